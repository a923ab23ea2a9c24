//! Matching run records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ModelId, ProjectId, RunId, WbsSetId};

/// Which tier of the matching algorithm produced a result.
///
/// Tiers are strictly ordered: an assembly-code match is never
/// overridden by a better-scoring text match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    AssemblyCodeExact,
    AssemblyCodePrefix,
    DescriptionSimilarity,
    Unmatched,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssemblyCodeExact => "assembly-code-exact",
            Self::AssemblyCodePrefix => "assembly-code-prefix",
            Self::DescriptionSimilarity => "description-similarity",
            Self::Unmatched => "unmatched",
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, Self::Unmatched)
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of matching one element against the WBS set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Zero-padded sequential index preserving element input order.
    pub item_key: String,
    pub element_id: String,
    pub assembly_code: String,
    pub matched_wbs_code: Option<String>,
    pub matched_wbs_title: Option<String>,
    /// Confidence in `[0, 1]`; 0 for unmatched elements.
    pub confidence: f64,
    pub strategy: MatchStrategy,
}

/// The immutable output of one matching pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRun {
    pub run_id: RunId,
    pub wbs_set_id: WbsSetId,
    pub project_id: ProjectId,
    pub model_id: ModelId,
    pub created_at: DateTime<Utc>,
    pub total_elements: usize,
    pub matched_elements: usize,
    pub unmatched_elements: usize,
    /// Mean confidence over matched elements only; 0 when none matched.
    pub average_confidence: f64,
    pub results: Vec<MatchResult>,
}

impl MatchRun {
    /// Result counts per strategy tier.
    pub fn strategy_counts(&self) -> BTreeMap<MatchStrategy, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.strategy).or_insert(0) += 1;
        }
        counts
    }
}
