//! Three-tier element-to-WBS matching.
//!
//! Tiers run in strict priority order per element: exact assembly-code
//! match, longest assembly-code prefix match, then token-similarity
//! against WBS titles. A tier that accepts is final; a later tier never
//! overrides an earlier one. Unmatched is a valid outcome, not an error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use bwm_model::{MatchStrategy, ModelElement, WbsCode, WbsItem};

use crate::tokens::{similarity, token_set};

/// Minimum similarity score accepted by the text tier.
const SIMILARITY_ACCEPT_MIN: f64 = 0.45;
/// Required gap between best and runner-up scores. A closer runner-up
/// means the match is ambiguous and the element stays unmatched.
const AMBIGUITY_GAP_MIN: f64 = 0.05;
/// Confidence assigned to assembly-code prefix matches.
const PREFIX_CONFIDENCE: f64 = 0.9;

/// Outcome of matching a single element.
#[derive(Debug, Clone)]
pub struct ElementMatch {
    pub wbs_code: Option<WbsCode>,
    pub wbs_title: Option<String>,
    pub confidence: f64,
    pub strategy: MatchStrategy,
}

impl ElementMatch {
    fn unmatched() -> Self {
        Self {
            wbs_code: None,
            wbs_title: None,
            confidence: 0.0,
            strategy: MatchStrategy::Unmatched,
        }
    }

    fn accepted(item: &WbsItem, confidence: f64, strategy: MatchStrategy) -> Self {
        Self {
            wbs_code: Some(item.code.clone()),
            wbs_title: Some(item.title.clone()),
            confidence,
            strategy,
        }
    }
}

/// Matching engine over one WBS set.
///
/// Token sets and the exact-code index are built once at construction;
/// matching each element is then pure in-memory computation, so a run
/// over identical inputs always yields identical results.
pub struct MatchEngine {
    items: Vec<WbsItem>,
    item_tokens: Vec<BTreeSet<String>>,
    by_code: BTreeMap<String, usize>,
}

impl MatchEngine {
    pub fn new(items: Vec<WbsItem>) -> Self {
        let item_tokens = items
            .iter()
            .map(|item| token_set(&format!("{} {}", item.code, item.title)))
            .collect();
        let by_code = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.code.as_str().to_string(), idx))
            .collect();
        Self {
            items,
            item_tokens,
            by_code,
        }
    }

    pub fn items(&self) -> &[WbsItem] {
        &self.items
    }

    /// Matches one element against the WBS set.
    pub fn match_element(&self, element: &ModelElement) -> ElementMatch {
        let assembly = WbsCode::try_normalize(&element.assembly_code);

        if let Some(code) = &assembly
            && let Some(&idx) = self.by_code.get(code.as_str())
        {
            return ElementMatch::accepted(&self.items[idx], 1.0, MatchStrategy::AssemblyCodeExact);
        }

        if let Some(code) = &assembly
            && let Some(idx) = self.longest_prefix(code)
        {
            return ElementMatch::accepted(
                &self.items[idx],
                PREFIX_CONFIDENCE,
                MatchStrategy::AssemblyCodePrefix,
            );
        }

        self.similarity_match(element)
    }

    /// Index of the item with the longest code that `code` equals or
    /// descends from. All matching prefixes lie on one ancestor chain,
    /// so the deepest level is unique.
    fn longest_prefix(&self, code: &WbsCode) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.code.is_prefix_of(code))
            .max_by_key(|(_, item)| item.level)
            .map(|(idx, _)| idx)
    }

    fn similarity_match(&self, element: &ModelElement) -> ElementMatch {
        let text = [
            element.assembly_description.as_str(),
            element.element_name.as_str(),
            element.family_name.as_str(),
            element.category.as_str(),
            element.type_mark.as_str(),
            element.description.as_str(),
        ]
        .join(" ");
        let element_tokens = token_set(&text);
        if element_tokens.is_empty() {
            return ElementMatch::unmatched();
        }

        let mut best: Option<(usize, f64)> = None;
        let mut second_score = 0.0_f64;
        for (idx, wbs_tokens) in self.item_tokens.iter().enumerate() {
            let score = similarity(&element_tokens, wbs_tokens);
            match best {
                Some((_, best_score)) if score > best_score => {
                    second_score = best_score;
                    best = Some((idx, score));
                }
                Some(_) => second_score = second_score.max(score),
                None => best = Some((idx, score)),
            }
        }

        let Some((idx, score)) = best else {
            return ElementMatch::unmatched();
        };
        if score < SIMILARITY_ACCEPT_MIN || score - second_score < AMBIGUITY_GAP_MIN {
            trace!(
                element = element.element_id,
                score,
                runner_up = second_score,
                "similarity below threshold or ambiguous"
            );
            return ElementMatch::unmatched();
        }

        ElementMatch::accepted(
            &self.items[idx],
            round4(score),
            MatchStrategy::DescriptionSimilarity,
        )
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(code: &str, title: &str) -> WbsItem {
        WbsItem::new(WbsCode::new(code).unwrap(), title)
    }

    fn element(assembly_code: &str, name: &str) -> ModelElement {
        ModelElement {
            element_id: "e1".to_string(),
            assembly_code: assembly_code.to_string(),
            element_name: name.to_string(),
            count: 1,
            ..Default::default()
        }
    }

    fn engine() -> MatchEngine {
        MatchEngine::new(vec![
            item("3.2.1", "Foundation Pour"),
            item("3.2", "Substructure Concrete"),
            item("3.5", "Interior Walls"),
        ])
    }

    #[test]
    fn exact_assembly_code_wins_with_full_confidence() {
        let matched = engine().match_element(&element("3.2.1", "anything"));
        assert_eq!(matched.strategy, MatchStrategy::AssemblyCodeExact);
        assert_eq!(matched.confidence, 1.0);
        assert_eq!(matched.wbs_code.unwrap().as_str(), "3.2.1");
    }

    #[test]
    fn exact_match_survives_messy_code_formatting() {
        let matched = engine().match_element(&element(" 3 .2..1 ", ""));
        assert_eq!(matched.strategy, MatchStrategy::AssemblyCodeExact);
    }

    #[test]
    fn prefix_match_picks_longest_ancestor() {
        // 3.2.1.7 descends from both 3.2 and 3.2.1; the deeper wins.
        let matched = engine().match_element(&element("3.2.1.7", ""));
        assert_eq!(matched.strategy, MatchStrategy::AssemblyCodePrefix);
        assert_eq!(matched.confidence, 0.9);
        assert_eq!(matched.wbs_code.unwrap().as_str(), "3.2.1");
    }

    #[test]
    fn prefix_requires_dot_boundary() {
        let engine = MatchEngine::new(vec![item("3.2", "Concrete")]);
        let matched = engine.match_element(&element("3.20", ""));
        // "3.20" is not a descendant of "3.2".
        assert_ne!(matched.strategy, MatchStrategy::AssemblyCodePrefix);
    }

    #[test]
    fn similarity_match_on_clear_title_overlap() {
        let matched = engine().match_element(&element("", "Interior Wall Type A"));
        assert_eq!(matched.strategy, MatchStrategy::DescriptionSimilarity);
        assert_eq!(matched.wbs_code.unwrap().as_str(), "3.5");
        assert!(matched.confidence >= SIMILARITY_ACCEPT_MIN);
    }

    #[test]
    fn ambiguous_runner_up_stays_unmatched() {
        let engine = MatchEngine::new(vec![
            item("1", "Steel Frame Erection"),
            item("2", "Steel Frame Painting"),
        ]);
        // Overlaps both titles identically; the gap is zero.
        let matched = engine.match_element(&element("", "Steel Frame"));
        assert_eq!(matched.strategy, MatchStrategy::Unmatched);
        assert_eq!(matched.confidence, 0.0);
    }

    #[test]
    fn empty_element_text_is_unmatched() {
        let matched = engine().match_element(&element("", ""));
        assert_eq!(matched.strategy, MatchStrategy::Unmatched);
        assert!(matched.wbs_code.is_none());
    }

    #[test]
    fn assembly_tier_never_falls_through_to_text() {
        // The element text strongly overlaps "Interior Walls" but the
        // assembly code resolves under 3.2, which must win.
        let mut e = element("3.2.9", "Interior Walls Interior Walls");
        e.description = "Interior Walls".to_string();
        let matched = engine().match_element(&e);
        assert_eq!(matched.strategy, MatchStrategy::AssemblyCodePrefix);
        assert_eq!(matched.wbs_code.unwrap().as_str(), "3.2");
    }

    #[test]
    fn matching_is_deterministic() {
        let engine = engine();
        let e = element("", "Interior Wall Type A");
        let first = engine.match_element(&e);
        let second = engine.match_element(&e);
        assert_eq!(first.strategy, second.strategy);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(
            first.wbs_code.map(|c| c.as_str().to_string()),
            second.wbs_code.map(|c| c.as_str().to_string())
        );
    }
}
