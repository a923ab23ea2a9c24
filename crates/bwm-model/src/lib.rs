#![deny(unsafe_code)]

pub mod code;
pub mod element;
pub mod error;
pub mod ids;
pub mod run;
pub mod wbs;

pub use code::WbsCode;
pub use element::{ElementProperty, FieldCompliance, ModelElement};
pub use error::{ModelError, Result};
pub use ids::{ModelId, ProjectId, RunId, WbsSetId};
pub use run::{MatchResult, MatchRun, MatchStrategy};
pub use wbs::{WbsItem, WbsSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_serializes() {
        let run = MatchRun {
            run_id: RunId::generate(),
            wbs_set_id: WbsSetId::generate(),
            project_id: ProjectId::new("P100").unwrap(),
            model_id: ModelId::new("M1").unwrap(),
            created_at: chrono::Utc::now(),
            total_elements: 1,
            matched_elements: 1,
            unmatched_elements: 0,
            average_confidence: 1.0,
            results: vec![MatchResult {
                item_key: "000000".to_string(),
                element_id: "e1".to_string(),
                assembly_code: "3.2.1".to_string(),
                matched_wbs_code: Some("3.2.1".to_string()),
                matched_wbs_title: Some("Foundation Pour".to_string()),
                confidence: 1.0,
                strategy: MatchStrategy::AssemblyCodeExact,
            }],
        };
        let json = serde_json::to_string(&run).expect("serialize run");
        let round: MatchRun = serde_json::from_str(&json).expect("deserialize run");
        assert_eq!(round.results[0].strategy, MatchStrategy::AssemblyCodeExact);
        assert_eq!(round.total_elements, 1);
    }
}
