//! Trace records: one per completed step of the revision loop.
//!
//! A record is also the step's state update (see
//! [`EssayState::apply`](super::EssayState::apply)). Serialized as a JSON
//! object tagged by `kind`.

use serde::{Deserialize, Serialize};

use super::state::Step;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceRecord {
    Plan {
        plan: String,
    },
    ResearchPlan {
        queries: Vec<String>,
        /// Snippets added by this step, in query order.
        content: Vec<String>,
    },
    Generate {
        draft: String,
        /// Revision number after this draft.
        revision_number: u32,
    },
    Reflect {
        critique: String,
    },
    ResearchCritique {
        queries: Vec<String>,
        /// Snippets added by this step, in query order.
        content: Vec<String>,
        /// Snippets accumulated by the run once this step is applied.
        #[serde(default)]
        total_items: usize,
    },
}

impl TraceRecord {
    pub fn step(&self) -> Step {
        match self {
            TraceRecord::Plan { .. } => Step::Plan,
            TraceRecord::ResearchPlan { .. } => Step::ResearchPlan,
            TraceRecord::Generate { .. } => Step::Generate,
            TraceRecord::Reflect { .. } => Step::Reflect,
            TraceRecord::ResearchCritique { .. } => Step::ResearchCritique,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.step().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_by_kind() {
        let record = TraceRecord::ResearchCritique {
            queries: vec!["q".into()],
            content: vec!["c".into()],
            total_items: 3,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "research_critique");
        assert_eq!(json["content"][0], "c");
        assert_eq!(json["total_items"], 3);
        assert_eq!(record.kind(), "research_critique");
    }

    #[test]
    fn parses_from_json_line() {
        let record: TraceRecord =
            serde_json::from_str(r#"{"kind":"generate","draft":"Essay","revision_number":2}"#).unwrap();
        assert_eq!(record.step(), Step::Generate);
    }

    #[test]
    fn critique_without_total_still_parses() {
        let record: TraceRecord = serde_json::from_str(
            r#"{"kind":"research_critique","queries":[],"content":["a","b"]}"#,
        )
        .unwrap();
        assert!(matches!(record, TraceRecord::ResearchCritique { total_items: 0, .. }));
    }

    #[test]
    fn unknown_kind_does_not_parse() {
        let parsed = serde_json::from_str::<TraceRecord>(r#"{"kind":"summarize","text":"x"}"#);
        assert!(parsed.is_err());
    }
}
