//! Run state of the revision loop and the transitions between steps.

use serde::{Deserialize, Serialize};

use super::trace::TraceRecord;

/// Everything one essay run knows.
///
/// `plan`, `draft` and `critique` hold the latest version only; `content`
/// only ever grows. The state changes solely through [`EssayState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayState {
    pub task: String,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub draft: String,
    #[serde(default)]
    pub critique: String,
    #[serde(default)]
    pub content: Vec<String>,
    /// Starts at 1; each Generate adds one.
    pub revision_number: u32,
    pub max_revisions: u32,
}

impl EssayState {
    pub fn new(task: impl Into<String>, max_revisions: u32) -> Self {
        Self {
            task: task.into(),
            plan: String::new(),
            draft: String::new(),
            critique: String::new(),
            content: Vec::new(),
            revision_number: 1,
            max_revisions,
        }
    }

    /// Merge one step's output into the state.
    pub fn apply(&mut self, record: &TraceRecord) {
        match record {
            TraceRecord::Plan { plan } => self.plan = plan.clone(),
            TraceRecord::ResearchPlan { content, .. }
            | TraceRecord::ResearchCritique { content, .. } => {
                self.content.extend(content.iter().cloned())
            }
            TraceRecord::Generate { draft, .. } => {
                self.draft = draft.clone();
                self.revision_number += 1;
            }
            TraceRecord::Reflect { critique } => self.critique = critique.clone(),
        }
    }

    /// Whether the drafts so far exhaust the revision budget.
    pub fn is_finished(&self) -> bool {
        self.revision_number > self.max_revisions
    }
}

/// The five steps of the revision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Plan,
    ResearchPlan,
    Generate,
    Reflect,
    ResearchCritique,
}

impl Step {
    pub const FIRST: Step = Step::Plan;

    pub fn name(self) -> &'static str {
        match self {
            Step::Plan => "plan",
            Step::ResearchPlan => "research_plan",
            Step::Generate => "generate",
            Step::Reflect => "reflect",
            Step::ResearchCritique => "research_critique",
        }
    }

    /// The step after `self`, given the state it left behind. `None` ends
    /// the run; only Generate can end it.
    pub fn next(self, state: &EssayState) -> Option<Step> {
        match self {
            Step::Plan => Some(Step::ResearchPlan),
            Step::ResearchPlan => Some(Step::Generate),
            Step::Generate if state.is_finished() => None,
            Step::Generate => Some(Step::Reflect),
            Step::Reflect => Some(Step::ResearchCritique),
            Step::ResearchCritique => Some(Step::Generate),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
