//! Essay revision loop.
//!
//! ```text
//! Plan → ResearchPlan → Generate ─┬─ revision_number > max_revisions → done
//!                         ▲       └─ Reflect → ResearchCritique ─┐
//!                         └──────────────────────────────────────┘
//! ```
//!
//! Steps run strictly one after another. After every step the state and
//! the step to run next are saved under the run's [`ThreadId`], so an
//! interrupted run can be picked up with [`EssayAgent::resume`].

mod queries;
mod state;
mod steps;
mod trace;

use std::sync::Arc;

use inkloop_checkpoint::InMemoryCheckpointStore;
use inkloop_core::checkpoint::{CheckpointStore, ThreadId};
use inkloop_core::error::CheckpointError;
use inkloop_core::provider::Provider;
use inkloop_core::search::SearchClient;
use inkloop_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use queries::{MAX_QUERIES, decode_queries};
pub use state::{EssayState, Step};
pub use trace::TraceRecord;

use steps::StepRunner;

pub const DEFAULT_MAX_REVISIONS: u32 = 2;

/// Search results kept per research query.
pub const DEFAULT_RESULTS_PER_QUERY: usize = 2;

/// What the checkpoint store holds for a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRun {
    pub state: EssayState,
    /// `None` once the run has finished.
    pub next: Option<Step>,
}

/// Outcome of one essay invocation.
#[derive(Debug, Clone)]
pub struct EssayRun {
    /// The last draft.
    pub draft: String,
    pub state: EssayState,
    /// Records of the steps executed by this invocation.
    pub trace: Vec<TraceRecord>,
}

pub struct EssayAgent {
    steps: StepRunner,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl EssayAgent {
    /// An agent checkpointing into process memory.
    pub fn new(
        provider: Arc<dyn Provider>,
        search: Arc<dyn SearchClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            steps: StepRunner {
                provider,
                search,
                model: model.into(),
                temperature: 0.0,
                max_tokens: None,
                results_per_query: DEFAULT_RESULTS_PER_QUERY,
                search_concurrency: 1,
            },
            checkpoints: Arc::new(InMemoryCheckpointStore::new()),
        }
    }

    pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = store;
        self
    }

    pub fn with_results_per_query(mut self, n: usize) -> Self {
        self.steps.results_per_query = n;
        self
    }

    /// Allow up to `n` research searches in flight. Snippets are still
    /// appended in query order.
    pub fn with_search_concurrency(mut self, n: usize) -> Self {
        self.steps.search_concurrency = n.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.steps.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.steps.max_tokens = max_tokens;
        self
    }

    /// Write an essay from scratch. Any checkpoint already saved under
    /// `thread` is replaced.
    pub async fn run(&self, task: &str, max_revisions: u32, thread: &ThreadId) -> Result<EssayRun> {
        self.run_with(task, max_revisions, thread, &mut |_| {}).await
    }

    /// Like [`run`](Self::run), handing every trace record to `on_record`
    /// as soon as its step completes.
    pub async fn run_with(
        &self,
        task: &str,
        max_revisions: u32,
        thread: &ThreadId,
        on_record: &mut (dyn FnMut(&TraceRecord) + Send),
    ) -> Result<EssayRun> {
        info!(thread = %thread, max_revisions, "Starting essay run");
        let state = EssayState::new(task, max_revisions);
        self.drive(thread, state, Some(Step::FIRST), on_record).await
    }

    /// Continue the run saved under `thread` from its next step. `None`
    /// when nothing is saved. A finished run resumes to itself with an
    /// empty trace.
    pub async fn resume(&self, thread: &ThreadId) -> Result<Option<EssayRun>> {
        self.resume_with(thread, &mut |_| {}).await
    }

    pub async fn resume_with(
        &self,
        thread: &ThreadId,
        on_record: &mut (dyn FnMut(&TraceRecord) + Send),
    ) -> Result<Option<EssayRun>> {
        let Some(saved) = self.checkpoint(thread).await? else {
            return Ok(None);
        };
        info!(
            thread = %thread,
            next = ?saved.next,
            revision = saved.state.revision_number,
            "Resuming essay run"
        );
        self.drive(thread, saved.state, saved.next, on_record)
            .await
            .map(Some)
    }

    /// The checkpoint saved under `thread`, if any.
    pub async fn checkpoint(&self, thread: &ThreadId) -> Result<Option<SavedRun>> {
        let Some(value) = self.checkpoints.load(thread).await? else {
            return Ok(None);
        };
        let saved = serde_json::from_value(value).map_err(|e| CheckpointError::Corrupted {
            thread_id: thread.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(saved))
    }

    async fn drive(
        &self,
        thread: &ThreadId,
        mut state: EssayState,
        mut next: Option<Step>,
        on_record: &mut (dyn FnMut(&TraceRecord) + Send),
    ) -> Result<EssayRun> {
        let mut trace = Vec::new();

        while let Some(step) = next {
            debug!(thread = %thread, %step, revision = state.revision_number, "Essay step");
            let record = self.steps.run(step, &state).await?;
            state.apply(&record);
            next = step.next(&state);

            let saved = SavedRun {
                state: state.clone(),
                next,
            };
            self.checkpoints
                .save(thread, serde_json::to_value(&saved)?)
                .await?;

            on_record(&record);
            trace.push(record);
        }

        info!(
            thread = %thread,
            revision = state.revision_number,
            snippets = state.content.len(),
            steps = trace.len(),
            "Essay run finished"
        );
        Ok(EssayRun {
            draft: state.draft.clone(),
            state,
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, ScriptedProvider, ScriptedSearch};
    use inkloop_core::Error;
    use inkloop_core::error::DecodeError;
    use inkloop_core::message::Role;

    const PLAN: &str = "I. Intro\nII. Body\nIII. Conclusion";

    fn agent(provider: Arc<ScriptedProvider>, search: Arc<ScriptedSearch>) -> EssayAgent {
        EssayAgent::new(provider, search, "mock-model")
    }

    /// Responses for a two-draft run (`max_revisions = 2`).
    fn two_draft_script() -> Vec<&'static str> {
        vec![
            PLAN,
            r#"{"queries": ["rust ownership", "borrow checker"]}"#,
            "Draft one.",
            "Needs more depth.",
            "Here you go: {\"queries\": [\"rust lifetimes explained\"]}",
            "Draft two.",
        ]
    }

    #[tokio::test]
    async fn two_drafts_one_reflection() {
        let provider = Arc::new(ScriptedProvider::texts(&two_draft_script()));
        let search = Arc::new(ScriptedSearch::new());
        let run = agent(provider.clone(), search.clone())
            .run("Write about Rust", 2, &ThreadId::from("t"))
            .await
            .unwrap();

        let kinds: Vec<&str> = run.trace.iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec!["plan", "research_plan", "generate", "reflect", "research_critique", "generate"]
        );
        assert_eq!(run.draft, "Draft two.");
        assert_eq!(run.state.revision_number, 3);
        assert_eq!(provider.call_count(), 6);

        // 3 queries, 2 snippets each, appended in query order
        assert_eq!(
            run.state.content,
            vec![
                "rust ownership #0",
                "rust ownership #1",
                "borrow checker #0",
                "borrow checker #1",
                "rust lifetimes explained #0",
                "rust lifetimes explained #1",
            ]
        );
        assert!(search.requests().iter().all(|r| r.max_results == 2));
    }

    #[tokio::test]
    async fn single_revision_stops_after_first_draft() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            PLAN,
            r#"{"queries": ["q"]}"#,
            "Only draft.",
        ]));
        let run = agent(provider.clone(), Arc::new(ScriptedSearch::new()))
            .run("task", 1, &ThreadId::from("t"))
            .await
            .unwrap();

        assert_eq!(run.draft, "Only draft.");
        assert_eq!(run.state.revision_number, 2);
        assert!(run.trace.iter().all(|r| r.step() != Step::Reflect));
    }

    #[tokio::test]
    async fn prompts_reach_the_model() {
        let provider = Arc::new(ScriptedProvider::texts(&two_draft_script()));
        agent(provider.clone(), Arc::new(ScriptedSearch::new()))
            .run("Write about Rust", 2, &ThreadId::from("t"))
            .await
            .unwrap();
        let requests = provider.requests();

        // plan: planner instruction + raw task
        assert!(requests[0].messages[0].content.starts_with("You are an expert writer"));
        assert_eq!(requests[0].messages[1].content, "Write about Rust");

        // first generate: snippets joined by blank lines, plan in the user turn
        let generate = &requests[2].messages;
        assert_eq!(generate[0].role, Role::System);
        assert!(generate[0].content.contains("rust ownership #0\n\nrust ownership #1"));
        assert_eq!(
            generate[1].content,
            format!("Write about Rust\n\nHere is my plan:\n\n{PLAN}")
        );

        // reflect grades the draft
        assert_eq!(requests[3].messages[1].content, "Draft one.");
        // research critique is driven by the critique
        assert!(requests[4].messages[1].content.contains("Critique: Needs more depth."));
        assert!(requests.iter().all(|r| r.temperature == 0.0));
    }

    #[tokio::test]
    async fn malformed_queries_abort_without_searching() {
        let provider = Arc::new(ScriptedProvider::texts(&[PLAN, "I would search for rust things."]));
        let search = Arc::new(ScriptedSearch::new());
        let err = agent(provider, search.clone())
            .run("task", 2, &ThreadId::from("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(DecodeError::MissingObject)));
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn search_failure_aborts_run() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            PLAN,
            r#"{"queries": ["fine", "down", "never"]}"#,
        ]));
        let search = Arc::new(ScriptedSearch::failing_on("down"));
        let err = agent(provider, search.clone())
            .run("task", 2, &ThreadId::from("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Search(_)));
        // sequential by default: the query after the failure is never sent
        assert_eq!(search.call_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_search_keeps_query_order() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            PLAN,
            r#"{"queries": ["a", "b", "c"]}"#,
            "Draft.",
        ]));
        let run = agent(provider, Arc::new(ScriptedSearch::new()))
            .with_search_concurrency(3)
            .with_results_per_query(1)
            .run("task", 1, &ThreadId::from("t"))
            .await
            .unwrap();
        assert_eq!(run.state.content, vec!["a #0", "b #0", "c #0"]);
    }

    #[tokio::test]
    async fn records_are_streamed_in_order() {
        let provider = Arc::new(ScriptedProvider::texts(&two_draft_script()));
        let mut seen = Vec::new();
        agent(provider, Arc::new(ScriptedSearch::new()))
            .run_with("task", 2, &ThreadId::from("t"), &mut |r| seen.push(r.kind()))
            .await
            .unwrap();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], "plan");
        assert_eq!(seen[5], "generate");
    }

    #[tokio::test]
    async fn every_step_is_checkpointed() {
        let provider = Arc::new(ScriptedProvider::texts(&two_draft_script()));
        let store = Arc::new(InMemoryCheckpointStore::new());
        let agent = agent(provider, Arc::new(ScriptedSearch::new()))
            .with_checkpoint_store(store.clone());
        let thread = ThreadId::from("essay-1");
        agent.run("task", 2, &thread).await.unwrap();

        let saved = agent.checkpoint(&thread).await.unwrap().unwrap();
        assert_eq!(saved.next, None);
        assert_eq!(saved.state.draft, "Draft two.");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn resume_continues_from_next_step() {
        let store = Arc::new(InMemoryCheckpointStore::new());
        let thread = ThreadId::from("essay-2");

        // first attempt dies in the critique research step
        let first = Arc::new(ScriptedProvider::texts(&[
            PLAN,
            r#"{"queries": ["q"]}"#,
            "Draft one.",
            "Needs more depth.",
            "no json, sorry",
        ]));
        let err = agent(first, Arc::new(ScriptedSearch::new()))
            .with_checkpoint_store(store.clone())
            .run("task", 2, &thread)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        // the retry only replays ResearchCritique and the second Generate
        let second = Arc::new(ScriptedProvider::texts(&[r#"{"queries": ["r"]}"#, "Draft two."]));
        let agent = agent(second.clone(), Arc::new(ScriptedSearch::new()))
            .with_checkpoint_store(store.clone());
        let run = agent.resume(&thread).await.unwrap().unwrap();

        assert_eq!(second.call_count(), 2);
        let kinds: Vec<&str> = run.trace.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec!["research_critique", "generate"]);
        assert_eq!(run.draft, "Draft two.");
        assert_eq!(run.state.content, vec!["q #0", "q #1", "r #0", "r #1"]);
        assert_eq!(run.state.revision_number, 3);

        // finished runs resume to themselves
        let again = agent.resume(&thread).await.unwrap().unwrap();
        assert!(again.trace.is_empty());
        assert_eq!(again.draft, "Draft two.");
    }

    #[tokio::test]
    async fn resume_without_checkpoint_is_none() {
        let provider = Arc::new(ScriptedProvider::texts(&[]));
        let agent = agent(provider, Arc::new(ScriptedSearch::new()));
        assert!(agent.resume(&ThreadId::from("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupted_checkpoint_is_reported() {
        let store = Arc::new(InMemoryCheckpointStore::new());
        let thread = ThreadId::from("bad");
        store.save(&thread, serde_json::json!({"oops": true})).await.unwrap();

        let agent = agent(Arc::new(ScriptedProvider::texts(&[])), Arc::new(ScriptedSearch::new()))
            .with_checkpoint_store(store);
        let err = agent.resume(&thread).await.unwrap_err();
        assert!(matches!(err, Error::Checkpoint(CheckpointError::Corrupted { .. })));
    }

    #[tokio::test]
    async fn provider_failure_is_fatal() {
        let agent = EssayAgent::new(Arc::new(FailingProvider), Arc::new(ScriptedSearch::new()), "m");
        let err = agent.run("task", 2, &ThreadId::new()).await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }
}
