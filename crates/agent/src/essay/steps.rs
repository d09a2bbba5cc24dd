//! The five step functions. Each reads the state and returns its update as
//! a [`TraceRecord`]; none of them mutates the state.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use inkloop_core::message::Message;
use inkloop_core::provider::{Provider, ProviderRequest};
use inkloop_core::search::{SearchClient, SearchRequest, SearchResponse};
use inkloop_core::Result;
use tracing::debug;

use super::queries::decode_queries;
use super::state::{EssayState, Step};
use super::trace::TraceRecord;
use crate::prompts;

pub(crate) struct StepRunner {
    pub provider: Arc<dyn Provider>,
    pub search: Arc<dyn SearchClient>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Search results kept per research query.
    pub results_per_query: usize,
    /// Research queries in flight at once.
    pub search_concurrency: usize,
}

impl StepRunner {
    pub async fn run(&self, step: Step, state: &EssayState) -> Result<TraceRecord> {
        match step {
            Step::Plan => self.plan(state).await,
            Step::ResearchPlan => self.research_plan(state).await,
            Step::Generate => self.generate(state).await,
            Step::Reflect => self.reflect(state).await,
            Step::ResearchCritique => self.research_critique(state).await,
        }
    }

    async fn plan(&self, state: &EssayState) -> Result<TraceRecord> {
        let plan = self.complete(prompts::PLAN, &state.task).await?;
        Ok(TraceRecord::Plan { plan })
    }

    async fn research_plan(&self, state: &EssayState) -> Result<TraceRecord> {
        let reply = self
            .complete(prompts::RESEARCH_PLAN, &prompts::research_plan_request(&state.task))
            .await?;
        let queries = decode_queries(&reply)?;
        let content = self.search_all(&queries).await?;
        Ok(TraceRecord::ResearchPlan { queries, content })
    }

    async fn generate(&self, state: &EssayState) -> Result<TraceRecord> {
        let system = prompts::writer(&state.content.join("\n\n"));
        let draft = self
            .complete(&system, &prompts::draft_request(&state.task, &state.plan))
            .await?;
        Ok(TraceRecord::Generate {
            draft,
            revision_number: state.revision_number + 1,
        })
    }

    async fn reflect(&self, state: &EssayState) -> Result<TraceRecord> {
        let critique = self.complete(prompts::REFLECTION, &state.draft).await?;
        Ok(TraceRecord::Reflect { critique })
    }

    async fn research_critique(&self, state: &EssayState) -> Result<TraceRecord> {
        let reply = self
            .complete(
                prompts::RESEARCH_CRITIQUE,
                &prompts::research_critique_request(&state.critique),
            )
            .await?;
        let queries = decode_queries(&reply)?;
        let content = self.search_all(&queries).await?;
        Ok(TraceRecord::ResearchCritique {
            total_items: state.content.len() + content.len(),
            queries,
            content,
        })
    }

    /// One system turn, one user turn, text back.
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ProviderRequest::new(
            &self.model,
            vec![Message::system(system), Message::user(user)],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }

    /// Search every query and flatten the snippets, in query order. The
    /// first failure aborts the step.
    async fn search_all(&self, queries: &[String]) -> Result<Vec<String>> {
        let responses: Vec<SearchResponse> = stream::iter(queries)
            .map(|query| {
                debug!(query = %query, "Research search");
                self.search
                    .search(SearchRequest::new(query.as_str(), self.results_per_query))
            })
            .buffered(self.search_concurrency.max(1))
            .try_collect()
            .await?;

        Ok(responses
            .into_iter()
            .flat_map(|r| r.results.into_iter().map(|hit| hit.content))
            .collect())
    }
}
