//! Function-calling research loop.
//!
//! The model is offered a single `web_search` tool. Every structured call
//! in a response is executed in order and answered with one tool-result
//! message carrying the call's id; then the model is asked again. A
//! response without tool calls ends the run.

use std::sync::Arc;

use inkloop_core::message::{Message, Transcript};
use inkloop_core::provider::{Provider, ProviderRequest};
use inkloop_core::search::SearchClient;
use inkloop_core::tool::{BAD_TOOL_NAME, ToolCall};
use inkloop_core::Result;
use inkloop_tools::{WEB_SEARCH, WebSearchTool};
use tracing::{debug, info, warn};

use crate::{DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_REACHED, prompts};

/// Results requested per `web_search` call.
pub const DEFAULT_SEARCH_RESULTS: usize = 4;

pub struct ToolCallingAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system: String,
    search: WebSearchTool,
    max_iterations: u32,
}

/// Outcome of one [`ToolCallingAgent::run_detailed`] call.
#[derive(Debug, Clone)]
pub struct ToolCallingRun {
    pub answer: String,
    /// Everything exchanged during the run, system prompt excluded.
    pub transcript: Transcript,
    pub iterations: u32,
    pub tool_calls_made: usize,
    pub completed: bool,
}

impl ToolCallingAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        search: Arc<dyn SearchClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            system: prompts::RESEARCH_ASSISTANT.to_string(),
            search: WebSearchTool::new(search, DEFAULT_SEARCH_RESULTS),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Lower the iteration budget. Values above [`DEFAULT_MAX_ITERATIONS`]
    /// are clamped to it.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.min(DEFAULT_MAX_ITERATIONS);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Replace the search tool, e.g. to change its result cap.
    pub fn with_search_tool(mut self, tool: WebSearchTool) -> Self {
        self.search = tool;
        self
    }

    pub async fn run(&self, message: &str) -> Result<String> {
        Ok(self.run_detailed(message).await?.answer)
    }

    pub async fn run_detailed(&self, message: &str) -> Result<ToolCallingRun> {
        let tools = vec![self.search.definition()];
        let mut transcript = Transcript::new();
        transcript.push(Message::user(message));
        let mut tool_calls_made = 0;

        for iteration in 1..=self.max_iterations {
            debug!(iteration, "Tool-calling iteration");
            let request = ProviderRequest::new(&self.model, transcript.with_system(&self.system))
                .with_temperature(self.temperature)
                .with_max_tokens(self.max_tokens)
                .with_tools(tools.clone());
            let response = self.provider.complete(request).await?;

            if !response.message.has_tool_calls() {
                let answer = response.message.content.clone();
                transcript.push(response.message);
                info!(iterations = iteration, tool_calls = tool_calls_made, "Tool-calling loop completed");
                return Ok(ToolCallingRun {
                    answer,
                    transcript,
                    iterations: iteration,
                    tool_calls_made,
                    completed: true,
                });
            }

            let calls: Vec<ToolCall> = response.message.tool_calls.iter().map(ToolCall::from).collect();
            transcript.push(response.message);

            for call in calls {
                tool_calls_made += 1;
                let output = if call.name == WEB_SEARCH {
                    debug!(id = %call.id, "Calling web_search");
                    match self.search.call(&call.arguments).await {
                        Ok(out) => out,
                        Err(e) => {
                            warn!(error = %e, "web_search failed");
                            e.to_string()
                        }
                    }
                } else {
                    warn!(tool = %call.name, "Model called an unknown tool");
                    BAD_TOOL_NAME.to_string()
                };
                transcript.push(Message::tool_result(call.id, output));
            }
        }

        warn!(max_iterations = self.max_iterations, "Tool-calling loop: max iterations reached");
        Ok(ToolCallingRun {
            answer: MAX_ITERATIONS_REACHED.to_string(),
            transcript,
            iterations: self.max_iterations,
            tool_calls_made,
            completed: false,
        })
    }
}
