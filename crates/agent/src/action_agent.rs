//! Text-directive tool loop: Thought → Action → `<PAUSE>` → Observation.
//!
//! The model names an action in an `Action: <name>: <argument>` line and
//! stops at `<PAUSE>`. The loop runs the action locally and answers with an
//! `Observation: <result>` user turn. A completion without an action line
//! is the final answer and is returned verbatim.
//!
//! The agent owns its history: consecutive [`ActionAgent::run`] calls
//! continue the same conversation, and each call gets its own iteration
//! budget of at most [`DEFAULT_MAX_ITERATIONS`] inference calls. A turn is
//! recorded only once the model has answered it.

use std::sync::Arc;

use inkloop_core::message::{Message, Transcript};
use inkloop_core::provider::{Provider, ProviderRequest};
use inkloop_core::tool::{ActionRequest, BAD_TOOL_NAME};
use inkloop_core::Result;
use inkloop_tools::ActionRegistry;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_REACHED, directive, prompts};

pub struct ActionAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    registry: ActionRegistry,
    /// Custom system prompt. `None` means the generated action prompt.
    system: Option<String>,
    max_iterations: u32,
    history: Mutex<Transcript>,
}

/// One executed action and what came back.
#[derive(Debug, Clone)]
pub struct ActionStep {
    pub request: ActionRequest,
    pub observation: String,
}

/// Outcome of one [`ActionAgent::run_detailed`] call.
#[derive(Debug, Clone)]
pub struct ActionRun {
    pub answer: String,
    /// Inference calls made.
    pub iterations: u32,
    pub steps: Vec<ActionStep>,
    /// `false` when the iteration ceiling produced the answer.
    pub completed: bool,
}

impl ActionAgent {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            registry: ActionRegistry::builtin(),
            system: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            history: Mutex::new(Transcript::new()),
        }
    }

    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the generated system prompt. An empty prompt sends none.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
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

    pub fn system_prompt(&self) -> String {
        self.system
            .clone()
            .unwrap_or_else(|| prompts::action_prompt(&self.registry))
    }

    /// Answer `message`, running actions as the model asks for them.
    pub async fn run(&self, message: &str) -> Result<String> {
        Ok(self.run_detailed(message).await?.answer)
    }

    pub async fn run_detailed(&self, message: &str) -> Result<ActionRun> {
        let system = self.system_prompt();
        let mut history = self.history.lock().await;
        let mut steps = Vec::new();
        let mut next_prompt = message.to_string();

        for iteration in 1..=self.max_iterations {
            debug!(iteration, "Action loop iteration");
            let turn = Message::user(next_prompt);
            let mut messages = history.with_system(&system);
            messages.push(turn.clone());

            let request = ProviderRequest::new(&self.model, messages)
                .with_temperature(self.temperature)
                .with_max_tokens(self.max_tokens)
                .with_stop(prompts::PAUSE);
            let response = self.provider.complete(request).await?;
            let text = response.message.content.clone();
            history.push(turn);
            history.push(response.message);

            let Some(action) = directive::parse_action(&text) else {
                info!(iterations = iteration, actions = steps.len(), "Action loop completed");
                return Ok(ActionRun {
                    answer: text,
                    iterations: iteration,
                    steps,
                    completed: true,
                });
            };

            let observation = match self.registry.resolve(&action.name) {
                Some(handler) => {
                    debug!(action = %action.name, argument = %action.argument, "Running action");
                    handler.observe(&action.argument)
                }
                None => {
                    warn!(action = %action.name, "Model asked for an unknown action");
                    BAD_TOOL_NAME.to_string()
                }
            };

            next_prompt = format!("Observation: {observation}");
            steps.push(ActionStep {
                request: action,
                observation,
            });
        }

        warn!(max_iterations = self.max_iterations, "Action loop: max iterations reached");
        Ok(ActionRun {
            answer: MAX_ITERATIONS_REACHED.to_string(),
            iterations: self.max_iterations,
            steps,
            completed: false,
        })
    }

    /// Snapshot of the conversation so far, without the system prompt.
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.messages().to_vec()
    }

    /// Start a fresh conversation.
    pub async fn reset(&self) {
        *self.history.lock().await = Transcript::new();
    }
}
