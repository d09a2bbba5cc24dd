//! The agent loops of inkloop.
//!
//! Two orchestration shapes live here:
//!
//! 1. **Tool loop**: infer, run the requested tool, feed the observation
//!    back, infer again. Stops when the model answers without asking for a
//!    tool, or after a fixed number of iterations.
//!    - [`ActionAgent`] reads `Action: <name>: <argument>` lines from the
//!      completion text.
//!    - [`ToolCallingAgent`] uses the provider's structured tool calls.
//! 2. **Revision loop** ([`EssayAgent`]): plan, research, draft, critique,
//!    research again, redraft; bounded by a revision counter and
//!    checkpointed after every step.

pub mod action_agent;
pub mod directive;
pub mod essay;
pub mod prompts;
pub mod render;
pub mod tool_calling;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use action_agent::{ActionAgent, ActionRun, ActionStep};
pub use directive::parse_action;
pub use essay::{EssayAgent, EssayRun, EssayState, SavedRun, Step, TraceRecord};
pub use render::TraceRenderer;
pub use tool_calling::{ToolCallingAgent, ToolCallingRun};

/// Answer returned when a tool loop runs out of iterations.
pub const MAX_ITERATIONS_REACHED: &str = "Maximum iterations reached without final answer.";

/// Iteration ceiling shared by both tool loops.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;
