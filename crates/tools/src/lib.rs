//! Local actions and tools for the inkloop agents.
//!
//! Text-directive agents name actions in an `Action: <name>: <argument>`
//! line. The set of actions is closed: [`ActionKind`] lists them and
//! [`ActionRegistry`] is the explicit dispatch table from name to handler.
//! Unknown names are rejected at [`ActionRegistry::resolve`].

pub mod calculator;
pub mod dog_weight;
pub mod web_search;

use inkloop_core::error::ToolError;

pub use web_search::{WEB_SEARCH, WebSearchTool};

/// Every action a text-directive agent can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Calculate,
    AverageDogWeight,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::Calculate, ActionKind::AverageDogWeight];

    /// The name the model uses in its directive.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Calculate => "calculate",
            ActionKind::AverageDogWeight => "average_dog_weight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Prompt text: an example call and what comes back.
    pub fn usage(self) -> &'static str {
        match self {
            ActionKind::Calculate => {
                "e.g. calculate: 4 * 7 / 3\n\
                 Runs a calculation and returns the number. Supports + - * / and parentheses"
            }
            ActionKind::AverageDogWeight => {
                "e.g. average_dog_weight: Collie\n\
                 returns average weight of a dog when given the breed"
            }
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A pure function from the raw argument string to a result string.
pub type ActionFn = fn(&str) -> Result<String, ToolError>;

/// A resolved action, ready to invoke.
#[derive(Debug, Clone, Copy)]
pub struct Action {
    kind: ActionKind,
    handler: ActionFn,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn invoke(&self, argument: &str) -> Result<String, ToolError> {
        (self.handler)(argument)
    }

    /// Invoke and flatten any failure into its description.
    pub fn observe(&self, argument: &str) -> String {
        match self.invoke(argument) {
            Ok(out) => out,
            Err(e) => e.to_string(),
        }
    }
}

/// Static name → handler table. Immutable once built.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    table: Vec<(ActionKind, ActionFn)>,
}

impl ActionRegistry {
    /// All built-in actions.
    pub fn builtin() -> Self {
        Self {
            table: vec![
                (ActionKind::Calculate, calculator::calculate),
                (ActionKind::AverageDogWeight, dog_weight::average_dog_weight),
            ],
        }
    }

    /// A registry limited to `kinds`.
    pub fn only(kinds: &[ActionKind]) -> Self {
        let mut registry = Self::builtin();
        registry.table.retain(|(k, _)| kinds.contains(k));
        registry
    }

    pub fn resolve(&self, name: &str) -> Option<Action> {
        let kind = ActionKind::from_name(name)?;
        self.table
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|&(kind, handler)| Action { kind, handler })
    }

    pub fn kinds(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.table.iter().map(|(k, _)| *k)
    }

    /// The "available actions" block of a text-directive system prompt.
    pub fn describe(&self) -> String {
        self.kinds()
            .map(|k| format!("{}:\n{}", k.name(), k.usage()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
