use serde::{Deserialize, Serialize};
use std::fmt;

/// Participants of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Seeds the task; speaks exactly once
    Initializer,
    /// Investigates with the retrieval tools and reports a conclusion
    Analyst,
    /// Runs the tool calls of the role that just spoke
    Executor,
    /// Reviews the analysis and owns the verdict
    Critic,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Initializer => "initializer",
            Role::Analyst => "analyst",
            Role::Executor => "executor",
            Role::Critic => "critic",
        }
    }

    /// Roles that talk to the oracle and may propose tool calls
    pub fn is_reasoning(self) -> bool {
        matches!(self, Role::Analyst | Role::Critic)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
