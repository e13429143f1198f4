use super::dfa::{StateId, Symbol};
use crate::logging::codes::{self, Code};

/// Construction-time defects in a transition table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutomatonError {
    #[error("State {state} has overlapping transitions on {first} and {second}")]
    Nondeterministic {
        state: StateId,
        first: Symbol,
        second: Symbol,
    },

    #[error("{role} state {state} is not declared")]
    UnknownState { role: &'static str, state: StateId },

    #[error("Final state {state} has no token class")]
    UnclassifiedFinalState { state: StateId },
}

impl AutomatonError {
    pub fn error_code(&self) -> Code {
        match self {
            AutomatonError::Nondeterministic { .. } => codes::automaton::NONDETERMINISTIC_TRANSITION,
            AutomatonError::UnknownState { .. } | AutomatonError::UnclassifiedFinalState { .. } => {
                codes::automaton::UNKNOWN_STATE
            }
        }
    }
}
