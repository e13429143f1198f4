use crate::logging::codes::{self, Code};
use crate::symbols::SymbolError;
use crate::utils::StackError;

/// Failures that stop the semantic executor; type errors are diagnostics instead
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("Rule {rule} needs {needed} values but the value stack holds {available}")]
    ValueStackUnderflow {
        rule: usize,
        needed: usize,
        available: usize,
    },

    #[error("Temporary limit of {limit} exceeded")]
    TooManyTemporaries { limit: usize },

    #[error("Value stack: {0}")]
    Stack(#[from] StackError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

impl SemanticError {
    pub fn error_code(&self) -> Code {
        match self {
            SemanticError::ValueStackUnderflow { .. } => codes::semantic::VALUE_STACK_UNDERFLOW,
            SemanticError::TooManyTemporaries { .. } => codes::semantic::TOO_MANY_TEMPORARIES,
            SemanticError::Stack(e) => e.error_code(),
            SemanticError::Symbol(e) => e.error_code(),
        }
    }
}
