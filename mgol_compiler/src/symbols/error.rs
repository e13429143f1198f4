use crate::logging::codes::{self, Code};
use crate::tokens::DataType;

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("Symbol '{lexeme}' is not in the symbol table")]
    NotFound { lexeme: String },

    #[error("Reserved word '{lexeme}' cannot be given type {data_type}")]
    ReservedWord { lexeme: String, data_type: DataType },
}

impl SymbolError {
    pub fn not_found(lexeme: &str) -> Self {
        Self::NotFound {
            lexeme: lexeme.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            SymbolError::NotFound { .. } => codes::semantic::UNDECLARED_IDENTIFIER,
            SymbolError::ReservedWord { .. } => codes::semantic::REDECLARATION,
        }
    }
}
