use super::tables::Action;
use crate::logging::codes::{self, Code};
use std::path::PathBuf;

/// Construction-time failures of the decision tables; always fatal
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("Cannot access table file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}:{line}: {message}")]
    TableFormat {
        origin: String,
        line: usize,
        message: String,
    },

    #[error("Invalid rule set in {origin}: {message}")]
    RulesFormat { origin: String, message: String },

    #[error("Unknown grammar rule {rule}")]
    UnknownRule { rule: usize },

    #[error("Conflict in state {state} on '{terminal}': {existing} vs {incoming}")]
    Conflict {
        state: usize,
        terminal: String,
        existing: Action,
        incoming: Action,
    },

    #[error("Symbol '{symbol}' is missing from the {table}")]
    UndefinedSymbol { symbol: String, table: &'static str },
}

impl GrammarError {
    pub fn error_code(&self) -> Code {
        match self {
            GrammarError::Io { .. } => codes::grammar::TABLE_IO_ERROR,
            GrammarError::TableFormat { .. } => codes::grammar::TABLE_FORMAT_ERROR,
            GrammarError::RulesFormat { .. } => codes::grammar::RULES_FORMAT_ERROR,
            GrammarError::UnknownRule { .. } => codes::grammar::UNKNOWN_RULE,
            GrammarError::Conflict { .. } => codes::grammar::GRAMMAR_CONFLICT,
            GrammarError::UndefinedSymbol { .. } => codes::grammar::UNDEFINED_SYMBOL,
        }
    }

    pub(crate) fn table_format(origin: &str, line: usize, message: impl Into<String>) -> Self {
        GrammarError::TableFormat {
            origin: origin.to_string(),
            line,
            message: message.into(),
        }
    }
}
