use crate::grammar::GrammarError;
use crate::lexical::LexerError;
use crate::logging::codes::{self, Code};
use crate::semantic::SemanticError;
use crate::utils::StackError;

/// Failures that abort a parse; syntax errors in the input are diagnostics
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Parse stack: {0}")]
    Stack(#[from] StackError),

    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("No goto entry for state {state} on {nonterminal}")]
    MissingGoto { state: usize, nonterminal: String },
}

impl SyntaxError {
    pub fn error_code(&self) -> Code {
        match self {
            SyntaxError::Stack(e) => e.error_code(),
            SyntaxError::Lexer(e) => e.error_code(),
            SyntaxError::Grammar(e) => e.error_code(),
            SyntaxError::Semantic(e) => e.error_code(),
            SyntaxError::MissingGoto { .. } => codes::syntax::MISSING_GOTO,
        }
    }
}
