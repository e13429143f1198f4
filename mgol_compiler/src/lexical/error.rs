use crate::automaton::AutomatonError;
use crate::config::compile_time::lexical::MAX_LEXEME_LENGTH;
use crate::logging::codes::{self, Code};
use crate::utils::Position;

/// Fatal scanner failures; malformed input is reported as a diagnostic instead
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("Failed to read source at {position}: {message}")]
    SourceRead { message: String, position: Position },

    #[error("Too many tokens (max {limit})")]
    TokenLimitExceeded { limit: usize },

    #[error("Invalid scanner table: {0}")]
    Automaton(#[from] AutomatonError),
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            LexerError::SourceRead { .. } => codes::lexical::SOURCE_READ_ERROR,
            LexerError::TokenLimitExceeded { .. } => codes::lexical::TOKEN_LIMIT_EXCEEDED,
            LexerError::Automaton(e) => e.error_code(),
        }
    }
}

/// Category of a malformed lexeme; selects the message only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalErrorKind {
    InvalidNumber,
    InvalidLiteral,
    InvalidComment,
    InvalidWord,
    LexemeTooLong,
}

impl LexicalErrorKind {
    pub fn classify(lexeme: &[u8]) -> Self {
        match lexeme.first().copied() {
            Some(b'"') => LexicalErrorKind::InvalidLiteral,
            Some(b'{') => LexicalErrorKind::InvalidComment,
            _ if lexeme == b"}" => LexicalErrorKind::InvalidComment,
            _ if lexeme.iter().any(u8::is_ascii_digit) => LexicalErrorKind::InvalidNumber,
            _ => LexicalErrorKind::InvalidWord,
        }
    }

    pub fn code(&self) -> Code {
        match self {
            LexicalErrorKind::InvalidNumber => codes::lexical::INVALID_NUMBER,
            LexicalErrorKind::InvalidLiteral => codes::lexical::INVALID_LITERAL,
            LexicalErrorKind::InvalidComment => codes::lexical::INVALID_COMMENT,
            LexicalErrorKind::InvalidWord => codes::lexical::INVALID_WORD,
            LexicalErrorKind::LexemeTooLong => codes::lexical::LEXEME_TOO_LONG,
        }
    }

    pub fn message(&self) -> String {
        match self {
            LexicalErrorKind::InvalidNumber => "Invalid number".to_string(),
            LexicalErrorKind::InvalidLiteral => "Unterminated literal".to_string(),
            LexicalErrorKind::InvalidComment => "Unbalanced comment".to_string(),
            LexicalErrorKind::InvalidWord => "Invalid word".to_string(),
            LexicalErrorKind::LexemeTooLong => {
                format!("Lexeme too long (max {} bytes)", MAX_LEXEME_LENGTH)
            }
        }
    }
}
