//! Lexical analysis
//!
//! [`Scanner`] turns a [`CharSource`] into MGol tokens one call at a time.
//! Malformed lexemes become `Error` tokens plus a diagnostic so the parser
//! can keep going; only source read failures stop a run.

pub mod error;
pub mod scanner;
pub mod source;

use crate::config::compile_time::lexical::*;
use crate::logging::codes;
use crate::tokens::Token;
use crate::utils::Spanned;

pub use error::{LexerError, LexicalErrorKind};
pub use scanner::{LexicalMetrics, Scanner};
pub use source::{ByteSource, CharSource};

/// Tokenize in-memory text with a fresh registry
pub fn tokenize(text: &str) -> Result<Vec<Spanned<Token>>, LexerError> {
    Scanner::from_text(text)?.scan_all()
}

/// Check that lexical codes are registered and limits are usable
pub fn validate_lexical_config() -> Result<(), String> {
    for code in [
        codes::lexical::INVALID_NUMBER,
        codes::lexical::INVALID_LITERAL,
        codes::lexical::INVALID_COMMENT,
        codes::lexical::INVALID_WORD,
        codes::lexical::SOURCE_READ_ERROR,
        codes::lexical::TOKEN_LIMIT_EXCEEDED,
        codes::lexical::LEXEME_TOO_LONG,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Lexical error code {} has no metadata", code));
        }
    }

    if MAX_LEXEME_LENGTH == 0 {
        return Err("MAX_LEXEME_LENGTH cannot be zero".to_string());
    }
    if MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT cannot be zero".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenClass;

    #[test]
    fn test_tokenize_declaration() {
        let tokens = tokenize("varinicio inteiro A, B; varfim;").unwrap();
        let terminals: Vec<_> = tokens.iter().filter_map(|t| t.value.terminal()).collect();

        assert_eq!(
            terminals,
            vec!["varinicio", "inteiro", "id", "vir", "id", "pt_v", "varfim", "pt_v", "$"]
        );
    }

    #[test]
    fn test_comments_have_no_terminal() {
        let tokens = tokenize("{ nota } fim").unwrap();
        assert_eq!(tokens[0].value.class, TokenClass::Comment);
        assert_eq!(tokens[0].value.terminal(), None);
    }

    #[test]
    fn test_config_is_valid() {
        assert!(validate_lexical_config().is_ok());
    }
}
