//! Token model shared by the scanner, the parser, and the semantic executor
//!
//! A [`Token`] is a plain value: class, lexeme, and data type. Identifier
//! tokens are copies of Symbol Registry entries, so any read of an
//! identifier's declared type must go back through the registry.

pub mod keyword;
pub mod token;

pub use keyword::Keyword;
pub use token::{DataType, Token, TokenClass};
