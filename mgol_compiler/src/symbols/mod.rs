//! Symbol Registry
//!
//! Lexeme to token mapping with insert-or-fetch semantics. One registry is
//! owned by each compilation session; the scanner fills it and the semantic
//! executor back-patches identifier types into it.

pub mod error;
pub mod table;

pub use error::{SymbolError, SymbolResult};
pub use table::SymbolTable;
