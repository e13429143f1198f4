//! Syntax analysis
//!
//! An LR engine driven by [`DecisionTables`](crate::grammar::DecisionTables)
//! pulls tokens from the scanner, runs a semantic action on every reduction,
//! and recovers from syntax errors in panic mode.

pub mod error;
pub mod parser;
pub mod recovery;

pub use error::SyntaxError;
pub use parser::{ParseOutcome, Parser, SyntaxErrorRecord, SyntaxMetrics, INITIAL_STATE};
