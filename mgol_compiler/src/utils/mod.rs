//! Shared primitives: source positions and the bounded stack used by the parser

pub mod span;
pub mod stack;

pub use span::{Position, SourceMap, Span, Spanned};
pub use stack::{BoundedStack, StackError};
