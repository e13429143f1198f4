//! Semantic analysis and C code generation
//!
//! The executor runs one action per grammar reduction. Declarations back-patch
//! identifier types into the Symbol Registry, expressions are type-checked and
//! lowered to three-address statements over `T{n}` temporaries, and control
//! structures wrap the statements their bodies already emitted.

pub mod codegen;
pub mod error;
pub mod executor;

pub use codegen::{CodeBuffer, TemporaryKind};
pub use error::SemanticError;
pub use executor::{Reduction, SemanticAction, SemanticExecutor};
