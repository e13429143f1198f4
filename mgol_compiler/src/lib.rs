//! Table-driven compiler from MGol to C
//!
//! The scanner is a DFA, the parser runs SLR(1) decision tables, and semantic
//! actions attached to grammar rules type-check and emit C as rules reduce.

#[macro_use]
pub mod logging;
pub mod automaton;
pub mod config;
pub mod diagnostics;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
pub mod pipeline;
pub mod semantic;
pub mod symbols;
pub mod syntax;
pub mod tokens;
pub mod utils;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use pipeline::{
    compile_file, compile_source, write_output, write_output_file, CompilationResult, Compiler,
    PipelineError,
};
pub use tokens::{DataType, Token, TokenClass};
