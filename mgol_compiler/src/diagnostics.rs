//! Non-fatal problems found while compiling: lexical, syntax, and semantic

use crate::logging::codes::{self, Code};
use crate::utils::Position;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "lexical",
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Semantic => "semantic",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: Code,
    pub message: String,
    pub position: Position,
    /// Offending lexeme, when one exists
    pub lexeme: Option<String>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        code: Code,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            position,
            lexeme: None,
        }
    }

    pub fn lexical(code: Code, message: impl Into<String>, position: Position) -> Self {
        Self::new(DiagnosticKind::Lexical, code, message, position)
    }

    pub fn syntax(code: Code, message: impl Into<String>, position: Position) -> Self {
        Self::new(DiagnosticKind::Syntax, code, message, position)
    }

    pub fn semantic(code: Code, message: impl Into<String>, position: Position) -> Self {
        Self::new(DiagnosticKind::Semantic, code, message, position)
    }

    pub fn with_lexeme(mut self, lexeme: impl Into<String>) -> Self {
        self.lexeme = Some(lexeme.into());
        self
    }

    pub fn is_lexical(&self) -> bool {
        self.kind == DiagnosticKind::Lexical
    }

    pub fn is_syntax(&self) -> bool {
        self.kind == DiagnosticKind::Syntax
    }

    pub fn is_semantic(&self) -> bool {
        self.kind == DiagnosticKind::Semantic
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error[{}] at line {}, column {}: {}",
            self.kind, self.code, self.position.line, self.position.column, self.message
        )
    }
}
