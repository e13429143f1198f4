use crate::diagnostics::Diagnostic;
use crate::lexical::LexicalMetrics;
use crate::logging::codes;
use crate::symbols::SymbolTable;
use crate::syntax::SyntaxMetrics;
use std::time::Duration;

/// Everything one compilation produced
#[derive(Debug)]
pub struct CompilationResult {
    /// Name used in logs: a path, or `<memory>` for in-memory sources
    pub source_name: String,
    /// Accepted with no diagnostics of any kind
    pub success: bool,
    pub accepted: bool,
    pub recovery_failed: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub program: Option<String>,
    pub symbols: SymbolTable,
    pub lexical_metrics: LexicalMetrics,
    pub syntax_metrics: SyntaxMetrics,
    pub processing_duration: Duration,
}

impl CompilationResult {
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn lexical_errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_lexical())
    }

    pub fn syntax_errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_syntax())
    }

    pub fn semantic_errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_semantic())
    }

    pub fn log_summary(&self) {
        let duration_ms = format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0);

        if self.success {
            crate::log_success!(
                codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
                "Compilation succeeded",
                "source" => &self.source_name,
                "tokens" => self.lexical_metrics.total_tokens,
                "duration_ms" => duration_ms
            );
        } else {
            crate::log_info!("Compilation finished with errors",
                "source" => &self.source_name,
                "lexical" => self.lexical_errors().count(),
                "syntax" => self.syntax_errors().count(),
                "semantic" => self.semantic_errors().count(),
                "program_generated" => self.program.is_some(),
                "duration_ms" => duration_ms
            );
        }
    }
}
