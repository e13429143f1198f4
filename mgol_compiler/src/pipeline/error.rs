use crate::config::ConfigError;
use crate::file_processor::FileProcessorError;
use crate::grammar::GrammarError;
use crate::lexical::LexerError;
use crate::logging::codes::{self, Code};
use crate::syntax::SyntaxError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Decision tables unavailable: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write output to {target}: {source}")]
    Output {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Compilation produced no program to write")]
    NothingToWrite,
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::LexicalAnalysis(e) => e.error_code(),
            PipelineError::Grammar(e) => e.error_code(),
            PipelineError::SyntaxAnalysis(e) => e.error_code(),
            PipelineError::Config(_) => codes::system::CONFIGURATION_ERROR,
            PipelineError::Output { .. } | PipelineError::NothingToWrite => {
                codes::file_processing::OUTPUT_WRITE_FAILED
            }
        }
    }
}
