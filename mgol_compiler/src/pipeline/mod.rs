//! Complete compilation: file -> scanner -> parser + semantic actions -> C
//!
//! A [`Compiler`] owns the decision tables and runtime preferences and can run
//! any number of compilations; each one gets a fresh Symbol Registry and code
//! buffer, so compilations never share state.

mod error;
mod info;
mod result;

pub use error::PipelineError;
pub use info::PipelineInfo;
pub use result::CompilationResult;

use crate::automaton::ScannerTable;
use crate::config::RuntimeConfig;
use crate::file_processor::FileProcessor;
use crate::grammar::DecisionTables;
use crate::lexical::{ByteSource, CharSource, LexerError, Scanner};
use crate::logging::{self, codes};
use crate::symbols::SymbolTable;
use crate::syntax::Parser;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

pub const MEMORY_SOURCE_NAME: &str = "<memory>";

pub struct Compiler {
    tables: DecisionTables,
    config: RuntimeConfig,
}

impl Compiler {
    /// Compiler over the built-in MGol tables with default preferences
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self::with_tables(DecisionTables::mgol()?, RuntimeConfig::default()))
    }

    pub fn with_config(config: RuntimeConfig) -> Result<Self, PipelineError> {
        Ok(Self::with_tables(DecisionTables::mgol()?, config))
    }

    pub fn with_tables(tables: DecisionTables, config: RuntimeConfig) -> Self {
        Self { tables, config }
    }

    pub fn tables(&self) -> &DecisionTables {
        &self.tables
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn compile_source(&self, source: &str) -> Result<CompilationResult, PipelineError> {
        self.compile(ByteSource::from_text(source), MEMORY_SOURCE_NAME)
    }

    /// Validate and load `path`, then compile it with the file as log context
    pub fn compile_file<P: AsRef<Path>>(&self, path: P) -> Result<CompilationResult, PipelineError> {
        let path = path.as_ref();
        let name = path.display().to_string();

        logging::with_file_context(path.to_path_buf(), || -> Result<_, PipelineError> {
            crate::log_info!("Starting MGol compilation", "file" => &name);

            let processor = FileProcessor::from_preferences(&self.config.file_processor);
            let file = processor.process_file(path)?;
            self.compile(file.into_source(), &name)
        })
    }

    /// Compile from any byte source
    pub fn compile<S: CharSource>(
        &self,
        source: S,
        source_name: &str,
    ) -> Result<CompilationResult, PipelineError> {
        let start_time = Instant::now();

        let scanner_table = ScannerTable::mgol().map_err(LexerError::from)?;
        let scanner = Scanner::with_preferences(
            source,
            scanner_table,
            SymbolTable::with_reserved_words(),
            self.config.lexical.clone(),
        );

        let outcome =
            Parser::with_preferences(scanner, &self.tables, self.config.syntax.clone()).parse()?;

        let suppress_for_lexical =
            !self.config.codegen.emit_on_lexical_errors && outcome.has_lexical_errors();
        let program = if suppress_for_lexical {
            crate::log_info!("Output suppressed because of lexical errors", "source" => source_name);
            None
        } else {
            outcome.program.clone()
        };

        let result = CompilationResult {
            source_name: source_name.to_string(),
            success: outcome.success(),
            accepted: outcome.accepted,
            recovery_failed: outcome.recovery_failed,
            diagnostics: outcome.diagnostics,
            program,
            symbols: outcome.symbols,
            lexical_metrics: outcome.lexical_metrics,
            syntax_metrics: outcome.syntax_metrics,
            processing_duration: start_time.elapsed(),
        };

        result.log_summary();
        Ok(result)
    }
}

/// Compile in-memory text with the built-in tables
pub fn compile_source(source: &str) -> Result<CompilationResult, PipelineError> {
    Compiler::new()?.compile_source(source)
}

/// Compile a source file with the built-in tables
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<CompilationResult, PipelineError> {
    Compiler::new()?.compile_file(path)
}

/// Write the generated program to `sink` in a single write
pub fn write_output<W: Write>(result: &CompilationResult, sink: &mut W) -> Result<(), PipelineError> {
    let program = result.program.as_ref().ok_or(PipelineError::NothingToWrite)?;

    sink.write_all(program.as_bytes())
        .and_then(|_| sink.flush())
        .map_err(|source| PipelineError::Output {
            target: result.source_name.clone(),
            source,
        })
}

/// Write the generated program to a file, replacing any previous contents
pub fn write_output_file<P: AsRef<Path>>(
    result: &CompilationResult,
    path: P,
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let program = result.program.as_ref().ok_or(PipelineError::NothingToWrite)?;

    std::fs::write(path, program).map_err(|source| {
        let error = PipelineError::Output {
            target: path.display().to_string(),
            source,
        };
        crate::log_error!(error.error_code(), "Failed to write generated code",
            "path" => path.display()
        );
        error
    })?;

    crate::log_success!(codes::success::CODE_GENERATED, "Generated code written",
        "path" => path.display(),
        "bytes" => program.len()
    );
    Ok(())
}

/// Build facts for the built-in tables
pub fn get_pipeline_info() -> Result<PipelineInfo, PipelineError> {
    Ok(PipelineInfo::from_tables(&DecisionTables::mgol()?))
}

/// Check that every stage's configuration is usable
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::validate_file_processor_config()?;
    crate::lexical::validate_lexical_config()?;
    ScannerTable::mgol().map_err(|e| format!("Scanner automaton is invalid: {}", e))?;
    DecisionTables::mgol().map_err(|e| format!("Decision tables are invalid: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::CodegenPreferences;
    use crate::tokens::{DataType, TokenClass};
    use assert_matches::assert_matches;

    const SUM_PROGRAM: &str = "inicio varinicio inteiro A,B,C; varfim; A<-B+C; fim";

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_pipeline_info_counts_tables() {
        let info = get_pipeline_info().unwrap();
        assert_eq!(info.grammar_rules, 39);
        assert!(info.parser_states > 0);
        assert!(info.report().contains("Grammar Rules: 39"));
    }

    #[test]
    fn test_assignment_tokens() {
        let tokens = crate::lexical::tokenize("A<-B+C").unwrap();
        let classes: Vec<TokenClass> = tokens.iter().map(|t| t.value.class).collect();

        assert_eq!(
            classes,
            vec![
                TokenClass::Identifier,
                TokenClass::Assignment,
                TokenClass::Identifier,
                TokenClass::ArithmeticOp,
                TokenClass::Identifier,
                TokenClass::EndOfFile,
            ]
        );
        assert_eq!(tokens[3].value.lexeme, "+");
    }

    #[test]
    fn test_sum_program_end_to_end() {
        let result = compile_source(SUM_PROGRAM).unwrap();

        assert!(result.success);
        assert_eq!(result.error_count(), 0);

        let program = result.program.as_deref().unwrap();
        assert_eq!(program.matches("int T").count(), 1);
        assert_eq!(program.matches("T0 = B + C;").count(), 1);
        assert_eq!(program.matches("A = T0;").count(), 1);
        assert!(program.starts_with("#include<stdio.h>\n"));
        assert!(program.ends_with("}\n"));

        for name in ["A", "B", "C"] {
            assert_eq!(result.symbols.data_type_of(name), DataType::Integer);
        }
    }

    #[test]
    fn test_literals_compile_to_valid_c() {
        let source = "inicio varinicio literal S, U; varfim; \
                      escreva \"linha1\nlinha2\"; escreva \"50%d\"; S <- U; fim";
        let result = compile_source(source).unwrap();

        assert!(result.success);
        let program = result.program.as_deref().unwrap();
        assert!(program.contains("\tprintf(\"%s\", \"linha1\\nlinha2\");\n"));
        assert!(program.contains("\tprintf(\"%s\", \"50%d\");\n"));
        assert!(program.contains("\tstrcpy(S, U);\n"));
        assert!(program.contains("#include<string.h>\n"));
    }

    #[test]
    fn test_undeclared_io_blocks_code_but_accepts() {
        for source in [
            "inicio varinicio varfim; leia X; fim",
            "inicio varinicio varfim; escreva X; fim",
        ] {
            let result = compile_source(source).unwrap();

            assert!(result.accepted);
            assert!(!result.success);
            assert_eq!(result.semantic_errors().count(), 1);
            assert_eq!(result.error_count(), 1);
            assert!(result.program.is_none());
        }
    }

    #[test]
    fn test_type_mismatch_reports_position() {
        let source = "inicio\nvarinicio\n inteiro A;\n real B;\nvarfim;\nA <- B;\nfim";
        let result = compile_source(source).unwrap();

        let errors: Vec<_> = result.semantic_errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, codes::semantic::ASSIGNMENT_TYPE_MISMATCH);
        assert_eq!(errors[0].position.line, 6);
        assert_eq!(errors[0].position.column, 1);
        assert!(result.program.is_none());
    }

    #[test]
    fn test_several_semantic_errors_in_one_run() {
        let source = "inicio varinicio inteiro A; literal S; varfim;\n\
                      leia Q;\n\
                      A <- S + S;\n\
                      escreva W;\n\
                      fim";
        let result = compile_source(source).unwrap();

        assert!(result.accepted);
        assert_eq!(result.semantic_errors().count(), 3);
        assert_eq!(
            result.diagnostics.iter().map(|d| d.position.line).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_lexical_error_preference() {
        let source = "inicio varinicio varfim; @ fim";

        let lenient = compile_source(source).unwrap();
        assert!(lenient.program.is_some());
        assert_eq!(lenient.lexical_errors().count(), 1);

        let config = RuntimeConfig {
            codegen: CodegenPreferences {
                default_output: "output.c".to_string(),
                emit_on_lexical_errors: false,
            },
            ..RuntimeConfig::default()
        };
        let strict = Compiler::with_config(config)
            .unwrap()
            .compile_source(source)
            .unwrap();
        assert!(strict.program.is_none());
    }

    #[test]
    fn test_compile_file_and_write_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("soma.mgol");
        let output = dir.path().join("soma.c");
        std::fs::write(&input, SUM_PROGRAM).unwrap();

        let result = compile_file(&input).unwrap();
        assert!(result.success);
        assert!(result.source_name.ends_with("soma.mgol"));

        write_output_file(&result, &output).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            result.program.clone().unwrap()
        );

        let mut sink = Vec::new();
        write_output(&result, &mut sink).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), result.program.unwrap());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = compile_file(dir.path().join("nada.mgol"));
        assert_matches!(result, Err(PipelineError::FileProcessing(_)));
    }

    #[test]
    fn test_nothing_to_write() {
        let result = compile_source("inicio varinicio varfim; leia X; fim").unwrap();
        let mut sink = Vec::new();

        assert_matches!(
            write_output(&result, &mut sink),
            Err(PipelineError::NothingToWrite)
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_exported_tables_compile_the_same() {
        let dir = tempfile::tempdir().unwrap();
        DecisionTables::mgol().unwrap().export_dir(dir.path()).unwrap();

        let tables = DecisionTables::load_dir(dir.path()).unwrap();
        let compiler = Compiler::with_tables(tables, RuntimeConfig::default());
        let from_files = compiler.compile_source(SUM_PROGRAM).unwrap();
        let built_in = compile_source(SUM_PROGRAM).unwrap();

        assert_eq!(from_files.program, built_in.program);
    }
}
