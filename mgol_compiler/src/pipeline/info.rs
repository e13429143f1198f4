use crate::config::build_info;
use crate::config::compile_time::{file_processing, syntax};
use crate::file_processor::MGOL_EXTENSION;
use crate::grammar::DecisionTables;

/// Static facts about the compiler build, shown by `mgolc --help`
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub build_profile: &'static str,
    pub limits_file: String,
    pub grammar_rules: usize,
    pub parser_states: usize,
    pub terminals: usize,
    pub max_file_size: u64,
    pub max_stack_depth: usize,
    pub source_extension: &'static str,
}

impl PipelineInfo {
    pub fn from_tables(tables: &DecisionTables) -> Self {
        Self {
            build_profile: build_info::profile(),
            limits_file: build_info::limits_file(),
            grammar_rules: tables.rules().len(),
            parser_states: tables.state_count(),
            terminals: tables.actions().terminals().len(),
            max_file_size: file_processing::MAX_FILE_SIZE,
            max_stack_depth: syntax::MAX_STACK_DEPTH,
            source_extension: MGOL_EXTENSION,
        }
    }

    pub fn report(&self) -> String {
        format!(
            "MGol Compilation Pipeline:\n\
             - Build Profile: {} ({})\n\
             - Grammar Rules: {}\n\
             - Parser States: {}\n\
             - Terminals: {}\n\
             - Max File Size: {} bytes\n\
             - Max Stack Depth: {}\n\
             - Source Extension: .{}",
            self.build_profile,
            self.limits_file,
            self.grammar_rules,
            self.parser_states,
            self.terminals,
            self.max_file_size,
            self.max_stack_depth,
            self.source_extension,
        )
    }
}
