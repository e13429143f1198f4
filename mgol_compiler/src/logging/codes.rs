//! Error and success codes with their classification metadata
//!
//! Every diagnostic the compiler can emit is identified by one `Code`. The
//! registry at the bottom of this module is the single source of severity,
//! category, and remediation text for each of them.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("E001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("E002");
    pub const CONFIGURATION_ERROR: Code = Code::new("E003");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const IO_ERROR: Code = Code::new("E010");
    pub const INVALID_PATH: Code = Code::new("E011");
    pub const TOO_MANY_LINES: Code = Code::new("E012");
    pub const OUTPUT_WRITE_FAILED: Code = Code::new("E013");
}

/// Lexical error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_NUMBER: Code = Code::new("E020");
    pub const INVALID_LITERAL: Code = Code::new("E021");
    pub const INVALID_COMMENT: Code = Code::new("E022");
    pub const INVALID_WORD: Code = Code::new("E023");
    pub const SOURCE_READ_ERROR: Code = Code::new("E024");
    pub const TOKEN_LIMIT_EXCEEDED: Code = Code::new("E025");
    pub const LEXEME_TOO_LONG: Code = Code::new("E026");
}

/// Automaton construction codes
pub mod automaton {
    use super::Code;

    pub const NONDETERMINISTIC_TRANSITION: Code = Code::new("E030");
    pub const UNKNOWN_STATE: Code = Code::new("E031");
}

/// Syntax error codes; E040..E049 mirror the action-table error categories
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const MISSING_PROGRAM_START: Code = Code::new("E041");
    pub const MALFORMED_DECLARATION: Code = Code::new("E042");
    pub const MALFORMED_ASSIGNMENT: Code = Code::new("E043");
    pub const MALFORMED_IO: Code = Code::new("E044");
    pub const MALFORMED_CONDITIONAL: Code = Code::new("E045");
    pub const MALFORMED_LOOP: Code = Code::new("E046");
    pub const UNBALANCED_PARENTHESES: Code = Code::new("E047");
    pub const MISSING_SEMICOLON: Code = Code::new("E048");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E049");
    pub const RECOVERY_FAILED: Code = Code::new("E050");
    pub const STACK_OVERFLOW: Code = Code::new("E051");
    pub const STACK_UNDERFLOW: Code = Code::new("E052");
    pub const MISSING_GOTO: Code = Code::new("E053");
}

/// Decision table and rule set codes
pub mod grammar {
    use super::Code;

    pub const TABLE_FORMAT_ERROR: Code = Code::new("E060");
    pub const UNKNOWN_RULE: Code = Code::new("E061");
    pub const GRAMMAR_CONFLICT: Code = Code::new("E062");
    pub const RULES_FORMAT_ERROR: Code = Code::new("E063");
    pub const TABLE_IO_ERROR: Code = Code::new("E064");
    pub const UNDEFINED_SYMBOL: Code = Code::new("E065");
}

pub mod semantic {
    use super::Code;

    pub const UNDECLARED_IDENTIFIER: Code = Code::new("E080");
    pub const TYPE_MISMATCH: Code = Code::new("E081");
    pub const ASSIGNMENT_TYPE_MISMATCH: Code = Code::new("E082");
    pub const LITERAL_IN_ARITHMETIC: Code = Code::new("E083");
    pub const REDECLARATION: Code = Code::new("E084");
    pub const TOO_MANY_TEMPORARIES: Code = Code::new("E085");
    pub const VALUE_STACK_UNDERFLOW: Code = Code::new("E086");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const AUTOMATON_CONSTRUCTED: Code = Code::new("I030");
    pub const PARSE_ACCEPTED: Code = Code::new("I040");
    pub const ERROR_RECOVERED: Code = Code::new("I041");
    pub const TABLES_CONSTRUCTED: Code = Code::new("I060");
    pub const SEMANTIC_ANALYSIS_COMPLETE: Code = Code::new("I080");
    pub const CODE_GENERATED: Code = Code::new("I090");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

type Entry = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

// (code, category, severity, recoverable, requires_halt, description, action)
const REGISTRY_ENTRIES: &[Entry] = &[
    ("E001", "System", Severity::Critical, false, true,
        "Internal compiler error", "File a bug report with the failing input"),
    ("E002", "System", Severity::Critical, false, true,
        "Logging or session initialization failed", "Check runtime configuration"),
    ("E003", "System", Severity::High, false, true,
        "Runtime configuration could not be loaded", "Fix the preferences file or environment"),
    ("E005", "FileProcessing", Severity::High, false, true,
        "Source file not found", "Check the input path"),
    ("E006", "FileProcessing", Severity::Medium, false, true,
        "Source file does not have the .mgol extension", "Rename the file or disable the extension check"),
    ("E007", "FileProcessing", Severity::High, false, true,
        "Source file exceeds the configured size limit", "Split the program or raise max_file_size"),
    ("E008", "FileProcessing", Severity::Medium, false, true,
        "Source file is empty", "Provide a program starting with 'inicio'"),
    ("E009", "FileProcessing", Severity::High, false, true,
        "Permission denied reading source file", "Check file permissions"),
    ("E010", "FileProcessing", Severity::High, false, true,
        "I/O error while reading source file", "Check the file system"),
    ("E011", "FileProcessing", Severity::Medium, false, true,
        "Input path is not a regular file", "Pass a path to a source file"),
    ("E012", "FileProcessing", Severity::Medium, false, true,
        "Source file has too many lines", "Split the program or raise max_line_count"),
    ("E013", "FileProcessing", Severity::High, false, true,
        "Generated code could not be written", "Check the output path"),
    ("E020", "Lexical", Severity::Medium, true, false,
        "Malformed numeric constant", "Write digits with an optional fraction and exponent, e.g. 3.5e2"),
    ("E021", "Lexical", Severity::Medium, true, false,
        "Unterminated literal constant", "Close the literal with a double quote"),
    ("E022", "Lexical", Severity::Medium, true, false,
        "Unterminated or unbalanced comment", "Close the comment with '}'"),
    ("E023", "Lexical", Severity::Medium, true, false,
        "Character sequence is not part of the language", "Remove or replace the offending characters"),
    ("E024", "Lexical", Severity::Critical, false, true,
        "Source stream could not be read", "Check the input source"),
    ("E025", "Lexical", Severity::High, false, true,
        "Token count limit exceeded", "Split the program or raise max_token_count"),
    ("E026", "Lexical", Severity::Medium, true, false,
        "Lexeme exceeds the maximum length", "Shorten the identifier, literal, or comment"),
    ("E030", "Automaton", Severity::Critical, false, true,
        "Automaton has overlapping transitions", "Fix the transition table"),
    ("E031", "Automaton", Severity::Critical, false, true,
        "Automaton references an undefined state", "Fix the transition table"),
    ("E040", "Syntax", Severity::High, true, false,
        "Unexpected token", "Check the statement structure near this token"),
    ("E041", "Syntax", Severity::High, true, false,
        "Program must begin with 'inicio'", "Start the program with 'inicio'"),
    ("E042", "Syntax", Severity::High, true, false,
        "Malformed variable declaration", "Use 'TYPE id, id;' inside varinicio/varfim"),
    ("E043", "Syntax", Severity::High, true, false,
        "Malformed assignment or expression", "Use 'id <- operand op operand;'"),
    ("E044", "Syntax", Severity::High, true, false,
        "Malformed read or write statement", "Use 'leia id;' or 'escreva arg;'"),
    ("E045", "Syntax", Severity::High, true, false,
        "Malformed conditional", "Use 'se (a op b) entao ... fimse'"),
    ("E046", "Syntax", Severity::High, true, false,
        "Malformed loop", "Use 'repita (a op b) ... fimrepita'"),
    ("E047", "Syntax", Severity::High, true, false,
        "Unbalanced parentheses", "Close every '(' with ')'"),
    ("E048", "Syntax", Severity::High, true, false,
        "Missing semicolon", "Terminate the statement with ';'"),
    ("E049", "Syntax", Severity::High, true, false,
        "Unexpected end of input", "Terminate the program with 'fim'"),
    ("E050", "Syntax", Severity::Critical, false, true,
        "Parser could not resynchronize before end of input", "Fix the first reported syntax error"),
    ("E051", "Syntax", Severity::Critical, false, true,
        "Parser stack capacity exceeded", "Reduce nesting or raise the stack capacity"),
    ("E052", "Syntax", Severity::Critical, false, true,
        "Parser stack underflow", "Check the decision tables for an inconsistent reduce"),
    ("E053", "Syntax", Severity::Critical, false, true,
        "Goto table has no entry after reduce", "Check the goto table"),
    ("E060", "Grammar", Severity::Critical, false, true,
        "Decision table file is malformed", "Fix the table file"),
    ("E061", "Grammar", Severity::Critical, false, true,
        "Action references an unknown rule", "Check the rule numbers in the action table"),
    ("E062", "Grammar", Severity::Critical, false, true,
        "Grammar is not SLR(1)", "Resolve the shift/reduce or reduce/reduce conflict"),
    ("E063", "Grammar", Severity::Critical, false, true,
        "Rule set file is malformed", "Fix the rule JSON"),
    ("E064", "Grammar", Severity::Critical, false, true,
        "Decision table file could not be read", "Check the table path"),
    ("E065", "Grammar", Severity::Critical, false, true,
        "Rule references a symbol with no productions", "Add the missing productions"),
    ("E080", "Semantic", Severity::Medium, true, false,
        "Identifier used before declaration", "Declare the variable between varinicio and varfim"),
    ("E081", "Semantic", Severity::Medium, true, false,
        "Operand types differ", "Use operands of the same type"),
    ("E082", "Semantic", Severity::Medium, true, false,
        "Assigned value type differs from the variable type", "Assign a value of the declared type"),
    ("E083", "Semantic", Severity::Medium, true, false,
        "Literal operand in arithmetic expression", "Use numeric operands in arithmetic"),
    ("E084", "Semantic", Severity::Medium, true, false,
        "Variable declared more than once", "Remove the duplicate declaration"),
    ("E085", "Semantic", Severity::High, false, true,
        "Temporary variable limit exceeded", "Simplify the program or raise max_temporaries"),
    ("E086", "Semantic", Severity::Critical, false, true,
        "Semantic value stack underflow", "Check the rule lengths against the value stack"),
    ("I001", "Success", Severity::Low, true, false,
        "Operation completed successfully", "No action required"),
    ("I004", "Success", Severity::Low, true, false,
        "System initialization completed", "No action required"),
    ("I006", "Success", Severity::Low, true, false,
        "Source file loaded", "No action required"),
    ("I020", "Success", Severity::Low, true, false,
        "Tokenization completed", "No action required"),
    ("I030", "Success", Severity::Low, true, false,
        "Automaton constructed", "No action required"),
    ("I040", "Success", Severity::Low, true, false,
        "Input accepted by the parser", "No action required"),
    ("I041", "Success", Severity::Low, true, false,
        "Parser resynchronized after a syntax error", "No action required"),
    ("I060", "Success", Severity::Low, true, false,
        "Decision tables constructed", "No action required"),
    ("I080", "Success", Severity::Low, true, false,
        "Semantic analysis completed", "No action required"),
    ("I090", "Success", Severity::Low, true, false,
        "Target code generated", "No action required"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicate_codes() {
        assert_eq!(get_error_registry().len(), REGISTRY_ENTRIES.len());
    }

    #[test]
    fn test_syntax_category_codes_are_registered() {
        for code in [
            syntax::UNEXPECTED_TOKEN,
            syntax::MISSING_PROGRAM_START,
            syntax::MALFORMED_DECLARATION,
            syntax::MALFORMED_ASSIGNMENT,
            syntax::MALFORMED_IO,
            syntax::MALFORMED_CONDITIONAL,
            syntax::MALFORMED_LOOP,
            syntax::UNBALANCED_PARENTHESES,
            syntax::MISSING_SEMICOLON,
            syntax::UNEXPECTED_END_OF_INPUT,
        ] {
            let metadata = get_error_metadata(code.as_str()).unwrap();
            assert_eq!(metadata.category, "Syntax");
            assert!(metadata.recoverable);
        }
    }

    #[test]
    fn test_defaults_for_unknown_code() {
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(is_recoverable("Z999"));
        assert!(!requires_halt("Z999"));
        assert_eq!(get_category("Z999"), "Unknown");
    }

    #[test]
    fn test_fatal_codes_require_halt() {
        assert!(requires_halt(lexical::SOURCE_READ_ERROR.as_str()));
        assert!(requires_halt(syntax::STACK_OVERFLOW.as_str()));
        assert!(requires_halt(grammar::GRAMMAR_CONFLICT.as_str()));
        assert!(!requires_halt(semantic::TYPE_MISMATCH.as_str()));
    }
}
