use crate::logging::codes::{self, Code};
use std::fmt;

/// Syntax-error category stored in an action table's error slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCategory {
    UnexpectedToken = 1,
    MissingProgramStart = 2,
    MalformedDeclaration = 3,
    MalformedAssignment = 4,
    MalformedIo = 5,
    MalformedConditional = 6,
    MalformedLoop = 7,
    UnbalancedParentheses = 8,
    MissingSemicolon = 9,
    UnexpectedEndOfInput = 10,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 10] = [
        ErrorCategory::UnexpectedToken,
        ErrorCategory::MissingProgramStart,
        ErrorCategory::MalformedDeclaration,
        ErrorCategory::MalformedAssignment,
        ErrorCategory::MalformedIo,
        ErrorCategory::MalformedConditional,
        ErrorCategory::MalformedLoop,
        ErrorCategory::UnbalancedParentheses,
        ErrorCategory::MissingSemicolon,
        ErrorCategory::UnexpectedEndOfInput,
    ];

    pub fn number(self) -> u16 {
        self as u16
    }

    pub fn from_number(number: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.number() == number)
    }

    pub fn code(self) -> Code {
        match self {
            ErrorCategory::UnexpectedToken => codes::syntax::UNEXPECTED_TOKEN,
            ErrorCategory::MissingProgramStart => codes::syntax::MISSING_PROGRAM_START,
            ErrorCategory::MalformedDeclaration => codes::syntax::MALFORMED_DECLARATION,
            ErrorCategory::MalformedAssignment => codes::syntax::MALFORMED_ASSIGNMENT,
            ErrorCategory::MalformedIo => codes::syntax::MALFORMED_IO,
            ErrorCategory::MalformedConditional => codes::syntax::MALFORMED_CONDITIONAL,
            ErrorCategory::MalformedLoop => codes::syntax::MALFORMED_LOOP,
            ErrorCategory::UnbalancedParentheses => codes::syntax::UNBALANCED_PARENTHESES,
            ErrorCategory::MissingSemicolon => codes::syntax::MISSING_SEMICOLON,
            ErrorCategory::UnexpectedEndOfInput => codes::syntax::UNEXPECTED_END_OF_INPUT,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCategory::UnexpectedToken => "unexpected token",
            ErrorCategory::MissingProgramStart => "program must start with 'inicio'",
            ErrorCategory::MalformedDeclaration => "malformed declaration",
            ErrorCategory::MalformedAssignment => "malformed assignment or expression",
            ErrorCategory::MalformedIo => "malformed read or write statement",
            ErrorCategory::MalformedConditional => "malformed conditional",
            ErrorCategory::MalformedLoop => "malformed loop",
            ErrorCategory::UnbalancedParentheses => "unbalanced parentheses",
            ErrorCategory::MissingSemicolon => "missing ';'",
            ErrorCategory::UnexpectedEndOfInput => "unexpected end of input",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
