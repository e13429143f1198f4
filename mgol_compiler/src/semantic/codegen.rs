//! C code buffer: emitted statements plus the temporaries they introduce

use super::error::SemanticError;
use crate::config::compile_time::semantic::{LITERAL_BUFFER_SIZE, MAX_TEMPORARIES};
use crate::tokens::DataType;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporaryKind {
    Int,
    Real,
    /// Result of a relational comparison
    Bool,
}

impl TemporaryKind {
    /// Kind of an arithmetic result of `data_type`; non-numeric types have none
    pub fn for_arithmetic(data_type: DataType) -> Option<Self> {
        match data_type {
            DataType::Integer => Some(TemporaryKind::Int),
            DataType::Real => Some(TemporaryKind::Real),
            DataType::Literal | DataType::Null => None,
        }
    }

    pub fn c_type(&self) -> &'static str {
        match self {
            TemporaryKind::Int | TemporaryKind::Bool => "int",
            TemporaryKind::Real => "double",
        }
    }

    /// Type a value held in this temporary carries through later reductions
    pub fn data_type(&self) -> DataType {
        match self {
            TemporaryKind::Int | TemporaryKind::Bool => DataType::Integer,
            TemporaryKind::Real => DataType::Real,
        }
    }
}

impl fmt::Display for TemporaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemporaryKind::Int => "int",
            TemporaryKind::Real => "real",
            TemporaryKind::Bool => "bool",
        };
        f.pad(name)
    }
}

pub fn temporary_name(index: usize) -> String {
    format!("T{}", index)
}

/// Statement text of `void main`, indented by block depth
#[derive(Debug, Clone, Default)]
pub struct CodeBuffer {
    text: String,
    temporaries: Vec<TemporaryKind>,
    depth: usize,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_line(&mut self, line: &str) {
        for _ in 0..=self.depth {
            self.text.push('\t');
        }
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Emit `header {` and indent what follows
    pub fn open_block(&mut self, header: &str) {
        self.emit_line(&format!("{} {{", header));
        self.depth += 1;
    }

    pub fn close_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.emit_line("}");
    }

    /// Allocate the next temporary; its index is its name suffix
    pub fn new_temporary(&mut self, kind: TemporaryKind) -> Result<String, SemanticError> {
        if self.temporaries.len() >= MAX_TEMPORARIES {
            return Err(SemanticError::TooManyTemporaries {
                limit: MAX_TEMPORARIES,
            });
        }
        self.temporaries.push(kind);
        Ok(temporary_name(self.temporaries.len() - 1))
    }

    pub fn temporaries(&self) -> &[TemporaryKind] {
        &self.temporaries
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.temporaries.is_empty()
    }

    /// The complete translation unit
    pub fn render_program(&self) -> String {
        let mut program = String::with_capacity(self.text.len() + 128);

        program.push_str("#include<stdio.h>\n");
        program.push_str("#include<string.h>\n");
        program.push_str(&format!("typedef char literal[{}];\n", LITERAL_BUFFER_SIZE));
        program.push_str("void main(void) {\n");

        for (index, kind) in self.temporaries.iter().enumerate() {
            program.push_str(&format!("\t{} {};\n", kind.c_type(), temporary_name(index)));
        }
        if !self.temporaries.is_empty() {
            program.push('\n');
        }

        program.push_str(&self.text);
        program.push_str("}\n");
        program
    }
}

/// C string literal for the body of an MGol literal constant (`"..."` lexeme)
pub fn c_string_literal(lexeme: &str) -> String {
    let body = lexeme.strip_prefix('"').unwrap_or(lexeme);
    let body = body.strip_suffix('"').unwrap_or(body);

    let mut out = String::with_capacity(body.len() + 2);
    out.push('"');
    for ch in body.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporaries_are_numbered_in_order() {
        let mut code = CodeBuffer::new();

        assert_eq!(code.new_temporary(TemporaryKind::Int).unwrap(), "T0");
        assert_eq!(code.new_temporary(TemporaryKind::Bool).unwrap(), "T1");
        assert_eq!(code.new_temporary(TemporaryKind::Real).unwrap(), "T2");
        assert_eq!(
            code.temporaries(),
            &[TemporaryKind::Int, TemporaryKind::Bool, TemporaryKind::Real]
        );
    }

    #[test]
    fn test_blocks_indent_their_body() {
        let mut code = CodeBuffer::new();
        code.open_block("if (T0)");
        code.emit_line("x = 1;");
        code.close_block();

        assert_eq!(code.text(), "\tif (T0) {\n\t\tx = 1;\n\t}\n");
        assert_eq!(code.depth(), 0);
    }

    #[test]
    fn test_unbalanced_close_does_not_underflow() {
        let mut code = CodeBuffer::new();
        code.close_block();
        assert_eq!(code.depth(), 0);
        assert_eq!(code.text(), "\t}\n");
    }

    #[test]
    fn test_render_program() {
        let mut code = CodeBuffer::new();
        let temp = code.new_temporary(TemporaryKind::Bool).unwrap();
        code.emit_line(&format!("{} = A < B;", temp));

        let program = code.render_program();
        assert!(program.starts_with("#include<stdio.h>\n#include<string.h>\n"));
        assert!(program.contains(&format!("typedef char literal[{}];", LITERAL_BUFFER_SIZE)));
        assert!(program.contains("void main(void) {\n\tint T0;\n\n\tT0 = A < B;\n}\n"));
    }

    #[test]
    fn test_arithmetic_kinds() {
        assert_eq!(
            TemporaryKind::for_arithmetic(DataType::Real),
            Some(TemporaryKind::Real)
        );
        assert_eq!(TemporaryKind::for_arithmetic(DataType::Literal), None);
        assert_eq!(TemporaryKind::Bool.c_type(), "int");
    }

    #[test]
    fn test_c_string_literal_escapes_control_characters() {
        assert_eq!(c_string_literal("\"Ola\""), "\"Ola\"");
        assert_eq!(
            c_string_literal("\"linha1\nlinha2\tfim\""),
            "\"linha1\\nlinha2\\tfim\""
        );
        assert_eq!(c_string_literal("\"a\\b\""), "\"a\\\\b\"");
        assert_eq!(c_string_literal("\"50%d\""), "\"50%d\"");
    }
}
