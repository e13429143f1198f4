use super::keyword::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Number,
    LiteralConstant,
    Identifier,
    Comment,
    EndOfFile,
    RelationalOp,
    Assignment,
    ArithmeticOp,
    OpenParen,
    CloseParen,
    Semicolon,
    Comma,
    Error,
    /// Value synthesized by a reduction; never produced by the scanner
    Nonterminal,
    Keyword(Keyword),
}

impl TokenClass {
    /// Grammar terminal this class is parsed as, if any
    pub fn terminal(&self) -> Option<&'static str> {
        match self {
            TokenClass::Number => Some("num"),
            TokenClass::LiteralConstant => Some("lit"),
            TokenClass::Identifier => Some("id"),
            TokenClass::EndOfFile => Some("$"),
            TokenClass::RelationalOp => Some("opr"),
            TokenClass::Assignment => Some("rcb"),
            TokenClass::ArithmeticOp => Some("opm"),
            TokenClass::OpenParen => Some("ab_p"),
            TokenClass::CloseParen => Some("fc_p"),
            TokenClass::Semicolon => Some("pt_v"),
            TokenClass::Comma => Some("vir"),
            TokenClass::Keyword(keyword) => Some(keyword.as_str()),
            TokenClass::Comment | TokenClass::Error | TokenClass::Nonterminal => None,
        }
    }

    /// Tokens the parser skips when fetching its lookahead
    pub fn is_ignorable(&self) -> bool {
        matches!(self, TokenClass::Comment | TokenClass::Error)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenClass::Number => "Num",
            TokenClass::LiteralConstant => "Lit",
            TokenClass::Identifier => "id",
            TokenClass::Comment => "Comentario",
            TokenClass::EndOfFile => "EOF",
            TokenClass::RelationalOp => "OPR",
            TokenClass::Assignment => "RCB",
            TokenClass::ArithmeticOp => "OPM",
            TokenClass::OpenParen => "AB_P",
            TokenClass::CloseParen => "FC_P",
            TokenClass::Semicolon => "PT_V",
            TokenClass::Comma => "VIR",
            TokenClass::Error => "ERRO",
            TokenClass::Nonterminal => "NT",
            TokenClass::Keyword(keyword) => keyword.as_str(),
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Declared or inferred type carried by a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Real,
    Literal,
    #[default]
    Null,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Integer => "inteiro",
            DataType::Real => "real",
            DataType::Literal => "literal",
            DataType::Null => "NULO",
        }
    }

    /// C spelling of the type; `None` for `Null`
    pub fn c_type(&self) -> Option<&'static str> {
        match self {
            DataType::Integer => Some("int"),
            DataType::Real => Some("double"),
            DataType::Literal => Some("literal"),
            DataType::Null => None,
        }
    }

    /// `scanf`/`printf` conversion for the type
    pub fn format_spec(&self) -> Option<&'static str> {
        match self {
            DataType::Integer => Some("%d"),
            DataType::Real => Some("%lf"),
            DataType::Literal => Some("%s"),
            DataType::Null => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Real)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Scanner output and semantic stack element; equality is structural
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub class: TokenClass,
    pub lexeme: String,
    pub data_type: DataType,
}

impl Token {
    pub fn new(class: TokenClass, lexeme: impl Into<String>, data_type: DataType) -> Self {
        Self {
            class,
            lexeme: lexeme.into(),
            data_type,
        }
    }

    pub fn keyword(keyword: Keyword) -> Self {
        Self::new(TokenClass::Keyword(keyword), keyword.as_str(), DataType::Null)
    }

    pub fn end_of_file() -> Self {
        Self::new(TokenClass::EndOfFile, "EOF", DataType::Null)
    }

    pub fn error(lexeme: impl Into<String>) -> Self {
        Self::new(TokenClass::Error, lexeme, DataType::Null)
    }

    pub fn comment(lexeme: impl Into<String>) -> Self {
        Self::new(TokenClass::Comment, lexeme, DataType::Null)
    }

    /// Value for a reduced nonterminal, named after the rule's left side
    pub fn nonterminal(name: impl Into<String>) -> Self {
        Self::new(TokenClass::Nonterminal, name, DataType::Null)
    }

    pub fn is_end_of_file(&self) -> bool {
        *self == Self::end_of_file()
    }

    pub fn terminal(&self) -> Option<&'static str> {
        self.class.terminal()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Classe: {}, Lexema: {}, Tipo: {}",
            self.class, self.lexeme, self.data_type
        )
    }
}
