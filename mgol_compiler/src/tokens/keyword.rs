//! Reserved words of the language
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Keyword {
    Inicio,
    Varinicio,
    Varfim,
    Escreva,
    Leia,
    Se,
    Entao,
    Fimse,
    Repita,
    Fimrepita,
    Fim,
    Inteiro,
    Literal,
    Real,
}

impl Keyword {
    pub const ALL: [Keyword; 14] = [
        Keyword::Inicio,
        Keyword::Varinicio,
        Keyword::Varfim,
        Keyword::Escreva,
        Keyword::Leia,
        Keyword::Se,
        Keyword::Entao,
        Keyword::Fimse,
        Keyword::Repita,
        Keyword::Fimrepita,
        Keyword::Fim,
        Keyword::Inteiro,
        Keyword::Literal,
        Keyword::Real,
    ];

    /// Spelling in source, which is also the grammar terminal name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inicio => "inicio",
            Self::Varinicio => "varinicio",
            Self::Varfim => "varfim",
            Self::Escreva => "escreva",
            Self::Leia => "leia",
            Self::Se => "se",
            Self::Entao => "entao",
            Self::Fimse => "fimse",
            Self::Repita => "repita",
            Self::Fimrepita => "fimrepita",
            Self::Fim => "fim",
            Self::Inteiro => "inteiro",
            Self::Literal => "literal",
            Self::Real => "real",
        }
    }

    /// Case-sensitive lookup
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|keyword| keyword.as_str() == s)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_spelling() {
        for keyword in Keyword::ALL {
            assert_eq!(Keyword::from_str(keyword.as_str()), Some(keyword));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(Keyword::from_str("fimse"), Some(Keyword::Fimse));
        assert_eq!(Keyword::from_str("FIMSE"), None);
        assert_eq!(Keyword::from_str("fimsee"), None);
    }
}
