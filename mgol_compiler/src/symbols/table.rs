use super::error::{SymbolError, SymbolResult};
use crate::tokens::{DataType, Keyword, Token, TokenClass};
use std::collections::BTreeMap;
use std::fmt;

/// Registry of every lexeme the scanner has classified as a word
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: BTreeMap<String, Token>,
}

impl SymbolTable {
    /// Empty registry, without reserved words
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with every keyword
    pub fn with_reserved_words() -> Self {
        let mut table = Self::new();
        table.seed_reserved_words();
        table
    }

    fn seed_reserved_words(&mut self) {
        for keyword in Keyword::ALL {
            self.insert(Token::keyword(keyword));
        }
    }

    /// Insert `token` unless its lexeme is already present; returns the stored entry
    pub fn insert(&mut self, token: Token) -> Token {
        self.entries
            .entry(token.lexeme.clone())
            .or_insert(token)
            .clone()
    }

    pub fn get(&self, lexeme: &str) -> Option<&Token> {
        self.entries.get(lexeme)
    }

    pub fn contains(&self, lexeme: &str) -> bool {
        self.entries.contains_key(lexeme)
    }

    /// Replace the entry for `token.lexeme`, returning the previous one
    pub fn update(&mut self, token: Token) -> Option<Token> {
        self.entries.insert(token.lexeme.clone(), token)
    }

    /// Back-patch the type of an existing identifier entry
    pub fn set_data_type(&mut self, lexeme: &str, data_type: DataType) -> SymbolResult<()> {
        let entry = self
            .entries
            .get_mut(lexeme)
            .ok_or_else(|| SymbolError::not_found(lexeme))?;

        if matches!(entry.class, TokenClass::Keyword(_)) {
            return Err(SymbolError::ReservedWord {
                lexeme: lexeme.to_string(),
                data_type,
            });
        }

        entry.data_type = data_type;
        Ok(())
    }

    /// Current type of `lexeme`; `Null` when absent or undeclared
    pub fn data_type_of(&self, lexeme: &str) -> DataType {
        self.entries
            .get(lexeme)
            .map(|token| token.data_type)
            .unwrap_or(DataType::Null)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Clear and re-seed the reserved words
    pub fn reset(&mut self) {
        self.clear();
        self.seed_reserved_words();
    }

    /// Entries sorted by lexeme
    pub fn entries(&self) -> impl Iterator<Item = &Token> {
        self.entries.values()
    }

    /// Identifier entries only, sorted by lexeme
    pub fn identifiers(&self) -> impl Iterator<Item = &Token> {
        self.entries
            .values()
            .filter(|token| token.class == TokenClass::Identifier)
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .keys()
            .map(|lexeme| lexeme.len())
            .max()
            .unwrap_or(0)
            .max("Lexema".len());

        writeln!(f, "{:<width$}  {:<10}  Tipo", "Lexema", "Classe")?;
        for token in self.entries.values() {
            writeln!(
                f,
                "{:<width$}  {:<10}  {}",
                token.lexeme, token.class, token.data_type
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn identifier(lexeme: &str) -> Token {
        Token::new(TokenClass::Identifier, lexeme, DataType::Null)
    }

    #[test]
    fn test_reserved_words_are_seeded() {
        let table = SymbolTable::with_reserved_words();
        assert_eq!(table.len(), Keyword::ALL.len());
        assert_eq!(
            table.get("fimrepita").map(|t| t.class),
            Some(TokenClass::Keyword(Keyword::Fimrepita))
        );
    }

    #[test]
    fn test_first_insertion_wins() {
        let mut table = SymbolTable::new();
        table.insert(Token::new(TokenClass::Identifier, "A", DataType::Integer));

        let fetched = table.insert(identifier("A"));
        assert_eq!(fetched.data_type, DataType::Integer);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_keyword_lexeme_fetches_keyword() {
        let mut table = SymbolTable::with_reserved_words();
        let token = table.insert(identifier("se"));
        assert_eq!(token.class, TokenClass::Keyword(Keyword::Se));
    }

    #[test]
    fn test_back_patch_type() {
        let mut table = SymbolTable::with_reserved_words();
        table.insert(identifier("B"));

        assert_eq!(table.data_type_of("B"), DataType::Null);
        table.set_data_type("B", DataType::Real).unwrap();
        assert_eq!(table.data_type_of("B"), DataType::Real);
        assert_eq!(table.insert(identifier("B")).data_type, DataType::Real);
    }

    #[test]
    fn test_set_data_type_errors() {
        let mut table = SymbolTable::with_reserved_words();

        assert_matches!(
            table.set_data_type("ghost", DataType::Integer),
            Err(SymbolError::NotFound { .. })
        );
        assert_matches!(
            table.set_data_type("fim", DataType::Integer),
            Err(SymbolError::ReservedWord { .. })
        );
        assert_eq!(table.data_type_of("ghost"), DataType::Null);
    }

    #[test]
    fn test_update_and_reset() {
        let mut table = SymbolTable::with_reserved_words();
        table.insert(identifier("X"));

        let previous = table.update(Token::new(TokenClass::Identifier, "X", DataType::Literal));
        assert_eq!(previous.map(|t| t.data_type), Some(DataType::Null));
        assert_eq!(table.identifiers().count(), 1);

        table.reset();
        assert!(!table.contains("X"));
        assert_eq!(table.len(), Keyword::ALL.len());

        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_display_lists_entries_sorted() {
        let mut table = SymbolTable::new();
        table.insert(identifier("b"));
        table.insert(Token::new(TokenClass::Identifier, "a", DataType::Integer));

        let rendered = table.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("a "));
        assert!(lines[1].ends_with("inteiro"));
        assert!(lines[2].starts_with("b "));
    }
}
