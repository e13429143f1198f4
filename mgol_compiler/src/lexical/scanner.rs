//! Maximal-munch scanner driven by the MGol automaton

use super::error::{LexerError, LexicalErrorKind};
use super::source::{ByteSource, CharSource};
use crate::automaton::ScannerTable;
use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::diagnostics::Diagnostic;
use crate::logging::codes;
use crate::symbols::SymbolTable;
use crate::tokens::{Token, TokenClass};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error, log_success};
use std::collections::BTreeMap;
use std::io::Cursor;

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub comment_count: usize,
    pub lexical_errors: usize,
    pub max_lexeme_length: usize,
    /// Per-class counts, keyed by class name; only with detailed metrics
    pub tokens_by_class: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        self.max_lexeme_length = self.max_lexeme_length.max(token.lexeme.len());

        match token.class {
            TokenClass::Identifier => self.identifier_tokens += 1,
            TokenClass::Comment => self.comment_count += 1,
            TokenClass::Error => self.lexical_errors += 1,
            _ => {}
        }

        if preferences.collect_detailed_metrics {
            *self
                .tokens_by_class
                .entry(token.class.name().to_string())
                .or_insert(0) += 1;
        }
    }
}

fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Pull-based scanner; each `scan` returns one token, ending with `EOF` forever
pub struct Scanner<S: CharSource> {
    source: S,
    table: ScannerTable,
    symbols: SymbolTable,
    preferences: LexicalPreferences,
    /// Position of the next byte to be read
    position: Position,
    /// Position before the most recent read, restored on pushback
    previous: Position,
    token_start: Position,
    buffer: Vec<u8>,
    /// The run outgrew `MAX_LEXEME_LENGTH`; later bytes are consumed unbuffered
    overflowed: bool,
    diagnostics: Vec<Diagnostic>,
    metrics: LexicalMetrics,
    reached_end: bool,
}

impl Scanner<ByteSource<Cursor<Vec<u8>>>> {
    /// Scanner over in-memory text with a fresh registry
    pub fn from_text(text: &str) -> Result<Self, LexerError> {
        Self::new(ByteSource::from_text(text), SymbolTable::with_reserved_words())
    }
}

impl<S: CharSource> Scanner<S> {
    pub fn new(source: S, symbols: SymbolTable) -> Result<Self, LexerError> {
        Ok(Self::with_table(source, ScannerTable::mgol()?, symbols))
    }

    pub fn with_table(source: S, table: ScannerTable, symbols: SymbolTable) -> Self {
        Self::with_preferences(source, table, symbols, LexicalPreferences::default())
    }

    pub fn with_preferences(
        source: S,
        table: ScannerTable,
        symbols: SymbolTable,
        preferences: LexicalPreferences,
    ) -> Self {
        Self {
            source,
            table,
            symbols,
            preferences,
            position: Position::start(),
            previous: Position::start(),
            token_start: Position::start(),
            buffer: Vec::new(),
            overflowed: false,
            diagnostics: Vec::new(),
            metrics: LexicalMetrics::default(),
            reached_end: false,
        }
    }

    /// Next token with its span. Malformed input yields an `Error` token and a
    /// diagnostic; only read failures and the token limit are `Err`.
    pub fn scan(&mut self) -> Result<Spanned<Token>, LexerError> {
        if self.metrics.total_tokens >= MAX_TOKEN_COUNT {
            log_error!(codes::lexical::TOKEN_LIMIT_EXCEEDED, "Token limit exceeded",
                "limit" => MAX_TOKEN_COUNT
            );
            return Err(LexerError::TokenLimitExceeded {
                limit: MAX_TOKEN_COUNT,
            });
        }

        let token = self.scan_token()?;
        self.metrics.record_token(&token.value, &self.preferences);

        if token.value.is_end_of_file() && !self.reached_end {
            self.reached_end = true;
            log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
                "tokens" => self.metrics.total_tokens,
                "lexical_errors" => self.metrics.lexical_errors
            );
        }

        Ok(token)
    }

    /// Every remaining token up to and including `EOF`
    pub fn scan_all(&mut self) -> Result<Vec<Spanned<Token>>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan()?;
            let done = token.value.is_end_of_file();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn scan_token(&mut self) -> Result<Spanned<Token>, LexerError> {
        self.reset_run();

        loop {
            let Some(byte) = self.read()? else {
                return Ok(self.finish_at_end());
            };

            if self.buffer.is_empty() {
                if is_separator(byte) {
                    continue;
                }
                self.token_start = self.previous;
            }

            let (_, moved) = self.table.automaton_mut().next(byte);
            if moved {
                if self.buffer.len() < MAX_LEXEME_LENGTH {
                    self.buffer.push(byte);
                } else {
                    self.overflowed = true;
                }
                continue;
            }

            if self.buffer.is_empty() {
                // Nothing starts with this byte; consume it so scanning progresses
                self.buffer.push(byte);
                if byte >= 0x80 {
                    self.consume_continuation_bytes(byte)?;
                }
                return Ok(self.reject_classified());
            }

            self.unread(byte);
            return Ok(self.finish_run());
        }
    }

    fn finish_at_end(&mut self) -> Spanned<Token> {
        if self.buffer.is_empty() {
            return Spanned::new(Token::end_of_file(), Span::empty(self.position));
        }
        self.finish_run()
    }

    fn finish_run(&mut self) -> Spanned<Token> {
        if self.overflowed {
            return self.reject(LexicalErrorKind::LexemeTooLong);
        }
        self.accept_or_reject()
    }

    /// Pulls the rest of a multi-byte UTF-8 character led by `lead` into the
    /// buffer, so one stray character is one error
    fn consume_continuation_bytes(&mut self, lead: u8) -> Result<(), LexerError> {
        let expected = match lead {
            0xC0..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF7 => 3,
            _ => 0,
        };

        for _ in 0..expected {
            match self.read()? {
                Some(byte @ 0x80..=0xBF) => self.buffer.push(byte),
                Some(byte) => {
                    self.unread(byte);
                    break;
                }
                None => break,
            }
        }
        Ok(())
    }

    fn accept_or_reject(&mut self) -> Spanned<Token> {
        let automaton = self.table.automaton();
        if !automaton.is_final_state() {
            return self.reject_classified();
        }

        let lexeme = self.lexeme();
        let Some(token) = self.table.accept(automaton.current(), &lexeme) else {
            return self.reject_classified();
        };

        let token = match token.class {
            TokenClass::Identifier => self.symbols.insert(token),
            _ => token,
        };

        log_debug!("Token accepted",
            "class" => token.class.name(),
            "lexeme" => token.lexeme.as_str(),
            "position" => self.token_start
        );

        Spanned::new(token, self.span())
    }

    fn reject_classified(&mut self) -> Spanned<Token> {
        self.reject(LexicalErrorKind::classify(&self.buffer))
    }

    fn reject(&mut self, kind: LexicalErrorKind) -> Spanned<Token> {
        let lexeme = self.lexeme();
        let start = self.token_start;
        let message = kind.message();

        if self.preferences.include_lexeme_in_errors {
            log_error!(kind.code(), &message, span = self.span(),
                "lexeme" => lexeme.as_str(),
                "line" => start.line,
                "column" => start.column
            );
        } else {
            log_error!(kind.code(), &message, span = self.span(),
                "line" => start.line,
                "column" => start.column
            );
        }

        self.diagnostics.push(
            Diagnostic::lexical(
                kind.code(),
                format!("{} '{}'", message, lexeme.escape_debug()),
                start,
            )
            .with_lexeme(lexeme.clone()),
        );

        Spanned::new(Token::error(lexeme), self.span())
    }

    fn reset_run(&mut self) {
        self.table.automaton_mut().reset();
        self.buffer.clear();
        self.overflowed = false;
        self.token_start = self.position;
    }

    fn read(&mut self) -> Result<Option<u8>, LexerError> {
        match self.source.read_byte() {
            Ok(Some(byte)) => {
                self.previous = self.position;
                self.position = self.position.advance(byte);
                Ok(Some(byte))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                log_error!(codes::lexical::SOURCE_READ_ERROR, "Failed to read source",
                    "position" => self.position,
                    "error" => e
                );
                Err(LexerError::SourceRead {
                    message: e.to_string(),
                    position: self.position,
                })
            }
        }
    }

    fn unread(&mut self, byte: u8) {
        self.source.unread_byte(byte);
        self.position = self.previous;
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    fn span(&self) -> Span {
        Span::new(self.token_start, self.position)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{DataType, Keyword};
    use assert_matches::assert_matches;

    fn classes(text: &str) -> Vec<(TokenClass, String)> {
        let mut scanner = Scanner::from_text(text).unwrap();
        scanner
            .scan_all()
            .unwrap()
            .into_iter()
            .map(|t| (t.value.class, t.value.lexeme))
            .collect()
    }

    fn owned(expected: &[(TokenClass, &str)]) -> Vec<(TokenClass, String)> {
        expected
            .iter()
            .map(|(class, lexeme)| (*class, lexeme.to_string()))
            .collect()
    }

    #[test]
    fn test_assignment_statement() {
        assert_eq!(
            classes("A<-B+C"),
            owned(&[
                (TokenClass::Identifier, "A"),
                (TokenClass::Assignment, "<-"),
                (TokenClass::Identifier, "B"),
                (TokenClass::ArithmeticOp, "+"),
                (TokenClass::Identifier, "C"),
                (TokenClass::EndOfFile, "EOF"),
            ])
        );
    }

    #[test]
    fn test_decimal_point_without_digits_is_an_error() {
        assert_eq!(
            classes("1.E+0"),
            owned(&[
                (TokenClass::Error, "1."),
                (TokenClass::Identifier, "E"),
                (TokenClass::ArithmeticOp, "+"),
                (TokenClass::Number, "0"),
                (TokenClass::EndOfFile, "EOF"),
            ])
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            classes("{{{ab}"),
            owned(&[
                (TokenClass::Comment, "{{{ab}"),
                (TokenClass::EndOfFile, "EOF"),
            ])
        );

        assert_eq!(
            classes("{{abab"),
            owned(&[(TokenClass::Error, "{{abab"), (TokenClass::EndOfFile, "EOF")])
        );
    }

    #[test]
    fn test_stray_close_brace_is_its_own_error() {
        let mut scanner = Scanner::from_text("ab}").unwrap();
        let tokens = scanner.scan_all().unwrap();

        assert_eq!(tokens[0].value.class, TokenClass::Identifier);
        assert_eq!(tokens[1].value, Token::error("}"));
        assert_eq!(
            scanner.diagnostics()[0].code,
            codes::lexical::INVALID_COMMENT
        );
    }

    #[test]
    fn test_number_types() {
        let mut scanner = Scanner::from_text("12 3.5 4e2 6.0E-1").unwrap();
        let types: Vec<_> = scanner
            .scan_all()
            .unwrap()
            .into_iter()
            .take(4)
            .map(|t| t.value.data_type)
            .collect();

        assert_eq!(
            types,
            vec![DataType::Integer, DataType::Real, DataType::Integer, DataType::Real]
        );
    }

    #[test]
    fn test_literals() {
        let mut scanner = Scanner::from_text("\"Ola,\n mundo\" x").unwrap();

        let literal = scanner.scan().unwrap();
        assert_eq!(literal.value.class, TokenClass::LiteralConstant);
        assert_eq!(literal.value.lexeme, "\"Ola,\n mundo\"");
        assert_eq!(literal.value.data_type, DataType::Literal);

        let identifier = scanner.scan().unwrap();
        assert_eq!(identifier.span.start().line, 2);
        assert_eq!(identifier.span.start().column, 9);

        let mut unterminated = Scanner::from_text("\"open").unwrap();
        assert_eq!(unterminated.scan().unwrap().value, Token::error("\"open"));
        assert_eq!(
            unterminated.diagnostics()[0].code,
            codes::lexical::INVALID_LITERAL
        );
    }

    #[test]
    fn test_keywords_come_from_the_registry() {
        let mut scanner = Scanner::from_text("se entao fimse").unwrap();
        let tokens = scanner.scan_all().unwrap();

        assert_eq!(tokens[0].value, Token::keyword(Keyword::Se));
        assert_eq!(tokens[1].value, Token::keyword(Keyword::Entao));
        assert_eq!(tokens[2].value, Token::keyword(Keyword::Fimse));
    }

    #[test]
    fn test_identifiers_are_registered_once() {
        let mut scanner = Scanner::from_text("total_1 total_1").unwrap();
        scanner
            .symbols_mut()
            .insert(Token::new(TokenClass::Identifier, "total_1", DataType::Real));

        let tokens = scanner.scan_all().unwrap();
        assert_eq!(tokens[0].value.data_type, DataType::Real);
        assert_eq!(tokens[0].value, tokens[1].value);
        assert_eq!(scanner.symbols().identifiers().count(), 1);
    }

    #[test]
    fn test_positions_unwind_on_pushback() {
        let mut scanner = Scanner::from_text("inicio\n  A;\n").unwrap();
        let tokens = scanner.scan_all().unwrap();

        assert_eq!(tokens[0].span.start(), Position::new(0, 1, 1));
        assert_eq!(tokens[1].span.start(), Position::new(9, 2, 3));
        assert_eq!(tokens[2].span.start(), Position::new(10, 2, 4));
        assert_eq!(tokens[3].span.start().line, 3);
    }

    #[test]
    fn test_unknown_byte_is_consumed() {
        assert_eq!(
            classes("a @ b"),
            owned(&[
                (TokenClass::Identifier, "a"),
                (TokenClass::Error, "@"),
                (TokenClass::Identifier, "b"),
                (TokenClass::EndOfFile, "EOF"),
            ])
        );
    }

    #[test]
    fn test_overlong_comment_is_one_error() {
        let text = format!("{{{}}} fim", "x".repeat(MAX_LEXEME_LENGTH + 1000));
        let mut scanner = Scanner::from_text(&text).unwrap();
        let tokens = scanner.scan_all().unwrap();

        let found: Vec<_> = tokens.iter().map(|t| t.value.class).collect();
        assert_eq!(
            found,
            vec![TokenClass::Error, TokenClass::Keyword(Keyword::Fim), TokenClass::EndOfFile]
        );
        assert_eq!(tokens[0].value.lexeme.len(), MAX_LEXEME_LENGTH);
        assert_eq!(tokens[0].span.end().offset, MAX_LEXEME_LENGTH + 1002);
        assert_eq!(scanner.diagnostics().len(), 1);
        assert_eq!(
            scanner.diagnostics()[0].code,
            codes::lexical::LEXEME_TOO_LONG
        );
    }

    #[test]
    fn test_overlong_identifier_at_end_of_input() {
        let text = "a".repeat(MAX_LEXEME_LENGTH + 1);
        let mut scanner = Scanner::from_text(&text).unwrap();
        let tokens = scanner.scan_all().unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value.class, TokenClass::Error);
        assert!(tokens[1].value.is_end_of_file());
        assert_eq!(scanner.diagnostics().len(), 1);
    }

    #[test]
    fn test_non_ascii_character_is_one_error() {
        let mut scanner = Scanner::from_text("é fim").unwrap();
        let tokens = scanner.scan_all().unwrap();

        assert_eq!(tokens[0].value, Token::error("é"));
        assert_eq!(tokens[0].span.end().offset, 2);
        assert_eq!(tokens[1].value, Token::keyword(Keyword::Fim));
        assert_eq!(scanner.diagnostics().len(), 1);
        assert_eq!(scanner.diagnostics()[0].lexeme.as_deref(), Some("é"));

        assert_eq!(
            classes("ç"),
            owned(&[(TokenClass::Error, "ç"), (TokenClass::EndOfFile, "EOF")])
        );
    }

    #[test]
    fn test_scanner_recovers_after_errors() {
        let mut scanner = Scanner::from_text("1e+ ; 7").unwrap();
        let tokens = scanner.scan_all().unwrap();

        assert_eq!(tokens[0].value, Token::error("1e+"));
        assert_eq!(tokens[1].value.class, TokenClass::Semicolon);
        assert_eq!(tokens[2].value.lexeme, "7");
        assert_eq!(scanner.metrics().lexical_errors, 1);
        assert_eq!(scanner.diagnostics().len(), 1);
    }

    #[test]
    fn test_end_of_file_repeats() {
        let mut scanner = Scanner::from_text("").unwrap();
        assert!(scanner.scan().unwrap().value.is_end_of_file());
        assert!(scanner.scan().unwrap().value.is_end_of_file());
    }

    #[test]
    fn test_read_errors_are_fatal() {
        struct Broken;

        impl CharSource for Broken {
            fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "gone"))
            }

            fn unread_byte(&mut self, _byte: u8) {}
        }

        let mut scanner = Scanner::new(Broken, SymbolTable::with_reserved_words()).unwrap();
        assert_matches!(scanner.scan(), Err(LexerError::SourceRead { .. }));
    }
}
