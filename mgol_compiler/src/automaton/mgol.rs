use super::dfa::{Automaton, StateId, Symbol, Transition};
use super::error::AutomatonError;
use crate::logging::codes;
use crate::tokens::{DataType, Token, TokenClass};
use std::collections::HashMap;

const START: StateId = 0;
const IDENTIFIER: StateId = 1;
const INTEGER: StateId = 2;
const DECIMAL_POINT: StateId = 3;
const FRACTION: StateId = 4;
const EXPONENT: StateId = 5;
const EXPONENT_SIGN: StateId = 6;
const EXPONENT_DIGITS: StateId = 7;
const LESS: StateId = 8;
const LESS_COMPOUND: StateId = 9;
const GREATER: StateId = 10;
const GREATER_EQUAL: StateId = 11;
const EQUAL: StateId = 12;
const ASSIGNMENT: StateId = 13;
const ARITHMETIC: StateId = 14;
const OPEN_PAREN: StateId = 15;
const CLOSE_PAREN: StateId = 16;
const SEMICOLON: StateId = 17;
const COMMA: StateId = 18;
const COMMENT_BODY: StateId = 19;
const COMMENT: StateId = 20;
const LITERAL_BODY: StateId = 21;
const LITERAL: StateId = 22;

const LAST_STATE: StateId = LITERAL;

fn mgol_transitions() -> Vec<Transition> {
    use Symbol::{Char, Digit, Letter, Other};

    let mut transitions = vec![
        Transition::new(START, Letter, IDENTIFIER),
        Transition::new(START, Digit, INTEGER),
        Transition::new(START, Char(b'<'), LESS),
        Transition::new(START, Char(b'>'), GREATER),
        Transition::new(START, Char(b'='), EQUAL),
        Transition::new(START, Char(b'('), OPEN_PAREN),
        Transition::new(START, Char(b')'), CLOSE_PAREN),
        Transition::new(START, Char(b';'), SEMICOLON),
        Transition::new(START, Char(b','), COMMA),
        Transition::new(START, Char(b'{'), COMMENT_BODY),
        Transition::new(START, Char(b'"'), LITERAL_BODY),
        // identifiers
        Transition::new(IDENTIFIER, Letter, IDENTIFIER),
        Transition::new(IDENTIFIER, Digit, IDENTIFIER),
        Transition::new(IDENTIFIER, Char(b'_'), IDENTIFIER),
        // numbers
        Transition::new(INTEGER, Digit, INTEGER),
        Transition::new(INTEGER, Char(b'.'), DECIMAL_POINT),
        Transition::new(DECIMAL_POINT, Digit, FRACTION),
        Transition::new(FRACTION, Digit, FRACTION),
        Transition::new(EXPONENT, Digit, EXPONENT_DIGITS),
        Transition::new(EXPONENT_SIGN, Digit, EXPONENT_DIGITS),
        Transition::new(EXPONENT_DIGITS, Digit, EXPONENT_DIGITS),
        // relational operators and assignment
        Transition::new(LESS, Char(b'>'), LESS_COMPOUND),
        Transition::new(LESS, Char(b'='), LESS_COMPOUND),
        Transition::new(LESS, Char(b'-'), ASSIGNMENT),
        Transition::new(GREATER, Char(b'='), GREATER_EQUAL),
        // comment and literal bodies
        Transition::new(COMMENT_BODY, Char(b'}'), COMMENT),
        Transition::new(COMMENT_BODY, Other, COMMENT_BODY),
        Transition::new(LITERAL_BODY, Char(b'"'), LITERAL),
        Transition::new(LITERAL_BODY, Other, LITERAL_BODY),
    ];

    for op in [b'+', b'-', b'*', b'/'] {
        transitions.push(Transition::new(START, Char(op), ARITHMETIC));
    }

    for state in [INTEGER, FRACTION] {
        transitions.push(Transition::new(state, Char(b'e'), EXPONENT));
        transitions.push(Transition::new(state, Char(b'E'), EXPONENT));
    }

    transitions.push(Transition::new(EXPONENT, Char(b'+'), EXPONENT_SIGN));
    transitions.push(Transition::new(EXPONENT, Char(b'-'), EXPONENT_SIGN));

    transitions
}

fn mgol_classes() -> HashMap<StateId, TokenClass> {
    HashMap::from([
        (IDENTIFIER, TokenClass::Identifier),
        (INTEGER, TokenClass::Number),
        (FRACTION, TokenClass::Number),
        (EXPONENT_DIGITS, TokenClass::Number),
        (LESS, TokenClass::RelationalOp),
        (LESS_COMPOUND, TokenClass::RelationalOp),
        (GREATER, TokenClass::RelationalOp),
        (GREATER_EQUAL, TokenClass::RelationalOp),
        (EQUAL, TokenClass::RelationalOp),
        (ASSIGNMENT, TokenClass::Assignment),
        (ARITHMETIC, TokenClass::ArithmeticOp),
        (OPEN_PAREN, TokenClass::OpenParen),
        (CLOSE_PAREN, TokenClass::CloseParen),
        (SEMICOLON, TokenClass::Semicolon),
        (COMMA, TokenClass::Comma),
        (COMMENT, TokenClass::Comment),
        (LITERAL, TokenClass::LiteralConstant),
    ])
}

/// An automaton together with the token class of each final state
#[derive(Debug, Clone)]
pub struct ScannerTable {
    automaton: Automaton,
    classes: HashMap<StateId, TokenClass>,
}

impl ScannerTable {
    /// Every final state of `automaton` must have a class
    pub fn new(
        automaton: Automaton,
        classes: HashMap<StateId, TokenClass>,
    ) -> Result<Self, AutomatonError> {
        if let Some(&state) = automaton
            .final_states()
            .iter()
            .find(|state| !classes.contains_key(state))
        {
            return Err(AutomatonError::UnclassifiedFinalState { state });
        }

        Ok(Self {
            automaton,
            classes,
        })
    }

    /// The MGol lexical automaton
    pub fn mgol() -> Result<Self, AutomatonError> {
        let classes = mgol_classes();
        let automaton = Automaton::new(
            START..=LAST_STATE,
            START,
            classes.keys().copied(),
            &mgol_transitions(),
        )?;

        let table = Self::new(automaton, classes)?;
        crate::log_success!(codes::success::AUTOMATON_CONSTRUCTED, "Scanner automaton constructed",
            "states" => LAST_STATE + 1,
            "accepting" => table.classes.len()
        );
        Ok(table)
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn automaton_mut(&mut self) -> &mut Automaton {
        &mut self.automaton
    }

    pub fn class_of(&self, state: StateId) -> Option<TokenClass> {
        self.classes.get(&state).copied()
    }

    /// Token for a run accepted in `state`. Numbers containing a decimal
    /// point are real; an exponent keeps the mantissa's type.
    pub fn accept(&self, state: StateId, lexeme: &str) -> Option<Token> {
        let class = self.class_of(state)?;
        let data_type = match class {
            TokenClass::Number if lexeme.contains('.') => DataType::Real,
            TokenClass::Number => DataType::Integer,
            TokenClass::LiteralConstant => DataType::Literal,
            _ => DataType::Null,
        };

        Some(Token::new(class, lexeme, data_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn run(table: &mut ScannerTable, input: &str) -> (StateId, bool) {
        let automaton = table.automaton_mut();
        automaton.reset();
        let mut last = (automaton.current(), true);
        for byte in input.bytes() {
            last = automaton.next(byte);
            if !last.1 {
                break;
            }
        }
        (last.0, automaton.is_final_state())
    }

    #[test]
    fn test_mgol_table_is_deterministic() {
        assert!(ScannerTable::mgol().is_ok());
    }

    #[test]
    fn test_accepting_runs() {
        let mut table = ScannerTable::mgol().unwrap();

        let cases = [
            ("contador_1", TokenClass::Identifier),
            ("42", TokenClass::Number),
            ("3.14", TokenClass::Number),
            ("1e10", TokenClass::Number),
            ("2.5E-3", TokenClass::Number),
            ("<>", TokenClass::RelationalOp),
            ("<=", TokenClass::RelationalOp),
            (">=", TokenClass::RelationalOp),
            ("=", TokenClass::RelationalOp),
            ("<-", TokenClass::Assignment),
            ("/", TokenClass::ArithmeticOp),
            (",", TokenClass::Comma),
            ("{ a {nested\n }", TokenClass::Comment),
            ("\"Ola, mundo\"", TokenClass::LiteralConstant),
        ];

        for (input, class) in cases {
            let (state, is_final) = run(&mut table, input);
            assert!(is_final, "{input:?} should end in a final state");
            assert_eq!(table.class_of(state), Some(class), "{input:?}");
        }
    }

    #[test]
    fn test_incomplete_runs_are_not_final() {
        let mut table = ScannerTable::mgol().unwrap();

        for input in ["1.", "1e", "1e+", "{open", "\"open"] {
            let (_, is_final) = run(&mut table, input);
            assert!(!is_final, "{input:?} should not be accepted");
        }
    }

    #[test]
    fn test_number_types() {
        let table = ScannerTable::mgol().unwrap();

        assert_eq!(table.accept(INTEGER, "7").unwrap().data_type, DataType::Integer);
        assert_eq!(table.accept(FRACTION, "7.5").unwrap().data_type, DataType::Real);
        assert_eq!(
            table.accept(EXPONENT_DIGITS, "7e2").unwrap().data_type,
            DataType::Integer
        );
        assert_eq!(
            table.accept(LITERAL, "\"x\"").unwrap().data_type,
            DataType::Literal
        );
        assert!(table.accept(DECIMAL_POINT, "7.").is_none());
    }

    #[test]
    fn test_unclassified_final_state_is_rejected() {
        let automaton = Automaton::new(0..=1, 0, [1], &[]).unwrap();
        assert_matches!(
            ScannerTable::new(automaton, HashMap::new()),
            Err(AutomatonError::UnclassifiedFinalState { state: 1 })
        );
    }
}
