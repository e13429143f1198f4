use super::error::AutomatonError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub type StateId = usize;

/// Alphabet element: a literal byte or a character class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Char(u8),
    /// ASCII letter
    Letter,
    /// ASCII digit
    Digit,
    /// Any byte not matched by another transition of the same state
    Other,
}

impl Symbol {
    fn matches(&self, byte: u8) -> bool {
        match self {
            Symbol::Char(c) => *c == byte,
            Symbol::Letter => byte.is_ascii_alphabetic(),
            Symbol::Digit => byte.is_ascii_digit(),
            Symbol::Other => false,
        }
    }

    fn overlaps(&self, other: &Symbol) -> bool {
        match (self, other) {
            (Symbol::Other, Symbol::Other) => true,
            (Symbol::Other, _) | (_, Symbol::Other) => false,
            (Symbol::Char(c), class) | (class, Symbol::Char(c)) => class.matches(*c),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "'{}'", c.escape_ascii()),
            Symbol::Letter => f.write_str("<letter>"),
            Symbol::Digit => f.write_str("<digit>"),
            Symbol::Other => f.write_str("<other>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub symbol: Symbol,
    pub to: StateId,
}

impl Transition {
    pub const fn new(from: StateId, symbol: Symbol, to: StateId) -> Self {
        Self { from, symbol, to }
    }
}

#[derive(Debug, Clone)]
pub struct Automaton {
    states: BTreeSet<StateId>,
    initial: StateId,
    finals: BTreeSet<StateId>,
    transitions: HashMap<StateId, Vec<(Symbol, StateId)>>,
    cursor: StateId,
}

impl Automaton {
    /// Build and validate an automaton. Rejects undeclared states and any
    /// pair of transitions from one state that could match the same byte.
    pub fn new(
        states: impl IntoIterator<Item = StateId>,
        initial: StateId,
        finals: impl IntoIterator<Item = StateId>,
        transitions: &[Transition],
    ) -> Result<Self, AutomatonError> {
        let states: BTreeSet<StateId> = states.into_iter().collect();
        let finals: BTreeSet<StateId> = finals.into_iter().collect();

        let require = |role: &'static str, state: StateId| {
            if states.contains(&state) {
                Ok(())
            } else {
                Err(AutomatonError::UnknownState { role, state })
            }
        };

        require("Initial", initial)?;
        for &state in &finals {
            require("Final", state)?;
        }

        let mut by_state: HashMap<StateId, Vec<(Symbol, StateId)>> = HashMap::new();
        for transition in transitions {
            require("Source", transition.from)?;
            require("Target", transition.to)?;

            let outgoing = by_state.entry(transition.from).or_default();
            if let Some((existing, _)) = outgoing
                .iter()
                .find(|(symbol, _)| symbol.overlaps(&transition.symbol))
            {
                return Err(AutomatonError::Nondeterministic {
                    state: transition.from,
                    first: *existing,
                    second: transition.symbol,
                });
            }
            outgoing.push((transition.symbol, transition.to));
        }

        Ok(Self {
            states,
            initial,
            finals,
            transitions: by_state,
            cursor: initial,
        })
    }

    /// Step on `byte`. With no matching transition the cursor stays put and
    /// `false` is returned; the caller decides between accept and error.
    pub fn next(&mut self, byte: u8) -> (StateId, bool) {
        let Some(outgoing) = self.transitions.get(&self.cursor) else {
            return (self.cursor, false);
        };

        let target = outgoing
            .iter()
            .find(|(symbol, _)| symbol.matches(byte))
            .or_else(|| outgoing.iter().find(|(symbol, _)| *symbol == Symbol::Other))
            .map(|(_, to)| *to);

        match target {
            Some(to) => {
                self.cursor = to;
                (to, true)
            }
            None => (self.cursor, false),
        }
    }

    pub fn reset(&mut self) {
        self.cursor = self.initial;
    }

    pub fn current(&self) -> StateId {
        self.cursor
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn is_initial(&self) -> bool {
        self.cursor == self.initial
    }

    pub fn is_final_state(&self) -> bool {
        self.finals.contains(&self.cursor)
    }

    pub fn final_states(&self) -> &BTreeSet<StateId> {
        &self.finals
    }

    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }
}
