//! Finite-State Engine
//!
//! [`Automaton`] is a pure deterministic stepper over bytes. It never
//! backtracks; pushback and token boundaries belong to the scanner.
//! [`ScannerTable`] pairs the MGol automaton with its final-state classes.

pub mod dfa;
pub mod error;
pub mod mgol;

pub use dfa::{Automaton, StateId, Symbol, Transition};
pub use error::AutomatonError;
pub use mgol::ScannerTable;
