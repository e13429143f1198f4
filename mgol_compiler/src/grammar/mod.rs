//! Grammar rules and the parser's decision tables
//!
//! The built-in tables are constructed at startup as SLR(1) tables from the
//! bundled MGol rules. Tables can also be loaded from (and exported to) a
//! directory holding `action_table.tsv`, `goto_table.tsv`, and `rules.json`.

pub mod builder;
pub mod category;
pub mod error;
pub mod rules;
pub mod tables;

use crate::logging::codes;
use crate::log_success;
use std::path::Path;

pub use builder::{ErrorPolicy, KernelItem, MgolErrorPolicy, SlrBuilder, SlrTables, UniformErrorPolicy};
pub use category::ErrorCategory;
pub use error::GrammarError;
pub use rules::{Rule, RuleSet};
pub use tables::{Action, ActionTable, GotoTable, END_MARKER};

pub const ACTION_TABLE_FILE: &str = "action_table.tsv";
pub const GOTO_TABLE_FILE: &str = "goto_table.tsv";
pub const RULES_FILE: &str = "rules.json";

/// Rules, actions, and gotos, checked against each other
#[derive(Debug, Clone)]
pub struct DecisionTables {
    rules: RuleSet,
    actions: ActionTable,
    gotos: GotoTable,
}

impl DecisionTables {
    pub fn new(rules: RuleSet, actions: ActionTable, gotos: GotoTable) -> Result<Self, GrammarError> {
        let tables = Self {
            rules,
            actions,
            gotos,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// SLR(1) tables for the bundled MGol grammar
    pub fn mgol() -> Result<Self, GrammarError> {
        let rules = RuleSet::mgol()?;
        let SlrTables { actions, gotos } = SlrBuilder::new(&rules)
            .with_error_policy(MgolErrorPolicy)
            .build()?;

        log_success!(codes::success::TABLES_CONSTRUCTED, "Decision tables constructed",
            "states" => actions.state_count(),
            "rules" => rules.len()
        );

        Self::new(rules, actions, gotos)
    }

    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, GrammarError> {
        let dir = dir.as_ref();
        let tables = Self::new(
            RuleSet::load(dir.join(RULES_FILE))?,
            ActionTable::load(dir.join(ACTION_TABLE_FILE))?,
            GotoTable::load(dir.join(GOTO_TABLE_FILE))?,
        )?;

        log_success!(codes::success::TABLES_CONSTRUCTED, "Decision tables loaded",
            "dir" => dir.display(),
            "states" => tables.state_count()
        );

        Ok(tables)
    }

    pub fn export_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(), GrammarError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| GrammarError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        self.actions.save(dir.join(ACTION_TABLE_FILE))?;
        self.gotos.save(dir.join(GOTO_TABLE_FILE))?;

        let rules_path = dir.join(RULES_FILE);
        std::fs::write(&rules_path, self.rules.to_json()?).map_err(|source| GrammarError::Io {
            path: rules_path,
            source,
        })
    }

    fn validate(&self) -> Result<(), GrammarError> {
        let state_count = self.actions.state_count();
        if self.gotos.state_count() != state_count {
            return Err(GrammarError::table_format(
                GOTO_TABLE_FILE,
                0,
                format!(
                    "{} goto rows for {} action rows",
                    self.gotos.state_count(),
                    state_count
                ),
            ));
        }

        for terminal in self.rules.terminals() {
            if !self.actions.terminals().iter().any(|t| t == terminal) {
                return Err(GrammarError::UndefinedSymbol {
                    symbol: terminal.to_string(),
                    table: "action table",
                });
            }
        }

        for nonterminal in self.rules.nonterminals() {
            if !self.gotos.nonterminals().iter().any(|nt| nt == nonterminal) {
                return Err(GrammarError::UndefinedSymbol {
                    symbol: nonterminal.to_string(),
                    table: "goto table",
                });
            }
        }

        for (state, terminal, action) in self.actions.cells() {
            match action {
                Action::Reduce(rule) => {
                    self.rules.rule(rule)?;
                }
                Action::Shift(target) if target >= state_count => {
                    return Err(GrammarError::table_format(
                        ACTION_TABLE_FILE,
                        state + 2,
                        format!("shift on '{}' to unknown state {}", terminal, target),
                    ));
                }
                _ => {}
            }
        }

        if let Some(target) = self.gotos.targets().find(|&t| t >= state_count) {
            return Err(GrammarError::table_format(
                GOTO_TABLE_FILE,
                0,
                format!("goto to unknown state {}", target),
            ));
        }

        Ok(())
    }

    pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        self.actions.action(state, terminal)
    }

    pub fn has_action(&self, state: usize, terminal: &str) -> bool {
        self.actions.has_action(state, terminal)
    }

    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.gotos.goto(state, nonterminal)
    }

    pub fn rule(&self, number: usize) -> Result<&Rule, GrammarError> {
        self.rules.rule(number)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn gotos(&self) -> &GotoTable {
        &self.gotos
    }

    pub fn state_count(&self) -> usize {
        self.actions.state_count()
    }
}
