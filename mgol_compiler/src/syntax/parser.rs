//! Table-driven LR parse engine
//!
//! The state stack holds parser states and the executor's value stack holds one
//! token per grammar symbol, so `values == states - 1` after every step. The
//! lookahead is always the next token that is neither a comment nor a lexical
//! error sentinel.

use super::error::SyntaxError;
use crate::config::compile_time::syntax::MAX_ERROR_HISTORY;
use crate::config::runtime::SyntaxPreferences;
use crate::diagnostics::Diagnostic;
use crate::grammar::{Action, DecisionTables, ErrorCategory};
use crate::lexical::{CharSource, LexicalMetrics, Scanner};
use crate::logging::codes;
use crate::semantic::SemanticExecutor;
use crate::symbols::SymbolTable;
use crate::tokens::Token;
use crate::utils::{BoundedStack, Position, StackError, Spanned};
use crate::{log_debug, log_error, log_performance, log_success};
use std::collections::VecDeque;
use std::time::Instant;

pub const INITIAL_STATE: usize = 0;

#[derive(Debug, Default, Clone)]
pub struct SyntaxMetrics {
    pub shifts: usize,
    pub reductions: usize,
    pub syntax_errors: usize,
    pub recoveries: usize,
    /// Tokens skipped while resynchronizing
    pub discarded_tokens: usize,
}

/// One syntax error as the parser saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorRecord {
    pub state: usize,
    pub token: Token,
    pub position: Position,
    pub category: ErrorCategory,
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub accepted: bool,
    /// Input ran out before the parser could resynchronize
    pub recovery_failed: bool,
    /// Lexical, syntax, and semantic diagnostics in source order
    pub diagnostics: Vec<Diagnostic>,
    /// Generated C, present only when no syntax or semantic error was found
    pub program: Option<String>,
    pub symbols: SymbolTable,
    pub lexical_metrics: LexicalMetrics,
    pub syntax_metrics: SyntaxMetrics,
    pub error_history: Vec<SyntaxErrorRecord>,
}

impl ParseOutcome {
    /// Accepted with no diagnostics of any kind
    pub fn success(&self) -> bool {
        self.accepted && self.diagnostics.is_empty()
    }

    pub fn has_lexical_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_lexical)
    }

    pub fn has_syntax_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_syntax)
    }

    pub fn has_semantic_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_semantic)
    }
}

pub struct Parser<'t, S: CharSource> {
    pub(super) scanner: Scanner<S>,
    pub(super) tables: &'t DecisionTables,
    pub(super) states: BoundedStack<usize>,
    pub(super) executor: SemanticExecutor,
    pub(super) metrics: SyntaxMetrics,
    preferences: SyntaxPreferences,
    diagnostics: Vec<Diagnostic>,
    error_history: VecDeque<SyntaxErrorRecord>,
}

impl<'t, S: CharSource> Parser<'t, S> {
    pub fn new(scanner: Scanner<S>, tables: &'t DecisionTables) -> Self {
        Self::with_preferences(scanner, tables, SyntaxPreferences::default())
    }

    pub fn with_preferences(
        scanner: Scanner<S>,
        tables: &'t DecisionTables,
        preferences: SyntaxPreferences,
    ) -> Self {
        let capacity = preferences.effective_stack_capacity();
        Self {
            scanner,
            tables,
            states: BoundedStack::new(capacity),
            executor: SemanticExecutor::new(capacity),
            metrics: SyntaxMetrics::default(),
            preferences,
            diagnostics: Vec::new(),
            error_history: VecDeque::new(),
        }
    }

    /// Swap in a different executor, e.g. one with extra rule actions
    pub fn with_executor(mut self, executor: SemanticExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Run to Accept or to a failed recovery. Syntax and semantic problems
    /// are reported in the outcome; `Err` means the parse could not continue.
    pub fn parse(mut self) -> Result<ParseOutcome, SyntaxError> {
        let started = Instant::now();

        self.states.clear();
        self.states.push(INITIAL_STATE)?;

        let mut lookahead = self.next_token()?;
        let mut accepted = false;
        let mut recovery_failed = false;
        // Offset of the token behind the latest recovery; cleared by a shift
        let mut trigger: Option<usize> = None;

        loop {
            let state = self.top()?;
            let terminal = lookahead.value.terminal().unwrap_or_default();

            match self.tables.action(state, terminal) {
                Some(Action::Shift(target)) => {
                    self.trace("Shift", state, &lookahead.value);
                    self.states.push(target)?;
                    let next = self.next_token()?;
                    self.executor.shift(std::mem::replace(&mut lookahead, next))?;
                    self.metrics.shifts += 1;
                    trigger = None;
                }
                Some(Action::Reduce(rule)) => {
                    self.trace("Reduce", state, &lookahead.value);
                    self.reduce(rule, lookahead.span.start)?;
                }
                Some(Action::Accept) => {
                    accepted = true;
                    break;
                }
                action => {
                    let slot = match action {
                        Some(Action::Error(category)) => Some(category),
                        _ => None,
                    };

                    let offset = lookahead.span.start.offset;
                    let repeated = trigger == Some(offset);
                    if !repeated {
                        self.report(state, &lookahead, slot);
                    }
                    trigger = Some(offset);

                    let position = lookahead.span.start;
                    match self.recover(lookahead, repeated)? {
                        Some(resumed) => lookahead = resumed,
                        None => {
                            self.report_recovery_failure(position);
                            recovery_failed = true;
                            break;
                        }
                    }
                }
            }
        }

        if accepted {
            log_performance!(codes::success::PARSE_ACCEPTED, "Parse accepted",
                duration = started.elapsed(),
                "shifts" => self.metrics.shifts,
                "reductions" => self.metrics.reductions,
                "syntax_errors" => self.metrics.syntax_errors
            );
        }

        Ok(self.finish(accepted, recovery_failed))
    }

    fn finish(mut self, accepted: bool, recovery_failed: bool) -> ParseOutcome {
        log_success!(codes::success::SEMANTIC_ANALYSIS_COMPLETE, "Semantic analysis completed",
            "semantic_errors" => self.executor.error_count()
        );

        let program = if accepted && self.diagnostics.is_empty() {
            self.executor.generate_program()
        } else {
            None
        };

        if let Some(program) = &program {
            log_success!(codes::success::CODE_GENERATED, "Code generated",
                "bytes" => program.len(),
                "temporaries" => self.executor.code().temporaries().len()
            );
        }

        let mut diagnostics = self.scanner.take_diagnostics();
        diagnostics.append(&mut self.diagnostics);
        diagnostics.append(&mut self.executor.take_diagnostics());
        diagnostics.sort_by_key(|diagnostic| diagnostic.position.offset);

        let lexical_metrics = self.scanner.metrics().clone();

        ParseOutcome {
            accepted,
            recovery_failed,
            diagnostics,
            program,
            symbols: self.scanner.into_symbols(),
            lexical_metrics,
            syntax_metrics: self.metrics,
            error_history: self.error_history.into_iter().collect(),
        }
    }

    fn reduce(&mut self, number: usize, position: Position) -> Result<(), SyntaxError> {
        let tables = self.tables;
        let rule = tables.rule(number)?;

        self.states.pop_many(rule.arity())?;
        let top = self.top()?;

        let Some(target) = tables.goto(top, &rule.left) else {
            log_error!(codes::syntax::MISSING_GOTO, "Goto table has no entry",
                "state" => top,
                "nonterminal" => &rule.left
            );
            return Err(SyntaxError::MissingGoto {
                state: top,
                nonterminal: rule.left.clone(),
            });
        };

        self.states.push(target)?;
        self.executor
            .reduce(rule, position, self.scanner.symbols_mut())?;
        self.metrics.reductions += 1;
        Ok(())
    }

    pub(super) fn top(&self) -> Result<usize, SyntaxError> {
        Ok(*self.states.peek().ok_or(StackError::Empty)?)
    }

    /// Next token the grammar can see
    pub(super) fn next_token(&mut self) -> Result<Spanned<Token>, SyntaxError> {
        loop {
            let token = self.scanner.scan()?;
            if !token.value.class.is_ignorable() {
                return Ok(token);
            }
        }
    }

    fn report(&mut self, state: usize, token: &Spanned<Token>, slot: Option<u16>) {
        let category = if token.value.is_end_of_file() {
            ErrorCategory::UnexpectedEndOfInput
        } else {
            slot.and_then(ErrorCategory::from_number)
                .unwrap_or(ErrorCategory::UnexpectedToken)
        };

        let message = if token.value.is_end_of_file() {
            "Unexpected end of input".to_string()
        } else {
            format!("{} near '{}'", category, token.value.lexeme)
        };

        let expected: Vec<&str> = self
            .tables
            .actions()
            .terminals()
            .iter()
            .map(String::as_str)
            .filter(|terminal| self.tables.has_action(state, terminal))
            .collect();

        log_error!(category.code(), &message, span = token.span,
            "state" => state,
            "token" => token.value.class,
            "expected" => expected.join(" ")
        );

        let position = token.span.start;
        self.diagnostics.push(
            Diagnostic::syntax(category.code(), message, position)
                .with_lexeme(token.value.lexeme.clone()),
        );

        if self.error_history.len() >= MAX_ERROR_HISTORY {
            self.error_history.pop_front();
        }
        self.error_history.push_back(SyntaxErrorRecord {
            state,
            token: token.value.clone(),
            position,
            category,
        });
        self.metrics.syntax_errors += 1;
    }

    fn report_recovery_failure(&mut self, position: Position) {
        let message = "Could not resynchronize before end of input";
        log_error!(codes::syntax::RECOVERY_FAILED, message,
            "line" => position.line,
            "column" => position.column
        );
        self.diagnostics
            .push(Diagnostic::syntax(codes::syntax::RECOVERY_FAILED, message, position));
    }

    pub(super) fn trace(&self, step: &str, state: usize, token: &Token) {
        if self.preferences.trace_actions {
            log_debug!(step, "state" => state, "token" => &token.lexeme);
        }
    }
}
