//! Panic-mode recovery
//!
//! Pop the live state stack until some state has a viable action on the
//! lookahead. If none does, restore the stack, drop the lookahead, and try
//! again with the next token. Running out of input ends the parse.

use super::error::SyntaxError;
use super::parser::Parser;
use crate::config::compile_time::syntax::MAX_RECOVERY_SCANS;
use crate::lexical::CharSource;
use crate::logging::codes;
use crate::tokens::Token;
use crate::utils::Spanned;
use crate::{log_debug, log_success};

impl<S: CharSource> Parser<'_, S> {
    /// Resynchronize after an error on `trigger`. With `discard_trigger` the
    /// token is dropped before searching. Returns the token to resume with,
    /// or `None` when input ran out first.
    pub(super) fn recover(
        &mut self,
        trigger: Spanned<Token>,
        discard_trigger: bool,
    ) -> Result<Option<Spanned<Token>>, SyntaxError> {
        let snapshot = self.states.clone();
        let mut scans = 0usize;
        let mut token = trigger;

        if discard_trigger {
            match self.discard(&token, &mut scans)? {
                Some(next) => token = next,
                None => return Ok(None),
            }
        }

        loop {
            if let Some(state) = self.resynchronize(&token) {
                // The stack is never empty here
                self.executor
                    .truncate_values(self.states.len().saturating_sub(1));
                self.metrics.recoveries += 1;

                log_success!(codes::success::ERROR_RECOVERED, "Recovered from syntax error",
                    "state" => state,
                    "token" => &token.value.lexeme,
                    "line" => token.span.start.line,
                    "discarded" => scans
                );
                return Ok(Some(token));
            }

            self.states = snapshot.clone();
            match self.discard(&token, &mut scans)? {
                Some(next) => token = next,
                None => return Ok(None),
            }
        }
    }

    /// Pop until the top state has a viable action on `token`; empties the
    /// stack when no such state exists.
    fn resynchronize(&mut self, token: &Spanned<Token>) -> Option<usize> {
        let terminal = token.value.terminal().unwrap_or_default();

        while let Some(&state) = self.states.peek() {
            if self.tables.has_action(state, terminal) {
                return Some(state);
            }
            self.states.truncate(self.states.len() - 1);
        }
        None
    }

    /// Replace `token` with the next one, unless input or the scan budget is exhausted
    fn discard(
        &mut self,
        token: &Spanned<Token>,
        scans: &mut usize,
    ) -> Result<Option<Spanned<Token>>, SyntaxError> {
        if token.value.is_end_of_file() || *scans >= MAX_RECOVERY_SCANS {
            return Ok(None);
        }

        log_debug!("Discarding token",
            "token" => &token.value.lexeme,
            "line" => token.span.start.line
        );
        *scans += 1;
        self.metrics.discarded_tokens += 1;
        Ok(Some(self.next_token()?))
    }
}
