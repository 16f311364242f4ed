// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The batch/interactive command dispatcher.
//!
//! Tokens are consumed left to right. Each command name is looked up in the
//! [`CommandRegistry`], takes its argument from the next token when it needs one,
//! and reports exactly one outcome line:
//!
//! ```text
//! Info [-game]: Command completed successfully
//! Invalid Command Error [-game]: Unknown game 'bogus' (expected smb, deluxe or fzero)
//! ```
//!
//! A failed command never stops the ones after it.

use crate::command::{CommandContext, CommandRegistry, Flow, Mode};
use crate::session::Session;
use crate::tokenizer::{strip_line_terminator, tokenize};
use gxbank_core::{BankError, BankResult};
use std::io::{BufRead, Write};

/// The result of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// `-interactive` was among the batch commands.
    pub enter_interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct LineOutcome {
    enter_interactive: bool,
    quit: bool,
}

/// Drives a [`Session`] from command tokens.
#[derive(Default)]
pub struct Dispatcher {
    registry: CommandRegistry,
    headless: bool,
}

impl Dispatcher {
    /// Creates a dispatcher with every built-in command.
    pub fn new() -> Self {
        Self::with_registry(CommandRegistry::with_builtins())
    }

    /// Creates a dispatcher over a custom registry.
    pub fn with_registry(registry: CommandRegistry) -> Self {
        Self {
            registry,
            headless: false,
        }
    }

    /// Discards the session's cache events after every batch and line, for
    /// runs with no renderer to consume them.
    pub fn headless(mut self) -> Self {
        self.headless = true;
        self
    }

    /// The registry commands are looked up in.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Runs process arguments as one batch.
    pub fn run_batch<S: AsRef<str>>(
        &self,
        session: &mut Session,
        args: &[S],
        out: &mut dyn Write,
    ) -> BankResult<BatchOutcome> {
        let tokens: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();
        let outcome = self.run_tokens(session, Mode::Batch, &tokens, out)?;
        self.settle(session);
        Ok(BatchOutcome {
            enter_interactive: outcome.enter_interactive,
        })
    }

    /// Reads and runs lines from `input` until `-quit` or end of input.
    pub fn run_interactive(
        &self,
        session: &mut Session,
        mut input: impl BufRead,
        out: &mut dyn Write,
    ) -> BankResult<()> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = input
                .read_line(&mut line)
                .map_err(|e| BankError::io("reading interactive input", e))?;
            if read == 0 {
                log::debug!("End of interactive input");
                return Ok(());
            }

            let tokens = tokenize(strip_line_terminator(&line));
            let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
            let outcome = self.run_tokens(session, Mode::Interactive, &tokens, out)?;
            self.settle(session);
            if outcome.quit {
                return Ok(());
            }
        }
    }

    fn settle(&self, session: &Session) {
        if self.headless {
            session.discard_cache_events();
        }
    }

    fn run_tokens(
        &self,
        session: &mut Session,
        mode: Mode,
        tokens: &[&str],
        out: &mut dyn Write,
    ) -> BankResult<LineOutcome> {
        let mut outcome = LineOutcome::default();
        let mut rest = tokens.iter().copied();

        while let Some(name) = rest.next() {
            let result = match self.registry.get(name) {
                None => Err(BankError::UnknownCommand(name.to_string())),
                Some(command) => {
                    let arg = match command.argument() {
                        Some(_) => match rest.next() {
                            Some(arg) => Some(arg),
                            None => {
                                report(out, name, &Err(BankError::argument("Not enough arguments")))?;
                                continue;
                            }
                        },
                        None => None,
                    };
                    log::debug!("Dispatching {name} {arg:?} ({mode:?})");
                    let mut ctx = CommandContext {
                        session: &mut *session,
                        registry: &self.registry,
                        mode,
                        out: &mut *out,
                    };
                    command.execute(&mut ctx, arg)
                }
            };

            match result {
                Ok(Flow::Quit) if mode == Mode::Batch => {}
                Ok(Flow::Quit) => {
                    report(out, name, &Ok(()))?;
                    outcome.quit = true;
                    return Ok(outcome);
                }
                Ok(Flow::EnterInteractive) => {
                    outcome.enter_interactive = true;
                    report(out, name, &Ok(()))?;
                }
                Ok(Flow::Continue) => report(out, name, &Ok(()))?,
                Err(e) => {
                    log::debug!("{name} failed ({}): {e}", e.kind());
                    report(out, name, &Err(e))?;
                }
            }
        }
        Ok(outcome)
    }
}

/// Writes the outcome line of one command.
fn report(out: &mut dyn Write, command: &str, result: &BankResult<()>) -> BankResult<()> {
    let written = match result {
        Ok(()) => writeln!(out, "Info [{command}]: Command completed successfully"),
        Err(e) => writeln!(out, "Invalid Command Error [{command}]: {e}"),
    };
    written.map_err(|e| BankError::io("writing command outcome", e))
}
