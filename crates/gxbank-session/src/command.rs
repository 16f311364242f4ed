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

//! Command trait and registry.
//!
//! Every command-line switch is a [`Command`] registered by name. The dispatcher
//! looks names up here and hands each command its optional argument.

use crate::session::Session;
use ahash::AHashMap;
use gxbank_core::{BankError, BankResult};
use std::io::Write;

/// Where the tokens being dispatched came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Process arguments, processed once.
    Batch,
    /// Lines read from standard input.
    Interactive,
}

/// What the dispatcher should do after a command succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Carry on with the next token.
    Continue,
    /// Switch to interactive mode once the batch is done.
    EnterInteractive,
    /// Stop the interactive loop now.
    Quit,
}

/// Command execution context.
pub struct CommandContext<'a> {
    /// The session commands act on.
    pub session: &'a mut Session,
    /// The registry the command was found in, for help output.
    pub registry: &'a CommandRegistry,
    /// Whether this is a batch or an interactive run.
    pub mode: Mode,
    /// Destination for command output other than outcome lines.
    pub out: &'a mut dyn Write,
}

impl CommandContext<'_> {
    /// Writes one line of command output.
    pub fn print(&mut self, line: &str) -> BankResult<()> {
        writeln!(self.out, "{line}").map_err(|e| BankError::io("writing command output", e))
    }
}

/// Trait for command implementations.
pub trait Command: Send + Sync {
    /// The name the command is invoked by, dash included.
    fn name(&self) -> &str;

    /// Placeholder for the argument in usage text, or `None` if the command
    /// takes no argument.
    fn argument(&self) -> Option<&str> {
        None
    }

    /// One-line description for usage text.
    fn help(&self) -> &str;

    /// Runs the command. `arg` is present exactly when [`argument`](Self::argument) is.
    fn execute(&self, ctx: &mut CommandContext<'_>, arg: Option<&str>) -> BankResult<Flow>;
}

/// Registry mapping command names to implementations.
pub struct CommandRegistry {
    commands: AHashMap<String, Box<dyn Command>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            commands: AHashMap::new(),
        }
    }

    /// Creates a registry holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::commands::register_all(&mut registry);
        registry
    }

    /// Registers a command, replacing any command of the same name.
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        self.commands
            .insert(command.name().to_string(), Box::new(command));
    }

    /// Looks a command up by name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|command| command.as_ref())
    }

    /// Whether a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Usage lines for every command, sorted by name.
    pub fn usage_lines(&self) -> Vec<String> {
        let mut commands: Vec<&dyn Command> = self.commands.values().map(Box::as_ref).collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
            .into_iter()
            .map(|command| {
                let invocation = match command.argument() {
                    Some(arg) => format!("{} <{arg}>", command.name()),
                    None => command.name().to_string(),
                };
                format!("  {invocation:<28}{}", command.help())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Command for Echo {
        fn name(&self) -> &str {
            "-echo"
        }

        fn argument(&self) -> Option<&str> {
            Some("text")
        }

        fn help(&self) -> &str {
            "Prints its argument"
        }

        fn execute(&self, ctx: &mut CommandContext<'_>, arg: Option<&str>) -> BankResult<Flow> {
            ctx.print(arg.unwrap_or_default())?;
            Ok(Flow::Continue)
        }
    }

    #[test]
    fn registered_commands_are_found_by_name() {
        let mut registry = CommandRegistry::new();
        assert!(registry.is_empty());
        registry.register(Echo);

        assert!(registry.contains("-echo"));
        assert_eq!(registry.get("-echo").unwrap().help(), "Prints its argument");
        assert!(registry.get("echo").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn usage_lines_show_arguments() {
        let mut registry = CommandRegistry::new();
        registry.register(Echo);
        let lines = registry.usage_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("  -echo <text>"));
        assert!(lines[0].ends_with("Prints its argument"));
    }

    #[test]
    fn context_prints_lines() {
        let registry = CommandRegistry::new();
        let mut session = Session::default();
        let mut out = Vec::new();
        let mut ctx = CommandContext {
            session: &mut session,
            registry: &registry,
            mode: Mode::Batch,
            out: &mut out,
        };
        Echo.execute(&mut ctx, Some("hello")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello\n");
    }

    #[test]
    fn builtins_cover_the_vocabulary() {
        let registry = CommandRegistry::with_builtins();
        for name in [
            "-help",
            "-interHelp",
            "-interactive",
            "-quit",
            "-game",
            "-mipmaps",
            "-interpolate",
            "-importObjMtl",
            "-importTpl",
            "-importGma",
            "-exportObjMtl",
            "-exportTpl",
            "-exportGma",
            "-exportPng",
            "-setAllMipmaps",
        ] {
            assert!(registry.contains(name), "{name} is not registered");
        }
        assert_eq!(registry.len(), 15);
    }
}
