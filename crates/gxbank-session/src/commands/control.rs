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

//! Control commands: help, mode switching and quitting.

use crate::command::{Command, CommandContext, CommandRegistry, Flow, Mode};
use gxbank_core::BankResult;

/// Registers the control commands.
pub fn register(registry: &mut CommandRegistry) {
    registry.register(HelpCommand);
    registry.register(InterHelpCommand);
    registry.register(InteractiveCommand);
    registry.register(QuitCommand);
}

const BATCH_HEADER: &str = "Usage: gxbank [command [argument]]...

Commands run left to right. Each prints exactly one outcome line.
";

const INTERACTIVE_HEADER: &str = "Interactive mode: enter one or more commands per line.

Separate commands and arguments with spaces; wrap arguments containing spaces in
double quotes. -quit (or end of input) leaves interactive mode.
";

fn print_usage(ctx: &mut CommandContext<'_>, header: &str) -> BankResult<()> {
    for line in header.lines() {
        ctx.print(line)?;
    }
    ctx.print("")?;
    ctx.print("Commands:")?;
    for line in ctx.registry.usage_lines() {
        ctx.print(&line)?;
    }
    Ok(())
}

/// `-help`
pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "-help"
    }

    fn help(&self) -> &str {
        "Show command-line usage"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _arg: Option<&str>) -> BankResult<Flow> {
        print_usage(ctx, BATCH_HEADER)?;
        Ok(Flow::Continue)
    }
}

/// `-interHelp`
pub struct InterHelpCommand;

impl Command for InterHelpCommand {
    fn name(&self) -> &str {
        "-interHelp"
    }

    fn help(&self) -> &str {
        "Show interactive-mode usage"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _arg: Option<&str>) -> BankResult<Flow> {
        print_usage(ctx, INTERACTIVE_HEADER)?;
        Ok(Flow::Continue)
    }
}

/// `-interactive`
pub struct InteractiveCommand;

impl Command for InteractiveCommand {
    fn name(&self) -> &str {
        "-interactive"
    }

    fn help(&self) -> &str {
        "Read further commands from standard input after the batch"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, _arg: Option<&str>) -> BankResult<Flow> {
        Ok(match ctx.mode {
            Mode::Batch => Flow::EnterInteractive,
            Mode::Interactive => Flow::Continue,
        })
    }
}

/// `-quit`
pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &str {
        "-quit"
    }

    fn help(&self) -> &str {
        "Leave interactive mode (ignored in batch mode)"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>, _arg: Option<&str>) -> BankResult<Flow> {
        Ok(Flow::Quit)
    }
}
