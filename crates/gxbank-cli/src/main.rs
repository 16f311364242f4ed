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

//! The `gxbank` binary.
//!
//! With arguments, every argument is a command token and the whole list runs as
//! one batch; `-interactive` then keeps reading commands from standard input.
//! Without arguments there is nothing to do headlessly, so usage is printed.

use anyhow::{Context, Result};
use gxbank_core::EditorSettings;
use gxbank_session::{Dispatcher, Session};
use std::io::{self, Write};

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("warn")).init();

    let settings = EditorSettings::from_env().context("Failed to load editor settings")?;
    log::debug!("Starting with {settings:?}");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dispatcher = Dispatcher::new().headless();
    let mut session = Session::new(settings);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.is_empty() {
        writeln!(out, "The model viewer is not part of this build; pass commands to run them.")?;
        writeln!(out)?;
        for line in dispatcher.registry().usage_lines() {
            writeln!(out, "{line}")?;
        }
        return Ok(());
    }

    let outcome = dispatcher
        .run_batch(&mut session, &args, &mut out)
        .context("Batch run failed")?;
    if outcome.enter_interactive {
        log::info!("Entering interactive mode");
        dispatcher
            .run_interactive(&mut session, io::stdin().lock(), &mut out)
            .context("Interactive session failed")?;
    }
    out.flush().context("Failed to flush standard output")?;
    Ok(())
}
