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

//! Settings commands.

use super::required;
use crate::command::{Command, CommandContext, CommandRegistry, Flow};
use gxbank_core::settings::parse_mipmap_count;
use gxbank_core::{BankResult, Game, Interpolation};

/// Registers the settings commands.
pub fn register(registry: &mut CommandRegistry) {
    registry.register(GameCommand);
    registry.register(MipmapsCommand);
    registry.register(InterpolateCommand);
}

/// `-game <smb|deluxe|fzero>`
pub struct GameCommand;

impl Command for GameCommand {
    fn name(&self) -> &str {
        "-game"
    }

    fn argument(&self) -> Option<&str> {
        Some("smb|deluxe|fzero")
    }

    fn help(&self) -> &str {
        "Select the game layout for loads and saves"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, arg: Option<&str>) -> BankResult<Flow> {
        let game: Game = required(arg)?.parse()?;
        ctx.session.set_selected_game(game);
        Ok(Flow::Continue)
    }
}

/// `-mipmaps <count>`
pub struct MipmapsCommand;

impl Command for MipmapsCommand {
    fn name(&self) -> &str {
        "-mipmaps"
    }

    fn argument(&self) -> Option<&str> {
        Some("count")
    }

    fn help(&self) -> &str {
        "Number of mip-maps to generate for imported textures"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, arg: Option<&str>) -> BankResult<Flow> {
        let count = parse_mipmap_count(required(arg)?)?;
        ctx.session.set_mipmap_count(count);
        Ok(Flow::Continue)
    }
}

/// `-interpolate <default|nearest|nn>`
pub struct InterpolateCommand;

impl Command for InterpolateCommand {
    fn name(&self) -> &str {
        "-interpolate"
    }

    fn argument(&self) -> Option<&str> {
        Some("default|nearest|nn")
    }

    fn help(&self) -> &str {
        "Resampling filter for generated mip-maps"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, arg: Option<&str>) -> BankResult<Flow> {
        let interpolation: Interpolation = required(arg)?.parse()?;
        ctx.session.set_interpolation(interpolation);
        Ok(Flow::Continue)
    }
}
