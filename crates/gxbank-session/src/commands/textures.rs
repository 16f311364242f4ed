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

//! Texture editing commands.

use super::required;
use crate::command::{Command, CommandContext, CommandRegistry, Flow};
use gxbank_core::settings::parse_mipmap_count;
use gxbank_core::BankResult;

/// Registers the texture editing commands.
pub fn register(registry: &mut CommandRegistry) {
    registry.register(SetAllMipmapsCommand);
}

/// `-setAllMipmaps <count>`
pub struct SetAllMipmapsCommand;

impl Command for SetAllMipmapsCommand {
    fn name(&self) -> &str {
        "-setAllMipmaps"
    }

    fn argument(&self) -> Option<&str> {
        Some("count")
    }

    fn help(&self) -> &str {
        "Regenerate every texture with the given number of mip-maps"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, arg: Option<&str>) -> BankResult<Flow> {
        let count = parse_mipmap_count(required(arg)?)?;
        ctx.session.set_all_mipmaps(count)?;
        Ok(Flow::Continue)
    }
}
