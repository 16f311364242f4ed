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

//! Built-in command implementations, grouped by category.

pub mod control;
pub mod io;
pub mod settings;
pub mod textures;

use crate::command::CommandRegistry;
use gxbank_core::{BankError, BankResult};

/// Registers every built-in command.
pub fn register_all(registry: &mut CommandRegistry) {
    control::register(registry);
    settings::register(registry);
    io::register(registry);
    textures::register(registry);
}

/// Unwraps the argument the dispatcher guarantees for argument-taking commands.
pub(crate) fn required(arg: Option<&str>) -> BankResult<&str> {
    arg.ok_or_else(|| BankError::argument("Not enough arguments"))
}
