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

//! File I/O commands: container banks, OBJ/MTL and PNG interchange.

use super::required;
use crate::command::{Command, CommandContext, CommandRegistry, Flow};
use crate::session::Session;
use gxbank_core::BankResult;
use std::path::Path;

/// Registers the file I/O commands.
pub fn register(registry: &mut CommandRegistry) {
    for command in [
        PathCommand {
            name: "-importTpl",
            help: "Load a TPL texture bank",
            run: |session, path| session.load_textures(Some(path)),
        },
        PathCommand {
            name: "-importGma",
            help: "Load a GMA model bank",
            run: |session, path| session.load_models(Some(path)),
        },
        PathCommand {
            name: "-exportTpl",
            help: "Save the texture bank as TPL",
            run: |session, path| session.save_textures(path),
        },
        PathCommand {
            name: "-exportGma",
            help: "Save the model bank as GMA",
            run: |session, path| session.save_models(path),
        },
        PathCommand {
            name: "-importObjMtl",
            help: "Replace both banks with an OBJ file and its materials",
            run: |session, path| session.import_obj_mtl(path),
        },
        PathCommand {
            name: "-exportObjMtl",
            help: "Write the models as OBJ/MTL with PNG textures",
            run: |session, path| session.export_obj_mtl(path),
        },
        PathCommand {
            name: "-exportPng",
            help: "Write every texture level as PNG into a folder",
            run: |session, path| session.export_png(path),
        },
    ] {
        registry.register(command);
    }
}

/// A command whose single argument is a file system path.
pub struct PathCommand {
    name: &'static str,
    help: &'static str,
    run: fn(&mut Session, &Path) -> BankResult<()>,
}

impl Command for PathCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn argument(&self) -> Option<&str> {
        Some("path")
    }

    fn help(&self) -> &str {
        self.help
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, arg: Option<&str>) -> BankResult<Flow> {
        let path = Path::new(required(arg)?);
        log::debug!("{} '{}'", self.name, path.display());
        (self.run)(ctx.session, path)?;
        Ok(Flow::Continue)
    }
}
