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

//! Lanes that read and write the binary bank containers.

mod binary;
mod gma;
mod tpl;

pub use gma::GmaCodec;
pub use tpl::TplCodec;

use gxbank_core::{BankError, BankResult};
use std::io::Read;

/// Reads a whole container stream into memory.
fn read_all(reader: &mut dyn Read, what: &str) -> BankResult<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| BankError::io(format!("reading {what} data"), e))?;
    Ok(bytes)
}
