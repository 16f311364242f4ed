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

//! The bank data model shared by the session, the codecs and the renderer.
//!
//! Banks are plain, index-stable containers. They know nothing about how they
//! are loaded or drawn; the container codecs in `gxbank-lanes` fill them and the
//! session in `gxbank-session` keeps everything derived from them consistent.

mod model;
mod texture;

pub use model::*;
pub use texture::*;

/// Which of the two banks an event or cache operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankKind {
    /// The texture bank (TPL).
    Texture,
    /// The model bank (GMA).
    Model,
}
