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

//! Contracts for the collaborators the session drives but does not own.
//!
//! Following the layered design, this module defines the 'what': container codecs,
//! image file access and the renderer's drawable cache. The 'how' lives in
//! `gxbank-lanes` (codecs) and in whatever renderer embeds the session.

use crate::asset::BankKind;
use crate::error::BankResult;
use crate::settings::Game;
use image::RgbaImage;
use std::io::{Read, Write};
use std::path::Path;

/// Parses and serializes one kind of bank container.
///
/// `game` selects the layout variant (byte order and similar details).
pub trait ContainerCodec<B>: Send + Sync {
    /// Decodes a whole bank from `reader`.
    fn decode(&self, reader: &mut dyn Read, game: Game) -> BankResult<B>;

    /// Encodes `bank` into `writer`.
    fn encode(&self, bank: &B, game: Game, writer: &mut dyn Write) -> BankResult<()>;
}

/// Loads and saves bitmap files.
pub trait ImageFileCodec: Send + Sync {
    /// Loads an image file, converted to 8-bit RGBA.
    fn load_image(&self, path: &Path) -> BankResult<RgbaImage>;

    /// Saves an image; the file type follows the path's extension.
    fn save_image(&self, image: &RgbaImage, path: &Path) -> BankResult<()>;
}

/// The renderer-side cache of compiled drawables.
///
/// The session never calls this directly; it publishes
/// [`CacheEvent`](crate::event::CacheEvent)s and the owner of the cache applies
/// them before drawing the next frame.
pub trait DrawableCache {
    /// Recompiles the drawable for one bank entry.
    fn rebuild_drawable(&mut self, kind: BankKind, index: usize);

    /// Drops every cached drawable of one bank.
    fn invalidate_drawable_cache(&mut self, kind: BankKind);
}
