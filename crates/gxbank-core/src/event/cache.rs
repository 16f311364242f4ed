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

use crate::asset::BankKind;
use crate::codec::DrawableCache;

/// A notification that cached renderer handles are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    /// The texture bank was replaced or unloaded; every texture handle is stale.
    TexturesReplaced,
    /// The model bank was replaced or unloaded; every model drawable is stale.
    ModelsReplaced,
    /// The texels of one texture changed.
    TextureChanged(usize),
}

impl CacheEvent {
    /// Applies this event to a drawable cache.
    pub fn apply(self, cache: &mut dyn DrawableCache) {
        match self {
            CacheEvent::TexturesReplaced => cache.invalidate_drawable_cache(BankKind::Texture),
            CacheEvent::ModelsReplaced => cache.invalidate_drawable_cache(BankKind::Model),
            CacheEvent::TextureChanged(index) => {
                cache.rebuild_drawable(BankKind::Texture, index)
            }
        }
    }
}
