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

//! The resource session: the two banks plus every piece of state derived from them.
//!
//! The session owns the texture and model banks, the selection tree, the import
//! settings and the texture dirty flag. Any change to a bank publishes a
//! [`CacheEvent`] so that the renderer can drop or rebuild its cached drawables
//! before the next frame.

use crate::selection::SelectionTree;
use gxbank_core::asset::{Material, ModelBank, TextureBank, TextureFormat, TextureSlot};
use gxbank_core::codec::{ContainerCodec, DrawableCache, ImageFileCodec};
use gxbank_core::event::{CacheEvent, EventBus};
use gxbank_core::{BankError, BankResult, EditorSettings, Game, Interpolation};
use gxbank_lanes::container_lane::{GmaCodec, TplCodec};
use gxbank_lanes::model_lane::{format_for_image, ObjExportLane, ObjImportLane};
use gxbank_lanes::texture_lane::{pixel, ImageFileLane, MipChainLane};
use image::RgbaImage;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// The collaborators a session reads and writes files through.
pub struct Codecs {
    /// TPL reader/writer.
    pub textures: Box<dyn ContainerCodec<TextureBank>>,
    /// GMA reader/writer.
    pub models: Box<dyn ContainerCodec<ModelBank>>,
    /// Bitmap file access for PNG export and OBJ/MTL import/export.
    pub images: Box<dyn ImageFileCodec>,
}

impl Default for Codecs {
    fn default() -> Self {
        Self {
            textures: Box::new(TplCodec),
            models: Box::new(GmaCodec),
            images: Box::new(ImageFileLane),
        }
    }
}

/// The editing session for one texture bank and one model bank.
pub struct Session {
    texture_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    textures: Option<TextureBank>,
    models: Option<ModelBank>,
    selection: SelectionTree,
    settings: EditorSettings,
    textures_dirty: bool,
    codecs: Codecs,
    events: EventBus<CacheEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl Session {
    /// Creates an empty session using the built-in codecs.
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_codecs(settings, Codecs::default())
    }

    /// Creates an empty session using custom codecs.
    pub fn with_codecs(settings: EditorSettings, codecs: Codecs) -> Self {
        Self {
            texture_path: None,
            model_path: None,
            textures: None,
            models: None,
            selection: SelectionTree::default(),
            settings,
            textures_dirty: false,
            codecs,
            events: EventBus::new(),
        }
    }

    /// The loaded texture bank, if any.
    pub fn textures(&self) -> Option<&TextureBank> {
        self.textures.as_ref()
    }

    /// The loaded model bank, if any.
    pub fn models(&self) -> Option<&ModelBank> {
        self.models.as_ref()
    }

    /// Path the texture bank was last loaded from or saved to.
    pub fn texture_path(&self) -> Option<&Path> {
        self.texture_path.as_deref()
    }

    /// Path the model bank was last loaded from or saved to.
    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectionTree {
        &self.selection
    }

    /// Mutable access to the selection, for the viewer's check boxes.
    pub fn selection_mut(&mut self) -> &mut SelectionTree {
        &mut self.selection
    }

    /// Current settings.
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Whether the texture bank has unsaved in-memory changes.
    pub fn textures_dirty(&self) -> bool {
        self.textures_dirty
    }

    /// The cache invalidation events not yet applied to a renderer.
    pub fn events(&self) -> &EventBus<CacheEvent> {
        &self.events
    }

    // --- Banks ---

    /// Replaces the texture bank with the contents of `path`, or unloads it.
    ///
    /// The previous bank is discarded before reading, so a failed load leaves no
    /// texture bank at all.
    pub fn load_textures(&mut self, path: Option<&Path>) -> BankResult<()> {
        self.textures = None;
        self.texture_path = None;
        self.textures_dirty = false;
        self.events.publish(CacheEvent::TexturesReplaced);

        let Some(path) = path else {
            log::info!("Texture bank unloaded");
            return Ok(());
        };
        let bank = self.decode_file(path, self.codecs.textures.as_ref())?;
        log::info!(
            "Loaded {} texture slot(s) from '{}' ({})",
            bank.len(),
            path.display(),
            self.settings.game
        );
        self.textures = Some(bank);
        self.texture_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Writes the texture bank to `path`.
    pub fn save_textures(&mut self, path: &Path) -> BankResult<()> {
        let bank = self
            .textures
            .as_ref()
            .ok_or_else(|| BankError::not_found("No texture bank is loaded"))?;
        let mut bytes = Vec::new();
        self.codecs
            .textures
            .encode(bank, self.settings.game, &mut bytes)?;
        write_file(path, &bytes)?;

        log::info!("Saved {} texture slot(s) to '{}'", bank.len(), path.display());
        self.textures_dirty = false;
        self.texture_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Replaces the model bank with the contents of `path`, or unloads it, and
    /// rebuilds the selection tree from scratch.
    pub fn load_models(&mut self, path: Option<&Path>) -> BankResult<()> {
        self.models = None;
        self.model_path = None;
        self.selection = SelectionTree::default();
        self.events.publish(CacheEvent::ModelsReplaced);

        let Some(path) = path else {
            log::info!("Model bank unloaded");
            return Ok(());
        };
        let bank = self.decode_file(path, self.codecs.models.as_ref())?;
        log::info!(
            "Loaded {} model slot(s) from '{}' ({})",
            bank.len(),
            path.display(),
            self.settings.game
        );
        self.selection = SelectionTree::build(Some(&bank));
        self.models = Some(bank);
        self.model_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Writes the model bank to `path`.
    pub fn save_models(&mut self, path: &Path) -> BankResult<()> {
        let bank = self
            .models
            .as_ref()
            .ok_or_else(|| BankError::not_found("No model bank is loaded"))?;
        let mut bytes = Vec::new();
        self.codecs.models.encode(bank, self.settings.game, &mut bytes)?;
        write_file(path, &bytes)?;

        log::info!("Saved {} model slot(s) to '{}'", bank.len(), path.display());
        self.model_path = Some(path.to_path_buf());
        Ok(())
    }

    fn decode_file<B>(&self, path: &Path, codec: &dyn ContainerCodec<B>) -> BankResult<B> {
        let file = File::open(path)
            .map_err(|e| BankError::io(format!("opening '{}'", path.display()), e))?;
        codec.decode(&mut BufReader::new(file), self.settings.game)
    }

    // --- Texture editing ---

    /// Replaces a whole texture with a mip chain generated from `image`.
    pub fn replace_whole_texture(
        &mut self,
        index: usize,
        format: TextureFormat,
        image: &RgbaImage,
    ) -> BankResult<()> {
        let lane = MipChainLane::from_settings(&self.settings);
        let bank = self.textures_mut()?;
        bank.slot(index)?;
        let slot = lane.generate(image, format)?;
        bank.replace_slot(index, slot)?;
        self.mark_texture_changed(index);
        Ok(())
    }

    /// Replaces one level of a texture. `image` must have the level's exact size.
    pub fn replace_texture_level(
        &mut self,
        index: usize,
        level: usize,
        image: &RgbaImage,
    ) -> BankResult<()> {
        let bank = self.textures_mut()?;
        let slot = bank.slot(index)?;
        let target = slot.levels().get(level).ok_or(BankError::OutOfRange {
            what: "mip level",
            index: level,
            len: slot.levels().len(),
        })?;
        let (width, height) = image.dimensions();
        if (width, height) != (target.width, target.height) {
            return Err(BankError::SizeMismatch {
                level,
                expected_width: target.width,
                expected_height: target.height,
                actual_width: width,
                actual_height: height,
            });
        }
        let data = pixel::encode_level(slot.format, image)?;
        bank.write_level(index, level, data)?;
        self.mark_texture_changed(index);
        Ok(())
    }

    /// Loads an image file and replaces a texture, or one of its levels, with it.
    ///
    /// A whole replacement keeps the slot's format; an empty slot gets the
    /// format an imported texture would.
    pub fn replace_texture_from_file(
        &mut self,
        index: usize,
        level: Option<usize>,
        path: &Path,
    ) -> BankResult<()> {
        let image = self.codecs.images.load_image(path)?;
        match level {
            Some(level) => self.replace_texture_level(index, level, &image),
            None => {
                let slot = self.textures_mut()?.slot(index)?;
                let format = if slot.is_empty() {
                    format_for_image(&image)
                } else {
                    slot.format
                };
                self.replace_whole_texture(index, format, &image)
            }
        }
    }

    /// Regenerates every non-empty texture from its level 0, keeping at most
    /// `mipmap_count + 1` levels. Either every texture is regenerated or none is.
    pub fn set_all_mipmaps(&mut self, mipmap_count: u32) -> BankResult<()> {
        let lane = MipChainLane {
            filter: self.settings.interpolation,
            level_cap: Some(mipmap_count.saturating_add(1)),
        };
        let bank = self.textures_mut()?;

        let mut regenerated = Vec::new();
        for (index, slot) in bank.slots().iter().enumerate() {
            let Some(top) = slot.levels().first() else {
                continue;
            };
            let image = pixel::decode_level(slot.format, top.width, top.height, &top.data)?;
            regenerated.push((index, lane.generate(&image, slot.format)?));
        }
        let mut changed = Vec::with_capacity(regenerated.len());
        for (index, slot) in regenerated {
            bank.replace_slot(index, slot)?;
            changed.push(index);
        }
        for index in changed {
            self.mark_texture_changed(index);
        }
        Ok(())
    }

    /// Resolves a material's texture. Out-of-range indices, empty slots and a
    /// missing texture bank all mean "no texture".
    pub fn texture_for_material(&self, material: &Material) -> Option<&TextureSlot> {
        self.textures.as_ref()?.resolve(material.texture_index)
    }

    fn textures_mut(&mut self) -> BankResult<&mut TextureBank> {
        self.textures
            .as_mut()
            .ok_or_else(|| BankError::not_found("No texture bank is loaded"))
    }

    fn mark_texture_changed(&mut self, index: usize) {
        self.textures_dirty = true;
        self.events.publish(CacheEvent::TextureChanged(index));
    }

    // --- Settings ---

    /// Selects the game whose layout subsequent loads and saves use.
    pub fn set_selected_game(&mut self, game: Game) {
        self.settings.game = game;
    }

    /// Sets how many mip-maps below level 0 imports generate.
    pub fn set_mipmap_count(&mut self, mipmap_count: u32) {
        self.settings.mipmap_count = Some(mipmap_count);
    }

    /// Sets the resampling filter for generated levels.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.settings.interpolation = interpolation;
    }

    // --- Interchange ---

    /// Writes every level of every non-empty texture as
    /// `tex_<index>_mip_<level>.png` into `folder`, creating it when missing.
    pub fn export_png(&self, folder: &Path) -> BankResult<()> {
        let bank = self
            .textures
            .as_ref()
            .ok_or_else(|| BankError::not_found("No texture bank is loaded"))?;
        fs::create_dir_all(folder)
            .map_err(|e| BankError::io(format!("creating '{}'", folder.display()), e))?;

        let mut written = 0;
        for (index, slot) in bank.slots().iter().enumerate() {
            for (level, mip) in slot.levels().iter().enumerate() {
                let image = pixel::decode_level(slot.format, mip.width, mip.height, &mip.data)?;
                let path = folder.join(format!("tex_{index:03}_mip_{level}.png"));
                self.codecs.images.save_image(&image, &path)?;
                written += 1;
            }
        }
        log::info!("Exported {written} PNG file(s) to '{}'", folder.display());
        Ok(())
    }

    /// Replaces both banks with the contents of an OBJ file and its material
    /// library. The new texture bank exists only in memory and is dirty.
    pub fn import_obj_mtl(&mut self, path: &Path) -> BankResult<()> {
        let import = ObjImportLane::new(
            self.codecs.images.as_ref(),
            MipChainLane::from_settings(&self.settings),
        )
        .import(path)?;

        self.selection = SelectionTree::build(Some(&import.models));
        self.textures = Some(import.textures);
        self.models = Some(import.models);
        self.texture_path = None;
        self.model_path = None;
        self.textures_dirty = true;
        self.events.publish(CacheEvent::TexturesReplaced);
        self.events.publish(CacheEvent::ModelsReplaced);
        Ok(())
    }

    /// Writes the model bank, its materials and their textures as OBJ/MTL/PNG.
    pub fn export_obj_mtl(&self, path: &Path) -> BankResult<()> {
        let models = self
            .models
            .as_ref()
            .ok_or_else(|| BankError::not_found("No model bank is loaded"))?;
        ObjExportLane::new(self.codecs.images.as_ref()).export(
            models,
            self.textures.as_ref(),
            path,
        )
    }

    // --- Renderer ---

    /// Applies every pending cache event to `cache`, returning how many there were.
    pub fn sync_cache(&self, cache: &mut dyn DrawableCache) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for event in events {
            log::debug!("Applying {event:?}");
            event.apply(cache);
        }
        count
    }

    /// Drops every pending cache event. Used when no renderer is attached.
    pub fn discard_cache_events(&self) -> usize {
        let count = self.events.drain().len();
        if count > 0 {
            log::trace!("Discarded {count} cache event(s)");
        }
        count
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> BankResult<()> {
    fs::write(path, bytes).map_err(|e| BankError::io(format!("writing '{}'", path.display()), e))
}
