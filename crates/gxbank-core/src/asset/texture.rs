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

//! Texture banks, their slots and the GX texel formats they are stored in.

use crate::error::{BankError, BankResult};

/// A GameCube GX texel format, identified by its hardware id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 4-bit intensity.
    I4,
    /// 8-bit intensity.
    I8,
    /// 4-bit intensity with 4-bit alpha.
    Ia4,
    /// 8-bit intensity with 8-bit alpha.
    Ia8,
    /// 16-bit RGB, 5/6/5 bits.
    Rgb565,
    /// 16-bit RGB555 or ARGB3444, selected per texel by the top bit.
    Rgb5a3,
    /// 32-bit RGBA, split into AR and GB passes per block.
    Rgba8,
    /// S3TC/DXT1 compression arranged in 8x8 super-blocks.
    Cmpr,
}

impl TextureFormat {
    /// Every format, in id order.
    pub const ALL: [TextureFormat; 8] = [
        TextureFormat::I4,
        TextureFormat::I8,
        TextureFormat::Ia4,
        TextureFormat::Ia8,
        TextureFormat::Rgb565,
        TextureFormat::Rgb5a3,
        TextureFormat::Rgba8,
        TextureFormat::Cmpr,
    ];

    /// The GX hardware id stored in containers.
    pub const fn id(self) -> u32 {
        match self {
            TextureFormat::I4 => 0x0,
            TextureFormat::I8 => 0x1,
            TextureFormat::Ia4 => 0x2,
            TextureFormat::Ia8 => 0x3,
            TextureFormat::Rgb565 => 0x4,
            TextureFormat::Rgb5a3 => 0x5,
            TextureFormat::Rgba8 => 0x6,
            TextureFormat::Cmpr => 0xE,
        }
    }

    /// Looks a format up by its GX id.
    pub fn from_id(id: u32) -> BankResult<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.id() == id)
            .ok_or_else(|| BankError::format(format!("unknown texture format 0x{id:X}")))
    }

    /// Width and height, in texels, of one storage block.
    pub const fn block_size(self) -> (u32, u32) {
        match self {
            TextureFormat::I4 | TextureFormat::Cmpr => (8, 8),
            TextureFormat::I8 | TextureFormat::Ia4 => (8, 4),
            TextureFormat::Ia8
            | TextureFormat::Rgb565
            | TextureFormat::Rgb5a3
            | TextureFormat::Rgba8 => (4, 4),
        }
    }

    /// Storage cost of one texel, in bits.
    pub const fn bits_per_texel(self) -> u32 {
        match self {
            TextureFormat::I4 | TextureFormat::Cmpr => 4,
            TextureFormat::I8 | TextureFormat::Ia4 => 8,
            TextureFormat::Ia8 | TextureFormat::Rgb565 | TextureFormat::Rgb5a3 => 16,
            TextureFormat::Rgba8 => 32,
        }
    }

    /// Number of bytes a `width` x `height` level occupies, padded to whole blocks.
    pub fn level_size(self, width: u32, height: u32) -> usize {
        let (bw, bh) = self.block_size();
        let blocks_x = width.div_ceil(bw) as usize;
        let blocks_y = height.div_ceil(bh) as usize;
        blocks_x * blocks_y * (bw * bh * self.bits_per_texel() / 8) as usize
    }
}

/// One resolution tier of a texture, with texels encoded in the slot's format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Encoded texel data, `format.level_size(width, height)` bytes long.
    pub data: Vec<u8>,
}

/// One texture of a bank.
///
/// A slot with no levels is empty; containers keep empty slots so that material
/// texture indices stay valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    /// Texel format of every level.
    pub format: TextureFormat,
    levels: Vec<MipLevel>,
}

impl TextureSlot {
    /// Creates an empty slot.
    pub fn empty() -> Self {
        Self {
            format: TextureFormat::I4,
            levels: Vec::new(),
        }
    }

    /// Creates a slot from levels ordered from full resolution downward.
    pub fn new(format: TextureFormat, levels: Vec<MipLevel>) -> Self {
        debug_assert!(
            levels
                .windows(2)
                .all(|pair| pair[1].width <= pair[0].width && pair[1].height <= pair[0].height),
            "mip levels must be ordered by decreasing size"
        );
        Self { format, levels }
    }

    /// Whether this slot holds no texture.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The mip levels, level 0 first.
    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    /// Replaces the texel data of one level. The caller guarantees the size.
    pub(crate) fn level_mut(&mut self, level: usize) -> Option<&mut MipLevel> {
        self.levels.get_mut(level)
    }
}

/// An index-stable, fixed-length collection of textures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureBank {
    slots: Vec<TextureSlot>,
}

impl TextureBank {
    /// Creates a bank from its slots. The length is fixed from here on.
    pub fn from_slots(slots: Vec<TextureSlot>) -> Self {
        Self { slots }
    }

    /// Number of slots, empty ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the bank has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slots, in index order.
    pub fn slots(&self) -> &[TextureSlot] {
        &self.slots
    }

    /// Returns the slot at `index`, or an `OutOfRange` error.
    pub fn slot(&self, index: usize) -> BankResult<&TextureSlot> {
        self.slots.get(index).ok_or(BankError::OutOfRange {
            what: "texture",
            index,
            len: self.slots.len(),
        })
    }

    /// Swaps in a new slot at `index`, returning the old one.
    pub fn replace_slot(&mut self, index: usize, slot: TextureSlot) -> BankResult<TextureSlot> {
        let len = self.slots.len();
        let current = self.slots.get_mut(index).ok_or(BankError::OutOfRange {
            what: "texture",
            index,
            len,
        })?;
        Ok(std::mem::replace(current, slot))
    }

    /// Overwrites the texel data of one existing level.
    ///
    /// Fails without touching the bank if the index or level is out of range or if
    /// `data` does not have the level's encoded size.
    pub fn write_level(&mut self, index: usize, level: usize, data: Vec<u8>) -> BankResult<()> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or(BankError::OutOfRange {
            what: "texture",
            index,
            len,
        })?;
        let format = slot.format;
        let level_count = slot.levels().len();
        let target = slot.level_mut(level).ok_or(BankError::OutOfRange {
            what: "mip level",
            index: level,
            len: level_count,
        })?;
        let expected = format.level_size(target.width, target.height);
        if data.len() != expected {
            return Err(BankError::format(format!(
                "encoded level is {} bytes, expected {expected}",
                data.len()
            )));
        }
        target.data = data;
        Ok(())
    }

    /// Resolves a material's soft texture reference.
    ///
    /// Out-of-range indices and empty slots both mean "no texture".
    pub fn resolve(&self, texture_index: u16) -> Option<&TextureSlot> {
        self.slots
            .get(usize::from(texture_index))
            .filter(|slot| !slot.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn level(format: TextureFormat, width: u32, height: u32) -> MipLevel {
        MipLevel {
            width,
            height,
            data: vec![0; format.level_size(width, height)],
        }
    }

    #[test]
    fn level_size_pads_to_whole_blocks() {
        assert_eq!(TextureFormat::Rgba8.level_size(4, 4), 64);
        assert_eq!(TextureFormat::Cmpr.level_size(8, 8), 32);
        assert_eq!(TextureFormat::Cmpr.level_size(1, 1), 32);
        assert_eq!(TextureFormat::I8.level_size(9, 4), 64);
        assert_eq!(TextureFormat::Rgb5a3.level_size(256, 256), 256 * 256 * 2);
    }

    #[test]
    fn format_ids_round_trip() {
        for format in TextureFormat::ALL {
            assert_eq!(TextureFormat::from_id(format.id()).unwrap(), format);
        }
        assert_eq!(
            TextureFormat::from_id(0x7).unwrap_err().kind(),
            ErrorKind::FormatError
        );
    }

    #[test]
    fn resolve_treats_out_of_range_and_empty_as_no_texture() {
        let bank = TextureBank::from_slots(vec![
            TextureSlot::new(TextureFormat::I8, vec![level(TextureFormat::I8, 8, 4)]),
            TextureSlot::empty(),
        ]);
        assert!(bank.resolve(0).is_some());
        assert!(bank.resolve(1).is_none());
        assert!(bank.resolve(2).is_none());
        assert!(bank.resolve(u16::MAX).is_none());
    }

    #[test]
    fn write_level_rejects_bad_targets_without_mutation() {
        let mut bank = TextureBank::from_slots(vec![TextureSlot::new(
            TextureFormat::I8,
            vec![level(TextureFormat::I8, 8, 8), level(TextureFormat::I8, 4, 4)],
        )]);
        let before = bank.clone();

        let err = bank.write_level(1, 0, vec![0; 64]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = bank.write_level(0, 2, vec![0; 64]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = bank.write_level(0, 0, vec![0; 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
        assert_eq!(bank, before);

        bank.write_level(0, 1, vec![7; 32]).unwrap();
        assert_eq!(bank.slot(0).unwrap().levels()[1].data, vec![7; 32]);
    }
}
