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

//! The TPL texture bank container.
//!
//! Layout: a `u32` texture count, then one 16-byte entry per texture
//! (`u32` format id, `u32` data offset, `u16` width, `u16` height, `u16` level
//! count, `u16` 0x1234). Empty slots are all-zero entries. Each texture's levels
//! follow each other at its data offset, which is 32-byte aligned. Header fields
//! use the game's byte order; texel data is always big-endian.

use super::binary::{offset_u32, ByteReader, ByteWriter};
use super::read_all;
use gxbank_core::asset::{MipLevel, TextureBank, TextureFormat, TextureSlot};
use gxbank_core::codec::ContainerCodec;
use gxbank_core::{BankError, BankResult, Game};
use std::io::{Read, Write};

const ENTRY_SIZE: usize = 16;
const ENTRY_MARKER: u16 = 0x1234;
const DATA_ALIGNMENT: usize = 32;

/// Reads and writes TPL texture banks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TplCodec;

impl ContainerCodec<TextureBank> for TplCodec {
    fn decode(&self, reader: &mut dyn Read, game: Game) -> BankResult<TextureBank> {
        let data = read_all(reader, "TPL")?;
        let mut r = ByteReader::new(&data, game.byte_order());

        let count = r.u32()? as usize;
        let table_end = count
            .checked_mul(ENTRY_SIZE)
            .and_then(|size| size.checked_add(4))
            .filter(|end| *end <= r.len())
            .ok_or_else(|| {
                BankError::format(format!("TPL declares {count} textures but is too short"))
            })?;
        log::debug!("TPL header: {count} entries, table ends at 0x{table_end:X}");

        let mut slots = Vec::with_capacity(count);
        for index in 0..count {
            let format_id = r.u32()?;
            let offset = r.u32()? as usize;
            let width = u32::from(r.u16()?);
            let height = u32::from(r.u16()?);
            let level_count = r.u16()?;
            let _marker = r.u16()?;

            if width == 0 || height == 0 || level_count == 0 {
                slots.push(TextureSlot::empty());
                continue;
            }

            let format = TextureFormat::from_id(format_id)?;
            let max_levels = 32 - width.max(height).leading_zeros();
            if u32::from(level_count) > max_levels {
                return Err(BankError::format(format!(
                    "texture {index} is {width}x{height} but declares {level_count} mip levels"
                )));
            }
            let mut levels_reader = r.at(offset)?;
            let mut levels = Vec::with_capacity(usize::from(level_count));
            for level in 0..u32::from(level_count) {
                let (w, h) = ((width >> level).max(1), (height >> level).max(1));
                let bytes = levels_reader.bytes(format.level_size(w, h)).map_err(|e| {
                    BankError::format(format!("texture {index} level {level}: {e}"))
                })?;
                levels.push(MipLevel {
                    width: w,
                    height: h,
                    data: bytes.to_vec(),
                });
            }
            slots.push(TextureSlot::new(format, levels));
        }
        Ok(TextureBank::from_slots(slots))
    }

    fn encode(&self, bank: &TextureBank, game: Game, writer: &mut dyn Write) -> BankResult<()> {
        let mut w = ByteWriter::new(game.byte_order());
        w.u32(offset_u32(bank.len())?);

        for slot in bank.slots() {
            match slot.levels().first() {
                None => w.pad_to(w.position() + ENTRY_SIZE),
                Some(top) => {
                    w.u32(slot.format.id());
                    w.u32(0);
                    w.u16(dimension_u16(top.width)?);
                    w.u16(dimension_u16(top.height)?);
                    w.u16(u16::try_from(slot.levels().len()).map_err(|_| {
                        BankError::format("texture has more mip levels than TPL can store")
                    })?);
                    w.u16(ENTRY_MARKER);
                }
            }
        }

        for (index, slot) in bank.slots().iter().enumerate() {
            if slot.is_empty() {
                continue;
            }
            w.align(DATA_ALIGNMENT);
            let offset = offset_u32(w.position())?;
            w.patch_u32(4 + index * ENTRY_SIZE + 4, offset);
            for level in slot.levels() {
                w.bytes(&level.data);
            }
        }
        w.align(DATA_ALIGNMENT);

        writer
            .write_all(&w.into_inner())
            .map_err(|e| BankError::io("writing TPL data", e))
    }
}

fn dimension_u16(value: u32) -> BankResult<u16> {
    u16::try_from(value)
        .map_err(|_| BankError::format(format!("texture dimension {value} exceeds 65535")))
}
