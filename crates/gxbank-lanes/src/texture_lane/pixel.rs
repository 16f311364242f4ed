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

//! Conversion between RGBA images and GX texel formats.
//!
//! Every GX format stores texels in tiles ("blocks") laid out left to right, top
//! to bottom; texels inside a block are row major. Partial blocks at the right and
//! bottom edges are padded. Texel data is always big-endian, whatever the byte
//! order of the container that holds it.

use gxbank_core::asset::TextureFormat;
use gxbank_core::{BankError, BankResult};
use image::{Rgba, RgbaImage};

/// Decodes one level of texel data into an RGBA image.
pub fn decode_level(
    format: TextureFormat,
    width: u32,
    height: u32,
    data: &[u8],
) -> BankResult<RgbaImage> {
    let expected = format.level_size(width, height);
    if data.len() < expected {
        return Err(BankError::format(format!(
            "{format:?} level {width}x{height} needs {expected} bytes, found {}",
            data.len()
        )));
    }

    let mut image = RgbaImage::new(width, height);
    match format {
        TextureFormat::Rgba8 => decode_rgba8(&mut image, data),
        TextureFormat::Cmpr => decode_cmpr(&mut image, data),
        _ => {
            let bits = format.bits_per_texel();
            for (ordinal, (x, y)) in block_order(format, width, height).enumerate() {
                let value = read_texel(data, ordinal, bits);
                if x < width && y < height {
                    image.put_pixel(x, y, decode_texel(format, value));
                }
            }
        }
    }
    Ok(image)
}

/// Encodes an RGBA image as one level of texel data.
pub fn encode_level(format: TextureFormat, image: &RgbaImage) -> BankResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(BankError::format("cannot encode an empty image"));
    }

    let mut data = vec![0u8; format.level_size(width, height)];
    match format {
        TextureFormat::Rgba8 => encode_rgba8(image, &mut data),
        TextureFormat::Cmpr => encode_cmpr(image, &mut data),
        _ => {
            let bits = format.bits_per_texel();
            for (ordinal, (x, y)) in block_order(format, width, height).enumerate() {
                let texel = texel_or_clear(image, x, y);
                write_texel(&mut data, ordinal, bits, encode_texel(format, texel));
            }
        }
    }
    Ok(data)
}

/// Texel coordinates in storage order, padding included.
fn block_order(
    format: TextureFormat,
    width: u32,
    height: u32,
) -> impl Iterator<Item = (u32, u32)> {
    let (bw, bh) = format.block_size();
    let blocks_x = width.div_ceil(bw);
    let blocks_y = height.div_ceil(bh);
    (0..blocks_y).flat_map(move |by| {
        (0..blocks_x).flat_map(move |bx| {
            (0..bh).flat_map(move |y| (0..bw).map(move |x| (bx * bw + x, by * bh + y)))
        })
    })
}

fn texel_or_clear(image: &RgbaImage, x: u32, y: u32) -> Rgba<u8> {
    if x < image.width() && y < image.height() {
        *image.get_pixel(x, y)
    } else {
        Rgba([0, 0, 0, 0])
    }
}

fn read_texel(data: &[u8], ordinal: usize, bits: u32) -> u16 {
    match bits {
        4 => {
            let byte = data[ordinal / 2];
            u16::from(if ordinal % 2 == 0 { byte >> 4 } else { byte & 0x0F })
        }
        8 => u16::from(data[ordinal]),
        _ => u16::from_be_bytes([data[ordinal * 2], data[ordinal * 2 + 1]]),
    }
}

fn write_texel(data: &mut [u8], ordinal: usize, bits: u32, value: u16) {
    match bits {
        4 => {
            let nibble = (value & 0x0F) as u8;
            let byte = &mut data[ordinal / 2];
            if ordinal % 2 == 0 {
                *byte = (*byte & 0x0F) | (nibble << 4);
            } else {
                *byte = (*byte & 0xF0) | nibble;
            }
        }
        8 => data[ordinal] = value as u8,
        _ => data[ordinal * 2..ordinal * 2 + 2].copy_from_slice(&value.to_be_bytes()),
    }
}

fn expand4(v: u16) -> u8 {
    (v as u8 & 0x0F) * 17
}

fn expand3(v: u16) -> u8 {
    let v = v as u8 & 0x07;
    (v << 5) | (v << 2) | (v >> 1)
}

fn expand5(v: u16) -> u8 {
    let v = v as u8 & 0x1F;
    (v << 3) | (v >> 2)
}

fn expand6(v: u16) -> u8 {
    let v = v as u8 & 0x3F;
    (v << 2) | (v >> 4)
}

fn intensity(texel: Rgba<u8>) -> u8 {
    let [r, g, b, _] = texel.0;
    ((u32::from(r) * 77 + u32::from(g) * 150 + u32::from(b) * 29) >> 8) as u8
}

fn decode_texel(format: TextureFormat, value: u16) -> Rgba<u8> {
    match format {
        TextureFormat::I4 => {
            let i = expand4(value);
            Rgba([i, i, i, i])
        }
        TextureFormat::I8 => {
            let i = value as u8;
            Rgba([i, i, i, i])
        }
        TextureFormat::Ia4 => {
            let i = expand4(value);
            Rgba([i, i, i, expand4(value >> 4)])
        }
        TextureFormat::Ia8 => {
            let i = (value & 0xFF) as u8;
            Rgba([i, i, i, (value >> 8) as u8])
        }
        TextureFormat::Rgb565 => {
            Rgba([expand5(value >> 11), expand6(value >> 5), expand5(value), 0xFF])
        }
        TextureFormat::Rgb5a3 => decode_rgb5a3(value),
        TextureFormat::Rgba8 | TextureFormat::Cmpr => {
            unreachable!("{format:?} is not stored texel by texel")
        }
    }
}

fn encode_texel(format: TextureFormat, texel: Rgba<u8>) -> u16 {
    let [r, g, b, a] = texel.0;
    match format {
        TextureFormat::I4 => u16::from(intensity(texel) >> 4),
        TextureFormat::I8 => u16::from(intensity(texel)),
        TextureFormat::Ia4 => u16::from((a >> 4) << 4 | intensity(texel) >> 4),
        TextureFormat::Ia8 => u16::from(a) << 8 | u16::from(intensity(texel)),
        TextureFormat::Rgb565 => to_rgb565(r, g, b),
        TextureFormat::Rgb5a3 => {
            if a == 0xFF {
                0x8000 | u16::from(r >> 3) << 10 | u16::from(g >> 3) << 5 | u16::from(b >> 3)
            } else {
                u16::from(a >> 5) << 12
                    | u16::from(r >> 4) << 8
                    | u16::from(g >> 4) << 4
                    | u16::from(b >> 4)
            }
        }
        TextureFormat::Rgba8 | TextureFormat::Cmpr => {
            unreachable!("{format:?} is not stored texel by texel")
        }
    }
}

fn decode_rgb5a3(value: u16) -> Rgba<u8> {
    if value & 0x8000 != 0 {
        Rgba([
            expand5(value >> 10),
            expand5(value >> 5),
            expand5(value),
            0xFF,
        ])
    } else {
        Rgba([
            expand4(value >> 8),
            expand4(value >> 4),
            expand4(value),
            expand3(value >> 12),
        ])
    }
}

fn to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    u16::from(r >> 3) << 11 | u16::from(g >> 2) << 5 | u16::from(b >> 3)
}

fn from_rgb565(value: u16) -> [u8; 3] {
    [expand5(value >> 11), expand6(value >> 5), expand5(value)]
}

// RGBA8 blocks hold 16 AR pairs followed by 16 GB pairs.
fn decode_rgba8(image: &mut RgbaImage, data: &[u8]) {
    let (width, height) = image.dimensions();
    let blocks = (0..height.div_ceil(4)).flat_map(|by| (0..width.div_ceil(4)).map(move |bx| (bx, by)));
    for ((bx, by), block) in blocks.zip(data.chunks_exact(64)) {
        for i in 0..16u32 {
            let (x, y) = (bx * 4 + i % 4, by * 4 + i / 4);
            if x < width && y < height {
                let ar = &block[i as usize * 2..];
                let gb = &block[32 + i as usize * 2..];
                image.put_pixel(x, y, Rgba([ar[1], gb[0], gb[1], ar[0]]));
            }
        }
    }
}

fn encode_rgba8(image: &RgbaImage, data: &mut [u8]) {
    let (width, height) = image.dimensions();
    let blocks = (0..height.div_ceil(4)).flat_map(|by| (0..width.div_ceil(4)).map(move |bx| (bx, by)));
    for ((bx, by), block) in blocks.zip(data.chunks_exact_mut(64)) {
        for i in 0..16u32 {
            let [r, g, b, a] = texel_or_clear(image, bx * 4 + i % 4, by * 4 + i / 4).0;
            let at = i as usize * 2;
            block[at] = a;
            block[at + 1] = r;
            block[32 + at] = g;
            block[32 + at + 1] = b;
        }
    }
}

// CMPR: 8x8 blocks of four DXT1 4x4 sub-blocks, in Z order.
const CMPR_SUB_BLOCKS: [(u32, u32); 4] = [(0, 0), (4, 0), (0, 4), (4, 4)];

fn cmpr_palette(c0: u16, c1: u16) -> [Rgba<u8>; 4] {
    let [r0, g0, b0] = from_rgb565(c0);
    let [r1, g1, b1] = from_rgb565(c1);
    let mix = |a: u8, b: u8, wa: u16, wb: u16| ((u16::from(a) * wa + u16::from(b) * wb) / (wa + wb)) as u8;
    if c0 > c1 {
        [
            Rgba([r0, g0, b0, 0xFF]),
            Rgba([r1, g1, b1, 0xFF]),
            Rgba([mix(r0, r1, 2, 1), mix(g0, g1, 2, 1), mix(b0, b1, 2, 1), 0xFF]),
            Rgba([mix(r0, r1, 1, 2), mix(g0, g1, 1, 2), mix(b0, b1, 1, 2), 0xFF]),
        ]
    } else {
        [
            Rgba([r0, g0, b0, 0xFF]),
            Rgba([r1, g1, b1, 0xFF]),
            Rgba([mix(r0, r1, 1, 1), mix(g0, g1, 1, 1), mix(b0, b1, 1, 1), 0xFF]),
            Rgba([0, 0, 0, 0]),
        ]
    }
}

fn cmpr_sub_blocks(width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    (0..height.div_ceil(8)).flat_map(move |by| {
        (0..width.div_ceil(8)).flat_map(move |bx| {
            CMPR_SUB_BLOCKS
                .iter()
                .map(move |(sx, sy)| (bx * 8 + sx, by * 8 + sy))
        })
    })
}

fn decode_cmpr(image: &mut RgbaImage, data: &[u8]) {
    let (width, height) = image.dimensions();
    for ((ox, oy), sub) in cmpr_sub_blocks(width, height).zip(data.chunks_exact(8)) {
        let c0 = u16::from_be_bytes([sub[0], sub[1]]);
        let c1 = u16::from_be_bytes([sub[2], sub[3]]);
        let palette = cmpr_palette(c0, c1);
        for row in 0..4u32 {
            let bits = sub[4 + row as usize];
            for col in 0..4u32 {
                let index = (bits >> (6 - col * 2)) & 0x03;
                let (x, y) = (ox + col, oy + row);
                if x < width && y < height {
                    image.put_pixel(x, y, palette[index as usize]);
                }
            }
        }
    }
}

fn distance(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    (0..3)
        .map(|c| {
            let d = i32::from(a.0[c]) - i32::from(b.0[c]);
            (d * d) as u32
        })
        .sum()
}

fn encode_cmpr(image: &RgbaImage, data: &mut [u8]) {
    let (width, height) = image.dimensions();
    for ((ox, oy), sub) in cmpr_sub_blocks(width, height).zip(data.chunks_exact_mut(8)) {
        let texels: Vec<(u32, Rgba<u8>)> = (0..16u32)
            .filter_map(|i| {
                let (x, y) = (ox + i % 4, oy + i / 4);
                (x < width && y < height).then(|| (i, *image.get_pixel(x, y)))
            })
            .collect();
        let opaque: Vec<Rgba<u8>> = texels
            .iter()
            .map(|(_, t)| *t)
            .filter(|t| t.0[3] >= 0x80)
            .collect();
        let has_transparency = opaque.len() < texels.len();

        let darkest = opaque.iter().copied().min_by_key(|t| intensity(*t));
        let brightest = opaque.iter().copied().max_by_key(|t| intensity(*t));
        let (mut c0, mut c1) = match (brightest, darkest) {
            (Some(hi), Some(lo)) => (
                to_rgb565(hi.0[0], hi.0[1], hi.0[2]),
                to_rgb565(lo.0[0], lo.0[1], lo.0[2]),
            ),
            _ => (0, 0),
        };
        // c0 <= c1 selects the three-colour mode with a transparent entry.
        if has_transparency == (c0 > c1) {
            std::mem::swap(&mut c0, &mut c1);
        }
        let palette = cmpr_palette(c0, c1);
        let choices = if c0 > c1 { 4 } else { 3 };

        sub[0..2].copy_from_slice(&c0.to_be_bytes());
        sub[2..4].copy_from_slice(&c1.to_be_bytes());
        sub[4..8].fill(0);
        for (i, texel) in texels {
            let index = if texel.0[3] < 0x80 {
                3
            } else {
                (0..choices)
                    .min_by_key(|&p| distance(texel, palette[p]))
                    .unwrap_or(0)
            };
            let row = 4 + (i / 4) as usize;
            sub[row] |= (index as u8) << (6 - (i % 4) * 2);
        }
    }
}
