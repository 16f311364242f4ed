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

//! Byte-order aware cursors over container bytes.

use gxbank_core::{BankError, BankResult, ByteOrder};

/// A bounds-checked reader over a byte slice.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            pos: 0,
            order,
        }
    }

    /// A reader over the same bytes, positioned at `pos`.
    pub(crate) fn at(&self, pos: usize) -> BankResult<Self> {
        if pos > self.data.len() {
            return Err(BankError::format(format!(
                "offset 0x{pos:X} lies past the end of the data (0x{:X} bytes)",
                self.data.len()
            )));
        }
        Ok(Self {
            data: self.data,
            pos,
            order: self.order,
        })
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn skip(&mut self, count: usize) -> BankResult<()> {
        self.bytes(count).map(|_| ())
    }

    pub(crate) fn bytes(&mut self, count: usize) -> BankResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                BankError::format(format!(
                    "unexpected end of data reading {count} bytes at 0x{:X}",
                    self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> BankResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> BankResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub(crate) fn u16(&mut self) -> BankResult<u16> {
        let raw = self.array::<2>()?;
        Ok(match self.order {
            ByteOrder::Big => u16::from_be_bytes(raw),
            ByteOrder::Little => u16::from_le_bytes(raw),
        })
    }

    pub(crate) fn u32(&mut self) -> BankResult<u32> {
        let raw = self.array::<4>()?;
        Ok(match self.order {
            ByteOrder::Big => u32::from_be_bytes(raw),
            ByteOrder::Little => u32::from_le_bytes(raw),
        })
    }

    pub(crate) fn f32(&mut self) -> BankResult<f32> {
        self.u32().map(f32::from_bits)
    }

    /// Reads a NUL-terminated string, lossily decoded.
    pub(crate) fn c_string(&mut self) -> BankResult<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| BankError::format("unterminated name in name table"))?;
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }
}

/// A growable output buffer with patchable fields.
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl ByteWriter {
    pub(crate) fn new(order: ByteOrder) -> Self {
        Self {
            buf: Vec::new(),
            order,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub(crate) fn u16(&mut self, value: u16) {
        match self.order {
            ByteOrder::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub(crate) fn u32(&mut self, value: u32) {
        match self.order {
            ByteOrder::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub(crate) fn f32(&mut self, value: f32) {
        self.u32(value.to_bits());
    }

    pub(crate) fn bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Zero-pads up to `position`, which must not lie behind the cursor.
    pub(crate) fn pad_to(&mut self, position: usize) {
        debug_assert!(position >= self.buf.len());
        self.buf.resize(position.max(self.buf.len()), 0);
    }

    /// Zero-pads to the next multiple of `alignment`.
    pub(crate) fn align(&mut self, alignment: usize) {
        let aligned = self.buf.len().next_multiple_of(alignment);
        self.buf.resize(aligned, 0);
    }

    /// Overwrites a previously written u32.
    pub(crate) fn patch_u32(&mut self, at: usize, value: u32) {
        let raw = match self.order {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
        self.buf[at..at + 4].copy_from_slice(&raw);
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Converts a buffer position into a 32-bit container offset.
pub(crate) fn offset_u32(position: usize) -> BankResult<u32> {
    u32::try_from(position)
        .map_err(|_| BankError::format("container exceeds the 4 GiB offset range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gxbank_core::ErrorKind;

    #[test]
    fn reader_honours_byte_order() {
        let data = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(ByteReader::new(&data, ByteOrder::Big).u32().unwrap(), 0x1234_5678);
        assert_eq!(
            ByteReader::new(&data, ByteOrder::Little).u32().unwrap(),
            0x7856_3412
        );
    }

    #[test]
    fn reader_reports_truncation_as_format_error() {
        let data = [0u8; 3];
        let err = ByteReader::new(&data, ByteOrder::Big).u32().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
        assert!(ByteReader::new(&data, ByteOrder::Big).at(4).is_err());
    }

    #[test]
    fn writer_patches_and_aligns() {
        let mut w = ByteWriter::new(ByteOrder::Little);
        w.u32(0);
        w.u16(0xBEEF);
        w.align(8);
        w.patch_u32(0, 0xAABB_CCDD);
        assert_eq!(
            w.into_inner(),
            vec![0xDD, 0xCC, 0xBB, 0xAA, 0xEF, 0xBE, 0, 0]
        );
    }

    #[test]
    fn c_string_stops_at_nul() {
        let data = b"stage\0other\0";
        let mut r = ByteReader::new(data, ByteOrder::Big);
        assert_eq!(r.c_string().unwrap(), "stage");
        assert_eq!(r.c_string().unwrap(), "other");
        assert!(r.c_string().is_err());
    }
}
