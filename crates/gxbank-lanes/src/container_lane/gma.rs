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

//! The GMA model bank container.
//!
//! A GMA starts with a `u32` model count and a `u32` model base offset, followed by
//! one 8-byte entry per model: the model's offset relative to the base (or
//! `0xFFFFFFFF` for an absent model) and its name's offset into the name table.
//! The NUL-terminated name table follows the entries. Each model is a `GCMF`
//! block: a 0x40-byte header, 0x20-byte materials, 0x30-byte transform matrices,
//! then the meshes, each a 0x60-byte header followed by its display list.

use super::binary::{offset_u32, ByteReader, ByteWriter};
use super::read_all;
use gxbank_core::asset::{
    Material, Mesh, MeshGeometry, MeshLayer, Model, ModelBank, Primitive, PrimitiveKind,
    RenderFlags, TransformMatrix, Vertex,
};
use gxbank_core::codec::ContainerCodec;
use gxbank_core::{BankError, BankResult, Game};
use std::io::{Read, Write};

const ABSENT_MODEL: u32 = 0xFFFF_FFFF;
const GCMF_MAGIC: &[u8; 4] = b"GCMF";
const GCMF_HEADER_SIZE: usize = 0x40;
const MATERIAL_SIZE: usize = 0x20;
const MATRIX_SIZE: usize = 0x30;
const MESH_HEADER_SIZE: usize = 0x60;
const NO_MATERIAL: u16 = 0xFFFF;
const NO_TRANSFORM: u8 = 0xFF;
const OP_TRIANGLES: u8 = 0x90;
const OP_TRIANGLE_STRIP: u8 = 0x98;
const ALIGNMENT: usize = 32;

/// Reads and writes GMA model banks.
#[derive(Debug, Clone, Copy, Default)]
pub struct GmaCodec;

impl ContainerCodec<ModelBank> for GmaCodec {
    fn decode(&self, reader: &mut dyn Read, game: Game) -> BankResult<ModelBank> {
        let data = read_all(reader, "GMA")?;
        let mut r = ByteReader::new(&data, game.byte_order());

        let count = r.u32()? as usize;
        let base = r.u32()? as usize;
        let name_table = count
            .checked_mul(8)
            .and_then(|size| size.checked_add(8))
            .filter(|end| *end <= r.len() && *end <= base)
            .ok_or_else(|| {
                BankError::format(format!("GMA declares {count} models but is too short"))
            })?;

        let mut slots = Vec::with_capacity(count);
        for index in 0..count {
            let model_offset = r.u32()?;
            let name_offset = r.u32()? as usize;
            if model_offset == ABSENT_MODEL {
                slots.push(None);
                continue;
            }

            let name = r.at(name_table + name_offset)?.c_string()?;
            let parsed = base
                .checked_add(model_offset as usize)
                .ok_or_else(|| BankError::format("model offset overflows"))
                .and_then(|start| read_model(&r, start, name.clone()));
            match parsed {
                Ok(model) => slots.push(Some(model)),
                Err(e) => {
                    log::warn!("Skipping GMA model {index} ('{name}'): {e}");
                    slots.push(None);
                }
            }
        }
        log::debug!(
            "GMA decoded: {} of {count} models present",
            slots.iter().flatten().count()
        );
        Ok(ModelBank::from_slots(slots))
    }

    fn encode(&self, bank: &ModelBank, game: Game, writer: &mut dyn Write) -> BankResult<()> {
        let mut w = ByteWriter::new(game.byte_order());
        w.u32(offset_u32(bank.len())?);
        w.u32(0);

        let mut names = Vec::new();
        for slot in bank.slots() {
            match slot {
                Some(model) => {
                    w.u32(0);
                    w.u32(offset_u32(names.len())?);
                    names.extend_from_slice(model.name.as_bytes());
                    names.push(0);
                }
                None => {
                    w.u32(ABSENT_MODEL);
                    w.u32(0);
                }
            }
        }
        w.bytes(&names);
        w.align(ALIGNMENT);
        let base = w.position();
        w.patch_u32(4, offset_u32(base)?);

        for (index, model) in bank.present() {
            w.align(ALIGNMENT);
            w.patch_u32(8 + index * 8, offset_u32(w.position() - base)?);
            write_model(&mut w, model)?;
        }
        w.align(ALIGNMENT);

        writer
            .write_all(&w.into_inner())
            .map_err(|e| BankError::io("writing GMA data", e))
    }
}

fn read_model(data: &ByteReader<'_>, start: usize, name: String) -> BankResult<Model> {
    let mut r = data.at(start)?;
    if r.bytes(4)? != GCMF_MAGIC {
        return Err(BankError::format(format!(
            "no GCMF block at offset 0x{start:X}"
        )));
    }
    r.skip(4)?;
    let bounding_center = [r.f32()?, r.f32()?, r.f32()?];
    let bounding_radius = r.f32()?;
    let material_count = usize::from(r.u16()?);
    let layer1_count = usize::from(r.u16()?);
    let layer2_count = usize::from(r.u16()?);
    let transform_count = usize::from(r.u8()?);
    r.skip(1)?;
    let header_size = r.u32()? as usize;

    let mut r = data.at(start + GCMF_HEADER_SIZE)?;
    let mut materials = Vec::with_capacity(material_count);
    for _ in 0..material_count {
        let flags = RenderFlags::from_bits(r.u32()?);
        let texture_index = r.u16()?;
        r.skip(MATERIAL_SIZE - 6)?;
        materials.push(Material {
            texture_index,
            flags,
        });
    }

    let mut transforms = Vec::with_capacity(transform_count);
    for _ in 0..transform_count {
        let mut matrix = [0.0; 12];
        for value in &mut matrix {
            *value = r.f32()?;
        }
        transforms.push(TransformMatrix(matrix));
    }

    let mut r = data.at(start + header_size)?;
    let mut meshes = Vec::with_capacity(layer1_count + layer2_count);
    for i in 0..layer1_count + layer2_count {
        let layer = if i < layer1_count {
            MeshLayer::Layer1
        } else {
            MeshLayer::Layer2
        };
        meshes.push(read_mesh(&mut r, layer)?);
    }

    Ok(Model {
        name,
        bounding_center,
        bounding_radius,
        materials,
        transforms,
        meshes,
    })
}

fn read_mesh(r: &mut ByteReader<'_>, layer: MeshLayer) -> BankResult<Mesh> {
    let header_start = r.position();
    let flags = RenderFlags::from_bits(r.u32()?);
    let mut materials = [None; 3];
    for material in &mut materials {
        *material = Some(r.u16()?).filter(|index| *index != NO_MATERIAL);
    }
    let primitive_count = r.u16()?;
    let mut transform_refs = [None; 8];
    for transform in &mut transform_refs {
        *transform = Some(r.u8()?).filter(|index| *index != NO_TRANSFORM);
    }
    let display_list_size = r.u32()? as usize;

    let list_start = header_start + MESH_HEADER_SIZE;
    let mut list = r.at(list_start)?;
    let mut primitives = Vec::with_capacity(usize::from(primitive_count));
    for _ in 0..primitive_count {
        let kind = match list.u8()? {
            OP_TRIANGLES => PrimitiveKind::Triangles,
            OP_TRIANGLE_STRIP => PrimitiveKind::TriangleStrip,
            other => {
                return Err(BankError::format(format!(
                    "unknown display list opcode 0x{other:02X}"
                )))
            }
        };
        let vertex_count = usize::from(list.u16()?);
        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push(Vertex {
                position: [list.f32()?, list.f32()?, list.f32()?],
                normal: [list.f32()?, list.f32()?, list.f32()?],
                uv: [list.f32()?, list.f32()?],
            });
        }
        primitives.push(Primitive { kind, vertices });
    }

    *r = r.at(list_start + display_list_size)?;
    Ok(Mesh {
        layer,
        materials,
        transform_refs,
        flags,
        geometry: MeshGeometry { primitives },
    })
}

fn count_u16(count: usize, what: &str) -> BankResult<u16> {
    u16::try_from(count).map_err(|_| BankError::format(format!("too many {what} for GMA")))
}

fn write_model(w: &mut ByteWriter, model: &Model) -> BankResult<()> {
    if !model.layers_in_order() {
        return Err(BankError::format(format!(
            "model '{}' has layer 1 meshes after layer 2 meshes",
            model.name
        )));
    }
    let start = w.position();
    let layer1: Vec<&Mesh> = model
        .meshes
        .iter()
        .filter(|mesh| mesh.layer == MeshLayer::Layer1)
        .collect();
    let layer2: Vec<&Mesh> = model
        .meshes
        .iter()
        .filter(|mesh| mesh.layer == MeshLayer::Layer2)
        .collect();
    let header_size = (GCMF_HEADER_SIZE
        + model.materials.len() * MATERIAL_SIZE
        + model.transforms.len() * MATRIX_SIZE)
        .next_multiple_of(ALIGNMENT);

    w.bytes(GCMF_MAGIC);
    w.u32(0);
    for value in model.bounding_center {
        w.f32(value);
    }
    w.f32(model.bounding_radius);
    w.u16(count_u16(model.materials.len(), "materials")?);
    w.u16(count_u16(layer1.len(), "layer 1 meshes")?);
    w.u16(count_u16(layer2.len(), "layer 2 meshes")?);
    w.u8(u8::try_from(model.transforms.len())
        .map_err(|_| BankError::format("too many transforms for GMA"))?);
    w.u8(0);
    w.u32(offset_u32(header_size)?);
    w.u32(0);
    // Default transform indices; unused by the editor.
    w.bytes(&[0; 8]);
    w.pad_to(start + GCMF_HEADER_SIZE);

    for material in &model.materials {
        let material_start = w.position();
        w.u32(material.flags.bits());
        w.u16(material.texture_index);
        w.pad_to(material_start + MATERIAL_SIZE);
    }
    for matrix in &model.transforms {
        for value in matrix.0 {
            w.f32(value);
        }
    }
    w.pad_to(start + header_size);

    for mesh in layer1.into_iter().chain(layer2) {
        write_mesh(w, mesh)?;
    }
    Ok(())
}

fn write_mesh(w: &mut ByteWriter, mesh: &Mesh) -> BankResult<()> {
    let header_start = w.position();
    w.u32(mesh.flags.bits());
    for material in mesh.materials {
        w.u16(material.unwrap_or(NO_MATERIAL));
    }
    w.u16(count_u16(mesh.geometry.primitives.len(), "primitives")?);
    for transform in mesh.transform_refs {
        w.u8(transform.unwrap_or(NO_TRANSFORM));
    }
    let size_field = w.position();
    w.u32(0);
    w.pad_to(header_start + MESH_HEADER_SIZE);

    let list_start = w.position();
    for primitive in &mesh.geometry.primitives {
        w.u8(match primitive.kind {
            PrimitiveKind::Triangles => OP_TRIANGLES,
            PrimitiveKind::TriangleStrip => OP_TRIANGLE_STRIP,
        });
        w.u16(count_u16(primitive.vertices.len(), "vertices in one primitive")?);
        for vertex in &primitive.vertices {
            for value in vertex.position.iter().chain(&vertex.normal).chain(&vertex.uv) {
                w.f32(*value);
            }
        }
    }
    w.align(ALIGNMENT);
    w.patch_u32(size_field, offset_u32(w.position() - list_start)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gxbank_core::ErrorKind;

    fn vertex(x: f32, y: f32) -> Vertex {
        Vertex {
            position: [x, y, 0.5],
            normal: [0.0, 0.0, 1.0],
            uv: [x, 1.0 - y],
        }
    }

    fn mesh(layer: MeshLayer, kind: PrimitiveKind, material: Option<u16>) -> Mesh {
        Mesh {
            layer,
            materials: [material, None, None],
            transform_refs: [Some(0), None, None, None, None, None, None, None],
            flags: RenderFlags::TWO_SIDED,
            geometry: MeshGeometry {
                primitives: vec![Primitive {
                    kind,
                    vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0), vertex(1.0, 1.0)],
                }],
            },
        }
    }

    fn model(name: &str) -> Model {
        Model {
            name: name.to_string(),
            bounding_center: [1.0, -2.0, 3.5],
            bounding_radius: 4.25,
            materials: vec![
                Material {
                    texture_index: 0,
                    flags: RenderFlags::NONE,
                },
                Material {
                    texture_index: 7,
                    flags: RenderFlags::UNLIT | RenderFlags::ADDITIVE,
                },
            ],
            transforms: vec![TransformMatrix::IDENTITY],
            meshes: vec![
                mesh(MeshLayer::Layer1, PrimitiveKind::TriangleStrip, Some(0)),
                mesh(MeshLayer::Layer1, PrimitiveKind::Triangles, None),
                mesh(MeshLayer::Layer2, PrimitiveKind::TriangleStrip, Some(1)),
            ],
        }
    }

    fn sample_bank() -> ModelBank {
        ModelBank::from_slots(vec![Some(model("floor")), None, Some(model("goal"))])
    }

    fn encode(bank: &ModelBank, game: Game) -> Vec<u8> {
        let mut bytes = Vec::new();
        GmaCodec.encode(bank, game, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn bank_with_absent_slot_survives_encode_and_decode() {
        let bank = sample_bank();
        for game in [Game::Smb, Game::Deluxe, Game::FZero] {
            let bytes = encode(&bank, game);
            assert_eq!(GmaCodec.decode(&mut bytes.as_slice(), game).unwrap(), bank);
        }
    }

    #[test]
    fn interleaved_layers_are_refused_on_save() {
        let mut interleaved = model("floor");
        interleaved.meshes.swap(1, 2);
        let bank = ModelBank::from_slots(vec![Some(interleaved)]);

        let err = GmaCodec.encode(&bank, Game::Smb, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
        assert!(err.to_string().contains("floor"));
    }

    #[test]
    fn broken_model_block_only_drops_that_slot() {
        let bank = sample_bank();
        let mut bytes = encode(&bank, Game::Smb);
        let base = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;
        let first = u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize;
        bytes[base + first..base + first + 4].copy_from_slice(b"XXXX");

        let decoded = GmaCodec.decode(&mut bytes.as_slice(), Game::Smb).unwrap();
        assert_eq!(decoded.len(), 3);
        assert!(decoded.model(0).is_none());
        assert!(decoded.model(1).is_none());
        assert_eq!(decoded.model(2), bank.model(2));
    }

    #[test]
    fn broken_header_fails_the_load() {
        let err = GmaCodec
            .decode(&mut [0u8, 0, 1, 0, 0, 0, 0, 8].as_slice(), Game::Smb)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
        assert!(GmaCodec.decode(&mut [0u8; 3].as_slice(), Game::Smb).is_err());
    }

    #[test]
    fn empty_bank_encodes_to_a_bare_header() {
        let bytes = encode(&ModelBank::default(), Game::Deluxe);
        let decoded = GmaCodec.decode(&mut bytes.as_slice(), Game::Deluxe).unwrap();
        assert!(decoded.is_empty());
    }
}
