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

//! Defines a lane for exporting a model bank as OBJ/MTL with PNG diffuse maps.

use crate::texture_lane::pixel;
use ahash::AHashSet;
use gxbank_core::asset::{ModelBank, TextureBank};
use gxbank_core::codec::ImageFileCodec;
use gxbank_core::{BankError, BankResult};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Lane for exporting OBJ/MTL files.
pub struct ObjExportLane<'a> {
    images: &'a dyn ImageFileCodec,
}

impl<'a> ObjExportLane<'a> {
    /// Creates a lane that writes diffuse maps through `images`.
    pub fn new(images: &'a dyn ImageFileCodec) -> Self {
        Self { images }
    }

    /// Writes `path`, a `<stem>.mtl` next to it, and one `<stem>_texNNN.png` per
    /// texture a material resolves to.
    pub fn export(
        &self,
        models: &ModelBank,
        textures: Option<&TextureBank>,
        path: &Path,
    ) -> BankResult<()> {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| BankError::argument(format!("'{}' is not a file path", path.display())))?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let texture_file = |index: u16| format!("{stem}_tex{index:03}.png");

        let mut obj = String::new();
        let mut mtl = String::new();
        let mut used_textures = AHashSet::new();
        writeln!(obj, "mtllib {stem}.mtl").map_err(text_error)?;

        let mut next_vertex = 1usize;
        for (model_index, model) in models.present() {
            for (material_index, material) in model.materials.iter().enumerate() {
                writeln!(mtl, "newmtl mat_{model_index}_{material_index}").map_err(text_error)?;
                writeln!(mtl, "Kd 1 1 1").map_err(text_error)?;
                let resolved = textures.and_then(|bank| bank.resolve(material.texture_index));
                if resolved.is_some() {
                    writeln!(mtl, "map_Kd {}", texture_file(material.texture_index)).map_err(text_error)?;
                    used_textures.insert(material.texture_index);
                }
                mtl.push('\n');
            }

            for (mesh_index, mesh) in model.meshes.iter().enumerate() {
                writeln!(obj, "o {}_{mesh_index}", model.name).map_err(text_error)?;
                if let Some(material) = mesh.materials[0]
                    .filter(|index| model.material(Some(*index)).is_some())
                {
                    writeln!(obj, "usemtl mat_{model_index}_{material}").map_err(text_error)?;
                }
                for primitive in &mesh.geometry.primitives {
                    for triangle in primitive.triangles() {
                        for vertex in &triangle {
                            let [x, y, z] = vertex.position;
                            let [nx, ny, nz] = vertex.normal;
                            let [u, v] = vertex.uv;
                            writeln!(obj, "v {x} {y} {z}").map_err(text_error)?;
                            writeln!(obj, "vt {u} {}", 1.0 - v).map_err(text_error)?;
                            writeln!(obj, "vn {nx} {ny} {nz}").map_err(text_error)?;
                        }
                        let (a, b, c) = (next_vertex, next_vertex + 1, next_vertex + 2);
                        writeln!(obj, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}").map_err(text_error)?;
                        next_vertex += 3;
                    }
                }
            }
        }

        write_text(path, &obj)?;
        write_text(&dir.join(format!("{stem}.mtl")), &mtl)?;

        if let Some(bank) = textures {
            for index in used_textures {
                let Some((slot, top)) = bank
                    .resolve(index)
                    .and_then(|slot| slot.levels().first().map(|top| (slot, top)))
                else {
                    continue;
                };
                let image = pixel::decode_level(slot.format, top.width, top.height, &top.data)?;
                self.images.save_image(&image, &dir.join(texture_file(index)))?;
            }
        }
        log::info!("Exported {} model(s) to '{}'", models.present().count(), path.display());
        Ok(())
    }
}

fn write_text(path: &Path, text: &str) -> BankResult<()> {
    fs::write(path, text).map_err(|e| BankError::io(format!("writing '{}'", path.display()), e))
}

fn text_error(_: std::fmt::Error) -> BankError {
    BankError::format("failed to format OBJ/MTL text")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture_lane::{ImageFileLane, MipChainLane};
    use gxbank_core::asset::{
        Material, Mesh, MeshGeometry, MeshLayer, Model, Primitive, PrimitiveKind, RenderFlags,
        TextureFormat, TextureSlot, Vertex,
    };
    use image::{Rgba, RgbaImage};

    fn strip_model() -> Model {
        let vertex = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [x, y],
        };
        Model {
            name: "panel".to_string(),
            bounding_center: [0.5, 0.5, 0.0],
            bounding_radius: 1.0,
            materials: vec![
                Material {
                    texture_index: 1,
                    flags: RenderFlags::NONE,
                },
                Material {
                    texture_index: 40,
                    flags: RenderFlags::NONE,
                },
            ],
            transforms: Vec::new(),
            meshes: vec![Mesh {
                layer: MeshLayer::Layer1,
                materials: [Some(0), None, None],
                transform_refs: [None; 8],
                flags: RenderFlags::NONE,
                geometry: MeshGeometry {
                    primitives: vec![Primitive {
                        kind: PrimitiveKind::TriangleStrip,
                        vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0), vertex(1.0, 1.0)],
                    }],
                },
            }],
        }
    }

    fn textures() -> TextureBank {
        let image = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let slot = MipChainLane::default()
            .generate(&image, TextureFormat::Rgba8)
            .unwrap();
        TextureBank::from_slots(vec![TextureSlot::empty(), slot])
    }

    #[test]
    fn writes_obj_mtl_and_referenced_textures() {
        let dir = tempfile::tempdir().unwrap();
        let models = ModelBank::from_slots(vec![None, Some(strip_model())]);
        let bank = textures();
        let path = dir.path().join("scene.obj");

        ObjExportLane::new(&ImageFileLane)
            .export(&models, Some(&bank), &path)
            .unwrap();

        let obj = fs::read_to_string(&path).unwrap();
        assert!(obj.starts_with("mtllib scene.mtl\n"));
        assert!(obj.contains("usemtl mat_1_0"));
        // A four-vertex strip becomes two triangles.
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 2);

        let mtl = fs::read_to_string(dir.path().join("scene.mtl")).unwrap();
        assert!(mtl.contains("newmtl mat_1_0\nKd 1 1 1\nmap_Kd scene_tex001.png"));
        assert!(mtl.contains("newmtl mat_1_1\nKd 1 1 1\n\n"));

        let png = image::open(dir.path().join("scene_tex001.png")).unwrap().to_rgba8();
        assert_eq!(png.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert!(!dir.path().join("scene_tex040.png").exists());
    }

    #[test]
    fn export_without_textures_skips_maps() {
        let dir = tempfile::tempdir().unwrap();
        let models = ModelBank::from_slots(vec![Some(strip_model())]);
        let path = dir.path().join("bare.obj");

        ObjExportLane::new(&ImageFileLane)
            .export(&models, None, &path)
            .unwrap();

        let mtl = fs::read_to_string(dir.path().join("bare.mtl")).unwrap();
        assert!(!mtl.contains("map_Kd"));
    }
}
