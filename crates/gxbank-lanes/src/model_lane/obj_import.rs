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

//! Defines a lane for importing OBJ/MTL scenes as a fresh pair of banks.

use crate::texture_lane::MipChainLane;
use ahash::AHashMap;
use gxbank_core::asset::{
    Material, Mesh, MeshGeometry, MeshLayer, Model, ModelBank, Primitive, PrimitiveKind,
    RenderFlags, TextureBank, TextureFormat, TextureSlot, Vertex,
};
use gxbank_core::codec::ImageFileCodec;
use gxbank_core::{BankError, BankResult};
use image::RgbaImage;
use std::path::Path;

/// Texture index stored in materials whose diffuse map could not be loaded.
const NO_TEXTURE: u16 = u16::MAX;

/// The banks built from one OBJ file and its material library.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjImport {
    /// One texture per distinct diffuse map.
    pub textures: TextureBank,
    /// A single model holding one mesh per OBJ object.
    pub models: ModelBank,
}

/// Lane for importing OBJ/MTL files.
pub struct ObjImportLane<'a> {
    images: &'a dyn ImageFileCodec,
    mip_chain: MipChainLane,
}

impl<'a> ObjImportLane<'a> {
    /// Creates a lane that loads diffuse maps through `images` and builds their
    /// mip chains with `mip_chain`.
    pub fn new(images: &'a dyn ImageFileCodec, mip_chain: MipChainLane) -> Self {
        Self { images, mip_chain }
    }

    /// Imports `path` and the material library it references.
    pub fn import(&self, path: &Path) -> BankResult<ObjImport> {
        if !path.is_file() {
            return Err(BankError::not_found(format!(
                "OBJ file '{}' does not exist",
                path.display()
            )));
        }

        let (objects, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| BankError::format(format!("failed to parse '{}': {e}", path.display())))?;

        if objects.is_empty() {
            return Err(BankError::format(format!(
                "'{}' contains no meshes",
                path.display()
            )));
        }

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("Ignoring material library of '{}': {e}", path.display());
            Vec::new()
        });

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut slots = Vec::new();
        let mut by_file: AHashMap<String, u16> = AHashMap::new();
        let mut model_materials = Vec::with_capacity(materials.len());
        for material in &materials {
            let texture_index = match &material.diffuse_texture {
                Some(file) => match by_file.get(file) {
                    Some(index) => *index,
                    None => {
                        let index = match self.load_texture(&base_dir.join(file)) {
                            Ok(slot) => {
                                slots.push(slot);
                                u16::try_from(slots.len() - 1).map_err(|_| {
                                    BankError::format("too many distinct diffuse maps")
                                })?
                            }
                            Err(e) => {
                                log::warn!(
                                    "Material '{}' keeps no texture: {e}",
                                    material.name
                                );
                                NO_TEXTURE
                            }
                        };
                        by_file.insert(file.clone(), index);
                        index
                    }
                },
                None => NO_TEXTURE,
            };
            model_materials.push(Material {
                texture_index,
                flags: RenderFlags::NONE,
            });
        }

        let meshes: Vec<Mesh> = objects
            .iter()
            .map(|object| convert_mesh(&object.mesh))
            .collect::<BankResult<_>>()?;
        let (bounding_center, bounding_radius) = bounding_sphere(&meshes);
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::info!(
            "Imported '{}': {} mesh(es), {} texture(s)",
            path.display(),
            meshes.len(),
            slots.len()
        );
        Ok(ObjImport {
            textures: TextureBank::from_slots(slots),
            models: ModelBank::from_slots(vec![Some(Model {
                name,
                bounding_center,
                bounding_radius,
                materials: model_materials,
                transforms: Vec::new(),
                meshes,
            })]),
        })
    }

    fn load_texture(&self, path: &Path) -> BankResult<TextureSlot> {
        let image = self.images.load_image(path)?;
        self.mip_chain.generate(&image, format_for_image(&image))
    }
}

/// CMPR for opaque images, RGB5A3 as soon as one texel is translucent.
pub fn format_for_image(image: &RgbaImage) -> TextureFormat {
    if image.pixels().any(|p| p.0[3] < u8::MAX) {
        TextureFormat::Rgb5a3
    } else {
        TextureFormat::Cmpr
    }
}

fn convert_mesh(mesh: &tobj::Mesh) -> BankResult<Mesh> {
    let material = mesh
        .material_id
        .map(|id| {
            u16::try_from(id).map_err(|_| BankError::format("material index exceeds u16"))
        })
        .transpose()?;

    let vertices = mesh
        .indices
        .iter()
        .map(|&index| {
            let i = index as usize;
            let position = [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ];
            let normal = if mesh.normals.len() >= (i + 1) * 3 {
                [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]]
            } else {
                [0.0; 3]
            };
            // OBJ texture space has its origin at the bottom left.
            let uv = if mesh.texcoords.len() >= (i + 1) * 2 {
                [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0; 2]
            };
            Vertex {
                position,
                normal,
                uv,
            }
        })
        .collect();

    Ok(Mesh {
        layer: MeshLayer::Layer1,
        materials: [material, None, None],
        transform_refs: [None; 8],
        flags: RenderFlags::NONE,
        geometry: MeshGeometry {
            primitives: vec![Primitive {
                kind: PrimitiveKind::Triangles,
                vertices,
            }],
        },
    })
}

/// The sphere around the axis-aligned bounding box of every vertex.
fn bounding_sphere(meshes: &[Mesh]) -> ([f32; 3], f32) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    let positions = meshes
        .iter()
        .flat_map(|mesh| &mesh.geometry.primitives)
        .flat_map(|primitive| &primitive.vertices)
        .map(|vertex| vertex.position);
    let mut any = false;
    for position in positions {
        any = true;
        for axis in 0..3 {
            min[axis] = min[axis].min(position[axis]);
            max[axis] = max[axis].max(position[axis]);
        }
    }
    if !any {
        return ([0.0; 3], 0.0);
    }

    let center = [
        (min[0] + max[0]) * 0.5,
        (min[1] + max[1]) * 0.5,
        (min[2] + max[2]) * 0.5,
    ];
    let radius = (0..3)
        .map(|axis| (max[axis] - center[axis]).powi(2))
        .sum::<f32>()
        .sqrt();
    (center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture_lane::ImageFileLane;
    use gxbank_core::ErrorKind;
    use image::Rgba;
    use std::fs;

    const QUAD_OBJ: &str = "mtllib quad.mtl
v 0 0 0
v 2 0 0
v 2 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
o quad
usemtl painted
f 1/1/1 2/2/1 3/3/1 4/4/1
o back
usemtl plain
f 3/3/1 2/2/1 1/1/1
";

    const QUAD_MTL: &str = "newmtl painted
Kd 1 1 1
map_Kd paint.png

newmtl plain
Kd 0.5 0.5 0.5

newmtl broken
map_Kd missing.png
";

    fn write_scene(dir: &Path, translucent: bool) {
        fs::write(dir.join("quad.obj"), QUAD_OBJ).unwrap();
        fs::write(dir.join("quad.mtl"), QUAD_MTL).unwrap();
        let alpha = if translucent { 128 } else { 255 };
        RgbaImage::from_pixel(8, 8, Rgba([200, 100, 50, alpha]))
            .save(dir.join("paint.png"))
            .unwrap();
    }

    #[test]
    fn imports_one_model_with_a_mesh_per_object() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path(), false);

        let lane = ObjImportLane::new(&ImageFileLane, MipChainLane::default());
        let import = lane.import(&dir.path().join("quad.obj")).unwrap();

        assert_eq!(import.models.len(), 1);
        let model = import.models.model(0).unwrap();
        assert_eq!(model.name, "quad");
        assert_eq!(model.meshes.len(), 2);
        // The quad is triangulated into two triangles.
        assert_eq!(model.meshes[0].geometry.primitives[0].triangles().len(), 2);
        assert_eq!(model.bounding_center, [1.0, 1.0, 0.0]);
        assert!((model.bounding_radius - 2.0f32.sqrt()).abs() < 1e-5);

        let painted = model.material(model.meshes[0].materials[0]).unwrap();
        let slot = import.textures.resolve(painted.texture_index).unwrap();
        assert_eq!(slot.format, TextureFormat::Cmpr);
        assert_eq!(slot.levels().len(), 4);

        let plain = model.material(model.meshes[1].materials[0]).unwrap();
        assert!(import.textures.resolve(plain.texture_index).is_none());
    }

    #[test]
    fn translucent_maps_use_rgb5a3() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path(), true);

        let lane = ObjImportLane::new(
            &ImageFileLane,
            MipChainLane {
                level_cap: Some(1),
                ..MipChainLane::default()
            },
        );
        let import = lane.import(&dir.path().join("quad.obj")).unwrap();
        let slot = &import.textures.slots()[0];
        assert_eq!(slot.format, TextureFormat::Rgb5a3);
        assert_eq!(slot.levels().len(), 1);
    }

    #[test]
    fn texture_coordinates_are_flipped_vertically() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path(), false);

        let lane = ObjImportLane::new(&ImageFileLane, MipChainLane::default());
        let import = lane.import(&dir.path().join("quad.obj")).unwrap();
        let first = import.models.model(0).unwrap().meshes[0].geometry.primitives[0].vertices[0];
        assert_eq!(first.position, [0.0, 0.0, 0.0]);
        assert_eq!(first.uv, [0.0, 1.0]);
    }

    #[test]
    fn missing_obj_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let lane = ObjImportLane::new(&ImageFileLane, MipChainLane::default());
        let err = lane.import(&dir.path().join("nothing.obj")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
