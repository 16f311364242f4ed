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

//! Model banks: models, their meshes and materials.

/// Raw render flags carried by materials and meshes.
///
/// The bits are preserved exactly as stored in the container; only the few the
/// exporters care about are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderFlags {
    bits: u32,
}

impl RenderFlags {
    /// No flags set.
    pub const NONE: Self = Self { bits: 0 };
    /// Faces are drawn from both sides.
    pub const TWO_SIDED: Self = Self { bits: 1 << 1 };
    /// Lighting is skipped.
    pub const UNLIT: Self = Self { bits: 1 << 2 };
    /// The material blends additively.
    pub const ADDITIVE: Self = Self { bits: 1 << 5 };

    /// Creates flags from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    /// Returns the raw bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Checks whether every bit of `other` is set.
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Combines two sets of flags.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }
}

impl std::ops::BitOr for RenderFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// A material: a soft reference into the texture bank plus render flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Material {
    /// Index into the texture bank. May be out of range or name an empty slot,
    /// which both mean "untextured".
    pub texture_index: u16,
    /// Raw render flags.
    pub flags: RenderFlags,
}

/// A 3x4 affine transform, row major.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformMatrix(pub [f32; 12]);

impl TransformMatrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    ]);
}

/// Which of a model's two mesh layers a mesh belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshLayer {
    /// Opaque geometry, drawn first.
    Layer1,
    /// Translucent geometry, drawn after every opaque mesh.
    Layer2,
}

/// How the vertices of a primitive are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Independent triangles, three vertices each.
    Triangles,
    /// A triangle strip.
    TriangleStrip,
}

/// One vertex of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Vertex normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

/// A run of vertices drawn with one primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Assembly mode.
    pub kind: PrimitiveKind,
    /// The vertices, in draw order.
    pub vertices: Vec<Vertex>,
}

impl Primitive {
    /// Expands the primitive into independent triangles, keeping a consistent
    /// winding for strips.
    pub fn triangles(&self) -> Vec<[Vertex; 3]> {
        match self.kind {
            PrimitiveKind::Triangles => self
                .vertices
                .chunks_exact(3)
                .map(|tri| [tri[0], tri[1], tri[2]])
                .collect(),
            PrimitiveKind::TriangleStrip => self
                .vertices
                .windows(3)
                .enumerate()
                .map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .collect(),
        }
    }
}

/// Mesh geometry. The session never looks inside; only codecs and exporters do.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshGeometry {
    /// Primitives in draw order.
    pub primitives: Vec<Primitive>,
}

/// One drawable part of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Layer the mesh is drawn in.
    pub layer: MeshLayer,
    /// Primary, secondary and tertiary material indices.
    pub materials: [Option<u16>; 3],
    /// Indices into the model's transform list, `None` for unused entries.
    pub transform_refs: [Option<u8>; 8],
    /// Raw render flags.
    pub flags: RenderFlags,
    /// Geometry payload.
    pub geometry: MeshGeometry,
}

/// A model: bounding sphere, materials, transforms and meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Model name from the container's name table.
    pub name: String,
    /// Center of the bounding sphere.
    pub bounding_center: [f32; 3],
    /// Radius of the bounding sphere.
    pub bounding_radius: f32,
    /// Materials referenced by the meshes.
    pub materials: Vec<Material>,
    /// Transform matrices referenced by the meshes.
    pub transforms: Vec<TransformMatrix>,
    /// Meshes, every layer 1 mesh before any layer 2 mesh. Containers store the
    /// layers as two runs, so mesh indices only survive a save in that order.
    pub meshes: Vec<Mesh>,
}

impl Model {
    /// Resolves a mesh material index against this model's material list.
    pub fn material(&self, index: Option<u16>) -> Option<&Material> {
        index.and_then(|i| self.materials.get(usize::from(i)))
    }

    /// Whether no layer 1 mesh follows a layer 2 mesh.
    pub fn layers_in_order(&self) -> bool {
        self.meshes
            .windows(2)
            .all(|pair| !(pair[0].layer == MeshLayer::Layer2 && pair[1].layer == MeshLayer::Layer1))
    }
}

/// An index-stable collection of models.
///
/// A `None` slot is a model that failed to load; it keeps its index so that
/// every later index is still valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelBank {
    slots: Vec<Option<Model>>,
}

impl ModelBank {
    /// Creates a bank from its slots.
    pub fn from_slots(slots: Vec<Option<Model>>) -> Self {
        Self { slots }
    }

    /// Number of slots, absent ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the bank has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slots, in index order.
    pub fn slots(&self) -> &[Option<Model>] {
        &self.slots
    }

    /// The model at `index`, if present.
    pub fn model(&self, index: usize) -> Option<&Model> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Iterates over present models with their bank index.
    pub fn present(&self) -> impl Iterator<Item = (usize, &Model)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|model| (i, model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32) -> Vertex {
        Vertex {
            position: [x, 0.0, 0.0],
            ..Default::default()
        }
    }

    #[test]
    fn strip_expansion_alternates_winding() {
        let strip = Primitive {
            kind: PrimitiveKind::TriangleStrip,
            vertices: (0..5).map(|i| vertex(i as f32)).collect(),
        };
        let tris = strip.triangles();
        assert_eq!(tris.len(), 3);
        assert_eq!(tris[0][0].position[0], 0.0);
        assert_eq!(tris[1][0].position[0], 2.0);
        assert_eq!(tris[1][1].position[0], 1.0);
        assert_eq!(tris[2][0].position[0], 2.0);
    }

    #[test]
    fn triangle_list_ignores_trailing_vertices() {
        let list = Primitive {
            kind: PrimitiveKind::Triangles,
            vertices: (0..7).map(|i| vertex(i as f32)).collect(),
        };
        assert_eq!(list.triangles().len(), 2);
    }

    #[test]
    fn render_flags_combine() {
        let flags = RenderFlags::TWO_SIDED | RenderFlags::UNLIT;
        assert!(flags.contains(RenderFlags::TWO_SIDED));
        assert!(!flags.contains(RenderFlags::ADDITIVE));
        assert_eq!(RenderFlags::from_bits(flags.bits()), flags);
    }

    #[test]
    fn present_skips_absent_slots_but_keeps_indices() {
        let model = Model {
            name: "stage".into(),
            bounding_center: [0.0; 3],
            bounding_radius: 1.0,
            materials: vec![Material::default()],
            transforms: Vec::new(),
            meshes: Vec::new(),
        };
        let bank = ModelBank::from_slots(vec![None, Some(model)]);
        let present: Vec<_> = bank.present().map(|(i, m)| (i, m.name.clone())).collect();
        assert_eq!(present, vec![(1, "stage".to_string())]);
        assert!(bank.model(0).is_none());
        assert!(bank.model(1).unwrap().material(Some(0)).is_some());
        assert!(bank.model(1).unwrap().material(Some(3)).is_none());
        assert!(bank.model(1).unwrap().material(None).is_none());
    }
}
