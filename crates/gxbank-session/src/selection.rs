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

//! The per-model, per-mesh visibility selection.
//!
//! The tree mirrors the model bank: one top node per model slot and one child per
//! mesh of that model. Top nodes are tri-state; mesh nodes are either checked or
//! unchecked. Aggregation is an explicit step rather than a side effect of the
//! widget that displays the tree.

use gxbank_core::asset::{MeshLayer, ModelBank};
use gxbank_core::{BankError, BankResult};

/// The check state of a selection node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckState {
    /// Drawn.
    Checked,
    /// Hidden.
    Unchecked,
    /// Some, but not all, children are drawn. Only top nodes can hold this state.
    Indeterminate,
}

/// Addresses one node of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// The top node of a model slot.
    Model(usize),
    /// A mesh child: model slot, then mesh index.
    Mesh(usize, usize),
}

/// Something the renderer should draw this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawItem {
    /// The whole cached drawable of a model.
    Model(usize),
    /// A single mesh of a model.
    Mesh {
        /// Model slot.
        model: usize,
        /// Mesh index within the model.
        mesh: usize,
    },
}

/// Tri-state aggregation over a node's children.
///
/// All children checked gives `Checked`, none gives `Unchecked`, anything else
/// `Indeterminate`. A node without children keeps `current`.
pub fn aggregate(children: &[CheckState], current: CheckState) -> CheckState {
    if children.is_empty() {
        return current;
    }
    let checked = children
        .iter()
        .filter(|state| **state == CheckState::Checked)
        .count();
    if checked == children.len() {
        CheckState::Checked
    } else if checked == 0 {
        CheckState::Unchecked
    } else {
        CheckState::Indeterminate
    }
}

/// A tree of tri-state nodes.
pub trait TriStateTree {
    /// Sets a node's state. Setting a top node cascades to its children; setting a
    /// child re-aggregates its parent. `Indeterminate` cannot be set directly.
    fn set_node_state(&mut self, node: NodeId, state: CheckState) -> BankResult<()>;

    /// Reads a node's state.
    fn node_state(&self, node: NodeId) -> BankResult<CheckState>;

    /// Recomputes a top node from its children and returns the result.
    fn aggregate(&mut self, model: usize) -> BankResult<CheckState>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MeshNode {
    layer: MeshLayer,
    state: CheckState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModelNode {
    present: bool,
    state: CheckState,
    meshes: Vec<MeshNode>,
}

/// The selection tree of the loaded model bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTree {
    models: Vec<ModelNode>,
}

impl SelectionTree {
    /// Builds a fresh tree, every node checked. `None` gives an empty tree.
    pub fn build(bank: Option<&ModelBank>) -> Self {
        let models = bank
            .map(|bank| {
                bank.slots()
                    .iter()
                    .map(|slot| ModelNode {
                        present: slot.is_some(),
                        state: CheckState::Checked,
                        meshes: slot
                            .iter()
                            .flat_map(|model| &model.meshes)
                            .map(|mesh| MeshNode {
                                layer: mesh.layer,
                                state: CheckState::Checked,
                            })
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { models }
    }

    /// Number of top nodes; always the model bank's length.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the tree has no top nodes.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Number of mesh children under a top node.
    pub fn mesh_count(&self, model: usize) -> BankResult<usize> {
        self.model_node(model).map(|node| node.meshes.len())
    }

    /// Checks every mesh whose layer is shown and unchecks the rest, then
    /// re-aggregates every top node.
    pub fn set_layer_visibility(&mut self, show_layer1: bool, show_layer2: bool) {
        for node in &mut self.models {
            for mesh in &mut node.meshes {
                let shown = match mesh.layer {
                    MeshLayer::Layer1 => show_layer1,
                    MeshLayer::Layer2 => show_layer2,
                };
                mesh.state = if shown {
                    CheckState::Checked
                } else {
                    CheckState::Unchecked
                };
            }
            node.reaggregate();
        }
    }

    /// What to draw: whole models for checked nodes, checked meshes for
    /// indeterminate ones, nothing for unchecked nodes or absent slots.
    pub fn render_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        for (index, node) in self.models.iter().enumerate() {
            if !node.present {
                continue;
            }
            match node.state {
                CheckState::Checked => items.push(DrawItem::Model(index)),
                CheckState::Indeterminate => items.extend(
                    node.meshes
                        .iter()
                        .enumerate()
                        .filter(|(_, mesh)| mesh.state == CheckState::Checked)
                        .map(|(mesh, _)| DrawItem::Mesh { model: index, mesh }),
                ),
                CheckState::Unchecked => {}
            }
        }
        items
    }

    fn model_node(&self, model: usize) -> BankResult<&ModelNode> {
        self.models.get(model).ok_or(BankError::OutOfRange {
            what: "model",
            index: model,
            len: self.models.len(),
        })
    }

    fn model_node_mut(&mut self, model: usize) -> BankResult<&mut ModelNode> {
        let len = self.models.len();
        self.models.get_mut(model).ok_or(BankError::OutOfRange {
            what: "model",
            index: model,
            len,
        })
    }
}

impl ModelNode {
    fn reaggregate(&mut self) -> CheckState {
        let children: Vec<CheckState> = self.meshes.iter().map(|mesh| mesh.state).collect();
        self.state = aggregate(&children, self.state);
        self.state
    }

    fn mesh_mut(&mut self, mesh: usize) -> BankResult<&mut MeshNode> {
        let len = self.meshes.len();
        self.meshes.get_mut(mesh).ok_or(BankError::OutOfRange {
            what: "mesh",
            index: mesh,
            len,
        })
    }
}

impl TriStateTree for SelectionTree {
    fn set_node_state(&mut self, node: NodeId, state: CheckState) -> BankResult<()> {
        if state == CheckState::Indeterminate {
            return Err(BankError::argument(
                "the indeterminate state is derived and cannot be set",
            ));
        }
        match node {
            NodeId::Model(model) => {
                let node = self.model_node_mut(model)?;
                node.state = state;
                for mesh in &mut node.meshes {
                    mesh.state = state;
                }
            }
            NodeId::Mesh(model, mesh) => {
                let node = self.model_node_mut(model)?;
                node.mesh_mut(mesh)?.state = state;
                node.reaggregate();
            }
        }
        Ok(())
    }

    fn node_state(&self, node: NodeId) -> BankResult<CheckState> {
        match node {
            NodeId::Model(model) => self.model_node(model).map(|node| node.state),
            NodeId::Mesh(model, mesh) => {
                let node = self.model_node(model)?;
                node.meshes
                    .get(mesh)
                    .map(|mesh| mesh.state)
                    .ok_or(BankError::OutOfRange {
                        what: "mesh",
                        index: mesh,
                        len: node.meshes.len(),
                    })
            }
        }
    }

    fn aggregate(&mut self, model: usize) -> BankResult<CheckState> {
        self.model_node_mut(model).map(ModelNode::reaggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gxbank_core::asset::{Mesh, MeshGeometry, Model, RenderFlags};
    use gxbank_core::ErrorKind;

    fn model(layers: &[MeshLayer]) -> Model {
        Model {
            name: "stage".to_string(),
            bounding_center: [0.0; 3],
            bounding_radius: 1.0,
            materials: Vec::new(),
            transforms: Vec::new(),
            meshes: layers
                .iter()
                .map(|layer| Mesh {
                    layer: *layer,
                    materials: [None; 3],
                    transform_refs: [None; 8],
                    flags: RenderFlags::NONE,
                    geometry: MeshGeometry::default(),
                })
                .collect(),
        }
    }

    fn bank() -> ModelBank {
        ModelBank::from_slots(vec![
            Some(model(&[MeshLayer::Layer1, MeshLayer::Layer2])),
            None,
            Some(model(&[MeshLayer::Layer1])),
        ])
    }

    #[test]
    fn aggregation_rules() {
        use CheckState::*;
        assert_eq!(aggregate(&[Checked, Checked], Unchecked), Checked);
        assert_eq!(aggregate(&[Unchecked, Unchecked], Checked), Unchecked);
        assert_eq!(aggregate(&[Checked, Unchecked], Checked), Indeterminate);
        assert_eq!(aggregate(&[], Unchecked), Unchecked);
        assert_eq!(aggregate(&[], Checked), Checked);
    }

    #[test]
    fn build_mirrors_the_bank_with_everything_checked() {
        let tree = SelectionTree::build(Some(&bank()));
        assert_eq!(tree.len(), 3);
        for model in 0..3 {
            assert_eq!(tree.node_state(NodeId::Model(model)).unwrap(), CheckState::Checked);
        }
        assert_eq!(tree.mesh_count(1).unwrap(), 0);
        assert_eq!(
            tree.render_list(),
            vec![DrawItem::Model(0), DrawItem::Model(2)]
        );
        assert!(SelectionTree::build(None).is_empty());
    }

    #[test]
    fn hiding_one_layer_makes_mixed_models_indeterminate() {
        let mut tree = SelectionTree::build(Some(&bank()));
        tree.set_layer_visibility(true, false);

        assert_eq!(
            tree.node_state(NodeId::Model(0)).unwrap(),
            CheckState::Indeterminate
        );
        assert_eq!(tree.node_state(NodeId::Model(2)).unwrap(), CheckState::Checked);
        assert_eq!(
            tree.render_list(),
            vec![DrawItem::Mesh { model: 0, mesh: 0 }, DrawItem::Model(2)]
        );
    }

    #[test]
    fn hiding_both_layers_unchecks_every_mesh() {
        let mut tree = SelectionTree::build(Some(&bank()));
        tree.set_layer_visibility(true, false);
        tree.set_layer_visibility(false, false);

        for (model, meshes) in [(0, 2), (2, 1)] {
            for mesh in 0..meshes {
                assert_eq!(
                    tree.node_state(NodeId::Mesh(model, mesh)).unwrap(),
                    CheckState::Unchecked
                );
            }
            assert_eq!(
                tree.node_state(NodeId::Model(model)).unwrap(),
                CheckState::Unchecked
            );
        }
        // The absent slot has no children and keeps its state.
        assert_eq!(tree.node_state(NodeId::Model(1)).unwrap(), CheckState::Checked);
        assert!(tree.render_list().is_empty());
    }

    #[test]
    fn setting_a_top_node_cascades() {
        let mut tree = SelectionTree::build(Some(&bank()));
        tree.set_node_state(NodeId::Model(0), CheckState::Unchecked)
            .unwrap();
        assert_eq!(
            tree.node_state(NodeId::Mesh(0, 1)).unwrap(),
            CheckState::Unchecked
        );

        tree.set_node_state(NodeId::Mesh(0, 1), CheckState::Checked)
            .unwrap();
        assert_eq!(
            tree.node_state(NodeId::Model(0)).unwrap(),
            CheckState::Indeterminate
        );
        assert_eq!(tree.aggregate(0).unwrap(), CheckState::Indeterminate);
    }

    #[test]
    fn indeterminate_cannot_be_set_and_bad_nodes_are_out_of_range() {
        let mut tree = SelectionTree::build(Some(&bank()));
        let err = tree
            .set_node_state(NodeId::Model(0), CheckState::Indeterminate)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentError);

        let err = tree.node_state(NodeId::Mesh(2, 5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert!(tree.aggregate(9).is_err());
    }
}
