//! Node hierarchy and meshes.

use log::warn;

use super::ModelBuilder;
use crate::data_structures::{scene_graph::Node, transform::node_transform};

impl ModelBuilder<'_> {
    /// Converts node `index` and its subtree. `path` holds the nodes above it
    /// so cyclic child references are cut instead of recursing forever.
    pub(super) fn load_node(&mut self, index: usize, path: &mut Vec<usize>) -> Option<Node> {
        let model = self.model;
        let Some(node) = model.document.nodes.get(index) else {
            warn!("{}: node {} does not exist", self.name, index);
            return None;
        };

        let mut result = match node_transform(node) {
            Some(matrix) => Node::MatrixTransform {
                name: node.name.clone(),
                matrix,
                children: Vec::new(),
            },
            None => Node::Group {
                name: node.name.clone(),
                children: Vec::new(),
            },
        };

        if let Some(mesh) = node.mesh {
            if let Some(mesh_node) = self.load_mesh(mesh) {
                let _ = result.add_child(mesh_node);
            }
        }

        path.push(index);
        for &child in &node.children {
            if path.contains(&child) {
                warn!("{}: node {} is its own ancestor, skipping it", self.name, child);
                continue;
            }
            if let Some(child_node) = self.load_node(child, path) {
                let _ = result.add_child(child_node);
            }
        }
        path.pop();
        Some(result)
    }

    /// A group with one child per primitive that loaded. A failing primitive
    /// is logged and skipped, the others still load.
    pub(super) fn load_mesh(&mut self, index: usize) -> Option<Node> {
        let model = self.model;
        let Some(mesh) = model.document.meshes.get(index) else {
            warn!("{}: mesh {} does not exist", self.name, index);
            return None;
        };

        let mut result = Node::Group {
            name: mesh.name.clone(),
            children: Vec::new(),
        };
        for primitive in 0..mesh.primitives.len() {
            match self.load_primitive(index, primitive) {
                Ok(Some(node)) => {
                    let _ = result.add_child(node);
                }
                Ok(None) => {}
                Err(e) => {
                    let mesh_name = mesh.name.clone().unwrap_or_else(|| index.to_string());
                    warn!(
                        "{}: error loading mesh {} primitive {}: {:#}",
                        self.name, mesh_name, primitive, e
                    );
                }
            }
        }
        Some(result)
    }
}
