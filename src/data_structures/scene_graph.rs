//! Scene graph produced by the model builder.
//!
//! The graph is a tree of [`Node`] values: groups and transforms for the
//! glTF node hierarchy, and one state group per primitive wrapped either in a
//! cull node (opaque) or a depth-sorted node (blended). Leaves carry a
//! [`DrawCommand`] and the state commands binding its pipeline and
//! descriptor sets.

use std::sync::Arc;

use cgmath::Matrix4;

use crate::{
    data_structures::{
        bounds::{Aabb, BoundingSphere},
        vertex::{ArrayData, Indices, VertexArray},
    },
    pipelines::{DescriptorSet, GraphicsPipeline},
};

#[derive(Clone, Debug)]
pub enum Node {
    Group {
        name: Option<String>,
        children: Vec<Node>,
    },
    MatrixTransform {
        name: Option<String>,
        matrix: Matrix4<f64>,
        children: Vec<Node>,
    },
    StateGroup {
        state_commands: Vec<StateCommand>,
        draw: DrawCommand,
    },
    Cull {
        bound: BoundingSphere,
        child: Box<Node>,
    },
    /// Rendered after opaque geometry, sorted back to front within its bin.
    DepthSorted {
        bin_number: i32,
        bound: BoundingSphere,
        child: Box<Node>,
    },
}

impl Node {
    pub fn group() -> Self {
        Node::Group {
            name: None,
            children: Vec::new(),
        }
    }

    pub fn get_children(&self) -> &[Node] {
        match self {
            Node::Group { children, .. } | Node::MatrixTransform { children, .. } => children,
            Node::Cull { child, .. } | Node::DepthSorted { child, .. } => {
                std::slice::from_ref(child.as_ref())
            }
            Node::StateGroup { .. } => &[],
        }
    }

    /**
     * Appends a child to a group or transform. Wrapping nodes hold exactly one child,
     * for those (and for state groups) the child is handed back.
     */
    pub fn add_child(&mut self, child: Node) -> Result<(), Node> {
        match self {
            Node::Group { children, .. } | Node::MatrixTransform { children, .. } => {
                children.push(child);
                Ok(())
            }
            _ => Err(child),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Group { name, .. } | Node::MatrixTransform { name, .. } => name.as_deref(),
            Node::StateGroup { draw, .. } => Some(&draw.name),
            _ => None,
        }
    }

    /// Depth-first, parents before children.
    pub fn visit<'a>(&'a self, visitor: &mut dyn FnMut(&'a Node)) {
        visitor(self);
        for child in self.get_children() {
            child.visit(visitor);
        }
    }

    pub fn draw_commands(&self) -> Vec<&DrawCommand> {
        let mut draws = Vec::new();
        self.visit(&mut |node| {
            if let Node::StateGroup { draw, .. } = node {
                draws.push(draw);
            }
        });
        draws
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StateCommand {
    BindGraphicsPipeline(Arc<GraphicsPipeline>),
    BindDescriptorSet {
        set: u32,
        descriptor_set: Arc<DescriptorSet>,
    },
    /// Binds whatever the view (camera and lights) provides at `set`.
    BindViewDescriptorSets { set: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Draw {
    Indexed { indices: Indices },
    Vertices { vertex_count: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub name: String,
    pub arrays: Vec<VertexArray>,
    pub draw: Draw,
    pub instance_count: u32,
}

impl DrawCommand {
    pub fn array(&self, name: &str) -> Option<&VertexArray> {
        self.arrays.iter().find(|array| array.name == name)
    }

    /// Box around the vertices the draw actually references.
    pub fn compute_bounds(&self, position_name: &str) -> Aabb {
        let mut bounds = Aabb::empty();
        let Some(ArrayData::Vec3(positions)) = self.array(position_name).map(|a| &a.data) else {
            return bounds;
        };
        match &self.draw {
            Draw::Indexed { indices } => {
                for index in indices.iter() {
                    if let Some(position) = positions.get(index as usize) {
                        bounds.add_point(*position);
                    }
                }
            }
            Draw::Vertices { vertex_count } => {
                for position in positions.iter().take(*vertex_count as usize) {
                    bounds.add_point(*position);
                }
            }
        }
        bounds
    }
}
