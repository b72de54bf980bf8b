//! Styling hook.
//!
//! A [`Styling`] provider is passed in with the build options. For each
//! model it may hand out a [`Stylist`], which decides per primitive whether it
//! is shown and can replace its vertex colors (feature coloring of 3D tiles).

use crate::{data_structures::document::Primitive, resources::Model};

/// Styling decision for one primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveStyling {
    pub show: bool,
    /// Replacement colors, one per source vertex, or a single color when
    /// `vertex_rate` is per instance.
    pub colors: Option<Vec<[f32; 4]>>,
    pub vertex_rate: wgpu::VertexStepMode,
}

impl Default for PrimitiveStyling {
    fn default() -> Self {
        Self {
            show: true,
            colors: None,
            vertex_rate: wgpu::VertexStepMode::Vertex,
        }
    }
}

pub trait Stylist {
    fn styling(&self, mesh: usize, primitive: usize, source: &Primitive) -> PrimitiveStyling;
}

pub trait Styling: Send + Sync {
    /// `None` when the style does not apply to this model.
    fn stylist(&self, model: &Model) -> Option<Box<dyn Stylist>>;
}
