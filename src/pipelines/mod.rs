//! Pipeline state configuration.
//!
//! Built primitives do not own GPU pipelines. They carry a [`GraphicsPipeline`]
//! description (shader set, defines, topology, vertex input layout, blend and
//! rasterization state, descriptor layout) that the renderer turns into a real
//! `wgpu::RenderPipeline`. Descriptions are hashable so identical ones are
//! shared through [`crate::context::SharedObjects`].

use std::{collections::BTreeSet, sync::Arc};

use crate::data_structures::{
    document::mode,
    vertex::{ArrayData, VertexArray},
};

pub mod descriptor;
pub mod shader;

pub use descriptor::{
    DescriptorBinding, DescriptorConfig, DescriptorKind, DescriptorSet, DescriptorSetLayout,
    PbrMaterial, TextureBinding,
};
pub use shader::{AttributeBinding, ShaderSet, TextureSlot};

/// Descriptor set holding per-view data (camera, lights).
pub const VIEW_DESCRIPTOR_SET: u32 = 1;
/// Descriptor set holding per-primitive material data.
pub const PRIMITIVE_DESCRIPTOR_SET: u32 = 2;
/// Depth-sort bin for blended primitives.
pub const TRANSPARENT_BIN: i32 = 10;

/// Shader defines set by the builder.
pub mod defines {
    pub const TWO_SIDED_LIGHTING: &str = "TWO_SIDED_LIGHTING";
    pub const OVERLAY_MAPS: &str = "OVERLAY_MAPS";
    pub const SIZE_TO_ERROR: &str = "SIZE_TO_ERROR";
    pub const BILLBOARD_NORMAL: &str = "BILLBOARD_NORMAL";
    pub const FLAT_SHADING: &str = "FLAT_SHADING";
}

/// Primitive topology of a draw.
///
/// A superset of `wgpu::PrimitiveTopology`: triangle fans are valid glTF and
/// survive up to the renderer, which has to convert them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// Maps a glTF primitive mode. Line loops have no engine equivalent.
    pub fn from_gltf_mode(gltf_mode: u32) -> Option<Self> {
        match gltf_mode {
            mode::POINTS => Some(Topology::PointList),
            mode::LINES => Some(Topology::LineList),
            mode::LINE_STRIP => Some(Topology::LineStrip),
            mode::TRIANGLES => Some(Topology::TriangleList),
            mode::TRIANGLE_STRIP => Some(Topology::TriangleStrip),
            mode::TRIANGLE_FAN => Some(Topology::TriangleFan),
            _ => None,
        }
    }

    pub fn is_triangles(self) -> bool {
        matches!(
            self,
            Topology::TriangleList | Topology::TriangleStrip | Topology::TriangleFan
        )
    }

    pub fn to_wgpu(self) -> Option<wgpu::PrimitiveTopology> {
        match self {
            Topology::PointList => Some(wgpu::PrimitiveTopology::PointList),
            Topology::LineList => Some(wgpu::PrimitiveTopology::LineList),
            Topology::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
            Topology::TriangleList => Some(wgpu::PrimitiveTopology::TriangleList),
            Topology::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
            Topology::TriangleFan => None,
        }
    }
}

/// Point lists and everything else get different default materials and
/// shader sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopologyClass {
    Points,
    Surfaces,
}

impl From<Topology> for TopologyClass {
    fn from(topology: Topology) -> Self {
        if topology == Topology::PointList {
            TopologyClass::Points
        } else {
            TopologyClass::Surfaces
        }
    }
}

/// One vertex buffer binding of a pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VertexInput {
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub rate: wgpu::VertexStepMode,
}

/// Color blending into the first color attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorBlendState {
    pub blend: Option<wgpu::BlendState>,
    pub write_mask: wgpu::ColorWrites,
}

impl ColorBlendState {
    pub fn opaque() -> Self {
        Self {
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }

    /// Standard alpha blending for color. Alpha uses a subtract operation, which
    /// the tile shaders compensate for.
    pub fn alpha_blending() -> Self {
        Self {
            blend: Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Subtract,
                },
            }),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterizationState {
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
}

impl RasterizationState {
    pub fn back_face_culling() -> Self {
        Self {
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
        }
    }

    pub fn two_sided() -> Self {
        Self {
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
        }
    }
}

/// A frozen, shareable pipeline description.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphicsPipeline {
    pub shader_set: Arc<ShaderSet>,
    pub defines: BTreeSet<String>,
    pub topology: Topology,
    pub vertex_inputs: Vec<VertexInput>,
    pub color_blend: Arc<ColorBlendState>,
    pub rasterization: Arc<RasterizationState>,
    pub descriptor_layout: Option<Arc<DescriptorSetLayout>>,
}

/// Mutable pipeline configuration for one primitive.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub shader_set: Arc<ShaderSet>,
    pub defines: BTreeSet<String>,
    pub topology: Topology,
    pub vertex_inputs: Vec<VertexInput>,
    pub color_blend: Arc<ColorBlendState>,
    pub rasterization: Arc<RasterizationState>,
    pub descriptor_layout: Option<Arc<DescriptorSetLayout>>,
}

impl PipelineConfig {
    pub fn new(shader_set: Arc<ShaderSet>, topology: Topology) -> Self {
        Self {
            shader_set,
            defines: BTreeSet::new(),
            topology,
            vertex_inputs: Vec::new(),
            color_blend: Arc::new(ColorBlendState::opaque()),
            rasterization: Arc::new(RasterizationState::back_face_culling()),
            descriptor_layout: None,
        }
    }

    pub fn define(&mut self, define: &str) {
        self.defines.insert(define.to_string());
    }

    /// Binds `data` to the shader attribute `name` and records the vertex
    /// input. Returns false when the shader set has no such attribute.
    pub fn assign_array(
        &mut self,
        arrays: &mut Vec<VertexArray>,
        name: &str,
        rate: wgpu::VertexStepMode,
        data: ArrayData,
    ) -> bool {
        let Some(attribute) = self.shader_set.attribute(name) else {
            log::debug!("shader set {} has no attribute {}", self.shader_set.name, name);
            return false;
        };
        self.vertex_inputs.push(VertexInput {
            location: attribute.location,
            format: data.format(),
            rate,
        });
        arrays.push(VertexArray {
            name: name.to_string(),
            location: attribute.location,
            rate,
            data,
        });
        true
    }

    pub fn init(&self) -> GraphicsPipeline {
        GraphicsPipeline {
            shader_set: self.shader_set.clone(),
            defines: self.defines.clone(),
            topology: self.topology,
            vertex_inputs: self.vertex_inputs.clone(),
            color_blend: self.color_blend.clone(),
            rasterization: self.rasterization.clone(),
            descriptor_layout: self.descriptor_layout.clone(),
        }
    }
}
