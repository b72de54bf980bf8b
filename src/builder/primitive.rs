//! Building one mesh primitive.

use anyhow::{anyhow, bail};
use log::warn;

use super::{Extension, ModelBuilder};
use crate::{
    data_structures::{
        scene_graph::{Draw, DrawCommand, Node, StateCommand},
        vertex::{ArrayData, VertexArray},
    },
    pipelines::{
        ColorBlendState, PRIMITIVE_DESCRIPTOR_SET, PipelineConfig, RasterizationState,
        TRANSPARENT_BIN, TextureSlot, Topology, VIEW_DESCRIPTOR_SET, defines,
        shader::attributes,
    },
    resources::{accessor, normals},
    styling::PrimitiveStyling,
};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Primitive attributes holding texture coordinates, with the first shader
/// location they map to. Overlay coordinates need [`Extension::Tiles3d`].
const TEX_COORD_SETS: [(&str, usize); 2] = [("TEXCOORD_", 0), ("_CESIUMOVERLAY_", 2)];

impl ModelBuilder<'_> {
    /**
     * Builds the scene graph node of one primitive.
     *
     * Returns `Ok(None)` for primitives that are skipped on purpose: no positions, a mode
     * without an engine topology, or hidden by styling. Broken accessor data is an error.
     *
     * Vertex data is unshared through the index list when flat normals have to be generated, the
     * primitive is then drawn without indices.
     */
    pub(super) fn load_primitive(
        &mut self,
        mesh_index: usize,
        primitive_index: usize,
    ) -> anyhow::Result<Option<Node>> {
        let model = self.model;
        let mesh = &model.document.meshes[mesh_index];
        let primitive = &mesh.primitives[primitive_index];

        let Some(position_accessor) = primitive.attribute("POSITION") else {
            return Ok(None);
        };

        let mesh_label = mesh.name.clone().unwrap_or_else(|| mesh_index.to_string());
        let name = format!("{} mesh {} primitive {}", self.name, mesh_label, primitive_index);
        let Some(topology) = Topology::from_gltf_mode(primitive.mode) else {
            warn!("{}: can't map glTF mode {} to a topology", name, primitive.mode);
            return Ok(None);
        };

        let material = self.material(primitive.material, topology);
        let descriptor = &material.descriptor_config;
        let mut pipeline = PipelineConfig::new(descriptor.shader_set.clone(), topology);
        pipeline.defines = descriptor.defines.clone();
        if topology == Topology::PointList {
            pipeline.define(defines::SIZE_TO_ERROR);
        }

        // Tangents are not generated yet, but the need still forces unshared vertices.
        let needs_tangents =
            descriptor.has_texture(TextureSlot::Normal) && primitive.attribute("TANGENT").is_none();
        let normal_accessor = primitive.attribute("NORMAL");
        let expand = (normal_accessor.is_none() || needs_tangents) && primitive.indices.is_some();

        let styling = match &self.stylist {
            Some(stylist) => stylist.styling(mesh_index, primitive_index, primitive),
            None => PrimitiveStyling::default(),
        };
        if !styling.show {
            return Ok(None);
        }

        let indices = match primitive.indices {
            Some(index) => Some(
                accessor::draw_indices(model, index)
                    .ok_or_else(|| anyhow!("invalid index accessor {}", index))?,
            ),
            None => None,
        };
        let expansion = if expand { indices.as_ref() } else { None };

        let positions = accessor::positions(model, position_accessor, expansion)
            .ok_or_else(|| anyhow!("invalid POSITION accessor {}", position_accessor))?;
        let vertex_count = positions.len();
        let mut arrays: Vec<VertexArray> = Vec::new();

        let (normal_data, normal_rate) = if let Some(normal_accessor) = normal_accessor {
            let normals = accessor::normals(model, normal_accessor, expansion)
                .ok_or_else(|| anyhow!("invalid NORMAL accessor {}", normal_accessor))?;
            (normals, wgpu::VertexStepMode::Vertex)
        } else if !topology.is_triangles() {
            if topology == Topology::PointList {
                pipeline.define(defines::BILLBOARD_NORMAL);
            }
            (vec![UP], wgpu::VertexStepMode::Instance)
        } else {
            let mut generated = Vec::with_capacity(vertex_count);
            normals::generate(&positions, &mut generated, topology);
            pipeline.define(defines::FLAT_SHADING);
            (generated, wgpu::VertexStepMode::Vertex)
        };
        pipeline.assign_array(
            &mut arrays,
            attributes::POSITION,
            wgpu::VertexStepMode::Vertex,
            ArrayData::Vec3(positions),
        );
        pipeline.assign_array(&mut arrays, attributes::NORMAL, normal_rate, ArrayData::Vec3(normal_data));

        let (colors, color_rate) = match styling.colors {
            Some(colors) => match (styling.vertex_rate, expansion) {
                (wgpu::VertexStepMode::Vertex, Some(indices)) => (
                    accessor::expand(&colors, indices)
                        .ok_or_else(|| anyhow!("styled colors do not cover the vertex indices"))?,
                    wgpu::VertexStepMode::Vertex,
                ),
                (rate, _) => (colors, rate),
            },
            None => match primitive
                .attribute("COLOR_0")
                .and_then(|color_accessor| accessor::colors(model, color_accessor, expansion))
            {
                Some(colors) => (colors, wgpu::VertexStepMode::Vertex),
                None => (vec![WHITE], wgpu::VertexStepMode::Instance),
            },
        };
        pipeline.assign_array(&mut arrays, attributes::COLOR, color_rate, ArrayData::Vec4(colors));

        for (prefix, base_location) in TEX_COORD_SETS {
            if base_location > 0 && !self.is_enabled(Extension::Tiles3d) {
                continue;
            }
            for set in 0..2 {
                let tex_coords = primitive
                    .attribute(&format!("{}{}", prefix, set))
                    .and_then(|tex_accessor| accessor::tex_coords(model, tex_accessor, expansion));
                let (data, rate) = match tex_coords {
                    Some(tex_coords) => (tex_coords, wgpu::VertexStepMode::Vertex),
                    None => (vec![[0.0, 0.0]], wgpu::VertexStepMode::Instance),
                };
                pipeline.assign_array(
                    &mut arrays,
                    attributes::TEX_COORD[base_location + set],
                    rate,
                    ArrayData::Vec2(data),
                );
            }
        }

        let draw = match indices {
            Some(indices) if !expand => Draw::Indexed { indices },
            _ => Draw::Vertices {
                vertex_count: u32::try_from(vertex_count)?,
            },
        };
        let draw = DrawCommand {
            name,
            arrays,
            draw,
            instance_count: 1,
        };
        if let Draw::Indexed { indices } = &draw.draw {
            if let Some(out_of_range) = indices.iter().find(|&i| i as usize >= vertex_count) {
                bail!("index {} is out of range for {} vertices", out_of_range, vertex_count);
            }
        }

        pipeline.color_blend = self.genv.share(if descriptor.blending {
            ColorBlendState::alpha_blending()
        } else {
            ColorBlendState::opaque()
        });
        pipeline.rasterization = self.genv.share(if descriptor.two_sided {
            RasterizationState::two_sided()
        } else {
            RasterizationState::back_face_culling()
        });
        if let Some(descriptor_set) = &descriptor.descriptor_set {
            pipeline.descriptor_layout = Some(descriptor_set.layout.clone());
        }
        let graphics_pipeline = self.genv.share(pipeline.init());

        let mut state_commands = vec![StateCommand::BindGraphicsPipeline(graphics_pipeline)];
        if let Some(descriptor_set) = &descriptor.descriptor_set {
            state_commands.push(StateCommand::BindDescriptorSet {
                set: PRIMITIVE_DESCRIPTOR_SET,
                descriptor_set: descriptor_set.clone(),
            });
        }
        state_commands.push(StateCommand::BindViewDescriptorSets {
            set: VIEW_DESCRIPTOR_SET,
        });

        let bound = draw.compute_bounds(attributes::POSITION).to_sphere();
        let state_group = Box::new(Node::StateGroup {
            state_commands,
            draw,
        });
        Ok(Some(if descriptor.blending {
            Node::DepthSorted {
                bin_number: TRANSPARENT_BIN,
                bound,
                child: state_group,
            }
        } else {
            Node::Cull {
                bound,
                child: state_group,
            }
        }))
    }
}
