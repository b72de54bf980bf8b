//! Shader set descriptions.
//!
//! A [`ShaderSet`] names the vertex attributes and material bindings a family
//! of shaders consumes. The builder only needs the attribute locations, the
//! texture binding slots, and the define that switches each slot on.

use std::sync::Arc;

use super::descriptor::{DescriptorBinding, DescriptorKind};

/// Attribute names understood by the PBR shader sets.
pub mod attributes {
    pub const POSITION: &str = "position";
    pub const NORMAL: &str = "normal";
    pub const COLOR: &str = "color";
    pub const TEX_COORD: [&str; 4] = ["tex_coord0", "tex_coord1", "tex_coord2", "tex_coord3"];
}

/// Material texture slots, in binding order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    BaseColor,
    MetallicRoughness,
    Normal,
    Occlusion,
    Emissive,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::BaseColor,
        TextureSlot::MetallicRoughness,
        TextureSlot::Normal,
        TextureSlot::Occlusion,
        TextureSlot::Emissive,
    ];

    /// Name of the binding in the shader set.
    pub fn binding_name(self) -> &'static str {
        match self {
            TextureSlot::BaseColor => "base_color_map",
            TextureSlot::MetallicRoughness => "metallic_roughness_map",
            TextureSlot::Normal => "normal_map",
            TextureSlot::Occlusion => "occlusion_map",
            TextureSlot::Emissive => "emissive_map",
        }
    }

    /// Define enabling the slot in the shaders.
    pub fn define(self) -> &'static str {
        match self {
            TextureSlot::BaseColor => "BASE_COLOR_MAP",
            TextureSlot::MetallicRoughness => "METALLIC_ROUGHNESS_MAP",
            TextureSlot::Normal => "NORMAL_MAP",
            TextureSlot::Occlusion => "OCCLUSION_MAP",
            TextureSlot::Emissive => "EMISSIVE_MAP",
        }
    }

    /// Base color and emissive textures hold color data and are sampled as
    /// sRGB, the rest is linear.
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureSlot::BaseColor | TextureSlot::Emissive)
    }
}

/// Name of the material uniform binding.
pub const MATERIAL_UNIFORM: &str = "material";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeBinding {
    pub name: String,
    pub location: u32,
    pub format: wgpu::VertexFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShaderSet {
    pub name: String,
    pub attributes: Vec<AttributeBinding>,
    pub bindings: Vec<DescriptorBinding>,
}

impl ShaderSet {
    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn binding(&self, name: &str) -> Option<&DescriptorBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// The PBR shader set: position, normal, color and four texture
    /// coordinate sets, five material textures and the material uniform.
    pub fn pbr(name: &str) -> Arc<Self> {
        let attribute = |name: &str, location, format| AttributeBinding {
            name: name.to_string(),
            location,
            format,
        };
        let mut attributes_list = vec![
            attribute(attributes::POSITION, 0, wgpu::VertexFormat::Float32x3),
            attribute(attributes::NORMAL, 1, wgpu::VertexFormat::Float32x3),
            attribute(attributes::TEX_COORD[0], 2, wgpu::VertexFormat::Float32x2),
            attribute(attributes::COLOR, 3, wgpu::VertexFormat::Float32x4),
        ];
        for (i, tex_coord) in attributes::TEX_COORD.iter().enumerate().skip(1) {
            attributes_list.push(attribute(
                *tex_coord,
                3 + i as u32,
                wgpu::VertexFormat::Float32x2,
            ));
        }

        let mut bindings: Vec<DescriptorBinding> = TextureSlot::ALL
            .iter()
            .enumerate()
            .map(|(i, slot)| DescriptorBinding {
                name: slot.binding_name().to_string(),
                binding: i as u32,
                kind: DescriptorKind::Texture,
                stages: wgpu::ShaderStages::FRAGMENT,
            })
            .collect();
        bindings.push(DescriptorBinding {
            name: MATERIAL_UNIFORM.to_string(),
            binding: 10,
            kind: DescriptorKind::Uniform,
            stages: wgpu::ShaderStages::VERTEX_FRAGMENT,
        });

        Arc::new(Self {
            name: name.to_string(),
            attributes: attributes_list,
            bindings,
        })
    }
}
