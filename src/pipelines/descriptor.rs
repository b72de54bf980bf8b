//! Material descriptors.
//!
//! [`DescriptorConfig`] collects what one material binds for its primitives:
//! textures per slot, the [`PbrMaterial`] uniform and the shader defines those
//! bindings switch on. Once complete it is frozen into a [`DescriptorSet`]
//! bound at [`super::PRIMITIVE_DESCRIPTOR_SET`].

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use super::shader::{MATERIAL_UNIFORM, ShaderSet, TextureSlot};
use crate::data_structures::texture::ImageInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Texture,
    Uniform,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DescriptorBinding {
    pub name: String,
    pub binding: u32,
    pub kind: DescriptorKind,
    pub stages: wgpu::ShaderStages,
}

/// Bindings actually used by one material, in binding order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DescriptorSetLayout {
    pub bindings: Vec<DescriptorBinding>,
}

/// Uniform block of the PBR shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PbrMaterial {
    pub base_color_factor: [f32; 4],
    /// rgb, w unused
    pub emissive_factor: [f32; 4],
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub alpha_mask_cutoff: f32,
    _padding: f32,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            emissive_factor: [0.0, 0.0, 0.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            alpha_mask_cutoff: 0.5,
            _padding: 0.0,
        }
    }
}

/// A texture bound to a material slot.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureBinding {
    pub image_info: ImageInfo,
    /// Texture coordinate set the slot samples with.
    pub tex_coord: u32,
}

/// The frozen bindings of a material.
#[derive(Clone, Debug, PartialEq)]
pub struct DescriptorSet {
    pub layout: Arc<DescriptorSetLayout>,
    pub textures: BTreeMap<TextureSlot, TextureBinding>,
    pub material: PbrMaterial,
}

#[derive(Clone, Debug)]
pub struct DescriptorConfig {
    pub shader_set: Arc<ShaderSet>,
    pub defines: BTreeSet<String>,
    pub material: PbrMaterial,
    pub textures: BTreeMap<TextureSlot, TextureBinding>,
    pub blending: bool,
    pub two_sided: bool,
    pub layout: Option<Arc<DescriptorSetLayout>>,
    pub descriptor_set: Option<Arc<DescriptorSet>>,
}

impl DescriptorConfig {
    pub fn new(shader_set: Arc<ShaderSet>) -> Self {
        Self {
            shader_set,
            defines: BTreeSet::new(),
            material: PbrMaterial::default(),
            textures: BTreeMap::new(),
            blending: false,
            two_sided: false,
            layout: None,
            descriptor_set: None,
        }
    }

    /// Binds a texture and enables its define. Returns false when the shader
    /// set has no binding for the slot.
    pub fn assign_texture(&mut self, slot: TextureSlot, image_info: ImageInfo, tex_coord: u32) -> bool {
        if self.shader_set.binding(slot.binding_name()).is_none() {
            return false;
        }
        self.defines.insert(slot.define().to_string());
        self.textures.insert(
            slot,
            TextureBinding {
                image_info,
                tex_coord,
            },
        );
        true
    }

    pub fn assign_uniform(&mut self, material: PbrMaterial) -> bool {
        if self.shader_set.binding(MATERIAL_UNIFORM).is_none() {
            return false;
        }
        self.material = material;
        true
    }

    pub fn has_texture(&self, slot: TextureSlot) -> bool {
        self.textures.contains_key(&slot)
    }

    /// Freezes the layout and the descriptor set from the assigned bindings.
    pub fn init(&mut self) {
        let bindings = self
            .shader_set
            .bindings
            .iter()
            .filter(|binding| {
                binding.name == MATERIAL_UNIFORM
                    || self
                        .textures
                        .keys()
                        .any(|slot| slot.binding_name() == binding.name)
            })
            .cloned()
            .collect();
        let layout = Arc::new(DescriptorSetLayout { bindings });
        self.descriptor_set = Some(Arc::new(DescriptorSet {
            layout: layout.clone(),
            textures: self.textures.clone(),
            material: self.material,
        }));
        self.layout = Some(layout);
    }
}
