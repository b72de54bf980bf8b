//! Materials, textures and the per-model caches behind them.

use std::{collections::HashMap, sync::Arc};

use log::warn;

use super::ModelBuilder;
use crate::{
    context::GraphicsEnvironment,
    data_structures::{
        document::{self, AlphaMode, TextureInfo},
        texture::{Image, ImageInfo, Sampler},
    },
    pipelines::{DescriptorConfig, PbrMaterial, TextureSlot, Topology, TopologyClass, defines},
    resources::texture::{make_image, sampler_lod},
};

/// A glTF material resolved for one topology class.
#[derive(Debug)]
pub struct CsMaterial {
    pub descriptor_config: DescriptorConfig,
}

#[derive(Default)]
pub(super) struct MaterialCache {
    materials: HashMap<(usize, TopologyClass), Arc<CsMaterial>>,
    /// Used by primitives without a (valid) material.
    defaults: HashMap<TopologyClass, Arc<CsMaterial>>,
}

#[derive(Default)]
struct LoadedImage {
    image: Option<Arc<Image>>,
    image_with_mipmap: Option<Arc<Image>>,
    srgb: bool,
}

#[derive(Default)]
pub(super) struct ImageCache {
    images: HashMap<usize, LoadedImage>,
}

fn default_material(genv: &GraphicsEnvironment, topology: Topology) -> CsMaterial {
    let mut descriptor_config = DescriptorConfig::new(genv.shader_set(topology));
    descriptor_config.assign_uniform(PbrMaterial::default());
    descriptor_config.init();
    CsMaterial { descriptor_config }
}

fn address_mode(wrap: u32) -> wgpu::AddressMode {
    match wrap {
        document::sampler::CLAMP_TO_EDGE => wgpu::AddressMode::ClampToEdge,
        document::sampler::MIRRORED_REPEAT => wgpu::AddressMode::MirrorRepeat,
        _ => wgpu::AddressMode::Repeat,
    }
}

/// Sampler state and whether the texture wants mipmaps. Without a glTF
/// sampler: repeat, linear, no mipmaps.
fn sampler_state(source: Option<&document::Sampler>) -> (Sampler, bool) {
    let mut sampler = Sampler::default();
    let Some(source) = source else {
        return (sampler, false);
    };
    sampler.address_mode_u = address_mode(source.wrap_s);
    sampler.address_mode_v = address_mode(source.wrap_t);
    if source.mag_filter == Some(document::sampler::NEAREST) {
        sampler.mag_filter = wgpu::FilterMode::Nearest;
    }
    if matches!(
        source.min_filter,
        Some(
            document::sampler::NEAREST
                | document::sampler::NEAREST_MIPMAP_NEAREST
                | document::sampler::NEAREST_MIPMAP_LINEAR
        )
    ) {
        sampler.min_filter = wgpu::FilterMode::Nearest;
    }
    // an absent minification filter means "implementation defined", which gets mipmaps
    let use_mipmaps = matches!(
        source.min_filter,
        None | Some(
            document::sampler::NEAREST_MIPMAP_NEAREST
                | document::sampler::LINEAR_MIPMAP_NEAREST
                | document::sampler::NEAREST_MIPMAP_LINEAR
                | document::sampler::LINEAR_MIPMAP_LINEAR
        )
    );
    (sampler, use_mipmaps)
}

impl ModelBuilder<'_> {
    /// The resolved material for `index` and the class of `topology`, created
    /// on first use. Missing or out of range indices get the default material.
    pub(super) fn material(&mut self, index: Option<usize>, topology: Topology) -> Arc<CsMaterial> {
        let class = TopologyClass::from(topology);
        let Some(index) = index.filter(|&i| i < self.model.document.materials.len()) else {
            let genv = &self.genv;
            return self
                .materials
                .defaults
                .entry(class)
                .or_insert_with(|| Arc::new(default_material(genv, topology)))
                .clone();
        };
        if let Some(material) = self.materials.materials.get(&(index, class)) {
            return material.clone();
        }
        let material = Arc::new(self.load_material(index, topology));
        self.materials
            .materials
            .insert((index, class), material.clone());
        material
    }

    fn load_material(&mut self, index: usize, topology: Topology) -> CsMaterial {
        let model = self.model;
        let source = &model.document.materials[index];
        let mut config = DescriptorConfig::new(self.genv.shader_set(topology));
        let mut pbr = PbrMaterial::default();

        // TODO: honor double_sided once tiles stop relying on two-sided lighting
        config.two_sided = true;
        config.defines.insert(defines::TWO_SIDED_LIGHTING.to_string());
        if self.options.render_overlays {
            config.defines.insert(defines::OVERLAY_MAPS.to_string());
        }

        match source.alpha_mode {
            AlphaMode::Blend => {
                config.blending = true;
                pbr.alpha_mask_cutoff = 0.0;
            }
            AlphaMode::Mask => {
                if let Some(cutoff) = source.alpha_cutoff {
                    pbr.alpha_mask_cutoff = cutoff as f32;
                }
            }
            AlphaMode::Opaque => {}
        }

        for (target, &value) in pbr.emissive_factor.iter_mut().zip(&source.emissive_factor) {
            *target = value as f32;
        }

        if let Some(metallic_roughness) = &source.pbr_metallic_roughness {
            for (target, &value) in pbr
                .base_color_factor
                .iter_mut()
                .zip(&metallic_roughness.base_color_factor)
            {
                *target = value as f32;
            }
            // negative factors leave the shader default
            if metallic_roughness.metallic_factor >= 0.0 {
                pbr.metallic_factor = metallic_roughness.metallic_factor as f32;
            }
            if metallic_roughness.roughness_factor >= 0.0 {
                pbr.roughness_factor = metallic_roughness.roughness_factor as f32;
            }
            self.load_material_texture(
                &mut config,
                TextureSlot::BaseColor,
                metallic_roughness.base_color_texture.as_ref(),
            );
            self.load_material_texture(
                &mut config,
                TextureSlot::MetallicRoughness,
                metallic_roughness.metallic_roughness_texture.as_ref(),
            );
        }
        self.load_material_texture(&mut config, TextureSlot::Normal, source.normal_texture.as_ref());
        self.load_material_texture(
            &mut config,
            TextureSlot::Occlusion,
            source.occlusion_texture.as_ref(),
        );
        self.load_material_texture(
            &mut config,
            TextureSlot::Emissive,
            source.emissive_texture.as_ref(),
        );

        config.assign_uniform(pbr);
        config.init();
        CsMaterial {
            descriptor_config: config,
        }
    }

    fn load_material_texture(
        &mut self,
        config: &mut DescriptorConfig,
        slot: TextureSlot,
        info: Option<&TextureInfo>,
    ) {
        let Some(info) = info else {
            return;
        };
        let Some(index) = info.index else {
            warn!("{}: {:?} texture has no index", self.name, slot);
            return;
        };
        if let Some(image_info) = self.load_texture(index, slot.is_srgb()) {
            config.assign_texture(slot, image_info, info.tex_coord);
        }
    }

    /// Resolves texture `index` to a sampler and an image. The image source
    /// is taken from `KHR_texture_basisu`, then `EXT_texture_webp`, then the
    /// texture itself; the first one present is used even if it is invalid.
    pub(super) fn load_texture(&mut self, index: usize, srgb: bool) -> Option<ImageInfo> {
        let model = self.model;
        let Some(texture) = model.document.textures.get(index) else {
            warn!("{}: texture {} does not exist", self.name, index);
            return None;
        };
        let (kind, source) = if let Some(basisu) = &texture.extensions.khr_texture_basisu {
            ("KTX", Some(basisu.source))
        } else if let Some(webp) = &texture.extensions.ext_texture_webp {
            ("WebP", Some(webp.source))
        } else {
            ("texture", texture.source)
        };
        let image_count = model.document.images.len();
        let Some(source) = source.filter(|&source| source < image_count) else {
            warn!(
                "{}: {} source index must be less than {} but is {:?}",
                self.name, kind, image_count, source
            );
            return None;
        };

        let (mut sampler, use_mipmaps) =
            sampler_state(texture.sampler.and_then(|s| model.document.samplers.get(s)));
        let image = self.load_image(source, use_mipmaps, srgb)?;
        let lod = sampler_lod(&image, use_mipmaps);
        sampler.max_lod = lod;
        sampler.mipmap_filter = if lod > 1 {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        Some(ImageInfo {
            sampler: self.genv.share(sampler),
            image,
        })
    }

    /**
     * Decodes image `index` once per variant. Mipmapped and plain variants are cached
     * separately and a mipmapped image also serves plain requests.
     * Using one image both as sRGB and as linear data is reported but not resolved.
     */
    pub(super) fn load_image(&mut self, index: usize, use_mipmaps: bool, srgb: bool) -> Option<Arc<Image>> {
        let loaded = self.images.images.entry(index).or_default();
        if (loaded.image.is_some() || loaded.image_with_mipmap.is_some()) && loaded.srgb != srgb {
            warn!("{}: image {} used as linear and sRGB", self.name, index);
        }
        if let Some(image) = &loaded.image_with_mipmap {
            return Some(image.clone());
        }
        if !use_mipmaps {
            if let Some(image) = &loaded.image {
                return Some(image.clone());
            }
        }

        let Some((bytes, mime_type)) = self.model.image_source(index) else {
            warn!("{}: image {} has no data", self.name, index);
            return None;
        };
        let decoded = match self.genv.image_decoder.decode(&bytes, mime_type.as_deref()) {
            Ok(decoded) => decoded,
            Err(errors) => {
                warn!("{}: image {} could not be decoded: {}", self.name, index, errors.join("; "));
                return None;
            }
        };
        let Some(image) = make_image(decoded, use_mipmaps, srgb) else {
            warn!("{}: image {} has no usable pixel format", self.name, index);
            return None;
        };

        let image = Arc::new(image);
        let loaded = self.images.images.entry(index).or_default();
        loaded.srgb = srgb;
        if use_mipmaps {
            loaded.image_with_mipmap = Some(image.clone());
        } else {
            loaded.image = Some(image.clone());
        }
        Some(image)
    }
}
