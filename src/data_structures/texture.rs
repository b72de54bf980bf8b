//! Engine images and samplers.
//!
//! This module provides [`Image`], a decoded pixel buffer tagged with the
//! GPU texture format it is uploaded as, [`Sampler`], the sampling state a
//! material texture is read with, and [`ImageInfo`], the pair of both bound
//! to one material texture slot.

use std::sync::Arc;

/// A decoded image ready for upload.
///
/// Pixel data is tightly packed rows of `format` texels (or 4x4 blocks for
/// block-compressed formats), top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    /// Mip levels stored in `pixels`, base level first.
    pub mip_levels: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    pub fn is_srgb(&self) -> bool {
        self.format.is_srgb()
    }
}

/// Sampling state of a material texture.
///
/// Compared and hashed structurally so identical samplers can be shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sampler {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::FilterMode,
    /// Mip levels the sampler reads, 1 when mipmapping is off. Levels the
    /// image does not store are generated on upload.
    pub max_lod: u32,
}

impl Default for Sampler {
    /// glTF default: repeat wrapping, linear filtering, no mipmaps.
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            max_lod: 1,
        }
    }
}

/// A sampler and an image bound together to one texture slot.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    pub sampler: Arc<Sampler>,
    pub image: Arc<Image>,
}
