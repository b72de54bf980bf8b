//! Image decoding and conversion to engine images.
//!
//! Decoding goes through an [`ImageDecoder`] held by the graphics
//! environment so tile loaders can plug in KTX2/Basis transcoders. The
//! [`DefaultImageDecoder`] handles the formats of the `image` crate.
//! [`make_image`] then picks the texture format the decoded pixels are
//! uploaded as.

use image::GenericImageView;

use crate::data_structures::texture::Image;

/// GPU block-compressed payloads a decoder can hand back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressedFormat {
    Etc1Rgb,
    Etc2Rgb,
    Etc2Rgba,
    EacR11,
    EacRg11,
    Bc1Rgb,
    Bc3Rgba,
    Bc4R,
    Bc5Rg,
    Bc7Rgba,
    Astc4x4Rgba,
    Pvrtc1Rgb,
    Pvrtc1Rgba,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Channels per texel of uncompressed pixels.
    pub channels: u8,
    pub compressed: Option<CompressedFormat>,
    /// Mip levels present in `pixels`.
    pub mip_levels: u32,
}

pub trait ImageDecoder: Send + Sync {
    /// Decodes `bytes`; `mime_type` is a hint, not a promise. Errors come back
    /// as a list of messages.
    fn decode(&self, bytes: &[u8], mime_type: Option<&str>) -> Result<DecodedImage, Vec<String>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultImageDecoder;

impl ImageDecoder for DefaultImageDecoder {
    fn decode(&self, bytes: &[u8], mime_type: Option<&str>) -> Result<DecodedImage, Vec<String>> {
        if matches!(mime_type, Some("image/ktx2")) {
            return Err(vec!["KTX2 images need a transcoding image decoder".to_string()]);
        }
        let format = mime_type.and_then(image::ImageFormat::from_mime_type);
        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(bytes, format)
                .or_else(|_| image::load_from_memory(bytes)),
            None => image::load_from_memory(bytes),
        }
        .map_err(|e| vec![format!("failed to decode image: {}", e)])?;

        let (width, height) = decoded.dimensions();
        let channels = decoded.color().channel_count();
        let pixels = match channels {
            1 => decoded.to_luma8().into_raw(),
            2 => decoded.to_luma_alpha8().into_raw(),
            3 => decoded.to_rgb8().into_raw(),
            _ => decoded.to_rgba8().into_raw(),
        };
        Ok(DecodedImage {
            pixels,
            width,
            height,
            channels: channels.min(4),
            compressed: None,
            mip_levels: 1,
        })
    }
}

fn compressed_format(format: CompressedFormat, srgb: bool) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat as F;
    let pick = |linear, srgb_format| Some(if srgb { srgb_format } else { linear });
    match format {
        CompressedFormat::Etc1Rgb | CompressedFormat::Etc2Rgb => {
            pick(F::Etc2Rgb8Unorm, F::Etc2Rgb8UnormSrgb)
        }
        CompressedFormat::Etc2Rgba => pick(F::Etc2Rgba8Unorm, F::Etc2Rgba8UnormSrgb),
        CompressedFormat::Bc1Rgb => pick(F::Bc1RgbaUnorm, F::Bc1RgbaUnormSrgb),
        CompressedFormat::Bc3Rgba => pick(F::Bc3RgbaUnorm, F::Bc3RgbaUnormSrgb),
        CompressedFormat::Bc7Rgba => pick(F::Bc7RgbaUnorm, F::Bc7RgbaUnormSrgb),
        CompressedFormat::Astc4x4Rgba => pick(
            F::Astc {
                block: wgpu::AstcBlock::B4x4,
                channel: wgpu::AstcChannel::Unorm,
            },
            F::Astc {
                block: wgpu::AstcBlock::B4x4,
                channel: wgpu::AstcChannel::UnormSrgb,
            },
        ),
        // single and dual channel formats have no sRGB variant
        CompressedFormat::Bc4R if !srgb => Some(F::Bc4RUnorm),
        CompressedFormat::Bc5Rg if !srgb => Some(F::Bc5RgUnorm),
        CompressedFormat::EacR11 if !srgb => Some(F::EacR11Unorm),
        CompressedFormat::EacRg11 if !srgb => Some(F::EacRg11Unorm),
        _ => None,
    }
}

/// The texture format for a decoded image, `None` when it cannot be
/// uploaded.
pub fn texture_format(decoded: &DecodedImage, srgb: bool) -> Option<wgpu::TextureFormat> {
    if let Some(compressed) = decoded.compressed {
        return compressed_format(compressed, srgb);
    }
    match decoded.channels {
        1 => Some(wgpu::TextureFormat::R8Unorm),
        2 => Some(wgpu::TextureFormat::Rg8Unorm),
        3 | 4 if srgb => Some(wgpu::TextureFormat::Rgba8UnormSrgb),
        3 | 4 => Some(wgpu::TextureFormat::Rgba8Unorm),
        _ => None,
    }
}

/// Converts a decoded image to an engine image.
///
/// RGB pixels are expanded to RGBA with opaque alpha. Empty images and
/// formats the GPU cannot sample give `None`.
pub fn make_image(decoded: DecodedImage, use_mipmaps: bool, srgb: bool) -> Option<Image> {
    if decoded.pixels.is_empty() || decoded.width == 0 || decoded.height == 0 {
        return None;
    }
    let format = texture_format(&decoded, srgb)?;
    let mip_levels = if use_mipmaps {
        decoded.mip_levels.max(1)
    } else {
        1
    };
    let pixels = if decoded.compressed.is_none() && decoded.channels == 3 {
        decoded
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
            .collect()
    } else {
        decoded.pixels
    };
    Some(Image {
        width: decoded.width,
        height: decoded.height,
        format,
        mip_levels,
        pixels,
    })
}

/// Mip levels a sampler should read for `image`: the stored levels when
/// there are several, otherwise a generated chain when mipmapping is asked
/// for.
pub fn sampler_lod(image: &Image, use_mipmaps: bool) -> u32 {
    if image.mip_levels > 1 {
        return image.mip_levels;
    }
    if !use_mipmaps || (image.width <= 1 && image.height <= 1) {
        return 1;
    }
    image.width.max(image.height).ilog2()
}
