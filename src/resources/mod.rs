//! Resident glTF models and the readers that pull typed data out of them.
//!
//! A [`Model`] is the parsed document plus every byte buffer it references,
//! fully in memory. The builder never does I/O: external buffers and images
//! have to be fetched by the caller and passed in as a resource map keyed by
//! URI.

use std::{borrow::Cow, collections::HashMap};

use anyhow::Context as _;
use base64::Engine as _;

use crate::data_structures::document::Document;

pub mod accessor;
pub mod normals;
pub mod texture;

const GLB_MAGIC: &[u8] = b"glTF";

#[derive(Clone, Debug, Default)]
pub struct Model {
    pub document: Document,
    /// One entry per document buffer, empty when it could not be resolved.
    pub buffers: Vec<Vec<u8>>,
    /// External files referenced by image URIs.
    pub resources: HashMap<String, Vec<u8>>,
}

impl Model {
    pub fn new(document: Document, buffers: Vec<Vec<u8>>) -> Self {
        Self {
            document,
            buffers,
            resources: HashMap::new(),
        }
    }

    /**
     * Parses a `.gltf` JSON document or a binary `.glb` container.
     * Buffers come from the GLB binary chunk, `data:` URIs or `resources`, in that order.
     */
    pub fn from_slice(bytes: &[u8], resources: &HashMap<String, Vec<u8>>) -> anyhow::Result<Self> {
        let (document, mut bin) = if bytes.starts_with(GLB_MAGIC) {
            let glb = gltf::Glb::from_slice(bytes)
                .map_err(|e| anyhow::anyhow!("invalid GLB container: {:?}", e))?;
            let document = Document::from_slice(&glb.json).context("GLB JSON chunk")?;
            (document, glb.bin.map(|bin| bin.into_owned()))
        } else {
            (Document::from_slice(bytes)?, None)
        };

        let mut buffers = Vec::with_capacity(document.buffers.len());
        for (i, buffer) in document.buffers.iter().enumerate() {
            let data = match buffer.uri.as_deref() {
                None => bin.take().unwrap_or_else(|| {
                    log::warn!("buffer {} has no URI and there is no binary chunk", i);
                    Vec::new()
                }),
                Some(uri) if uri.starts_with("data:") => match decode_data_uri(uri) {
                    Some((_, data)) => data,
                    None => {
                        log::warn!("buffer {} has an undecodable data URI", i);
                        Vec::new()
                    }
                },
                Some(uri) => match resources.get(uri) {
                    Some(data) => data.clone(),
                    None => {
                        log::warn!("buffer {} references missing resource {}", i, uri);
                        Vec::new()
                    }
                },
            };
            if data.len() < buffer.byte_length {
                log::warn!(
                    "buffer {} holds {} bytes but declares {}",
                    i,
                    data.len(),
                    buffer.byte_length
                );
            }
            buffers.push(data);
        }

        let image_resources = document
            .images
            .iter()
            .filter_map(|image| image.uri.as_deref())
            .filter(|uri| !uri.starts_with("data:"))
            .filter_map(|uri| Some((uri.to_string(), resources.get(uri)?.clone())))
            .collect();

        Ok(Self {
            document,
            buffers,
            resources: image_resources,
        })
    }

    /// The bytes of a buffer view, `None` when the view or its buffer is
    /// missing or the range is out of bounds.
    pub fn buffer_view_bytes(&self, view: usize) -> Option<&[u8]> {
        let view = self.document.buffer_views.get(view)?;
        let buffer = self.buffers.get(view.buffer)?;
        let end = view.byte_offset.checked_add(view.byte_length)?;
        buffer.get(view.byte_offset..end)
    }

    /// Encoded bytes of an image and its MIME type if known.
    pub fn image_source(&self, index: usize) -> Option<(Cow<'_, [u8]>, Option<String>)> {
        let image = self.document.images.get(index)?;
        if let Some(view) = image.buffer_view {
            let bytes = self.buffer_view_bytes(view)?;
            return Some((Cow::Borrowed(bytes), image.mime_type.clone()));
        }
        let uri = image.uri.as_deref()?;
        if uri.starts_with("data:") {
            let (mime_type, bytes) = decode_data_uri(uri)?;
            return Some((Cow::Owned(bytes), image.mime_type.clone().or(mime_type)));
        }
        let bytes = self.resources.get(uri)?;
        Some((Cow::Borrowed(bytes.as_slice()), image.mime_type.clone()))
    }
}

/// Decodes a base64 `data:` URI into its MIME type and payload.
pub fn decode_data_uri(uri: &str) -> Option<(Option<String>, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()?;
    let mime_type = (!mime_type.is_empty()).then(|| mime_type.to_string());
    Some((mime_type, data))
}
