#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use flow_tiles::{
    CreateModelOptions, ExtensionList, GraphicsEnvironment, Model, Node,
    context::PbrShaderFactory,
    data_structures::document::Document,
    resources::texture::{DecodedImage, ImageDecoder},
};
use serde_json::{Value, json};

pub const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/**
 * Assembles a small glTF model in memory: a JSON document and a single binary buffer that every
 * accessor added through the fixture points into.
 */
pub struct ModelFixture {
    pub json: Value,
    pub buffer: Vec<u8>,
}

impl ModelFixture {
    pub fn new() -> Self {
        Self {
            json: json!({
                "asset": { "version": "2.0" },
                "buffers": [{ "byteLength": 0 }],
            }),
            buffer: Vec::new(),
        }
    }

    /// Appends `value` to the top level array `key` and returns its index.
    pub fn push(&mut self, key: &str, value: Value) -> usize {
        let array = self.json[key].as_array_mut();
        match array {
            Some(array) => {
                array.push(value);
                array.len() - 1
            }
            None => {
                self.json[key] = json!([value]);
                0
            }
        }
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.json[key] = value;
    }

    pub fn add_view(&mut self, bytes: &[u8], stride: Option<usize>) -> usize {
        while self.buffer.len() % 4 != 0 {
            self.buffer.push(0);
        }
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        let mut view = json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        });
        if let Some(stride) = stride {
            view["byteStride"] = json!(stride);
        }
        self.push("bufferViews", view)
    }

    pub fn accessor_raw(
        &mut self,
        bytes: &[u8],
        component_type: u32,
        element_type: &str,
        count: usize,
        normalized: bool,
    ) -> usize {
        let view = self.add_view(bytes, None);
        self.push(
            "accessors",
            json!({
                "bufferView": view,
                "componentType": component_type,
                "type": element_type,
                "count": count,
                "normalized": normalized,
            }),
        )
    }

    pub fn accessor_f32<const N: usize>(&mut self, values: &[[f32; N]]) -> usize {
        let element_type = match N {
            1 => "SCALAR",
            2 => "VEC2",
            3 => "VEC3",
            _ => "VEC4",
        };
        let bytes: Vec<u8> = values
            .iter()
            .flatten()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        self.accessor_raw(&bytes, 5126, element_type, values.len(), false)
    }

    pub fn indices_u8(&mut self, values: &[u8]) -> usize {
        self.accessor_raw(values, 5121, "SCALAR", values.len(), false)
    }

    pub fn indices_u16(&mut self, values: &[u16]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.accessor_raw(&bytes, 5123, "SCALAR", values.len(), false)
    }

    pub fn indices_u32(&mut self, values: &[u32]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.accessor_raw(&bytes, 5125, "SCALAR", values.len(), false)
    }

    /// Positions of a counter-clockwise triangle in the xy plane.
    pub fn triangle(&mut self) -> usize {
        self.accessor_f32(&TRIANGLE)
    }

    pub fn add_mesh(&mut self, primitives: Vec<Value>) -> usize {
        self.push("meshes", json!({ "primitives": primitives }))
    }

    pub fn add_node(&mut self, node: Value) -> usize {
        self.push("nodes", node)
    }

    pub fn add_scene(&mut self, nodes: &[usize]) -> usize {
        self.push("scenes", json!({ "nodes": nodes }))
    }

    pub fn add_material(&mut self, material: Value) -> usize {
        self.push("materials", material)
    }

    pub fn add_image(&mut self, image: Value) -> usize {
        self.push("images", image)
    }

    /// An image stored in a buffer view of the fixture buffer.
    pub fn add_embedded_image(&mut self, bytes: &[u8], mime_type: &str) -> usize {
        let view = self.add_view(bytes, None);
        self.add_image(json!({ "bufferView": view, "mimeType": mime_type }))
    }

    pub fn add_texture(&mut self, texture: Value) -> usize {
        self.push("textures", texture)
    }

    pub fn add_sampler(&mut self, sampler: Value) -> usize {
        self.push("samplers", sampler)
    }

    pub fn document(&self) -> Document {
        let mut json = self.json.clone();
        json["buffers"][0]["byteLength"] = json!(self.buffer.len());
        Document::from_slice(&serde_json::to_vec(&json).expect("fixture serializes"))
            .expect("fixture is a valid document")
    }

    pub fn build(&self) -> Model {
        Model::new(self.document(), vec![self.buffer.clone()])
    }
}

/// A primitive with only positions.
pub fn positions_primitive(position: usize) -> Value {
    json!({ "attributes": { "POSITION": position } })
}

/// Decodes anything into a small RGBA image and counts its calls.
#[derive(Clone, Default)]
pub struct CountingDecoder {
    pub calls: Arc<AtomicUsize>,
}

impl CountingDecoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageDecoder for CountingDecoder {
    fn decode(&self, bytes: &[u8], _mime_type: Option<&str>) -> Result<DecodedImage, Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if bytes.is_empty() {
            return Err(vec!["empty image".to_string()]);
        }
        Ok(DecodedImage {
            pixels: vec![255; 4 * 4 * 4],
            width: 4,
            height: 4,
            channels: 4,
            compressed: None,
            mip_levels: 1,
        })
    }
}

pub fn environment() -> Arc<GraphicsEnvironment> {
    Arc::new(GraphicsEnvironment::default())
}

pub fn environment_with_decoder(decoder: CountingDecoder) -> Arc<GraphicsEnvironment> {
    Arc::new(GraphicsEnvironment::new(
        Box::new(PbrShaderFactory::new()),
        Box::new(decoder),
    ))
}

pub fn build(model: &Model) -> Node {
    flow_tiles::build_model(
        environment(),
        model,
        CreateModelOptions::default(),
        ExtensionList::default(),
    )
}

/// The single primitive node below the root of a one-mesh, no-node model.
pub fn only_primitive(root: &Node) -> &Node {
    let mesh = &root.get_children()[0];
    assert_eq!(mesh.get_children().len(), 1, "expected exactly one primitive");
    &mesh.get_children()[0]
}
