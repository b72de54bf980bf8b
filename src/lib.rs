//! flow-tiles
//!
//! Turns glTF tile content into a renderable scene graph for a streaming
//! 3D-tiles client. A parsed model (document plus resident buffers) goes in,
//! a tree of groups, transforms, state groups and culling / depth-sorting nodes
//! with fully assembled draw commands comes out. Nothing in here performs I/O:
//! fetching tiles and decoding image payloads belong to the caller, which plugs
//! in through the [`context::GraphicsEnvironment`] and the [`styling`] hooks.
//!
//! High-level modules
//! - `builder`: the model builder, scene/node traversal, primitives and materials
//! - `context`: graphics environment (shader sets, shared objects, image decoding)
//! - `data_structures`: glTF document, engine scene graph, vertex and texture data
//! - `pipelines`: topology, shader sets and pipeline state configuration
//! - `resources`: resident model data, accessor views, normal generation, images
//! - `render`: upload of built draw commands into `wgpu` buffers
//! - `styling`: per-primitive visibility and color overrides
//!

pub mod builder;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod styling;

// Re-exports commonly used types for convenience in downstream code.
pub use builder::{CreateModelOptions, Extension, ExtensionList, ModelBuilder, build_model};
pub use context::GraphicsEnvironment;
pub use data_structures::scene_graph::Node;
pub use resources::Model;
