//! Engine and interchange data structures.
//!
//! This module contains the plain data types the builder reads and produces:
//!
//! - `document` is the lenient glTF 2.0 JSON document
//! - `scene_graph` holds the engine scene graph nodes and draw commands
//! - `vertex` contains typed vertex arrays and draw indices
//! - `texture` holds engine images, samplers and image/sampler pairs
//! - `transform` builds node transforms from matrices or TRS triples
//! - `bounds` contains bounding boxes and spheres

pub mod bounds;
pub mod document;
pub mod scene_graph;
pub mod texture;
pub mod transform;
pub mod vertex;
