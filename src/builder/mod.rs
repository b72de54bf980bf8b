//! Scene graph construction from a glTF model.
//!
//! [`ModelBuilder`] walks one [`Model`] and produces a [`Node`] tree: groups
//! and transforms for the glTF node hierarchy, and for every primitive a
//! state group with its pipeline, descriptor sets and draw command, wrapped
//! in a cull node or a depth-sorted node.
//!
//! A builder is used for exactly one model. Its material and image caches
//! live as long as the builder and are never shared between models.
//!
//! Problems in the source are isolated as narrowly as possible: a bad texture
//! costs its material slot, a bad primitive costs that primitive, a bad node
//! reference costs that subtree. Everything is reported through `log`,
//! prefixed with the model name.

use std::{collections::HashSet, sync::Arc};

use crate::{
    context::GraphicsEnvironment,
    data_structures::scene_graph::Node,
    resources::Model,
    styling::{Styling, Stylist},
};

mod material;
mod node;
mod primitive;

pub use material::CsMaterial;

use material::{ImageCache, MaterialCache};

/// Name used in log messages when the model does not carry a tile URL.
pub const DEFAULT_NAME: &str = "glTF";
pub const MAX_NAME_LENGTH: usize = 256;
/// Root `extras` key a tile loader stores the content URL under.
pub const TILE_URL_EXTRA: &str = "Cesium3DTiles_TileUrl";

/// Optional behaviour that has to be switched on per build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extension {
    /// 3D-tiles specifics such as raster overlay texture coordinates.
    Tiles3d,
    /// Lets the styling provider of the options hide and recolor primitives.
    Styling,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionList(HashSet<Extension>);

impl ExtensionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, extension: Extension) {
        self.0.insert(extension);
    }

    pub fn is_enabled(&self, extension: Extension) -> bool {
        self.0.contains(&extension)
    }
}

impl FromIterator<Extension> for ExtensionList {
    fn from_iter<I: IntoIterator<Item = Extension>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Default)]
pub struct CreateModelOptions {
    /// Adds the raster overlay maps to every material.
    pub render_overlays: bool,
    pub styling: Option<Arc<dyn Styling>>,
}

impl std::fmt::Debug for CreateModelOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateModelOptions")
            .field("render_overlays", &self.render_overlays)
            .field("styling", &self.styling.is_some())
            .finish()
    }
}

/// Shortens `s` to at most `max_length` characters by replacing its middle
/// with `...`. For lengths of 3 or less the string is cut from the right.
pub fn constrain_length(s: &str, max_length: usize) -> String {
    let length = s.chars().count();
    if length <= max_length {
        return s.to_string();
    }
    if max_length <= 3 {
        return s.chars().take(max_length).collect();
    }
    let kept = max_length - 3;
    let prefix_length = kept.div_ceil(2);
    let suffix_length = kept / 2;
    let prefix: String = s.chars().take(prefix_length).collect();
    let suffix: String = s.chars().skip(length - suffix_length).collect();
    format!("{}...{}", prefix, suffix)
}

pub struct ModelBuilder<'a> {
    genv: Arc<GraphicsEnvironment>,
    model: &'a Model,
    options: CreateModelOptions,
    extensions: ExtensionList,
    name: String,
    stylist: Option<Box<dyn Stylist>>,
    materials: MaterialCache,
    images: ImageCache,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(
        genv: Arc<GraphicsEnvironment>,
        model: &'a Model,
        options: CreateModelOptions,
        extensions: ExtensionList,
    ) -> Self {
        let name = model
            .document
            .extra_str(TILE_URL_EXTRA)
            .map(|url| constrain_length(url, MAX_NAME_LENGTH))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let stylist = match &options.styling {
            Some(styling) if extensions.is_enabled(Extension::Styling) => styling.stylist(model),
            _ => None,
        };
        Self {
            genv,
            model,
            options,
            extensions,
            name,
            stylist,
            materials: MaterialCache::default(),
            images: ImageCache::default(),
        }
    }

    /// Name used to prefix diagnostics for this model.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self, extension: Extension) -> bool {
        self.extensions.is_enabled(extension)
    }

    /**
     * Builds the scene graph of the whole model.
     *
     * Shows the default scene if it is valid, else the first scene. Without scenes the first
     * node is the root, and without nodes all meshes are shown side by side.
     */
    pub fn build(mut self) -> Node {
        let model = self.model;
        let document = &model.document;
        let scene = document
            .scene
            .and_then(|index| document.scenes.get(index))
            .or_else(|| document.scenes.first());

        if let Some(scene) = scene {
            let mut root = Node::group();
            for &node in &scene.nodes {
                if let Some(child) = self.load_node(node, &mut Vec::new()) {
                    // groups always accept children
                    let _ = root.add_child(child);
                }
            }
            return root;
        }
        if !document.nodes.is_empty() {
            return self.load_node(0, &mut Vec::new()).unwrap_or_else(Node::group);
        }
        let mut root = Node::group();
        for mesh in 0..document.meshes.len() {
            if let Some(child) = self.load_mesh(mesh) {
                let _ = root.add_child(child);
            }
        }
        root
    }
}

/// Builds the scene graph of `model` in one go.
pub fn build_model(
    genv: Arc<GraphicsEnvironment>,
    model: &Model,
    options: CreateModelOptions,
    extensions: ExtensionList,
) -> Node {
    ModelBuilder::new(genv, model, options, extensions).build()
}
