//! The graphics environment a model is built against.
//!
//! Models are built off the render thread by the tile loader, so everything
//! here is `Send + Sync`. The environment lives for the whole session and is
//! shared between builds; nothing in it is specific to one model.

use std::{
    any::{Any, TypeId},
    collections::{HashMap, HashSet},
    hash::Hash,
    sync::{Arc, Mutex},
};

use crate::{
    pipelines::{ShaderSet, Topology, TopologyClass},
    resources::texture::{DefaultImageDecoder, ImageDecoder},
};

/// Hands out the shader set used for a primitive topology.
pub trait ShaderFactory: Send + Sync {
    fn shader_set(&self, topology: Topology) -> Arc<ShaderSet>;
}

/// One PBR shader set for point clouds, one for everything else.
#[derive(Debug)]
pub struct PbrShaderFactory {
    pbr: Arc<ShaderSet>,
    points: Arc<ShaderSet>,
}

impl PbrShaderFactory {
    pub fn new() -> Self {
        Self {
            pbr: ShaderSet::pbr("pbr"),
            points: ShaderSet::pbr("pbr_points"),
        }
    }
}

impl Default for PbrShaderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderFactory for PbrShaderFactory {
    fn shader_set(&self, topology: Topology) -> Arc<ShaderSet> {
        match TopologyClass::from(topology) {
            TopologyClass::Points => self.points.clone(),
            TopologyClass::Surfaces => self.pbr.clone(),
        }
    }
}

/// Deduplicates state objects by value.
///
/// `share` returns the already stored `Arc` for a value equal to the one
/// passed in, so equal pipelines, samplers and render states end up as one
/// object on the GPU side.
#[derive(Default)]
pub struct SharedObjects {
    pools: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl SharedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn share<T>(&self, value: T) -> Arc<T>
    where
        T: Hash + Eq + Send + Sync + 'static,
    {
        // A panic while holding the lock cannot leave a pool half-updated
        let mut pools = self.pools.lock().unwrap_or_else(|e| e.into_inner());
        let pool = pools
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(HashSet::<Arc<T>>::new()));
        let Some(pool) = pool.downcast_mut::<HashSet<Arc<T>>>() else {
            log::warn!("shared object pool has the wrong type");
            return Arc::new(value);
        };
        if let Some(shared) = pool.get(&value) {
            return shared.clone();
        }
        let shared = Arc::new(value);
        pool.insert(shared.clone());
        shared
    }
}

impl std::fmt::Debug for SharedObjects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedObjects").finish_non_exhaustive()
    }
}

pub struct GraphicsEnvironment {
    pub shader_factory: Box<dyn ShaderFactory>,
    pub shared_objects: SharedObjects,
    pub image_decoder: Box<dyn ImageDecoder>,
}

impl GraphicsEnvironment {
    pub fn new(shader_factory: Box<dyn ShaderFactory>, image_decoder: Box<dyn ImageDecoder>) -> Self {
        Self {
            shader_factory,
            shared_objects: SharedObjects::new(),
            image_decoder,
        }
    }

    pub fn shader_set(&self, topology: Topology) -> Arc<ShaderSet> {
        self.shader_factory.shader_set(topology)
    }

    pub fn share<T>(&self, value: T) -> Arc<T>
    where
        T: Hash + Eq + Send + Sync + 'static,
    {
        self.shared_objects.share(value)
    }
}

impl Default for GraphicsEnvironment {
    fn default() -> Self {
        Self::new(
            Box::new(PbrShaderFactory::new()),
            Box::new(DefaultImageDecoder),
        )
    }
}
