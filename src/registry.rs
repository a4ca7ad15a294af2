//! Component handle registry.
//!
//! Maps a component id to the handle the rendering layer draws with. Handles
//! come from two tiers: entries the host registered up front, and entries a
//! `ComponentResolver` produced on demand (cached after the first success).
//! Resolution failures never escape as errors; the caller gets `None` and
//! renders its fallback.

use crate::validate::ValidatedBlock;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// On-demand resolution of a component id plus its catalog render path.
#[async_trait]
pub trait ComponentResolver<H>: Send + Sync {
    async fn resolve(&self, id: &str, render_path: &str) -> Result<H>;
}

/// Resolver for hosts that register every handle ahead of time.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopResolver;

#[async_trait]
impl<H: Send + 'static> ComponentResolver<H> for NoopResolver {
    async fn resolve(&self, id: &str, render_path: &str) -> Result<H> {
        Err(anyhow!(
            "no resolver configured for component '{id}' ({render_path})"
        ))
    }
}

/// Resolver backed by a fixed render-path → handle table.
#[derive(Clone, Debug)]
pub struct StaticResolver<H> {
    by_render_path: HashMap<String, H>,
}

impl<H> StaticResolver<H> {
    pub fn new(by_render_path: HashMap<String, H>) -> Self {
        Self { by_render_path }
    }
}

#[async_trait]
impl<H: Clone + Send + Sync + 'static> ComponentResolver<H> for StaticResolver<H> {
    async fn resolve(&self, id: &str, render_path: &str) -> Result<H> {
        self.by_render_path
            .get(render_path)
            .cloned()
            .ok_or_else(|| {
                anyhow!("render path '{render_path}' for component '{id}' is not known")
            })
    }
}

/// Component id → handle table with an on-demand fallback.
pub struct ComponentRegistry<H> {
    handles: Mutex<HashMap<String, Arc<H>>>,
    resolver: Arc<dyn ComponentResolver<H>>,
}

impl<H: Send + Sync + 'static> ComponentRegistry<H> {
    pub fn new(resolver: Arc<dyn ComponentResolver<H>>) -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
            resolver,
        }
    }

    /// Registry without on-demand resolution.
    pub fn preregistered() -> Self {
        Self::new(Arc::new(NoopResolver))
    }

    /// Store `handle` under `id`, replacing any existing entry.
    pub async fn register(&self, id: impl Into<String>, handle: H) {
        let mut handles = self.handles.lock().await;
        handles.insert(id.into(), Arc::new(handle));
    }

    /// Handle for `id`, resolving and caching it on first use.
    ///
    /// The table lock is released while the resolver runs. If two callers
    /// race on the same id, both resolve and the later insert wins.
    pub async fn resolve(&self, id: &str, render_path: &str) -> Option<Arc<H>> {
        if let Some(handle) = self.handles.lock().await.get(id) {
            return Some(Arc::clone(handle));
        }

        match self.resolver.resolve(id, render_path).await {
            Ok(handle) => {
                tracing::debug!(id, render_path, "resolved component handle");
                let handle = Arc::new(handle);
                let mut handles = self.handles.lock().await;
                handles.insert(id.to_string(), Arc::clone(&handle));
                Some(handle)
            }
            Err(err) => {
                tracing::warn!(
                    id,
                    render_path,
                    error = %format!("{err:#}"),
                    "component resolution failed"
                );
                None
            }
        }
    }

    /// Handle for a validated block's component.
    pub async fn resolve_block(&self, block: &ValidatedBlock) -> Option<Arc<H>> {
        self.resolve(block.descriptor.id.as_str(), &block.descriptor.render_path)
            .await
    }

    /// Remove the entry for `id`, or every entry when `None`.
    pub async fn clear(&self, id: Option<&str>) {
        let mut handles = self.handles.lock().await;
        match id {
            Some(id) => {
                handles.remove(id);
            }
            None => handles.clear(),
        }
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.handles.lock().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }
}
