//! Catalog source fetchers.
//!
//! A catalog source is an opaque identifier; a `CatalogFetcher` turns it into
//! the catalog JSON text. Hosts with remote catalogs implement the trait
//! themselves (timeouts and retries live there).

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// Resolves a catalog source identifier to the catalog document text.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<String>;
}

/// Reads catalogs from the filesystem. Relative sources resolve against the
/// optional base directory.
#[derive(Clone, Debug, Default)]
pub struct FileFetcher {
    base_dir: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let candidate = PathBuf::from(source);
        match &self.base_dir {
            Some(base) if candidate.is_relative() => base.join(candidate),
            _ => candidate,
        }
    }
}

#[async_trait]
impl CatalogFetcher for FileFetcher {
    async fn fetch(&self, source: &str) -> Result<String> {
        let path = self.resolve(source);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading catalog {}", path.display()))
    }
}

/// In-memory documents keyed by source identifier.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the document served for `source`.
    pub fn insert(&self, source: impl Into<String>, document: impl Into<String>) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        documents.insert(source.into(), document.into());
    }
}

#[async_trait]
impl CatalogFetcher for MemoryFetcher {
    async fn fetch(&self, source: &str) -> Result<String> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        documents
            .get(source)
            .cloned()
            .ok_or_else(|| anyhow!("no in-memory catalog registered for '{source}'"))
    }
}
