#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use blockfence::{BLOCK_TAG, Catalog, CatalogFetcher, MemoryFetcher, default_catalog_path};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn sample_catalog_path() -> PathBuf {
    default_catalog_path(&repo_root())
}

pub fn sample_catalog() -> Result<Catalog> {
    Catalog::load(&sample_catalog_path())
}

// Wraps a body in the block fence exactly as a model would emit it.
pub fn fenced(body: &str) -> String {
    format!("```{BLOCK_TAG}\n{body}\n```")
}

pub fn block_text(id: &str, payload: Value) -> String {
    fenced(&json!({"id": id, "payload": payload}).to_string())
}

// Builds a catalog from `(id, inputSchema)` pairs through a temp file so the
// full load path (contract check, typed parse, index) is exercised.
pub fn catalog_with(components: &[(&str, Value)]) -> Result<Catalog> {
    let document = catalog_document(components);
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, &document)?;
    file.flush()?;
    Catalog::load(file.path()).context("failed to load fixture catalog")
}

pub fn catalog_document(components: &[(&str, Value)]) -> Value {
    let components: Vec<Value> = components
        .iter()
        .map(|(id, schema)| {
            json!({
                "id": id,
                "category": "fixture",
                "description": format!("fixture {id}"),
                "renderPath": format!("fixtures/{}", id.to_lowercase()),
                "inputSchema": schema
            })
        })
        .collect();
    json!({"version": "fixture_v1", "components": components})
}

// Counts fetches so cache tests can assert how often the source was hit.
#[derive(Default)]
pub struct CountingFetcher {
    pub inner: MemoryFetcher,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn with_document(source: &str, document: &Value) -> Self {
        let fetcher = Self::default();
        fetcher.inner.insert(source, document.to_string());
        fetcher
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogFetcher for CountingFetcher {
    async fn fetch(&self, source: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(source).await
    }
}
