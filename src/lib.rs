//! Streaming extraction, validation and resolution of fenced UI component
//! blocks in language-model output.
//!
//! Text flows through [`BlockExtractor`] (or [`extract`] for whole-text
//! rescans), each completed [`RawBlock`] is checked by [`validate_block`]
//! against a [`Catalog`], and valid blocks are mapped to renderable handles by
//! a [`ComponentRegistry`]. [`BlockPipeline`] chains the three for one stream.

pub mod catalog;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod schema_loader;
pub mod validate;

pub use catalog::{
    Catalog, CatalogCache, CatalogFetcher, ComponentCatalog, ComponentDescriptor, ComponentId,
    DEFAULT_CATALOG_PATH, FieldType, FileFetcher, InputFieldSpec, MemoryFetcher,
    load_catalog_from_path,
};
pub use extract::{
    BLOCK_TAG, BlockExtractor, Extraction, FENCE, LogSink, MalformedBlock, MalformedBlockSink,
    MalformedReason, RawBlock, Segment, Stage, extract, extract_with_sink, placeholder,
    split_display,
};
pub use pipeline::{BlockPipeline, RenderPlan, Slot};
pub use registry::{ComponentRegistry, ComponentResolver, NoopResolver, StaticResolver};
pub use validate::{BlockRejection, ValidatedBlock, Violation, validate_block, validate_blocks};

use std::path::{Path, PathBuf};

/// Path of the bundled sample catalog under `root`.
pub fn default_catalog_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CATALOG_PATH)
}
