//! Component catalog wiring.
//!
//! A catalog is a versioned list of component descriptors, each declaring the
//! payload schema its blocks must satisfy. `Catalog` is the checked, indexed
//! snapshot; `CatalogCache` loads snapshots through a `CatalogFetcher` and
//! keeps them for a caller-chosen TTL.

pub mod cache;
pub mod fetch;
pub mod index;
pub mod model;

pub use cache::CatalogCache;
pub use fetch::{CatalogFetcher, FileFetcher, MemoryFetcher};
pub use index::{Catalog, allowed_catalog_versions};
pub use model::{
    ComponentCatalog, ComponentDescriptor, ComponentId, FieldType, InputFieldSpec,
    load_catalog_from_path, parse_catalog_document, value_kind,
};

/// Default relative path to the bundled sample catalog.
pub const DEFAULT_CATALOG_PATH: &str = "catalogs/sample_components.json";
