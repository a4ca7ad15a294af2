//! Indexed, checked view of a component catalog.
//!
//! The index is strict: duplicate ids, malformed versions, field specs whose
//! defaults or enum literals disagree with their declared type, and examples
//! that violate their own input schema all fail the load.

use crate::catalog::model::{
    ComponentCatalog, ComponentDescriptor, ComponentId, FieldType, InputFieldSpec,
    load_catalog_from_path, parse_catalog_document, value_kind,
};
use crate::validate::{check_payload, literal_eq};
use anyhow::{Context, Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

// Unset means any well-formed version is accepted.
const ENV_ALLOWED_CATALOG_VERSIONS: &str = "BLOCKFENCE_ALLOWED_CATALOG_VERSIONS";

/// Catalog plus a lookup table keyed by component id.
///
/// Immutable once built; refreshed catalogs are new instances shared behind
/// `Arc`.
#[derive(Debug)]
pub struct Catalog {
    version: String,
    components: Vec<Arc<ComponentDescriptor>>,
    by_id: BTreeMap<ComponentId, usize>,
}

impl Catalog {
    /// Check a parsed document and build the id index.
    pub fn from_document(document: ComponentCatalog) -> Result<Self> {
        validate_version(&document.version)?;
        if document.components.is_empty() {
            bail!("catalog contains no components");
        }

        let mut by_id = BTreeMap::new();
        let mut components = Vec::with_capacity(document.components.len());
        for descriptor in document.components {
            if descriptor.id.0.trim().is_empty() {
                bail!("encountered component with no id");
            }
            if by_id.contains_key(&descriptor.id) {
                bail!("duplicate component id {}", descriptor.id);
            }
            if descriptor.render_path.trim().is_empty() {
                bail!("component {} has an empty renderPath", descriptor.id);
            }
            for (name, spec) in &descriptor.input_schema {
                validate_field_spec(name, spec)
                    .with_context(|| format!("component {} inputSchema", descriptor.id))?;
            }
            if let Some(example) = &descriptor.example {
                let violations = check_payload(example, &descriptor.input_schema);
                if !violations.is_empty() {
                    let details = violations
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; ");
                    bail!(
                        "component {} example does not satisfy its inputSchema: {details}",
                        descriptor.id
                    );
                }
            }
            by_id.insert(descriptor.id.clone(), components.len());
            components.push(Arc::new(descriptor));
        }

        Ok(Self {
            version: document.version,
            components,
            by_id,
        })
    }

    /// Parse and check a catalog from its JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Self::from_document(parse_catalog_document(raw)?)
    }

    /// Load and check the catalog stored at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let document =
            load_catalog_from_path(path).with_context(|| format!("loading {}", path.display()))?;
        Self::from_document(document).with_context(|| format!("indexing {}", path.display()))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a component by id.
    pub fn component(&self, id: &str) -> Option<&Arc<ComponentDescriptor>> {
        self.by_id.get(id).map(|idx| &self.components[*idx])
    }

    /// Component ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.iter().map(|descriptor| &descriptor.id)
    }

    /// Descriptors in catalog order.
    pub fn components(&self) -> impl Iterator<Item = &Arc<ComponentDescriptor>> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        bail!("catalog version must not be empty");
    }
    if !version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        bail!("catalog version must match ^[A-Za-z0-9_.-]+$, got {version}");
    }

    if let Some(allowed) = allowed_catalog_versions() {
        if !allowed.contains(version) {
            bail!("catalog version '{version}' not in allowed set {allowed:?}");
        }
    }
    Ok(())
}

/// Catalog versions accepted by this process, if restricted via
/// `BLOCKFENCE_ALLOWED_CATALOG_VERSIONS`.
pub fn allowed_catalog_versions() -> Option<BTreeSet<String>> {
    let raw = std::env::var(ENV_ALLOWED_CATALOG_VERSIONS).ok()?;
    let versions: BTreeSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if versions.is_empty() {
        None
    } else {
        Some(versions)
    }
}

fn validate_field_spec(path: &str, spec: &InputFieldSpec) -> Result<()> {
    if let Some(default) = &spec.default {
        if !spec.field_type.matches(default) {
            bail!(
                "field {path}: default is {} but type is {}",
                value_kind(default),
                spec.field_type
            );
        }
    }

    if let Some(values) = &spec.enum_values {
        if !spec.field_type.supports_enum() {
            bail!("field {path}: enumValues not allowed on {} fields", spec.field_type);
        }
        if values.is_empty() {
            bail!("field {path}: enumValues must not be empty");
        }
        if let Some(bad) = values.iter().find(|v| !spec.field_type.matches(v)) {
            bail!(
                "field {path}: enum literal {bad} is not a {}",
                spec.field_type
            );
        }
        if let Some(default) = &spec.default {
            if !values.iter().any(|candidate| literal_eq(candidate, default)) {
                bail!("field {path}: default {default} is not one of enumValues");
            }
        }
    }

    if let Some(properties) = &spec.properties {
        if spec.field_type != FieldType::Object {
            bail!("field {path}: properties only allowed on object fields");
        }
        for (name, nested) in properties {
            validate_field_spec(&format!("{path}.{name}"), nested)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog_with_field(field: serde_json::Value) -> Result<Catalog> {
        Catalog::from_json_str(
            &json!({
                "version": "ui_catalog_v1",
                "components": [{
                    "id": "Badge",
                    "renderPath": "badges/badge",
                    "inputSchema": {"tone": field}
                }]
            })
            .to_string(),
        )
    }

    #[test]
    fn default_must_be_enum_member() {
        let err = catalog_with_field(json!({
            "type": "string",
            "enumValues": ["info", "warn"],
            "default": "error"
        }))
        .unwrap_err();
        assert!(format!("{err:#}").contains("not one of enumValues"));
    }

    #[test]
    fn numeric_default_matches_enum_by_value() -> Result<()> {
        let catalog = catalog_with_field(json!({
            "type": "number",
            "enumValues": [1, 2],
            "default": 1.0
        }))?;
        assert!(catalog.component("Badge").is_some());
        Ok(())
    }

    #[test]
    fn enum_rejected_on_boolean() {
        assert!(catalog_with_field(json!({"type": "boolean", "enumValues": [true]})).is_err());
    }

    #[test]
    fn default_must_match_type() {
        assert!(catalog_with_field(json!({"type": "number", "default": "3"})).is_err());
    }

    #[test]
    fn nested_properties_are_checked() {
        let err = catalog_with_field(json!({
            "type": "object",
            "properties": {"level": {"type": "number", "enumValues": [1, "two"]}}
        }))
        .unwrap_err();
        assert!(format!("{err:#}").contains("tone.level"));
    }

    #[test]
    fn lookup_preserves_catalog_order() -> Result<()> {
        let catalog = Catalog::from_json_str(
            &json!({
                "version": "v2",
                "components": [
                    {"id": "Zeta", "renderPath": "z"},
                    {"id": "Alpha", "renderPath": "a"}
                ]
            })
            .to_string(),
        )?;
        let ids: Vec<_> = catalog.ids().map(ComponentId::as_str).collect();
        assert_eq!(ids, ["Zeta", "Alpha"]);
        assert_eq!(catalog.component("Alpha").map(|c| c.render_path.as_str()), Some("a"));
        assert!(catalog.component("Missing").is_none());
        Ok(())
    }
}
