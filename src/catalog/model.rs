//! Serde model for component catalog documents.
//!
//! These types mirror the catalog JSON one-to-one. They carry no invariants of
//! their own; `Catalog` (see `index.rs`) is the checked, shareable view that
//! the validator and registry consume.

use crate::schema_loader::validate_catalog_contract;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Unique identifier of a component inside a catalog.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Declared JSON kind of a payload field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    /// Whether `value` has this kind. `null` never matches.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::String, Value::String(_))
                | (FieldType::Number, Value::Number(_))
                | (FieldType::Boolean, Value::Bool(_))
                | (FieldType::Array, Value::Array(_))
                | (FieldType::Object, Value::Object(_))
        )
    }

    /// Enum literals are only meaningful for scalar kinds that compare by value.
    pub fn supports_enum(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Number)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the JSON kind of `value`, as reported in type mismatches.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema for one payload field. `properties` nests the same shape for
/// `object` fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, alias = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, InputFieldSpec>>,
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub id: ComponentId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub render_path: String,
    #[serde(default)]
    pub input_schema: BTreeMap<String, InputFieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Map<String, Value>>,
}

/// Raw catalog document as fetched from a source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentCatalog {
    pub version: String,
    pub components: Vec<ComponentDescriptor>,
}

/// Parse a catalog document, checking it against the bundled catalog
/// contract before mapping it onto the typed model.
pub fn parse_catalog_document(raw: &str) -> Result<ComponentCatalog> {
    let value: Value = serde_json::from_str(raw).context("parsing catalog JSON")?;
    validate_catalog_contract(&value)?;
    serde_json::from_value(value).context("mapping catalog document onto component model")
}

pub fn load_catalog_from_path(path: &Path) -> Result<ComponentCatalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    parse_catalog_document(&raw).with_context(|| format!("loading catalog {}", path.display()))
}
