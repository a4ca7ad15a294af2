//! Block validation against the component catalog.
//!
//! The schema dialect is deliberately small: per-field kind, required flag,
//! default, enum literals for scalars, and nested `properties` for objects.
//! Undeclared payload fields are tolerated. Every violation in a block is
//! collected so one rejection carries the complete list.

use crate::catalog::{
    Catalog, ComponentDescriptor, ComponentId, FieldType, InputFieldSpec, value_kind,
};
use crate::extract::RawBlock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// One violated constraint. Field paths are dotted for nested objects
/// (`address.city`).
#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("missing required field '{field}'")]
    MissingField { field: String },
    #[error("field '{field}' should be {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: &'static str,
    },
    #[error("field '{field}' has value {value}, expected one of {}", join_values(.allowed))]
    InvalidEnumValue {
        field: String,
        value: Value,
        allowed: Vec<Value>,
    },
}

impl Violation {
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingField { field }
            | Violation::TypeMismatch { field, .. }
            | Violation::InvalidEnumValue { field, .. } => field,
        }
    }
}

/// Why a block was not accepted.
#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockRejection {
    /// The id is not in the catalog; `known_ids` lists every id that is, in
    /// catalog order.
    #[error("unknown component '{id}' (known: {})", .known_ids.join(", "))]
    UnknownComponent { id: String, known_ids: Vec<String> },
    #[error("component '{id}' payload rejected: {}", ViolationList(.violations))]
    SchemaViolations {
        id: String,
        violations: Vec<Violation>,
    },
}

impl BlockRejection {
    pub fn component_id(&self) -> &str {
        match self {
            BlockRejection::UnknownComponent { id, .. }
            | BlockRejection::SchemaViolations { id, .. } => id,
        }
    }

    /// Schema violations; empty for unknown components.
    pub fn violations(&self) -> &[Violation] {
        match self {
            BlockRejection::UnknownComponent { .. } => &[],
            BlockRejection::SchemaViolations { violations, .. } => violations,
        }
    }
}

struct ViolationList<'a>(&'a [Violation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A block whose payload satisfies its component's input schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidatedBlock {
    #[serde(flatten)]
    pub block: RawBlock,
    #[serde(skip)]
    pub descriptor: Arc<ComponentDescriptor>,
}

impl ValidatedBlock {
    pub fn component_id(&self) -> &ComponentId {
        &self.descriptor.id
    }

    pub fn source_span(&self) -> usize {
        self.block.source_span
    }

    /// Payload with declared defaults filled in for absent fields, at every
    /// nesting level that is present.
    pub fn props(&self) -> Map<String, Value> {
        let mut props = self.block.payload.clone();
        apply_defaults(&mut props, &self.descriptor.input_schema);
        props
    }
}

fn apply_defaults(object: &mut Map<String, Value>, schema: &BTreeMap<String, InputFieldSpec>) {
    for (name, spec) in schema {
        match object.get_mut(name) {
            Some(Value::Object(nested)) => {
                if let Some(properties) = &spec.properties {
                    apply_defaults(nested, properties);
                }
            }
            Some(_) => {}
            None => {
                if let Some(default) = &spec.default {
                    object.insert(name.clone(), default.clone());
                }
            }
        }
    }
}

/// Check one block against the catalog.
pub fn validate_block(
    block: &RawBlock,
    catalog: &Catalog,
) -> Result<ValidatedBlock, BlockRejection> {
    let Some(descriptor) = catalog.component(&block.component_id) else {
        return Err(BlockRejection::UnknownComponent {
            id: block.component_id.clone(),
            known_ids: catalog.ids().map(|id| id.0.clone()).collect(),
        });
    };

    let violations = check_payload(&block.payload, &descriptor.input_schema);
    if !violations.is_empty() {
        return Err(BlockRejection::SchemaViolations {
            id: block.component_id.clone(),
            violations,
        });
    }

    Ok(ValidatedBlock {
        block: block.clone(),
        descriptor: Arc::clone(descriptor),
    })
}

/// Check every block, preserving order.
pub fn validate_blocks(
    blocks: &[RawBlock],
    catalog: &Catalog,
) -> Vec<Result<ValidatedBlock, BlockRejection>> {
    blocks
        .iter()
        .map(|block| validate_block(block, catalog))
        .collect()
}

/// Every violation of `schema` in `payload`, in schema field order.
pub(crate) fn check_payload(
    payload: &Map<String, Value>,
    schema: &BTreeMap<String, InputFieldSpec>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_fields(payload, schema, "", &mut violations);
    violations
}

fn check_fields(
    object: &Map<String, Value>,
    schema: &BTreeMap<String, InputFieldSpec>,
    prefix: &str,
    violations: &mut Vec<Violation>,
) {
    for (name, spec) in schema {
        let field = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        let Some(value) = object.get(name) else {
            if spec.required && spec.default.is_none() {
                violations.push(Violation::MissingField { field });
            }
            continue;
        };

        if !spec.field_type.matches(value) {
            violations.push(Violation::TypeMismatch {
                field,
                expected: spec.field_type,
                found: value_kind(value),
            });
            continue;
        }

        if let Some(allowed) = &spec.enum_values {
            if !allowed.iter().any(|candidate| literal_eq(candidate, value)) {
                violations.push(Violation::InvalidEnumValue {
                    field: field.clone(),
                    value: value.clone(),
                    allowed: allowed.clone(),
                });
            }
        }

        if let (Value::Object(nested), Some(properties)) = (value, &spec.properties) {
            check_fields(nested, properties, &field, violations);
        }
    }
}

// `1` and `1.0` are the same literal for enum purposes.
pub(crate) fn literal_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::from_json_str(
            &json!({
                "version": "v1",
                "components": [{
                    "id": "Profile",
                    "renderPath": "profile/card",
                    "inputSchema": {
                        "name": {"type": "string", "required": true},
                        "size": {"type": "number", "enumValues": [1, 2, 3]},
                        "address": {
                            "type": "object",
                            "properties": {
                                "city": {"type": "string", "required": true},
                                "country": {"type": "string", "default": "NZ"}
                            }
                        }
                    }
                }]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn raw(payload: Value) -> RawBlock {
        RawBlock {
            component_id: "Profile".to_string(),
            payload: payload.as_object().cloned().unwrap(),
            source_span: 0,
        }
    }

    #[test]
    fn nested_violations_use_dotted_paths() {
        let err =
            validate_block(&raw(json!({"name": "a", "address": {}})), &catalog()).unwrap_err();
        assert_eq!(
            err.violations(),
            [Violation::MissingField {
                field: "address.city".to_string()
            }]
        );
    }

    #[test]
    fn enum_accepts_float_spelling_of_integer() {
        assert!(validate_block(&raw(json!({"name": "a", "size": 2.0})), &catalog()).is_ok());
        let err = validate_block(&raw(json!({"name": "a", "size": 4})), &catalog()).unwrap_err();
        assert!(matches!(
            err.violations(),
            [Violation::InvalidEnumValue { field, .. }] if field.as_str() == "size"
        ));
    }

    #[test]
    fn props_fill_nested_defaults() {
        let validated = validate_block(
            &raw(json!({"name": "a", "address": {"city": "Wellington"}})),
            &catalog(),
        )
        .unwrap();
        let props = validated.props();
        assert_eq!(props["address"]["country"], "NZ");
        assert!(props.get("size").is_none());
    }

    #[test]
    fn rejection_message_lists_every_violation() {
        let err = validate_block(&raw(json!({"size": "big"})), &catalog()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing required field 'name'"), "{message}");
        assert!(message.contains("field 'size' should be number, found string"), "{message}");
    }
}
