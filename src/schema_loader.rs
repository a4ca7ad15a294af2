//! Catalog contract enforcement.
//!
//! Every catalog document is checked against the bundled JSON Schema
//! (`schema/component_catalog.schema.json`) before it is mapped onto the typed
//! model, so structural problems are reported with JSON pointers instead of
//! serde's first-error messages. The contract is compiled once per process.

use anyhow::{Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::OnceLock;

/// Bundled catalog contract.
pub const CATALOG_CONTRACT: &str = include_str!("../schema/component_catalog.schema.json");

static COMPILED_CONTRACT: OnceLock<std::result::Result<JSONSchema, String>> = OnceLock::new();

fn compiled_contract() -> Result<&'static JSONSchema> {
    COMPILED_CONTRACT
        .get_or_init(|| {
            let raw: Value = serde_json::from_str(CATALOG_CONTRACT)
                .map_err(|err| format!("parsing catalog contract: {err}"))?;
            JSONSchema::compile(&raw).map_err(|err| format!("compiling catalog contract: {err}"))
        })
        .as_ref()
        .map_err(|msg| anyhow!("{msg}"))
}

/// Validate a raw catalog document against the bundled contract, reporting
/// every violation.
pub(crate) fn validate_catalog_contract(document: &Value) -> Result<()> {
    let contract = compiled_contract()?;
    if let Err(errors) = contract.validate(document) {
        let details = errors
            .map(|err| {
                let pointer = err.instance_path.to_string();
                if pointer.is_empty() {
                    err.to_string()
                } else {
                    format!("{pointer}: {err}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        bail!("catalog failed contract validation:\n{details}");
    }
    Ok(())
}
