//! JSON Schema helpers for files the synchronizer owns.
//!
//! Schemas ship inside the binary; callers compile one, then validate a
//! parsed document and get every violation reported in a single error.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Schema for the persisted metadata registry.
pub(crate) const METADATA_REGISTRY_SCHEMA: &str =
    include_str!("../schema/metadata_registry.schema.json");

/// Parse and compile an embedded schema.
pub(crate) fn compile_schema(raw: &str, label: &str) -> Result<JSONSchema> {
    let schema: Value =
        serde_json::from_str(raw).with_context(|| format!("parsing schema {label}"))?;
    JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling schema {label}: {err}"))
}

/// Validate `instance`, joining all violations into one message.
pub(crate) fn validate_value(schema: &JSONSchema, instance: &Value, subject: &str) -> Result<()> {
    if let Err(errors) = schema.validate(instance) {
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
        bail!("{subject} failed schema validation:\n{details}");
    }
    Ok(())
}
