//! File-backed registry of generated component builder factories.
//!
//! The registry is what makes the pipeline incremental: it remembers every
//! scheme that has ever been generated, so the aggregate factory and the pom
//! section still cover components that were not rebuilt in this run. Every
//! mutation is flushed before returning, so the file on disk always reflects
//! the components processed so far.

use crate::descriptor::EnrichedComponentModel;
use crate::schema_loader::{METADATA_REGISTRY_SCHEMA, compile_schema, validate_value};
use crate::writer::{WriteOutcome, write_if_changed};
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const SCHEMA_LABEL: &str = "metadata_registry.schema.json";

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The entry breaks the registry schema; persisting it would make every
    /// later load fail.
    #[error("registry entry for '{scheme}' is invalid: {details}")]
    InvalidEntry { scheme: String, details: String },
    #[error("{0:#}")]
    Storage(anyhow::Error),
}

#[derive(Debug)]
/// Scheme -> enriched model, mirrored to `metadata_file` on every change.
pub struct MetadataRegistry {
    metadata_file: PathBuf,
    factories_dir: PathBuf,
    components: BTreeMap<String, EnrichedComponentModel>,
    disk_writes: usize,
}

impl MetadataRegistry {
    /// Load the registry backing `metadata_file`.
    ///
    /// A missing file is an empty registry. A file that cannot be read,
    /// parsed, or validated is fatal: continuing from an unknown prior state
    /// would corrupt every later run. Entries whose generated source is no
    /// longer present in `factories_dir` are dropped and the file is
    /// rewritten.
    pub fn load(metadata_file: &Path, factories_dir: &Path) -> Result<Self> {
        let mut registry = Self {
            metadata_file: metadata_file.to_path_buf(),
            factories_dir: factories_dir.to_path_buf(),
            components: BTreeMap::new(),
            disk_writes: 0,
        };

        let raw = match fs::read_to_string(metadata_file) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(file = %metadata_file.display(), "no metadata registry yet");
                return Ok(registry);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading metadata registry {}", metadata_file.display()));
            }
        };
        registry.components = parse_registry(&raw, metadata_file)?;

        let stale: Vec<String> = registry
            .components
            .iter()
            .filter(|(_, model)| !registry.source_exists(&model.generated_class_name))
            .map(|(scheme, _)| scheme.clone())
            .collect();
        if !stale.is_empty() {
            for scheme in &stale {
                debug!(%scheme, "dropping registry entry without a generated source");
                registry.components.remove(scheme);
            }
            registry.flush()?;
        }
        Ok(registry)
    }

    /// Insert or replace the entry for `model`'s scheme, then persist.
    ///
    /// The entry is checked against the registry schema first; a rejected
    /// entry leaves both memory and disk untouched.
    pub fn add_component_and_sync(
        &mut self,
        model: &EnrichedComponentModel,
        generated_class_name: &str,
    ) -> Result<WriteOutcome, RegistryError> {
        let entry = model.clone().with_generated_class_name(generated_class_name);
        let scheme = entry.scheme().to_string();
        check_entry(&scheme, &entry).map_err(|err| RegistryError::InvalidEntry {
            scheme: scheme.clone(),
            details: format!("{err:#}"),
        })?;
        self.components.insert(scheme, entry);
        self.flush().map_err(RegistryError::Storage)
    }

    /// Evict `scheme`, persisting only when something was removed.
    pub fn remove_component_and_sync(
        &mut self,
        scheme: &str,
    ) -> Result<Option<EnrichedComponentModel>> {
        let removed = self.components.remove(scheme);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Everything known to the registry, including entries carried over from
    /// earlier runs, keyed and ordered by scheme.
    pub fn component_cache(&self) -> &BTreeMap<String, EnrichedComponentModel> {
        &self.components
    }

    pub fn entry(&self, scheme: &str) -> Option<&EnrichedComponentModel> {
        let entry = self.components.get(scheme);
        if entry.is_none() {
            debug!(%scheme, "no registry entry");
        }
        entry
    }

    pub fn generated_class_name(&self, scheme: &str) -> Option<&str> {
        self.entry(scheme)
            .map(|model| model.generated_class_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn metadata_file(&self) -> &Path {
        &self.metadata_file
    }

    /// Flushes that actually changed the file on disk.
    pub fn disk_writes(&self) -> usize {
        self.disk_writes
    }

    fn source_exists(&self, class_name: &str) -> bool {
        self.factories_dir.join(format!("{class_name}.java")).is_file()
    }

    fn flush(&mut self) -> Result<WriteOutcome> {
        let mut rendered = serde_json::to_string_pretty(&self.components)
            .context("serializing metadata registry")?;
        rendered.push('\n');
        let outcome = write_if_changed(&self.metadata_file, &rendered).with_context(|| {
            format!("flushing metadata registry {}", self.metadata_file.display())
        })?;
        if outcome.changed() {
            self.disk_writes += 1;
        }
        Ok(outcome)
    }
}

fn parse_registry(raw: &str, path: &Path) -> Result<BTreeMap<String, EnrichedComponentModel>> {
    let value: Value = serde_json::from_str(raw)
        .with_context(|| format!("metadata registry {} is not valid JSON", path.display()))?;
    let schema = compile_schema(METADATA_REGISTRY_SCHEMA, SCHEMA_LABEL)?;
    validate_value(
        &schema,
        &value,
        &format!("metadata registry {}", path.display()),
    )?;
    let components: BTreeMap<String, EnrichedComponentModel> = serde_json::from_value(value)
        .with_context(|| format!("decoding metadata registry {}", path.display()))?;
    for (scheme, model) in &components {
        if scheme != model.scheme() {
            bail!(
                "metadata registry {} maps key '{}' to scheme '{}'",
                path.display(),
                scheme,
                model.scheme()
            );
        }
    }
    Ok(components)
}

/// Validate `entry` exactly as `load` would see it once persisted.
fn check_entry(scheme: &str, entry: &EnrichedComponentModel) -> Result<()> {
    let mut document = Map::new();
    document.insert(
        scheme.to_string(),
        serde_json::to_value(entry).context("serializing registry entry")?,
    );
    let schema = compile_schema(METADATA_REGISTRY_SCHEMA, SCHEMA_LABEL)?;
    validate_value(&schema, &Value::Object(document), &format!("entry '{scheme}'"))
}
