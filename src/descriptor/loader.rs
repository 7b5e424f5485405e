//! Resolve component names to descriptor documents and models.

use crate::descriptor::{ComponentModel, DescriptorIndex, ModelKind, ModelMapper};
use crate::descriptor::index::DESCRIPTOR_SUFFIX;
use anyhow::Result;
use std::rc::Rc;
use tracing::debug;

/// Find the descriptor for `name` declaring `kind`.
///
/// Candidates are files named `<name>.json`; the first one (in path order)
/// whose raw text contains the kind marker wins. Documents with a matching
/// name but another kind are ignored, and no match at all is `Ok(None)`.
pub fn load_descriptor_of_kind(
    index: &DescriptorIndex,
    name: &str,
    kind: &ModelKind,
) -> Result<Option<Rc<str>>> {
    let file_name = format!("{name}{DESCRIPTOR_SUFFIX}");
    let marker = kind.marker();
    for path in index.named(&file_name) {
        let Some(text) = index.get_or_load(path)? else {
            continue;
        };
        if text.contains(&marker) {
            return Ok(Some(text));
        }
        debug!(path = %path.display(), %kind, "descriptor name matches but kind does not");
    }
    Ok(None)
}

pub fn load_component_descriptor(index: &DescriptorIndex, name: &str) -> Result<Option<Rc<str>>> {
    load_descriptor_of_kind(index, name, &ModelKind::Component)
}

/// Outcome of resolving every discovered name.
#[derive(Debug, Default)]
pub struct LoadedModels {
    pub models: Vec<ComponentModel>,
    /// Discovered names with no component descriptor.
    pub missing: Vec<String>,
}

#[derive(Debug)]
/// Why loading stopped: storage trouble or a descriptor the mapper rejected.
pub enum LoadError {
    Io(anyhow::Error),
    Mapping { name: String, cause: anyhow::Error },
}

/// Load and map the component model for every name, in the given order.
pub fn load_component_models<'a>(
    index: &DescriptorIndex,
    names: impl IntoIterator<Item = &'a String>,
    mapper: &dyn ModelMapper,
) -> Result<LoadedModels, LoadError> {
    let mut loaded = LoadedModels::default();
    for name in names {
        let descriptor = load_component_descriptor(index, name).map_err(LoadError::Io)?;
        let Some(descriptor) = descriptor else {
            debug!(component = %name, "no component descriptor found, skipping");
            loaded.missing.push(name.clone());
            continue;
        };
        let model = mapper
            .map_component(&descriptor)
            .map_err(|cause| LoadError::Mapping {
                name: name.clone(),
                cause,
            })?;
        loaded.models.push(model);
    }
    Ok(loaded)
}
