//! In-memory component models and the descriptor -> model mapping seam.
//!
//! `ComponentModel` keeps only the identity fields the synchronizer keys on
//! (scheme, implementing class, owning module) and carries everything else
//! from the descriptor as opaque metadata for the generator. The mapping
//! itself sits behind [`ModelMapper`] so hosts can swap in a richer parser.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One logical component as described by its descriptor document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentModel {
    pub scheme: String,
    /// Fully qualified implementing class.
    pub java_type: String,
    pub group_id: String,
    pub artifact_id: String,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, Value>,
}

impl ComponentModel {
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description").and_then(Value::as_str)
    }

    /// Simple name of the implementing class (`FtpComponent` for
    /// `org.apache.camel.component.file.remote.FtpComponent`).
    pub fn java_simple_name(&self) -> &str {
        self.java_type
            .rsplit('.')
            .next()
            .unwrap_or(self.java_type.as_str())
    }

    /// `componentProperties` copied from the descriptor, in name order.
    pub fn component_properties(&self) -> Option<&Map<String, Value>> {
        self.metadata
            .get(COMPONENT_PROPERTIES)
            .and_then(Value::as_object)
    }
}

/// A model plus what this generation pass learned about it.
///
/// `generated_class_name` starts out derived from the scheme and is replaced
/// by whatever name the generator actually used once the model is registered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedComponentModel {
    pub generated_class_name: String,
    #[serde(default)]
    pub has_aliases: bool,
    pub component: ComponentModel,
}

impl EnrichedComponentModel {
    pub fn new(component: ComponentModel, has_aliases: bool) -> Self {
        Self {
            generated_class_name: builder_factory_class_name(&component.scheme),
            has_aliases,
            component,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.component.scheme
    }

    pub fn with_generated_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.generated_class_name = class_name.into();
        self
    }
}

/// Turns descriptor text into a [`ComponentModel`].
pub trait ModelMapper {
    fn map_component(&self, descriptor: &str) -> Result<ComponentModel>;
}

const COMPONENT_PROPERTIES: &str = "componentProperties";

/// Default mapper for the upstream JSON layout: a top-level `component`
/// object holding the identity fields, plus an optional
/// `componentProperties` object that is kept as metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonModelMapper;

impl ModelMapper for JsonModelMapper {
    fn map_component(&self, descriptor: &str) -> Result<ComponentModel> {
        let value: Value = serde_json::from_str(descriptor).context("descriptor is not valid JSON")?;
        let Some(component) = value.get("component") else {
            bail!("descriptor has no 'component' object");
        };
        let mut model: ComponentModel = serde_json::from_value(component.clone())
            .context("descriptor 'component' object is missing identity fields")?;
        for (field, value) in [
            ("scheme", &model.scheme),
            ("javaType", &model.java_type),
            ("groupId", &model.group_id),
            ("artifactId", &model.artifact_id),
        ] {
            if value.trim().is_empty() {
                bail!("descriptor declares an empty {field}");
            }
        }
        if let Some(props) = value.get(COMPONENT_PROPERTIES) {
            model
                .metadata
                .insert(COMPONENT_PROPERTIES.to_string(), props.clone());
        }
        Ok(model)
    }
}

/// `aws2-s3` -> `Aws2S3ComponentBuilderFactory`.
pub fn builder_factory_class_name(scheme: &str) -> String {
    format!("{}ComponentBuilderFactory", upper_camel_case(scheme))
}

pub(crate) fn upper_camel_case(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `aws2-s3` -> `aws2S3`.
pub(crate) fn lower_camel_case(raw: &str) -> String {
    let upper = upper_camel_case(raw);
    let mut chars = upper.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
