use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Declared `kind` of a descriptor document.
///
/// Upstream tooling writes several model kinds that may share a file name
/// (a component and a data format both called `avro`, for instance); the kind
/// marker is what tells them apart. `Other` keeps unknown kinds representable.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ModelKind {
    Component,
    DataFormat,
    Language,
    Model,
    Other(String),
}

impl ModelKind {
    pub fn as_str(&self) -> &str {
        match self {
            ModelKind::Component => "component",
            ModelKind::DataFormat => "dataformat",
            ModelKind::Language => "language",
            ModelKind::Model => "model",
            ModelKind::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "component" => ModelKind::Component,
            "dataformat" => ModelKind::DataFormat,
            "language" => ModelKind::Language,
            "model" => ModelKind::Model,
            other => ModelKind::Other(other.to_string()),
        }
    }

    /// Literal marker searched for in raw descriptor text.
    ///
    /// Matching is a substring test on the unparsed document, so the spacing
    /// here must stay exactly what the upstream writer emits.
    pub fn marker(&self) -> String {
        format!("\"kind\": \"{}\"", self.as_str())
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModelKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}
