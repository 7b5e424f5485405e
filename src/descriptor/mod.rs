//! Descriptor document wiring.
//!
//! Upstream builds leave one JSON descriptor per model somewhere under the
//! build directory and one registration file per component under the
//! services directory. This module finds both, reads each descriptor at most
//! once per run, and maps component descriptors into `ComponentModel`s.

pub mod discovery;
pub mod identity;
pub mod index;
pub mod loader;
pub mod model;

pub use discovery::{COMPONENT_SERVICES_DIR, discover_component_names};
pub use identity::ModelKind;
pub use index::DescriptorIndex;
pub use loader::{
    LoadError, LoadedModels, load_component_descriptor, load_component_models,
    load_descriptor_of_kind,
};
pub use model::{
    ComponentModel, EnrichedComponentModel, JsonModelMapper, ModelMapper,
    builder_factory_class_name,
};
