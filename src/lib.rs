//! Incremental synchronizer for component DSL sources.
//!
//! Given the build output of a component module, the crate regenerates the
//! per-component builder factories, the aggregate `ComponentsBuilderFactory`,
//! the metadata registry, and the component import section of the DSL pom.
//! Only files whose content actually changed are written, so re-running with
//! the same inputs leaves every timestamp alone and downstream incremental
//! builds stay quiet.
//!
//! The entry point is [`run`]: hosts translate their invocation into a
//! [`SyncConfig`] and get a [`SyncReport`] back. Hosts that bring their own
//! descriptor parser or code generator plug them into a [`Synchronizer`].

pub mod config;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod grouping;
pub mod pipeline;
pub mod registry;
pub mod splice;
pub mod writer;

mod schema_loader;

pub use config::{SyncConfig, SyncOverrides, find_module_root};
pub use descriptor::{
    ComponentModel, DescriptorIndex, EnrichedComponentModel, JsonModelMapper, ModelKind,
    ModelMapper, discover_component_names, load_component_descriptor, load_descriptor_of_kind,
};
pub use error::SyncError;
pub use generator::{ArtifactGenerator, BuilderFactoryGenerator, GeneratedSource};
pub use grouping::{AliasGroup, group_aliases};
pub use pipeline::{ArtifactReport, SyncReport, Synchronizer, run};
pub use registry::{MetadataRegistry, RegistryError};
pub use splice::{SectionMarkers, SpliceError, render_dependency_block, sync_section};
pub use writer::{SourceWriter, WriteOutcome, write_if_changed};
