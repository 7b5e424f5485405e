//! One synchronization run, start to finish.
//!
//! Descriptors are indexed and resolved for every discovered component,
//! grouped by implementing class, and generated one by one; each generated
//! factory is registered immediately. Once every component has been handled
//! the full registry (including components carried over from earlier runs)
//! drives one aggregate generation and one pom section rewrite.

use crate::config::SyncConfig;
use crate::descriptor::{
    DescriptorIndex, EnrichedComponentModel, JsonModelMapper, LoadError, ModelMapper,
    discover_component_names, load_component_models,
};
use crate::error::SyncError;
use crate::generator::{ArtifactGenerator, BuilderFactoryGenerator};
use crate::grouping::group_aliases;
use crate::registry::{MetadataRegistry, RegistryError};
use crate::splice::{DocumentSyncError, sync_dependency_document};
use crate::writer::{SourceWriter, WriteOutcome};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReport {
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
/// What a run looked at and what it changed on disk.
pub struct SyncReport {
    pub discovered: Vec<String>,
    pub generated: Vec<String>,
    /// Discovered names without a component descriptor.
    pub skipped: Vec<String>,
    /// Every scheme in the registry after the run.
    pub registered: Vec<String>,
    pub artifacts: Vec<ArtifactReport>,
    /// Registry flushes that changed the metadata file.
    pub registry_writes: usize,
}

impl SyncReport {
    pub fn written(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|artifact| artifact.outcome.changed())
            .count()
            + self.registry_writes
    }

    pub fn unchanged(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|artifact| !artifact.outcome.changed())
            .count()
    }

    fn record(&mut self, path: PathBuf, outcome: WriteOutcome) {
        self.artifacts.push(ArtifactReport { path, outcome });
    }
}

/// Run the synchronizer with the stock JSON mapper and Java generator.
pub fn run(config: &SyncConfig) -> Result<SyncReport, SyncError> {
    let generator = BuilderFactoryGenerator::new(config.factories_package.clone());
    Synchronizer::new(config, &JsonModelMapper, &generator).run()
}

/// Pipeline state for a single invocation.
pub struct Synchronizer<'a> {
    config: &'a SyncConfig,
    mapper: &'a dyn ModelMapper,
    generator: &'a dyn ArtifactGenerator,
    registry: Option<MetadataRegistry>,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        config: &'a SyncConfig,
        mapper: &'a dyn ModelMapper,
        generator: &'a dyn ArtifactGenerator,
    ) -> Self {
        Self {
            config,
            mapper,
            generator,
            registry: None,
        }
    }

    pub fn run(mut self) -> Result<SyncReport, SyncError> {
        let config = self.config;
        let mut report = SyncReport::default();

        let names = discover_component_names(&config.build_dir).map_err(SyncError::Io)?;
        report.discovered = names.iter().cloned().collect();
        if names.is_empty() {
            debug!(build_dir = %config.build_dir.display(), "no components found");
            return Ok(report);
        }
        debug!("Found {} components", names.len());
        let index = DescriptorIndex::build(&config.build_dir).map_err(SyncError::Io)?;

        let loaded = load_component_models(&index, &names, self.mapper).map_err(|err| match err {
            LoadError::Io(cause) => SyncError::Io(cause),
            LoadError::Mapping { name, cause } => SyncError::generation(name, cause),
        })?;
        report.skipped = loaded.missing;
        debug!(
            descriptors = index.len(),
            reads = index.storage_reads(),
            "descriptor index used"
        );

        let writer = match &config.license_header {
            Some(header) => SourceWriter::with_header_file(&config.sources_output_dir, header)
                .map_err(SyncError::Io)?,
            None => SourceWriter::new(&config.sources_output_dir),
        };

        for group in group_aliases(loaded.models) {
            if group.has_aliases() {
                debug!(java_type = %group.java_type, members = group.members.len(), "aliased component class");
            }
            for model in &group.members {
                let class_name = self.generate_component(&writer, model, &mut report)?;
                self.register(model, &class_name)?;
                report.generated.push(model.scheme().to_string());
            }
        }

        let known: Vec<EnrichedComponentModel> = self
            .registry()?
            .component_cache()
            .values()
            .cloned()
            .collect();
        report.registered = known.iter().map(|m| m.scheme().to_string()).collect();

        self.generate_aggregate(&writer, &known, &mut report)?;
        self.sync_pom(&known, &mut report)?;

        report.registry_writes = self.registry()?.disk_writes();
        Ok(report)
    }

    fn registry(&mut self) -> Result<&mut MetadataRegistry, SyncError> {
        let registry = match self.registry.take() {
            Some(registry) => registry,
            None => MetadataRegistry::load(&self.config.metadata_file, &self.config.factories_dir())
                .map_err(SyncError::Registry)?,
        };
        Ok(self.registry.insert(registry))
    }

    fn generate_component(
        &self,
        writer: &SourceWriter,
        model: &EnrichedComponentModel,
        report: &mut SyncReport,
    ) -> Result<String, SyncError> {
        let package = &self.config.factories_package;
        let generated = self
            .generator
            .generate_component(model, package)
            .map_err(|cause| SyncError::generation(model.scheme(), cause))?;
        let (path, outcome) = writer
            .write_source(package, &generated.class_name, &generated.source)
            .map_err(SyncError::Io)?;
        info!("Regenerate {}", generated.class_name);
        report.record(path, outcome);
        Ok(generated.class_name)
    }

    fn register(&mut self, model: &EnrichedComponentModel, class_name: &str) -> Result<(), SyncError> {
        self.registry()?
            .add_component_and_sync(model, class_name)
            .map_err(|err| match err {
                RegistryError::Storage(cause) => SyncError::Registry(cause),
                invalid => SyncError::generation(model.scheme(), invalid.into()),
            })?;
        info!("Update components metadata with {class_name}");
        Ok(())
    }

    fn generate_aggregate(
        &self,
        writer: &SourceWriter,
        known: &[EnrichedComponentModel],
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let package = &self.config.dsl_package;
        let generated = self
            .generator
            .generate_aggregate(known, package)
            .map_err(|cause| SyncError::generation(package.as_str(), cause))?;
        let (path, outcome) = writer
            .write_source(package, &generated.class_name, &generated.source)
            .map_err(SyncError::Io)?;
        info!("Regenerate {}", generated.class_name);
        report.record(path, outcome);
        Ok(())
    }

    fn sync_pom(
        &self,
        known: &[EnrichedComponentModel],
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let pom = &self.config.dependency_document;
        let outcome = sync_dependency_document(pom, known).map_err(|err| match err {
            DocumentSyncError::Io(cause) => SyncError::Io(cause),
            other => SyncError::config(other.to_string()),
        })?;
        debug!(pom = %pom.display(), ?outcome, "dependency section synced");
        report.record(pom.clone(), outcome);
        Ok(())
    }
}
