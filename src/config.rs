//! Run configuration and default path resolution.
//!
//! Every input the pipeline needs is spelled out in [`SyncConfig`]. Hosts
//! either fill it directly or call [`SyncConfig::resolve`], which applies the
//! conventional component DSL module layout to whatever was not overridden.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment hint naming the component DSL module root directly.
pub const MODULE_ROOT_ENV: &str = "DSLSYNC_MODULE_ROOT";

/// Location of the component DSL module relative to the project root.
pub const COMPONENT_DSL_MODULE: &str = "core/camel-componentdsl";

pub const DEFAULT_DSL_PACKAGE: &str = "org.apache.camel.builder.component";
pub const DEFAULT_FACTORIES_PACKAGE: &str = "org.apache.camel.builder.component.dsl";
pub const METADATA_FILE_NAME: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Build output of the module being processed (descriptors and service
    /// registrations live here).
    pub build_dir: PathBuf,
    pub sources_output_dir: PathBuf,
    pub resources_output_dir: PathBuf,
    /// Pom whose component import section is rewritten.
    pub dependency_document: PathBuf,
    pub metadata_file: PathBuf,
    /// Package of the aggregate builder factory.
    pub dsl_package: String,
    /// Package of the per-component builder factories.
    pub factories_package: String,
    /// Replaces the packaged license header when set.
    pub license_header: Option<PathBuf>,
}

/// Optional settings, read from a JSON file and/or command-line flags.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncOverrides {
    pub build_dir: Option<PathBuf>,
    pub module_root: Option<PathBuf>,
    pub sources_output_dir: Option<PathBuf>,
    pub resources_output_dir: Option<PathBuf>,
    pub dependency_document: Option<PathBuf>,
    pub metadata_file: Option<PathBuf>,
    pub dsl_package: Option<String>,
    pub factories_package: Option<String>,
    pub license_header: Option<PathBuf>,
}

impl SyncOverrides {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: SyncOverrides) -> Self {
        Self {
            build_dir: other.build_dir.or(self.build_dir),
            module_root: other.module_root.or(self.module_root),
            sources_output_dir: other.sources_output_dir.or(self.sources_output_dir),
            resources_output_dir: other.resources_output_dir.or(self.resources_output_dir),
            dependency_document: other.dependency_document.or(self.dependency_document),
            metadata_file: other.metadata_file.or(self.metadata_file),
            dsl_package: other.dsl_package.or(self.dsl_package),
            factories_package: other.factories_package.or(self.factories_package),
            license_header: other.license_header.or(self.license_header),
        }
    }
}

impl SyncConfig {
    /// Fill in every path the overrides leave open.
    ///
    /// The module root is only looked up when some path actually depends on
    /// it: an explicit `module_root`, then `DSLSYNC_MODULE_ROOT`, then the
    /// first ancestor of `base_dir` containing `core/camel-componentdsl`.
    pub fn resolve(base_dir: &Path, overrides: SyncOverrides) -> Result<Self> {
        let build_dir = overrides
            .build_dir
            .clone()
            .unwrap_or_else(|| base_dir.join("target"));

        let needs_root = overrides.sources_output_dir.is_none()
            || overrides.dependency_document.is_none()
            || (overrides.metadata_file.is_none() && overrides.resources_output_dir.is_none());
        let root = if needs_root {
            Some(match overrides.module_root.clone() {
                Some(root) => root,
                None => find_module_root(base_dir)?,
            })
        } else {
            None
        };
        let under_root = |relative: &str| -> Result<PathBuf> {
            match &root {
                Some(root) => Ok(root.join(relative)),
                None => bail!("component DSL module root is required to derive {relative}"),
            }
        };

        let sources_output_dir = match overrides.sources_output_dir {
            Some(dir) => dir,
            None => under_root("src/generated/java")?,
        };
        let resources_output_dir = match overrides.resources_output_dir {
            Some(dir) => dir,
            None => match &overrides.metadata_file {
                Some(file) => file
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
                None => under_root("src/generated/resources")?,
            },
        };
        let dependency_document = match overrides.dependency_document {
            Some(path) => path,
            None => under_root("pom.xml")?,
        };
        let metadata_file = overrides
            .metadata_file
            .unwrap_or_else(|| resources_output_dir.join(METADATA_FILE_NAME));

        Ok(Self {
            build_dir,
            sources_output_dir,
            resources_output_dir,
            dependency_document,
            metadata_file,
            dsl_package: overrides
                .dsl_package
                .unwrap_or_else(|| DEFAULT_DSL_PACKAGE.to_string()),
            factories_package: overrides
                .factories_package
                .unwrap_or_else(|| DEFAULT_FACTORIES_PACKAGE.to_string()),
            license_header: overrides.license_header,
        })
    }

    /// Directory holding the per-component factory sources.
    pub fn factories_dir(&self) -> PathBuf {
        crate::writer::package_dir(&self.sources_output_dir, &self.factories_package)
    }
}

/// Locate the component DSL module for a project checkout.
///
/// Honors `DSLSYNC_MODULE_ROOT` when it names an existing directory, then
/// climbs from `start` looking for `core/camel-componentdsl`.
pub fn find_module_root(start: &Path) -> Result<PathBuf> {
    if let Ok(hint) = env::var(MODULE_ROOT_ENV) {
        if let Some(root) = module_root_from_hint(&hint) {
            return Ok(root);
        }
    }

    if let Some(root) = search_upwards(start) {
        return Ok(root);
    }

    bail!(
        "Unable to locate {COMPONENT_DSL_MODULE} above {}. Set {MODULE_ROOT_ENV} or pass explicit output paths.",
        start.display()
    )
}

fn module_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.trim().is_empty() {
        return None;
    }
    let path = PathBuf::from(hint);
    if !path.is_dir() {
        return None;
    }
    fs::canonicalize(path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(COMPONENT_DSL_MODULE);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
