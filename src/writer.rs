//! The single choke point for every file the synchronizer produces.
//!
//! Downstream incremental builds key off modification times, so a file whose
//! rendered content is identical to what is on disk must not be touched at
//! all. Changed files are written through a temporary sibling and renamed
//! into place so readers never observe a half-written file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// License header shipped with the crate and prepended to generated sources.
pub const DEFAULT_LICENSE_HEADER: &str = include_str!("../resources/license-header-java.txt");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

impl WriteOutcome {
    pub fn changed(self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// Write `content` to `target` unless the file already holds exactly that.
pub fn write_if_changed(target: &Path, content: &str) -> Result<WriteOutcome> {
    match fs::read(target) {
        Ok(existing) if existing == content.as_bytes() => return Ok(WriteOutcome::Unchanged),
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("reading {}", target.display()));
        }
    }

    let parent = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).with_context(|| format!("creating {}", parent.display()))?;

    let mut staged = NamedTempFile::new_in(&parent)
        .with_context(|| format!("staging write in {}", parent.display()))?;
    staged
        .write_all(content.as_bytes())
        .with_context(|| format!("staging {}", target.display()))?;
    staged
        .persist(target)
        .map_err(|err| err.error)
        .with_context(|| format!("writing {}", target.display()))?;
    Ok(WriteOutcome::Written)
}

#[derive(Debug, Clone)]
/// Writes generated class sources under an output root.
///
/// The license header is resolved once when the writer is built and reused
/// for every file, so it is byte-identical across runs and never shows up as
/// a change on its own.
pub struct SourceWriter {
    root: PathBuf,
    header: String,
}

impl SourceWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            header: DEFAULT_LICENSE_HEADER.to_string(),
        }
    }

    /// Use the header stored at `path` instead of the packaged one.
    pub fn with_header_file(root: impl Into<PathBuf>, path: &Path) -> Result<Self> {
        let header = fs::read_to_string(path)
            .with_context(|| format!("reading license header {}", path.display()))?;
        Ok(Self {
            root: root.into(),
            header,
        })
    }

    /// `<root>/<package as directories>/<class_name>.java`.
    pub fn source_path(&self, package: &str, class_name: &str) -> PathBuf {
        package_dir(&self.root, package).join(format!("{class_name}.java"))
    }

    pub fn write_source(
        &self,
        package: &str,
        class_name: &str,
        source: &str,
    ) -> Result<(PathBuf, WriteOutcome)> {
        let target = self.source_path(package, class_name);
        let code = format!("{}{}", self.header, source);
        debug!(target = %target.display(), "source code generated:\n{code}");
        let outcome = write_if_changed(&target, &code)?;
        Ok((target, outcome))
    }
}

/// Directory for `package` under `root` (`a.b.c` -> `root/a/b/c`).
pub fn package_dir(root: &Path, package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}
