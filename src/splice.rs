//! Marker-delimited region rewriting.
//!
//! The dependency-management document is opaque except for one region fenced
//! by two literal marker lines. Splicing treats the document as three
//! segments and replaces only the middle one; the content is sorted and
//! de-duplicated so the same set of models always renders byte-identically.

use crate::descriptor::{ComponentModel, EnrichedComponentModel};
use crate::writer::{WriteOutcome, write_if_changed};
use anyhow::Context;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const START_COMPONENTS_IMPORT: &str = "<!-- START: camel components import -->";
pub const END_COMPONENTS_IMPORT: &str = "<!-- END: camel components import -->";

#[derive(Debug, Clone, Copy)]
/// Literal markers fencing an owned region plus the indentation used for
/// the marker lines.
pub struct SectionMarkers<'a> {
    pub start: &'a str,
    pub end: &'a str,
    pub indent: &'a str,
}

/// Markers used in the component DSL pom.
pub const COMPONENTS_IMPORT: SectionMarkers<'static> = SectionMarkers {
    start: START_COMPONENTS_IMPORT,
    end: END_COMPONENTS_IMPORT,
    indent: "\t\t",
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpliceError {
    #[error("start marker '{0}' not found")]
    MissingStart(String),
    #[error("end marker '{0}' not found")]
    MissingEnd(String),
    #[error("end marker '{end}' appears before start marker '{start}'")]
    Misordered { start: String, end: String },
}

/// Replace the region between `markers` with `blocks`.
///
/// Blocks are sorted and de-duplicated; each is emitted verbatim, so callers
/// include their own trailing newline. Content outside the markers is
/// trimmed and otherwise untouched.
pub fn sync_section<I, S>(
    document: &str,
    markers: &SectionMarkers<'_>,
    blocks: I,
) -> Result<String, SpliceError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let start = document
        .find(markers.start)
        .ok_or_else(|| SpliceError::MissingStart(markers.start.to_string()))?;
    let end = document
        .find(markers.end)
        .ok_or_else(|| SpliceError::MissingEnd(markers.end.to_string()))?;
    if end < start + markers.start.len() {
        return Err(SpliceError::Misordered {
            start: markers.start.to_string(),
            end: markers.end.to_string(),
        });
    }

    let before = document[..start].trim();
    let after = document[end + markers.end.len()..].trim();
    let body: BTreeSet<String> = blocks.into_iter().map(Into::into).collect();

    let mut spliced = String::with_capacity(document.len());
    spliced.push_str(before);
    spliced.push('\n');
    spliced.push_str(markers.indent);
    spliced.push_str(markers.start);
    spliced.push('\n');
    for block in &body {
        spliced.push_str(block);
    }
    spliced.push_str(markers.indent);
    spliced.push_str(markers.end);
    spliced.push('\n');
    spliced.push_str(markers.indent);
    spliced.push_str(after);
    spliced.push('\n');
    Ok(spliced)
}

/// One `<dependency>` block for the module that owns `model`.
pub fn render_dependency_block(model: &ComponentModel, indent: &str) -> String {
    format!(
        "{indent}<dependency>\n\
         {indent}\t<groupId>{}</groupId>\n\
         {indent}\t<artifactId>{}</artifactId>\n\
         {indent}\t<scope>provided</scope>\n\
         {indent}\t<version>${{project.version}}</version>\n\
         {indent}</dependency>\n",
        model.group_id, model.artifact_id
    )
}

#[derive(Debug, Error)]
pub enum DocumentSyncError {
    #[error("dependency document {0} does not exist")]
    MissingDocument(String),
    #[error("dependency document {path}: {source}")]
    Markers {
        path: String,
        #[source]
        source: SpliceError,
    },
    #[error("{0:#}")]
    Io(anyhow::Error),
}

/// Rewrite the component import section of the pom at `path` so it lists the
/// owning module of every model exactly once.
pub fn sync_dependency_document<'a>(
    path: &Path,
    models: impl IntoIterator<Item = &'a EnrichedComponentModel>,
) -> Result<WriteOutcome, DocumentSyncError> {
    if !path.is_file() {
        return Err(DocumentSyncError::MissingDocument(
            path.display().to_string(),
        ));
    }
    let document = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))
        .map_err(DocumentSyncError::Io)?;

    let blocks = models
        .into_iter()
        .map(|model| render_dependency_block(&model.component, COMPONENTS_IMPORT.indent));
    let updated = sync_section(&document, &COMPONENTS_IMPORT, blocks).map_err(|source| {
        DocumentSyncError::Markers {
            path: path.display().to_string(),
            source,
        }
    })?;
    write_if_changed(path, &updated).map_err(DocumentSyncError::Io)
}
