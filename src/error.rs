//! Failure taxonomy surfaced by [`crate::run`].
//!
//! Internal helpers return `anyhow::Result` with path context attached at each
//! I/O boundary; the pipeline sorts those failures into the categories below
//! so hosts can tell "bad input" (a build failure) from "the tooling broke"
//! (an execution error).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing dependency document, missing markers, or an unresolvable
    /// module layout.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unreadable descriptor, unwritable output, or an unreadable build tree.
    #[error("{0:#}")]
    Io(anyhow::Error),

    /// The persisted registry could not be loaded, validated, or flushed.
    #[error("metadata registry: {0:#}")]
    Registry(anyhow::Error),

    /// A descriptor could not be mapped or a generator rejected its input.
    #[error("generation failed for {subject}: {cause:#}")]
    Generation { subject: String, cause: anyhow::Error },
}

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn generation(subject: impl Into<String>, cause: anyhow::Error) -> Self {
        Self::Generation {
            subject: subject.into(),
            cause,
        }
    }

    /// True for failures caused by the input models rather than the
    /// environment; hosts report these as build failures.
    pub fn is_build_failure(&self) -> bool {
        matches!(self, SyncError::Generation { .. })
    }

    /// Process exit status the CLI uses for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_build_failure() { 2 } else { 1 }
    }
}
