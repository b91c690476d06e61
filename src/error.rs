//! Error types for the extraction workflow and the reference host.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by host-side operations (note store, editor surface).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The resolved path would land outside the vault root.
    #[error("path escapes the vault: {0}")]
    OutsideVault(String),

    /// Creation refused because the target already exists.
    #[error("a note already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The referenced note is gone.
    #[error("no note at {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error from the underlying filesystem.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for host-side operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Workflow failures. Every variant's message is shown to the user as a
/// notice; validation variants abort before any mutation.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The trimmed selection was empty.
    #[error("No text selected to extract.")]
    EmptySelection,

    /// The editor could not resolve a source note.
    #[error("Couldn't determine current file.")]
    NoActiveNote,

    /// A note name was required but was empty after trimming. Raised in
    /// use-default and explicit-name modes; the prompt re-asks instead.
    #[error("Please provide a note name.")]
    EmptyNameSubmitted,

    /// The new note could not be created. The source note was not touched.
    #[error("Couldn't create note at {}: {source}", path.display())]
    CreationFailed {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// The note was created but the original selection could not be
    /// replaced, leaving a valid orphan at `note_path`.
    #[error("Extracted text to {} but couldn't update the original note: {source}", note_path.display())]
    LinkRewriteFailed {
        note_path: PathBuf,
        #[source]
        source: StoreError,
    },
}

/// Settings load/save failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Validation(String),
}

/// Result type for settings operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
