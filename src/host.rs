//! Collaborator contracts for the host application.
//!
//! The workflow never reaches for ambient state: every host capability it
//! touches (note store, editor surface, notices, the naming prompt, suffix
//! generation) comes in through one of these traits. The crate's reference
//! implementations live in `vault`, `selection` and `term`; tests plug in
//! in-memory fakes.
//!
//! All store and editor paths are vault-relative.

use std::path::{Path, PathBuf};

use crate::error::StoreResult;

/// The host's note store.
pub trait Workspace {
    /// Create a note at `path` containing exactly `content`, and return the
    /// normalized path. Fails if a note is already there.
    fn create_note(&mut self, path: &Path, content: &str)
    -> StoreResult<PathBuf>;

    /// Create a folder, including missing parents. An existing folder is
    /// not an error.
    fn create_folder(&mut self, path: &Path) -> StoreResult<()>;

    /// Move a note from `from` to `to`, rewriting inbound links so nothing
    /// dangles. Must refuse to overwrite an existing target.
    fn rename_note(&mut self, from: &Path, to: &Path) -> StoreResult<()>;

    /// A link reference to `target` suitable for insertion into the note at
    /// `from`.
    fn link_reference(&self, target: &Path, from: &Path) -> String;
}

/// The host's editor surface: one note with one captured selection.
pub trait Editor {
    /// Path of the note the selection lives in, when resolvable.
    fn active_note(&self) -> Option<PathBuf>;

    /// The captured selection text.
    fn selected_text(&self) -> &str;

    /// Replace exactly the span captured at construction time, regardless of
    /// what happened to the document since.
    fn replace_selection(&mut self, replacement: &str) -> StoreResult<()>;
}

/// Fire-and-forget transient user notices. Never queried for acknowledgement.
pub trait Notifier {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// One round of the naming prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The user submitted this (possibly empty) name.
    Submitted(String),
    /// The user backed out; the workflow must abort with no side effects.
    Cancelled,
}

/// Modal naming prompt, seeded with the derived default. One ask, one
/// outcome; the workflow re-asks when an empty name comes back. An
/// implementation that loses its input stream reports `Cancelled`.
pub trait NamePrompt {
    fn ask(&mut self, default_name: &str) -> PromptOutcome;
}

/// Source of staging-name suffixes, used to dodge collisions while a note
/// waits in the source folder to be relocated. Injectable so tests can pin
/// the values.
pub trait SuffixSource {
    fn staging_suffix(&mut self) -> String;
}
