//! The extraction pipeline.
//!
//! One run per invocation: validate the selection, settle on a name, create
//! the note, optionally relocate it into the configured subfolder, then
//! rewrite the original selection into a link, an embed, or nothing. No
//! state survives between runs.
//!
//! Relocation goes through create-then-rename rather than creating in the
//! final folder directly: renaming a tracked note lets the store redirect
//! every reference to it, including the one this run is about to write.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{AfterAction, ExtractConfig};
use crate::error::{ExtractError, StoreError};
use crate::host::{
    Editor, NamePrompt, Notifier, PromptOutcome, SuffixSource, Workspace,
};
use crate::naming;

/// Fresh-suffix attempts before a staging collision becomes fatal.
const STAGING_ATTEMPTS: usize = 5;

/// How an extraction run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A note now exists at `path`. `warning` carries the relocation
    /// failure the run survived, if any.
    Extracted { path: PathBuf, warning: Option<String> },
    /// The user backed out of the naming prompt. Nothing was created and
    /// nothing was edited.
    Cancelled,
}

/// Runs extractions against a set of host collaborators.
pub struct Extractor<'a> {
    workspace: &'a mut dyn Workspace,
    editor: &'a mut dyn Editor,
    notifier: &'a dyn Notifier,
    suffixes: &'a mut dyn SuffixSource,
}

impl<'a> Extractor<'a> {
    pub fn new(
        workspace: &'a mut dyn Workspace,
        editor: &'a mut dyn Editor,
        notifier: &'a dyn Notifier,
        suffixes: &'a mut dyn SuffixSource,
    ) -> Self {
        Self { workspace, editor, notifier, suffixes }
    }

    /// Run one extraction against the wall clock.
    pub fn extract(
        &mut self,
        config: &ExtractConfig,
        prompt: Option<&mut dyn NamePrompt>,
    ) -> Result<ExtractOutcome, ExtractError> {
        self.extract_at(config, prompt, Local::now())
    }

    /// Run one extraction with the timestamp pinned. Every date token in
    /// the name format and the subfolder template expands from this single
    /// value.
    pub fn extract_at(
        &mut self,
        config: &ExtractConfig,
        prompt: Option<&mut dyn NamePrompt>,
        now: DateTime<Local>,
    ) -> Result<ExtractOutcome, ExtractError> {
        let content = self.editor.selected_text().trim().to_string();
        if content.is_empty() {
            return Err(ExtractError::EmptySelection);
        }
        let source =
            self.editor.active_note().ok_or(ExtractError::NoActiveNote)?;

        let default_name = naming::derive_name(&content, config, now);
        let name = match prompt {
            Some(prompt) => match self.resolve_name(prompt, &default_name) {
                Some(name) => name,
                None => return Ok(ExtractOutcome::Cancelled),
            },
            None => {
                let name = default_name.trim();
                if name.is_empty() {
                    return Err(ExtractError::EmptyNameSubmitted);
                }
                name.to_string()
            }
        };

        let source_dir =
            source.parent().map(Path::to_path_buf).unwrap_or_default();
        let (note_path, warning) = if config.use_subdir {
            let staged = self.create_staged(&name, &source_dir, &content)?;
            let subdir = source_dir
                .join(naming::expand_date_tokens(&config.subdir, now));
            match self.relocate(&staged, &subdir, &name) {
                Ok(path) => (path, None),
                Err(_) => {
                    let warning = format!(
                        "Couldn't move new file into {}.",
                        subdir.display()
                    );
                    self.notifier.warn(&warning);
                    (staged, Some(warning))
                }
            }
        } else {
            let path = source_dir.join(format!("{name}.md"));
            let created =
                self.workspace.create_note(&path, &content).map_err(
                    |source| ExtractError::CreationFailed { path, source },
                )?;
            (created, None)
        };

        let link = self.workspace.link_reference(&note_path, &source);
        let replacement = match config.text_after_extraction {
            AfterAction::Embed => format!("!{link}"),
            AfterAction::Link => link,
            AfterAction::None => String::new(),
        };
        self.editor.replace_selection(&replacement).map_err(|source| {
            ExtractError::LinkRewriteFailed {
                note_path: note_path.clone(),
                source,
            }
        })?;

        self.notifier
            .info(&format!("Extracted text to {}", note_path.display()));
        Ok(ExtractOutcome::Extracted { path: note_path, warning })
    }

    /// Prompt until a usable name arrives. `None` means the user cancelled.
    /// An empty submission draws a notice and a fresh prompt seeded with
    /// the same default.
    fn resolve_name(
        &self,
        prompt: &mut dyn NamePrompt,
        default_name: &str,
    ) -> Option<String> {
        loop {
            match prompt.ask(default_name) {
                PromptOutcome::Cancelled => return None,
                PromptOutcome::Submitted(name) => {
                    let name = name.trim();
                    if name.is_empty() {
                        self.notifier.info("Please provide a note name.");
                        continue;
                    }
                    return Some(name.to_string());
                }
            }
        }
    }

    /// Park the note in the source folder under a suffixed name so a
    /// not-yet-relocated sibling with the same derived name can't collide.
    fn create_staged(
        &mut self,
        name: &str,
        dir: &Path,
        content: &str,
    ) -> Result<PathBuf, ExtractError> {
        let mut attempts = STAGING_ATTEMPTS;
        loop {
            let suffix = self.suffixes.staging_suffix();
            let path = dir.join(format!("{name}-{suffix}.md"));
            attempts -= 1;
            match self.workspace.create_note(&path, content) {
                Ok(created) => return Ok(created),
                Err(StoreError::AlreadyExists(_)) if attempts > 0 => {}
                Err(source) => {
                    return Err(ExtractError::CreationFailed { path, source });
                }
            }
        }
    }

    fn relocate(
        &mut self,
        staged: &Path,
        subdir: &Path,
        name: &str,
    ) -> Result<PathBuf, StoreError> {
        self.workspace.create_folder(subdir)?;
        let target = subdir.join(format!("{name}.md"));
        self.workspace.rename_note(staged, &target)?;
        Ok(target)
    }
}
