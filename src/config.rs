//! Extraction settings: a small JSON file per vault.
//!
//! Settings are read fresh on every invocation. Loading merges the file over
//! the defaults: present keys win, missing keys fall back, a missing file
//! means all defaults. Key names are camelCase so files written by earlier
//! versions of the tool (and by hand) stay stable.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Settings file name, resolved relative to the vault root.
pub const SETTINGS_FILE: &str = ".snip_notes.json";

/// What replaces the selection in the source note after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AfterAction {
    /// Embed the new note in place (`![name](path)`).
    #[default]
    Embed,
    /// Leave a bare link (`[name](path)`).
    Link,
    /// Remove the selection entirely.
    None,
}

/// Per-vault extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractConfig {
    /// Template for new note names. `{nWords}` expands to the derived
    /// keywords, `{DATE:<pattern>}` to the current date (see `naming`).
    pub format: String,
    /// How many keywords `{nWords}` keeps.
    pub n_words: usize,
    /// Whitespace-separated words to filter instead of the built-in English
    /// stopword set. Blank selects the built-in set.
    pub custom_stopwords: String,
    /// Whether new notes are moved into `subdir` after creation.
    pub use_subdir: bool,
    /// Subdirectory template relative to the source note's folder. May
    /// contain `{DATE:<pattern>}` tokens and nested folders.
    pub subdir: String,
    /// What replaces the extracted selection.
    pub text_after_extraction: AfterAction,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            format: "{DATE:YYYY-MM-DD}_{nWords}".to_string(),
            n_words: 5,
            custom_stopwords: String::new(),
            use_subdir: true,
            subdir: "extracts".to_string(),
            text_after_extraction: AfterAction::Embed,
        }
    }
}

impl ExtractConfig {
    /// Settings path for a vault: `SNIP_NOTES_CONFIG` when set, otherwise
    /// `<vault>/.snip_notes.json`.
    pub fn default_path(vault: &Path) -> PathBuf {
        if let Ok(path) = env::var("SNIP_NOTES_CONFIG") {
            return PathBuf::from(path);
        }
        vault.join(SETTINGS_FILE)
    }

    /// Load settings from `path`. A missing file yields the defaults; a
    /// present file is parsed with per-key fallback to the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        fs::write(path, out)?;
        Ok(())
    }

    /// Reject settings that can never produce a usable note name.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.format.trim().is_empty() {
            return Err(ConfigError::Validation(
                "format must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
