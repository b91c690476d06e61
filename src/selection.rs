//! Editor surface over a note on disk.
//!
//! A selection is captured once as a byte span covering a 1-based inclusive
//! line range, without the final line terminator. Replacement splices
//! exactly that span and writes the note back, so the text around it is
//! untouched even in `none` mode, where the terminator stays behind as an
//! empty line.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;
use crate::host::Editor;

pub struct FileSelection {
    full_path: PathBuf,
    rel_path: PathBuf,
    content: String,
    span: Range<usize>,
}

impl FileSelection {
    /// Capture lines `start..=end` (1-based) of the note at `rel_path`
    /// under `vault_root`.
    pub fn capture(
        vault_root: &Path,
        rel_path: &Path,
        start: usize,
        end: usize,
    ) -> StoreResult<Self> {
        let full_path = vault_root.join(rel_path);
        let content = fs::read_to_string(&full_path).map_err(|err| {
            io::Error::new(err.kind(), format!("{}: {err}", rel_path.display()))
        })?;
        let spans = line_spans(&content);
        if start == 0 || start > end || end > spans.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "line range {start}:{end} is out of bounds (note has {} lines)",
                    spans.len()
                ),
            )
            .into());
        }
        let span = spans[start - 1].start..spans[end - 1].end;
        Ok(Self {
            full_path,
            rel_path: rel_path.to_path_buf(),
            content,
            span,
        })
    }
}

impl Editor for FileSelection {
    fn active_note(&self) -> Option<PathBuf> {
        Some(self.rel_path.clone())
    }

    fn selected_text(&self) -> &str {
        &self.content[self.span.clone()]
    }

    fn replace_selection(&mut self, replacement: &str) -> StoreResult<()> {
        self.content.replace_range(self.span.clone(), replacement);
        self.span = self.span.start..self.span.start + replacement.len();
        fs::write(&self.full_path, &self.content)?;
        Ok(())
    }
}

/// Byte span of every line, excluding terminators. A trailing newline does
/// not open a final empty line.
fn line_spans(content: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (idx, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            spans.push(start..idx);
            start = idx + 1;
        }
    }
    if start < content.len() {
        spans.push(start..content.len());
    }
    spans
}
