//! Filesystem-backed note store.
//!
//! A vault is a directory tree of markdown notes addressed by vault-relative
//! paths. Renames keep the link graph intact: inbound inline links and
//! embeds are redirected at the moved note's new path, and the moved note's
//! own relative destinations are re-based onto its new folder. Only inline
//! `[text](dest)` / `![text](dest)` markup is rewritten; reference-style
//! links and autolinks pass through untouched.

use std::fs;
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

use pulldown_cmark::{Event, LinkType, Parser, Tag};

use crate::error::{StoreError, StoreResult};
use crate::host::Workspace;

pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open the vault rooted at `root`. The root directory must exist.
    pub fn open(root: &Path) -> StoreResult<Self> {
        if !root.is_dir() {
            return Err(StoreError::NotFound(root.to_path_buf()));
        }
        Ok(Self { root: root.to_path_buf() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, rel: &Path) -> StoreResult<PathBuf> {
        Ok(self.root.join(normalize_rel(rel)?))
    }

    /// Every markdown note in the vault, vault-relative. Dot-entries are
    /// skipped.
    fn note_paths(&self) -> StoreResult<Vec<PathBuf>> {
        let mut notes = Vec::new();
        collect_notes(&self.root, &self.root, &mut notes)?;
        Ok(notes)
    }

    /// Compute every content edit a rename requires, without touching disk.
    fn plan_rename_edits(
        &self,
        from: &Path,
        to: &Path,
    ) -> StoreResult<Vec<RewriteEdit>> {
        let mut edits = Vec::new();
        for note in self.note_paths()? {
            if note == *from {
                continue;
            }
            let content = fs::read_to_string(self.root.join(&note))?;
            let note_dir = parent_dir(&note);
            if let Some(rewritten) =
                redirect_dests(&content, &note_dir, from, to)
            {
                edits.push(RewriteEdit { note, original: content, rewritten });
            }
        }
        // The moved note itself sees its folder change, so its own relative
        // destinations need re-basing.
        let content = fs::read_to_string(self.root.join(from))?;
        if let Some(rewritten) = rebase_dests(&content, from, to) {
            edits.push(RewriteEdit {
                note: to.to_path_buf(),
                original: content,
                rewritten,
            });
        }
        Ok(edits)
    }
}

struct RewriteEdit {
    note: PathBuf,
    original: String,
    rewritten: String,
}

impl Workspace for FsVault {
    fn create_note(
        &mut self,
        path: &Path,
        content: &str,
    ) -> StoreResult<PathBuf> {
        let rel = normalize_rel(path)?;
        let full = self.root.join(&rel);
        match fs::OpenOptions::new().write(true).create_new(true).open(&full)
        {
            Ok(mut file) => {
                file.write_all(content.as_bytes())?;
                Ok(rel)
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(rel))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn create_folder(&mut self, path: &Path) -> StoreResult<()> {
        fs::create_dir_all(self.full_path(path)?)?;
        Ok(())
    }

    fn rename_note(&mut self, from: &Path, to: &Path) -> StoreResult<()> {
        let from = normalize_rel(from)?;
        let to = normalize_rel(to)?;
        let from_full = self.root.join(&from);
        let to_full = self.root.join(&to);
        if !from_full.is_file() {
            return Err(StoreError::NotFound(from));
        }
        if to_full.exists() {
            return Err(StoreError::AlreadyExists(to));
        }

        let edits = self.plan_rename_edits(&from, &to)?;
        fs::rename(&from_full, &to_full)?;
        for (applied, edit) in edits.iter().enumerate() {
            if let Err(err) =
                fs::write(self.root.join(&edit.note), &edit.rewritten)
            {
                // Roll back what we changed so a reported failure means the
                // note really is still at `from` with its links intact.
                for done in &edits[..applied] {
                    let _ = fs::write(self.root.join(&done.note), &done.original);
                }
                let _ = fs::rename(&to_full, &from_full);
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn link_reference(&self, target: &Path, from: &Path) -> String {
        let from_dir = parent_dir(from);
        let dest = encode_dest(&dest_string(&relative_to(target, &from_dir)));
        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("[{stem}]({dest})")
    }
}

/// Clean a vault-relative path: no absolute paths, no `..` escapes.
fn normalize_rel(path: &Path) -> StoreResult<PathBuf> {
    let mut cleaned = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Normal(part) => cleaned.push(part),
            Component::CurDir => {}
            _ => {
                return Err(StoreError::OutsideVault(
                    path.to_string_lossy().into_owned(),
                ));
            }
        }
    }
    Ok(cleaned)
}

fn collect_notes(
    root: &Path,
    dir: &Path,
    out: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            collect_notes(root, &path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Relative path from `from_dir` to `target`, both vault-relative.
fn relative_to(target: &Path, from_dir: &Path) -> PathBuf {
    let target_parts: Vec<_> = target.components().collect();
    let from_parts: Vec<_> = from_dir.components().collect();
    let common = target_parts
        .iter()
        .zip(&from_parts)
        .take_while(|(a, b)| a == b)
        .count();
    let mut rel = PathBuf::new();
    for _ in common..from_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part);
    }
    rel
}

/// Resolve a link destination written inside `dir` to a vault-relative
/// path. `None` when it walks out of the vault.
fn resolve_dest(dir: &Path, dest: &str) -> Option<PathBuf> {
    let mut stack: Vec<String> = dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    for segment in dest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            part => stack.push(part.to_string()),
        }
    }
    Some(stack.iter().collect())
}

fn dest_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn encode_dest(dest: &str) -> String {
    let mut out = String::with_capacity(dest.len());
    for ch in dest.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            // A literal '#' in a file name would read as a fragment marker.
            '#' => out.push_str("%23"),
            _ => out.push(ch),
        }
    }
    out
}

fn decode_dest(dest: &str) -> String {
    let bytes = dest.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let decoded = if bytes[i] == b'%' && i + 2 < bytes.len() {
            std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        } else {
            None
        };
        match decoded {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Byte range and raw destination of every inline link or embed in `content`.
fn link_spans(content: &str) -> Vec<(Range<usize>, String)> {
    let mut spans = Vec::new();
    for (event, range) in Parser::new(content).into_offset_iter() {
        let (link_type, dest) = match event {
            Event::Start(Tag::Link { link_type, dest_url, .. })
            | Event::Start(Tag::Image { link_type, dest_url, .. }) => {
                (link_type, dest_url)
            }
            _ => continue,
        };
        if link_type != LinkType::Inline {
            continue;
        }
        if let Some(dest_range) = dest_range_in(content, &range, &dest) {
            spans.push((dest_range, dest.into_string()));
        }
    }
    spans
}

/// Narrow a link event's span down to the bytes of its destination.
///
/// The event span covers the whole construct, so the destination has to be
/// located textually. Every `](` is a candidate opener; a candidate is
/// accepted only when its text equals the destination the parser reported,
/// which rules out look-alikes inside quoted titles and nested markup.
/// `None` leaves the link unedited rather than risk splicing the wrong
/// bytes.
fn dest_range_in(
    content: &str,
    span: &Range<usize>,
    dest: &str,
) -> Option<Range<usize>> {
    let raw = &content[span.clone()];
    let close = raw.rfind(')')?;
    for (idx, _) in raw.match_indices("](") {
        let open = idx + 2;
        if close <= open {
            continue;
        }
        let inside = &raw[open..close];
        let (start, end) = if inside.starts_with('<') {
            match inside.find('>') {
                Some(gt) => (open + 1, open + gt),
                None => (open, close),
            }
        } else {
            match inside.find(char::is_whitespace) {
                // A title follows the destination; leave it alone.
                Some(ws) => (open, open + ws),
                None => (open, close),
            }
        };
        if &raw[start..end] == dest {
            return Some(span.start + start..span.start + end);
        }
    }
    None
}

/// Split a destination into its path part and `#fragment` suffix.
fn split_fragment(dest: &str) -> (&str, &str) {
    match dest.find('#') {
        Some(pos) => (&dest[..pos], &dest[pos..]),
        None => (dest, ""),
    }
}

fn is_external(dest: &str) -> bool {
    dest.is_empty() || dest.starts_with('#') || dest.contains(':')
}

fn apply_dest_edits(
    content: &str,
    mut edits: Vec<(Range<usize>, String)>,
) -> Option<String> {
    if edits.is_empty() {
        return None;
    }
    edits.sort_by_key(|(range, _)| range.start);
    let mut out = content.to_string();
    for (range, dest) in edits.into_iter().rev() {
        out.replace_range(range, &dest);
    }
    Some(out)
}

/// Redirect destinations in a bystander note that resolve to `from` so they
/// point at `to` instead. `None` when nothing matched.
fn redirect_dests(
    content: &str,
    note_dir: &Path,
    from: &Path,
    to: &Path,
) -> Option<String> {
    let mut edits = Vec::new();
    for (range, dest) in link_spans(content) {
        let (path_part, fragment) = split_fragment(&dest);
        if is_external(path_part) {
            continue;
        }
        let resolved = match resolve_dest(note_dir, &decode_dest(path_part)) {
            Some(path) => path,
            None => continue,
        };
        if resolved != *from {
            continue;
        }
        let fresh = encode_dest(&dest_string(&relative_to(to, note_dir)));
        edits.push((range, format!("{fresh}{fragment}")));
    }
    apply_dest_edits(content, edits)
}

/// Re-base every relative destination in the note moving from `from` to
/// `to` so it still resolves from the new folder. A destination pointing at
/// the note itself follows the rename instead. `None` when nothing changed.
fn rebase_dests(content: &str, from: &Path, to: &Path) -> Option<String> {
    let old_dir = parent_dir(from);
    let new_dir = parent_dir(to);
    let mut edits = Vec::new();
    for (range, dest) in link_spans(content) {
        let (path_part, fragment) = split_fragment(&dest);
        if is_external(path_part) {
            continue;
        }
        let resolved = match resolve_dest(&old_dir, &decode_dest(path_part)) {
            Some(path) => path,
            None => continue,
        };
        let target = if resolved == *from { to } else { resolved.as_path() };
        let fresh = encode_dest(&dest_string(&relative_to(target, &new_dir)));
        if fresh != dest {
            edits.push((range, format!("{fresh}{fragment}")));
        }
    }
    apply_dest_edits(content, edits)
}
