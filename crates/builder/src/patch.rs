//! Exact-anchor text patches applied to build descriptors
//!
//! A patch names a file, an anchor string and the lines to insert after it.
//! Files are handled as a list of lines: a line matches when it contains the
//! anchor verbatim, and every matching line gets the insertion. Inserted
//! lines reuse the line ending of the line they follow, so `\r\n` files stay
//! `\r\n`.
//!
//! Insertion happens after the whole matching line, never in the middle of
//! it: text that follows the anchor on the same line stays on that line.

use crate::utils::fileops::write_atomic;
use cpkg_errors::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One textual insertion into a source-tree file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPatch {
    /// File to patch, relative to the source tree
    pub file: PathBuf,
    /// Exact text a line must contain to be patched
    pub anchor: String,
    /// Lines inserted after every matching line, in order
    pub insert: Vec<String>,
}

impl TextPatch {
    pub fn new(
        file: impl Into<PathBuf>,
        anchor: impl Into<String>,
        insert: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            file: file.into(),
            anchor: anchor.into(),
            insert: insert.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of applying a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The insertion was made after `occurrences` lines
    Patched { occurrences: usize },
    /// No line contains the anchor; the file was left untouched
    AnchorNotFound,
    /// Every anchor line is already followed by the insertion; the file was
    /// left untouched
    AlreadyApplied,
}

struct Line<'a> {
    body: &'a str,
    ending: &'a str,
}

fn split_lines(content: &str) -> Vec<Line<'_>> {
    content
        .split_inclusive('\n')
        .map(|raw| {
            let body_len = if raw.ends_with("\r\n") {
                raw.len() - 2
            } else if raw.ends_with('\n') {
                raw.len() - 1
            } else {
                raw.len()
            };
            Line {
                body: &raw[..body_len],
                ending: &raw[body_len..],
            }
        })
        .collect()
}

/// Apply a patch to in-memory text
///
/// Returns the outcome and, when patched, the new text.
#[must_use]
pub fn patch_text(content: &str, anchor: &str, insert: &[String]) -> (PatchOutcome, Option<String>) {
    let lines = split_lines(content);
    let matches: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !anchor.is_empty() && line.body.contains(anchor))
        .map(|(idx, _)| idx)
        .collect();

    if matches.is_empty() {
        return (PatchOutcome::AnchorNotFound, None);
    }

    let already_applied = !insert.is_empty()
        && matches.iter().all(|&idx| {
            insert.iter().enumerate().all(|(offset, wanted)| {
                lines
                    .get(idx + 1 + offset)
                    .is_some_and(|line| line.body == wanted)
            })
        });
    if already_applied {
        return (PatchOutcome::AlreadyApplied, None);
    }

    // Ending used when the anchor sits on an unterminated last line
    let fallback_ending = lines
        .iter()
        .map(|line| line.ending)
        .find(|ending| !ending.is_empty())
        .unwrap_or("\n");

    let mut out = String::with_capacity(content.len() + matches.len() * 64);
    for (idx, line) in lines.iter().enumerate() {
        out.push_str(line.body);
        out.push_str(line.ending);

        if !matches.contains(&idx) {
            continue;
        }

        let terminated = !line.ending.is_empty();
        let ending = if terminated { line.ending } else { fallback_ending };
        if !terminated && !insert.is_empty() {
            out.push_str(ending);
        }
        for (n, inserted) in insert.iter().enumerate() {
            out.push_str(inserted);
            if terminated || n + 1 < insert.len() {
                out.push_str(ending);
            }
        }
    }

    (
        PatchOutcome::Patched {
            occurrences: matches.len(),
        },
        Some(out),
    )
}

/// Apply a patch to its file below `source_root`
///
/// The file is rewritten atomically, and only when the outcome is
/// [`PatchOutcome::Patched`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or the patched contents
/// cannot be written back.
pub fn apply_patch(source_root: &Path, patch: &TextPatch) -> Result<PatchOutcome, Error> {
    let path = source_root.join(&patch.file);
    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(&e, &path))?;

    let (outcome, patched) = patch_text(&content, &patch.anchor, &patch.insert);
    if let Some(patched) = patched {
        write_atomic(&path, patched.as_bytes())?;
    }

    Ok(outcome)
}
