//! Wildcard file lookup under the home root
//!
//! The walk is depth-first and pre-order. Inside each directory the files
//! are considered before any subdirectory is entered; otherwise the
//! directory-listing order is kept as is. The first match ends the walk.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, ToolError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Find the first file under `root` whose name matches `file_name`.
///
/// `file_name` supports `*` (any run of characters, possibly empty) and `?`
/// (exactly one character). When `extension` is given (with the dot, e.g.
/// `.pdf`), files whose name does not end with it are skipped and the
/// extension is appended to the pattern.
///
/// Returns the absolute path of the first match, or `None` when the walk
/// finishes without one. Directories that cannot be listed abort the walk
/// with an error.
pub fn locate_file(
    root: &Path,
    file_name: &str,
    extension: Option<&str>,
) -> Result<Option<PathBuf>> {
    let extension = extension.filter(|ext| !ext.is_empty());
    let raw_pattern = format!("{}{}", file_name, extension.unwrap_or_default()).to_lowercase();
    let pattern = compile_pattern(&raw_pattern)?;

    debug!("Searching {} for '{}'", root.display(), raw_pattern);

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()));

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 || is_directory(&entry) {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };

        if let Some(ext) = extension {
            if !name.ends_with(ext) {
                continue;
            }
        }

        if pattern.matches_with(&name.to_lowercase(), MATCH_OPTIONS) {
            let found = std::path::absolute(entry.path())?;
            debug!("Matched {}", found.display());
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Compile a file-name wildcard pattern.
///
/// Runs of `*` collapse to a single `*`: they mean the same thing for a
/// single path component, and `glob` reserves `**` for whole components.
/// A `[` with no closing `]` is matched literally, as `fnmatch` does.
fn compile_pattern(raw: &str) -> Result<Pattern> {
    let chars: Vec<char> = raw.chars().collect();
    let mut collapsed = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if collapsed.ends_with('*') => {}
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    collapsed.extend(&chars[i..=end]);
                    i = end;
                }
                None => collapsed.push_str("[[]"),
            },
            c => collapsed.push(c),
        }
        i += 1;
    }

    Pattern::new(&collapsed).map_err(|e| ToolError::InvalidPattern(raw.to_string(), e.to_string()))
}

/// Index of the `]` closing the class opened at `start`.
///
/// A `]` right after `[` or `[!` belongs to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

/// Symlinks to directories are not descended into and never match.
fn is_directory(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}
