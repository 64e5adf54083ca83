//! File integrity checks
//!
//! Checks run in order and stop at the first one that cannot pass, so a
//! report only carries the facts established up to that point:
//!
//! 1. existence
//! 2. readability (one byte is read)
//! 3. size and non-emptiness
//! 4. MIME type guess and extension consistency

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mime::{expected_extensions, guess_mime_type};

/// Result of [`check_integrity`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub exists: bool,
    pub readable: bool,
    pub non_empty: bool,
    /// Size in bytes
    pub size: u64,
    /// Guessed from the extension, `None` when unknown
    pub mime_type: Option<String>,
    pub extension_matches: bool,
}

/// Run the integrity checks on `path`.
///
/// Never fails: a check that cannot be performed leaves its field (and every
/// later field) at the default value.
pub fn check_integrity(path: &Path) -> IntegrityReport {
    let mut report = IntegrityReport::default();

    if !path.exists() {
        return report;
    }
    report.exists = true;

    if let Err(e) = read_first_byte(path) {
        debug!("{} is not readable: {}", path.display(), e);
        return report;
    }
    report.readable = true;

    match std::fs::metadata(path) {
        Ok(meta) => {
            report.size = meta.len();
            report.non_empty = report.size > 0;
        }
        Err(e) => {
            debug!("Failed to stat {}: {}", path.display(), e);
            return report;
        }
    }

    let mime_type = guess_mime_type(path);
    report.mime_type = mime_type.map(str::to_string);
    report.extension_matches = extension_matches(path, mime_type);

    report
}

fn read_first_byte(path: &Path) -> std::io::Result<()> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; 1];
    file.read(&mut buf).map(|_| ())
}

/// Unknown MIME types (and files with no guessable type) count as a match.
fn extension_matches(path: &Path, mime_type: Option<&str>) -> bool {
    let Some(expected) = mime_type.and_then(expected_extensions) else {
        return true;
    };

    let actual = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();

    expected.contains(&actual.as_str())
}
