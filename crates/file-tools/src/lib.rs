//! Local file-management tools
//!
//! Four independent, stateless operations over the local filesystem:
//! - `snapshot`: render a web page to a PDF under the home root
//! - `locate`: find the first file under the home root matching a wildcard pattern
//! - `protect`: rewrite a PDF with password-based encryption
//! - `integrity`: report existence, readability, size and MIME consistency of a file
//!
//! Every operation takes the home root explicitly instead of reading it from
//! the process environment.

pub mod error;
pub mod integrity;
pub mod locate;
pub mod mime;
pub mod protect;
pub mod snapshot;

pub use error::{Result, ToolError};
pub use integrity::{check_integrity, IntegrityReport};
pub use locate::locate_file;
pub use protect::{protect_pdf, ProtectRequest};
pub use snapshot::{snapshot, ChromeRenderer, PdfRenderer, SnapshotRequest};

use std::path::{Path, PathBuf};

/// Resolve a caller-supplied path against the home root.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(home: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}
