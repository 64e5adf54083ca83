//! Extension-based MIME type lookup
//!
//! Types are inferred from the file name only; file contents are never
//! inspected.

use std::path::Path;

/// Guess the MIME type of a file from its extension.
///
/// Returns `None` when the path has no extension or the extension is unknown.
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let mime = match ext.as_str() {
        // Documents
        "pdf" => "application/pdf",
        "doc" | "dot" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "rtf" => "application/rtf",
        "odt" => "application/vnd.oasis.opendocument.text",
        "epub" => "application/epub+zip",

        // Text
        "txt" | "text" | "log" | "c" | "h" | "bat" | "ksh" | "pl" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "htm" | "html" => "text/html",
        "css" => "text/css",
        "xml" => "text/xml",
        "js" | "mjs" => "text/javascript",
        "py" => "text/x-python",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",

        // Images
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",

        // Audio / video
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",

        // Archives
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",

        _ => return None,
    };

    Some(mime)
}

/// Extensions considered consistent with a MIME type.
///
/// Only a handful of types are checked; `None` means the type is not checked
/// and any extension is accepted.
pub fn expected_extensions(mime_type: &str) -> Option<&'static [&'static str]> {
    match mime_type {
        "image/jpeg" => Some(&[".jpg", ".jpeg"]),
        "image/png" => Some(&[".png"]),
        "application/pdf" => Some(&[".pdf"]),
        "text/plain" => Some(&[".txt"]),
        _ => None,
    }
}
