//! PDF password protection
//!
//! The source document is read completely into memory and re-serialized
//! before anything is written, so protecting a file in place never reads
//! from a partially overwritten source.

use std::path::Path;

use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, StringFormat};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::resolve_path;

/// RC4 key length in bits for the standard security handler
const KEY_LENGTH: usize = 128;

/// Request to password-protect a PDF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectRequest {
    /// PDF to protect, absolute or relative to the home root
    pub input_path: String,
    /// Used as both the user and the owner password
    pub password: String,
    /// Destination; the input is rewritten in place when absent
    #[serde(default)]
    pub output_path: Option<String>,
}

/// Encrypt the requested PDF and write it to its destination.
///
/// Any fault (missing input, corrupt or already encrypted PDF, I/O failure)
/// is returned as an error; nothing is written unless encryption succeeded.
pub fn protect_pdf(home: &Path, request: &ProtectRequest) -> Result<String> {
    if request.password.is_empty() {
        return Err(ToolError::InvalidArgument(
            "password must not be empty".to_string(),
        ));
    }

    let input = resolve_path(home, &request.input_path);
    let output = match &request.output_path {
        Some(path) => resolve_path(home, path),
        None => input.clone(),
    };

    info!("Protecting {} -> {}", input.display(), output.display());

    let source = std::fs::read(&input)?;
    let (protected, page_count) = encrypt_document(&source, &request.password)
        .map_err(|e| match e {
            ToolError::AlreadyEncrypted(_) => ToolError::AlreadyEncrypted(input.display().to_string()),
            other => other,
        })?;

    std::fs::write(&output, protected)?;

    Ok(format!(
        "the file has been successfully protected ({} pages written to {})",
        page_count,
        output.display()
    ))
}

/// Encrypt PDF bytes with `password`, returning the new bytes and page count.
///
/// The algorithm:
/// 1. Parse the source and reject it if it is already encrypted
/// 2. Drop objects unreachable from the trailer and renumber the rest
/// 3. Make sure the trailer carries a file identifier (the key derivation needs one)
/// 4. Encrypt strings and streams, then serialize
pub fn encrypt_document(bytes: &[u8], password: &str) -> Result<(Vec<u8>, usize)> {
    let mut doc = Document::load_mem(bytes)?;

    if doc.is_encrypted() {
        return Err(ToolError::AlreadyEncrypted("source document".to_string()));
    }

    let page_count = doc.get_pages().len();
    debug!("Loaded PDF with {} pages", page_count);

    doc.prune_objects();
    doc.renumber_objects();
    ensure_file_id(&mut doc, bytes);

    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password: password,
        user_password: password,
        key_length: KEY_LENGTH,
        permissions: Permissions::all(),
    })?;
    doc.encrypt(&state)?;

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;

    Ok((buffer, page_count))
}

/// Derive a file identifier from the source bytes when the trailer has none.
fn ensure_file_id(doc: &mut Document, source: &[u8]) {
    if doc.trailer.get(b"ID").is_ok() {
        return;
    }

    let digest = Sha256::digest(source);
    let id = digest[..16].to_vec();
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
}
