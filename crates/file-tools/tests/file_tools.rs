//! End-to-end checks of the four tools against a scratch home directory

use std::path::Path;

use file_tools::{
    check_integrity, locate_file, protect_pdf, snapshot, IntegrityReport, PdfRenderer,
    ProtectRequest, SnapshotRequest,
};
use lopdf::{Dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Helper to create a PDF with N pages on disk
fn write_pdf(path: &Path, num_pages: u32) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for page_num in 0..num_pages {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", page_num + 1).into_bytes(),
        ));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(num_pages as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.save(path).unwrap();
}

/// Load a protected PDF and unlock it with `password`
fn open_locked(path: &Path, password: &str) -> lopdf::Result<Document> {
    let mut doc = Document::load(path)?;
    doc.decrypt(password)?;
    Ok(doc)
}

#[test]
fn integrity_of_readable_pdf() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("statement.pdf");
    write_pdf(&path, 2);

    let report = check_integrity(&path);
    let size = std::fs::metadata(&path).unwrap().len();
    assert!(size > 0);
    assert_eq!(
        report,
        IntegrityReport {
            exists: true,
            readable: true,
            non_empty: true,
            size,
            mime_type: Some("application/pdf".to_string()),
            extension_matches: true,
        }
    );
}

#[test]
fn integrity_of_missing_path_is_all_default() {
    let home = TempDir::new().unwrap();
    assert_eq!(
        check_integrity(&home.path().join("nope.pdf")),
        IntegrityReport::default()
    );
}

#[test]
fn locate_finds_nested_match_only() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("report.txt"), b"plain").unwrap();
    let nested = home.path().join("archive/2024/finance");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(nested.join("report_2024.pdf"), b"%PDF").unwrap();

    let found = locate_file(home.path(), "report_*", Some(".pdf"))
        .unwrap()
        .unwrap();
    assert!(found.is_absolute());
    assert_eq!(found.file_name().unwrap(), "report_2024.pdf");

    assert_eq!(locate_file(home.path(), "nomatch", Some(".xyz")).unwrap(), None);
}

#[test]
fn protect_round_trip_requires_password() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("contract.pdf");
    write_pdf(&input, 4);

    let request = ProtectRequest {
        input_path: "contract.pdf".to_string(),
        password: "correct horse".to_string(),
        output_path: Some("contract_locked.pdf".to_string()),
    };
    protect_pdf(home.path(), &request).unwrap();

    let output = home.path().join("contract_locked.pdf");
    let unlocked = open_locked(&output, "correct horse").unwrap();
    assert_eq!(unlocked.get_pages().len(), 4);
    assert!(open_locked(&output, "battery staple").is_err());

    let original = Document::load(&input).unwrap();
    assert_eq!(original.get_pages().len(), unlocked.get_pages().len());
}

#[test]
fn protect_twice_fails_with_reason() {
    let home = TempDir::new().unwrap();
    write_pdf(&home.path().join("twice.pdf"), 1);

    let request = ProtectRequest {
        input_path: "twice.pdf".to_string(),
        password: "pw".to_string(),
        output_path: None,
    };
    protect_pdf(home.path(), &request).unwrap();

    let err = protect_pdf(home.path(), &request).unwrap_err();
    assert!(!err.to_string().is_empty());
}

struct CopyRenderer;

#[async_trait::async_trait]
impl PdfRenderer for CopyRenderer {
    async fn render_to_file(&self, _url: &str, output: &Path) -> file_tools::Result<()> {
        write_pdf(output, 1);
        Ok(())
    }
}

#[tokio::test]
async fn snapshot_default_name_uses_domain_and_date() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir(home.path().join("Downloads")).unwrap();

    let request: SnapshotRequest =
        serde_json::from_value(serde_json::json!({"url": "https://example.com/page"})).unwrap();
    snapshot(home.path(), &CopyRenderer, &request).await.unwrap();

    let expected = format!(
        "example_snapshot_{}.pdf",
        chrono::Local::now().format("%m%d%Y")
    );
    let written = home.path().join("Downloads").join(expected);
    assert_eq!(check_integrity(&written).mime_type.as_deref(), Some("application/pdf"));
}
