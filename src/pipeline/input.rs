//! Input validation: confirm the caller-supplied path is a readable PDF.
//!
//! The pipeline never mutates or takes ownership of the source document; the
//! caller manages its lifetime. Validating the `%PDF` magic bytes up front
//! gives callers a meaningful error instead of a pdfium parse failure deep
//! inside the rasteriser.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate existence, readability, and PDF magic bytes of a document path.
pub fn validate_document(path: &Path) -> Result<PathBuf, ExtractError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(ExtractError::FileNotFound { path });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ExtractError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    }

    debug!("Validated PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = validate_document(Path::new("/nonexistent/doc.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"GIF89a not a pdf")
            .unwrap();

        let err = validate_document(&path).unwrap_err();
        match err {
            ExtractError::NotAPdf { magic, .. } => assert_eq!(&magic, b"GIF8"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.7\n%fake body")
            .unwrap();

        let validated = validate_document(&path).unwrap();
        assert_eq!(validated, path);
    }

    #[test]
    fn short_file_is_accepted() {
        // Fewer than 4 bytes: magic check is skipped, pdfium decides later.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pdf");
        std::fs::File::create(&path).unwrap().write_all(b"%P").unwrap();

        assert!(validate_document(&path).is_ok());
    }
}
