//! Text extraction from PDF bytes.

use crate::error::CourseGenError;
use tracing::debug;

/// PDF files start with `%PDF`.
const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Extract plain text from an in-memory PDF.
///
/// Rejects non-PDF bytes up front with [`CourseGenError::NotAPdf`] so a
/// mislabelled upload fails fast instead of producing a parser stack trace.
/// Whether the extracted text is usable (non-empty) is the caller's call:
/// an image-only PDF extracts successfully to whitespace.
pub fn extract_text(bytes: &[u8]) -> Result<String, CourseGenError> {
    if bytes.len() < PDF_MAGIC.len() || &bytes[..PDF_MAGIC.len()] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(CourseGenError::NotAPdf { magic });
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| CourseGenError::PdfExtraction {
            detail: e.to_string(),
        })?;

    debug!(chars = text.len(), "extracted text from PDF");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = extract_text(b"PK\x03\x04rest-of-a-zip").unwrap_err();
        match err {
            CourseGenError::NotAPdf { magic } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            extract_text(b"%P"),
            Err(CourseGenError::NotAPdf { .. })
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            extract_text(b""),
            Err(CourseGenError::NotAPdf { .. })
        ));
    }

    #[test]
    fn garbage_after_magic_is_a_parse_error() {
        // Correct magic, nonsense body: passes the cheap check, fails parsing.
        let err = extract_text(b"%PDF-1.7 but nothing else").unwrap_err();
        assert!(matches!(err, CourseGenError::PdfExtraction { .. }));
    }
}
