//! Document text extraction for uploaded resumes and job descriptions.
//!
//! PDFs go through `pdf-extract`; plain text is decoded as UTF-8 (lossy).
//! Parsing runs on the blocking pool, and a parser panic is reported as an
//! error rather than taking the request down with it.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("PDF parser crashed on this document")]
    ParserPanicked,

    #[error("No text could be extracted from the document")]
    Empty,
}

/// One uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    PlainText,
}

fn detect_kind(upload: &Upload) -> Result<DocumentKind, DocumentError> {
    let content_type = upload.content_type.as_deref().unwrap_or("").to_ascii_lowercase();
    let filename = upload.filename.as_deref().unwrap_or("").to_ascii_lowercase();

    if upload.data.starts_with(b"%PDF") || content_type == "application/pdf" {
        return Ok(DocumentKind::Pdf);
    }
    if content_type.starts_with("text/") || filename.ends_with(".txt") {
        return Ok(DocumentKind::PlainText);
    }

    let label = if content_type.is_empty() {
        filename
    } else {
        content_type
    };
    Err(DocumentError::Unsupported(label))
}

/// Extracts the text of an uploaded document. Text that is blank after
/// trimming is an error so callers never analyze a document they failed to read.
pub async fn extract_text(upload: Upload) -> Result<String, DocumentError> {
    let kind = detect_kind(&upload)?;

    let text = match kind {
        DocumentKind::PlainText => String::from_utf8_lossy(&upload.data).into_owned(),
        DocumentKind::Pdf => {
            let data = upload.data.clone();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
                .await
                .map_err(|_| DocumentError::ParserPanicked)?
                .map_err(|e| DocumentError::Pdf(format!("{e:?}")))?
        }
    };

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }

    debug!(kind = ?kind, chars = text.len(), "document text extracted");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(filename: &str, content_type: Option<&str>, data: &'static [u8]) -> Upload {
        Upload {
            filename: Some(filename.to_string()),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_detects_pdf_by_magic_bytes() {
        let u = upload("resume.bin", Some("application/octet-stream"), b"%PDF-1.7 ...");
        assert_eq!(detect_kind(&u).unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_detects_pdf_by_content_type() {
        let u = upload("resume", Some("application/pdf"), b"junk");
        assert_eq!(detect_kind(&u).unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_detects_plain_text_by_extension() {
        let u = upload("jd.TXT", None, b"Python");
        assert_eq!(detect_kind(&u).unwrap(), DocumentKind::PlainText);
    }

    #[test]
    fn test_rejects_images() {
        let u = upload("photo.png", Some("image/png"), b"\x89PNG");
        assert!(matches!(detect_kind(&u), Err(DocumentError::Unsupported(t)) if t == "image/png"));
    }

    #[tokio::test]
    async fn test_plain_text_is_returned_verbatim() {
        let text = extract_text(upload("jd.txt", Some("text/plain"), b"Django and Flask"))
            .await
            .unwrap();
        assert_eq!(text, "Django and Flask");
    }

    #[tokio::test]
    async fn test_blank_document_is_an_error() {
        let err = extract_text(upload("jd.txt", Some("text/plain"), b"  \n\t"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Empty));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_an_error() {
        let corrupt = upload("resume.pdf", Some("application/pdf"), b"%PDF-1.4 truncated");
        let result = extract_text(corrupt).await;
        assert!(result.is_err());
    }
}
