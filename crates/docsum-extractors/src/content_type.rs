//! Content-type resolution and validation.
//!
//! The filename extension is the most reliable signal for browser uploads,
//! so it takes precedence over the client-supplied header. Validation is
//! a lookup against the fixed set of accepted MIME strings below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Canonical MIME type for PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// Canonical MIME type for OOXML wordprocessing documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Canonical MIME type for plain text.
pub const TEXT_MIME: &str = "text/plain";

/// Legacy Word binary format. Recognized so it can be rejected with a clear message.
pub const LEGACY_DOC_MIME: &str = "application/msword";

const PDF_ACCEPTED: &[&str] = &[PDF_MIME];

const DOCX_ACCEPTED: &[&str] = &[
    DOCX_MIME,
    "application/vnd.openxmlformats-officedocument.wordprocessingml",
    "application/docx",
    "application/x-docx",
];

const TEXT_ACCEPTED: &[&str] = &[
    TEXT_MIME,
    "text/txt",
    "application/txt",
    "application/x-txt",
];

/// A supported document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    Docx,
    #[serde(rename = "text/plain")]
    PlainText,
}

impl ContentType {
    /// Every supported format.
    pub const ALL: [ContentType; 3] = [ContentType::Pdf, ContentType::Docx, ContentType::PlainText];

    /// The canonical MIME string for this format.
    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Pdf => PDF_MIME,
            ContentType::Docx => DOCX_MIME,
            ContentType::PlainText => TEXT_MIME,
        }
    }

    /// All MIME strings accepted as this format, canonical first.
    pub fn accepted_mimes(self) -> &'static [&'static str] {
        match self {
            ContentType::Pdf => PDF_ACCEPTED,
            ContentType::Docx => DOCX_ACCEPTED,
            ContentType::PlainText => TEXT_ACCEPTED,
        }
    }

    /// Look up a MIME string in the accepted set. Matching is exact.
    pub fn parse(mime: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ct| ct.accepted_mimes().contains(&mime))
    }

    /// Short label used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Pdf => "PDF",
            ContentType::Docx => "DOCX",
            ContentType::PlainText => "plain text",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ExtractError::UnsupportedFormat(s.to_string()))
    }
}

/// Lowercased extension of the last path component, including the dot.
fn extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    name.rfind('.').map(|idx| name[idx..].to_ascii_lowercase())
}

/// Derive the MIME type for an upload.
///
/// Known extensions map to their canonical type; anything else falls back
/// to the declared header verbatim, valid or not. Validation is a
/// separate step ([`is_supported`]).
pub fn resolve(filename: &str, declared: &str) -> String {
    let mapped = match extension(filename).as_deref() {
        Some(".pdf") => Some(PDF_MIME),
        Some(".docx") => Some(DOCX_MIME),
        Some(".txt") => Some(TEXT_MIME),
        Some(".doc") => Some(LEGACY_DOC_MIME),
        _ => None,
    };

    mapped
        .map(str::to_string)
        .unwrap_or_else(|| declared.to_string())
}

/// Check if the MIME type is one of the accepted strings.
pub fn is_supported(mime: &str) -> bool {
    ContentType::parse(mime).is_some()
}

/// Map any accepted variant to its canonical MIME string.
pub fn canonicalize(mime: &str) -> Option<&'static str> {
    ContentType::parse(mime).map(ContentType::mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_extension() {
        assert_eq!(resolve("report.pdf", ""), PDF_MIME);
        assert_eq!(resolve("x.docx", ""), DOCX_MIME);
        assert_eq!(resolve("notes.txt", "application/octet-stream"), TEXT_MIME);
        assert_eq!(resolve("old.doc", DOCX_MIME), LEGACY_DOC_MIME);
    }

    #[test]
    fn test_resolve_extension_is_case_insensitive() {
        assert_eq!(resolve("SCAN.PDF", "image/png"), PDF_MIME);
        assert_eq!(resolve("Letter.DocX", ""), DOCX_MIME);
    }

    #[test]
    fn test_resolve_falls_back_to_header() {
        assert_eq!(resolve("x.unknown", "text/csv"), "text/csv");
        assert_eq!(resolve("README", "text/plain"), "text/plain");
        assert_eq!(resolve("archive.tar.gz", ""), "");
    }

    #[test]
    fn test_resolve_uses_last_path_component() {
        assert_eq!(resolve("dir.pdf/notes", "text/csv"), "text/csv");
        assert_eq!(resolve("C:\\docs\\cv.docx", ""), DOCX_MIME);
    }

    #[test]
    fn test_is_supported() {
        for ct in ContentType::ALL {
            for mime in ct.accepted_mimes() {
                assert!(is_supported(mime), "{} should be supported", mime);
            }
        }
        assert!(!is_supported(LEGACY_DOC_MIME));
        assert!(!is_supported("text/csv"));
        assert!(!is_supported(""));
        assert!(!is_supported("APPLICATION/PDF"));
        assert!(!is_supported("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_canonicalize_variants() {
        assert_eq!(canonicalize("application/x-docx"), Some(DOCX_MIME));
        assert_eq!(canonicalize("application/x-txt"), Some(TEXT_MIME));
        assert_eq!(canonicalize("image/png"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("application/docx".parse::<ContentType>().unwrap(), ContentType::Docx);
        let err = "video/mp4".parse::<ContentType>().unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ref m) if m == "video/mp4"));
    }

    #[test]
    fn test_serde_uses_canonical_mime() {
        let json = serde_json::to_string(&ContentType::Docx).unwrap();
        assert_eq!(json, format!("\"{}\"", DOCX_MIME));
    }
}
