//! Factory for creating extractors.

use std::sync::Arc;

use crate::content_type::ContentType;
use crate::error::{ExtractError, ExtractResult};
use crate::text::TextExtractor;
use crate::Extractor;

#[cfg(feature = "pdf")]
use crate::PdfExtractor;

#[cfg(feature = "docx")]
use crate::DocxExtractor;

/// Factory for creating content extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create a PDF extractor.
    #[cfg(feature = "pdf")]
    pub fn pdf() -> Arc<dyn Extractor> {
        Arc::new(PdfExtractor::new())
    }

    /// Create a DOCX extractor.
    #[cfg(feature = "docx")]
    pub fn docx() -> Arc<dyn Extractor> {
        Arc::new(DocxExtractor::new())
    }

    /// Create a plain-text extractor.
    pub fn text() -> Arc<dyn Extractor> {
        Arc::new(TextExtractor::new())
    }

    /// Create the extractor for a format, if it was compiled in.
    pub fn for_content_type(content_type: ContentType) -> Option<Arc<dyn Extractor>> {
        match content_type {
            #[cfg(feature = "pdf")]
            ContentType::Pdf => Some(Self::pdf()),

            #[cfg(feature = "docx")]
            ContentType::Docx => Some(Self::docx()),

            ContentType::PlainText => Some(Self::text()),

            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    /// Create extractor for a given MIME type.
    pub fn for_mime_type(mime_type: &str) -> ExtractResult<Arc<dyn Extractor>> {
        ContentType::parse(mime_type)
            .and_then(Self::for_content_type)
            .ok_or_else(|| ExtractError::UnsupportedFormat(mime_type.to_string()))
    }

    /// Get all available extractors.
    #[allow(clippy::vec_init_then_push)]
    pub fn all() -> Vec<Arc<dyn Extractor>> {
        let mut extractors: Vec<Arc<dyn Extractor>> = Vec::new();

        #[cfg(feature = "pdf")]
        extractors.push(Self::pdf());

        #[cfg(feature = "docx")]
        extractors.push(Self::docx());

        extractors.push(Self::text());

        extractors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_all_extractors() {
        let extractors = ExtractorFactory::all();

        #[cfg(all(feature = "pdf", feature = "docx"))]
        assert_eq!(extractors.len(), 3);

        #[cfg(not(any(feature = "pdf", feature = "docx")))]
        assert_eq!(extractors.len(), 1);
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_factory_docx() {
        let extractor = ExtractorFactory::docx();
        assert!(extractor.supports("application/docx"));
        assert!(extractor.supports("application/x-docx"));
        assert!(!extractor.supports("application/msword"));
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_factory_for_mime_type_docx() {
        let extractor = ExtractorFactory::for_mime_type(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        )
        .unwrap();
        assert_eq!(extractor.content_type(), ContentType::Docx);
    }

    #[test]
    fn test_factory_text_variants() {
        for mime in ["text/plain", "text/txt", "application/txt", "application/x-txt"] {
            let extractor = ExtractorFactory::for_mime_type(mime).unwrap();
            assert_eq!(extractor.name(), "plain-text");
        }
    }

    #[test]
    fn test_factory_for_mime_type_unsupported() {
        let Err(err) = ExtractorFactory::for_mime_type("application/msword") else {
            panic!("legacy Word documents have no extractor");
        };
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));

        let err = ExtractorFactory::for_mime_type("image/png").err().unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedFormat);
    }
}
