//! Extraction pipeline for processing content through appropriate extractors.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::content_type::ContentType;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{ExtractedContent, RawInput};
use crate::Extractor;

/// Pipeline for extracting content using registered extractors.
///
/// Routes content to the extractor for its format and enforces the output
/// contract: text is trimmed and never empty, and `content_type` is the
/// canonical format even when a near-variant MIME string was passed in.
pub struct ExtractionPipeline {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractionPipeline {
    /// Create new empty pipeline.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create pipeline with all available extractors.
    pub fn with_defaults() -> Self {
        Self {
            extractors: crate::ExtractorFactory::all(),
        }
    }

    /// Add an extractor to the pipeline.
    pub fn add_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Extract content using the appropriate extractor for the MIME type.
    ///
    /// The MIME type must be an exact member of the accepted set. Extractor
    /// failures come back wrapped in [`ExtractError::ExtractionFailed`]
    /// except [`ExtractError::EmptyContent`], which is returned as is.
    pub fn extract(&self, content: &[u8], mime_type: &str) -> ExtractResult<ExtractedContent> {
        let content_type: ContentType = mime_type.parse()?;

        let extractor = self
            .extractors
            .iter()
            .find(|e| e.content_type() == content_type)
            .ok_or_else(|| ExtractError::UnsupportedFormat(mime_type.to_string()))?;

        debug!(
            extractor = extractor.name(),
            format = %content_type,
            bytes = content.len(),
            "extracting document"
        );

        let mut extracted = match extractor.extract(content) {
            Ok(extracted) => extracted,
            Err(ExtractError::EmptyContent) => return Err(ExtractError::EmptyContent),
            Err(e) => {
                warn!(format = %content_type, kind = e.kind().as_str(), error = %e, "extraction failed");
                return Err(ExtractError::ExtractionFailed {
                    format: content_type,
                    source: Box::new(e),
                });
            }
        };

        let trimmed = extracted.text.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::EmptyContent);
        }
        if trimmed.len() != extracted.text.len() {
            extracted.text = trimmed.to_string();
        }
        extracted.content_type = content_type;

        debug!(format = %content_type, chars = extracted.text.chars().count(), "extraction complete");
        Ok(extracted)
    }

    /// Resolve the upload's type from its filename and claimed type, then extract.
    pub fn extract_input(&self, input: &RawInput) -> ExtractResult<ExtractedContent> {
        self.extract(&input.bytes, &input.resolved_type())
    }

    /// Check if pipeline can handle a given MIME type.
    pub fn supports(&self, mime_type: &str) -> bool {
        self.extractors.iter().any(|e| e.supports(mime_type))
    }

    /// List all supported MIME types.
    pub fn supported_types(&self) -> Vec<&str> {
        self.extractors
            .iter()
            .flat_map(|e| e.supported_types().iter().copied())
            .collect()
    }

    /// Get the number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Check if the pipeline has no registered extractors.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Extractor returning a fixed result, for exercising the pipeline contract.
    struct StubExtractor {
        content_type: ContentType,
        text: Option<&'static str>,
    }

    impl Extractor for StubExtractor {
        fn extract(&self, _content: &[u8]) -> ExtractResult<ExtractedContent> {
            match self.text {
                Some(text) => Ok(ExtractedContent::new(text.to_string(), ContentType::PlainText)),
                None => Err(ExtractError::corrupt("PDF", "broken xref table")),
            }
        }

        fn content_type(&self) -> ContentType {
            self.content_type
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn stub(content_type: ContentType, text: Option<&'static str>) -> Arc<dyn Extractor> {
        Arc::new(StubExtractor { content_type, text })
    }

    #[test]
    fn test_pipeline_creation() {
        let pipeline = ExtractionPipeline::with_defaults();

        #[cfg(feature = "pdf")]
        assert!(pipeline.supports("application/pdf"));

        #[cfg(feature = "docx")]
        assert!(pipeline.supports("application/docx"));

        assert!(pipeline.supports("text/plain"));
    }

    #[test]
    fn test_pipeline_empty() {
        let pipeline = ExtractionPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.len(), 0);
        assert!(!pipeline.supports("text/plain"));
    }

    #[test]
    fn test_pipeline_unsupported_type_error() {
        let pipeline = ExtractionPipeline::with_defaults();
        let result = pipeline.extract(b"test", "video/mp4");
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat(_))));

        let result = pipeline.extract(b"test", "application/msword");
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_pipeline_accepted_but_unregistered() {
        let pipeline = ExtractionPipeline::new();
        let result = pipeline.extract(b"test", "text/plain");
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_pipeline_trims_and_canonicalizes() {
        let pipeline =
            ExtractionPipeline::new().add_extractor(stub(ContentType::Docx, Some("  body \n")));
        let extracted = pipeline.extract(b"ignored", "application/x-docx").unwrap();
        assert_eq!(extracted.text, "body");
        assert_eq!(extracted.content_type, ContentType::Docx);
    }

    #[test]
    fn test_pipeline_rejects_blank_extractor_output() {
        let pipeline =
            ExtractionPipeline::new().add_extractor(stub(ContentType::PlainText, Some(" \n\t ")));
        let result = pipeline.extract(b"ignored", "text/plain");
        assert!(matches!(result, Err(ExtractError::EmptyContent)));
    }

    #[test]
    fn test_pipeline_wraps_extractor_failure() {
        let pipeline = ExtractionPipeline::new().add_extractor(stub(ContentType::Pdf, None));
        let err = pipeline.extract(b"ignored", "application/pdf").unwrap_err();

        assert!(matches!(
            err,
            ExtractError::ExtractionFailed {
                format: ContentType::Pdf,
                ..
            }
        ));
        assert_eq!(err.kind(), crate::ErrorKind::CorruptContainer);
    }

    #[test]
    fn test_pipeline_empty_text_not_wrapped() {
        let pipeline = ExtractionPipeline::with_defaults();
        let result = pipeline.extract(b"   \r\n  ", "text/plain");
        assert!(matches!(result, Err(ExtractError::EmptyContent)));
    }

    #[test]
    fn test_extract_input_uses_filename() {
        let pipeline = ExtractionPipeline::with_defaults();
        let input = RawInput::new(
            b"Dear team,\r\nthe invoice is attached.".to_vec(),
            "notes.TXT",
            "application/octet-stream",
        );
        let extracted = pipeline.extract_input(&input).unwrap();
        assert_eq!(extracted.text, "Dear team,\nthe invoice is attached.");
        assert_eq!(extracted.content_type, ContentType::PlainText);
    }
}
