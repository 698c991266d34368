//! docsum-extractors - Text extraction for uploaded documents.
//!
//! Turns an opaque upload (PDF, DOCX or plain text) into normalized,
//! analyzable text through a set of format-specific extractors behind a
//! single trait-based interface.
//!
//! # Features
//!
//! - `pdf` (default) - PDF text extraction via lopdf
//! - `docx` (default) - DOCX text extraction via zip + quick-xml
//!
//! Plain-text extraction is always available.
//!
//! # Example
//!
//! ```ignore
//! use docsum_extractors::{content_type, ExtractionPipeline};
//!
//! let mime = content_type::resolve("report.docx", "application/octet-stream");
//! let pipeline = ExtractionPipeline::with_defaults();
//! let extracted = pipeline.extract(&docx_bytes, &mime)?;
//! println!("{}", extracted.text);
//! ```

pub mod content_type;
mod error;
mod factory;
mod pipeline;
pub mod text;
mod types;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

pub use content_type::{is_supported, resolve, ContentType};
pub use error::{ErrorKind, ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use pipeline::ExtractionPipeline;
pub use text::{detect_encoding, looks_like_text, TextEncoding, TextExtractor};
pub use types::{DocumentStructure, ExtractedContent, RawInput};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "docx")]
pub use docx::DocxExtractor;

/// Core Extractor trait - all format extractors implement this.
///
/// Extraction is synchronous and holds no state between calls, so a single
/// extractor can be shared across threads behind an `Arc`.
pub trait Extractor: Send + Sync {
    /// Extract text content from bytes.
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent>;

    /// The document format this extractor handles.
    fn content_type(&self) -> ContentType;

    /// Supported MIME types for this extractor.
    fn supported_types(&self) -> &[&str] {
        self.content_type().accepted_mimes()
    }

    /// Check if this extractor handles the given MIME type.
    fn supports(&self, mime_type: &str) -> bool {
        self.supported_types().contains(&mime_type)
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}

/// Trim extracted text, rejecting results with nothing left.
pub(crate) fn non_empty(text: &str) -> ExtractResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    Ok(trimmed.to_string())
}
