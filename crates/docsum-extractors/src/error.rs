//! Extraction error types.

use thiserror::Error;

use crate::content_type::{ContentType, LEGACY_DOC_MIME};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure category shared by every extractor.
///
/// Callers decide how to surface a failure (client error, retry, ...)
/// from the kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Content type is outside the supported set.
    UnsupportedFormat,
    /// ZIP or PDF structure could not be parsed.
    CorruptContainer,
    /// Container opened but an expected internal part is absent.
    MissingRequiredPart,
    /// Parsing succeeded but produced no usable text.
    EmptyContent,
    /// Text bytes could not be interpreted under the detected encoding.
    DecodeFailure,
}

impl ErrorKind {
    /// Stable identifier for logs and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::CorruptContainer => "corrupt_container",
            ErrorKind::MissingRequiredPart => "missing_required_part",
            ErrorKind::EmptyContent => "empty_content",
            ErrorKind::DecodeFailure => "decode_failure",
        }
    }
}

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Content type is not supported by any extractor.
    #[error("Unsupported content type: {0}")]
    UnsupportedFormat(String),

    /// The container (ZIP archive, PDF file structure) is malformed.
    #[error("Corrupt {format} container: {message}")]
    CorruptContainer {
        format: &'static str,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A part the format requires is missing from the container.
    #[error("Missing required part: {0}")]
    MissingRequiredPart(String),

    /// Extracted content is empty.
    #[error("Empty content extracted")]
    EmptyContent,

    /// Text bytes could not be decoded.
    #[error("Text decoding failed: {0}")]
    DecodeFailure(String),

    /// An extractor failed; raised by the pipeline around the extractor's own error.
    #[error("{format} extraction failed: {source}")]
    ExtractionFailed {
        format: ContentType,
        #[source]
        source: Box<ExtractError>,
    },
}

impl ExtractError {
    /// Create a corrupt-container error without an underlying cause.
    pub fn corrupt(format: &'static str, message: impl Into<String>) -> Self {
        Self::CorruptContainer {
            format,
            message: message.into(),
            source: None,
        }
    }

    /// Create a corrupt-container error that keeps the parser's error as its source.
    pub fn corrupt_with<E>(format: &'static str, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CorruptContainer {
            format,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the failure category, looking through pipeline wrapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::CorruptContainer { .. } => ErrorKind::CorruptContainer,
            Self::MissingRequiredPart(_) => ErrorKind::MissingRequiredPart,
            Self::EmptyContent => ErrorKind::EmptyContent,
            Self::DecodeFailure(_) => ErrorKind::DecodeFailure,
            Self::ExtractionFailed { source, .. } => source.kind(),
        }
    }

    /// Message safe to show to the uploader. Never includes parser state.
    pub fn public_message(&self) -> String {
        match self {
            Self::UnsupportedFormat(mime) => format!(
                "Unsupported file type '{}'. Only PDF, DOCX and plain text files are allowed",
                mime
            ),
            Self::CorruptContainer { .. } => {
                "The document could not be read. The file may be corrupted".to_string()
            }
            Self::MissingRequiredPart(_) => {
                "The document is missing required content. The file may be corrupted".to_string()
            }
            Self::EmptyContent => {
                "No text could be extracted from the document. The file may be empty or corrupted"
                    .to_string()
            }
            Self::DecodeFailure(_) => "The text file could not be decoded".to_string(),
            Self::ExtractionFailed { source, .. } => source.public_message(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFormat(mime) if mime == LEGACY_DOC_MIME => {
                Some("Legacy .doc files are not supported. Save the document as .docx and upload it again")
            }
            Self::UnsupportedFormat(_) => Some("Upload a PDF, DOCX or plain text file"),
            Self::EmptyContent => Some("Check that the document contains selectable text"),
            Self::ExtractionFailed { source, .. } => source.suggestion(),
            _ => None,
        }
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
