//! Error types for docsum operations.
//!
//! Every variant carries a structured [`ErrorCode`] and callers can ask
//! whether a failure was caused by the client's input or by the server.

use docsum_extractors::{ErrorKind, ExtractError};
use thiserror::Error;

/// Result type alias for docsum operations.
pub type DocsumResult<T> = Result<T, DocsumError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all docsum operations.
#[derive(Error, Debug)]
pub enum DocsumError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// Upload exceeds the configured size limit.
    #[error("Payload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Text extraction failed.
    #[error("Extraction error: {source}")]
    Extraction {
        code: ErrorCode,
        #[source]
        source: ExtractError,
    },

    /// Document not found.
    #[error("Document not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        document_id: Option<String>,
    },

    /// Object storage operation failed.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<BoxError>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<BoxError>,
    },

    /// LLM operation failed.
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValEmptyUpload,
    ValPayloadTooLarge,

    // Extraction (EXT_xxx)
    ExtUnsupportedFormat,
    ExtCorruptContainer,
    ExtMissingPart,
    ExtEmptyContent,
    ExtDecodeFailure,

    // Documents (DOC_xxx)
    DocNotFound,

    // Storage (STO_xxx)
    StoWriteFailed,
    StoReadFailed,
    StoInvalidKey,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // LLM (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmInvalidResponse,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValEmptyUpload => "VAL_002",
            ErrorCode::ValPayloadTooLarge => "VAL_003",
            ErrorCode::ExtUnsupportedFormat => "EXT_001",
            ErrorCode::ExtCorruptContainer => "EXT_002",
            ErrorCode::ExtMissingPart => "EXT_003",
            ErrorCode::ExtEmptyContent => "EXT_004",
            ErrorCode::ExtDecodeFailure => "EXT_005",
            ErrorCode::DocNotFound => "DOC_001",
            ErrorCode::StoWriteFailed => "STO_001",
            ErrorCode::StoReadFailed => "STO_002",
            ErrorCode::StoInvalidKey => "STO_003",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::UnsupportedFormat => ErrorCode::ExtUnsupportedFormat,
            ErrorKind::CorruptContainer => ErrorCode::ExtCorruptContainer,
            ErrorKind::MissingRequiredPart => ErrorCode::ExtMissingPart,
            ErrorKind::EmptyContent => ErrorCode::ExtEmptyContent,
            ErrorKind::DecodeFailure => ErrorCode::ExtDecodeFailure,
        }
    }
}

impl DocsumError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create the error for an upload with no bytes.
    pub fn empty_upload() -> Self {
        Self::Validation {
            message: "Uploaded file is empty".to_string(),
            code: ErrorCode::ValEmptyUpload,
            suggestion: Some("Select a non-empty PDF, DOCX or plain text file".to_string()),
        }
    }

    /// Create a not found error.
    pub fn not_found(document_id: impl Into<String>) -> Self {
        let id = document_id.into();
        Self::NotFound {
            message: format!("Document with id '{}' not found", id),
            code: ErrorCode::DocNotFound,
            document_id: Some(id),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            code: ErrorCode::StoWriteFailed,
            source: None,
        }
    }

    /// Create a storage error with an underlying cause.
    pub fn storage_with<E>(code: ErrorCode, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            code,
            source: Some(Box::new(source)),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create an LLM error.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmGenerationFailed,
            source: None,
        }
    }

    /// Create an LLM connection error.
    pub fn llm_connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmConnectionFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create an error for an LLM reply that could not be interpreted.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmInvalidResponse,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::PayloadTooLarge { .. } => ErrorCode::ValPayloadTooLarge,
            Self::Extraction { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Storage { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Llm { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Check if the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::PayloadTooLarge { .. }
                | Self::Extraction { .. }
                | Self::NotFound { .. }
        )
    }

    /// Message safe to return to the caller.
    ///
    /// Client errors describe the problem; server errors stay generic so
    /// that collaborator details do not leak.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::PayloadTooLarge { limit, .. } => {
                format!("File too large. Maximum size is {} bytes", limit)
            }
            Self::Extraction { source, .. } => source.public_message(),
            Self::NotFound { .. } => "Document not found".to_string(),
            Self::Storage { .. } => "Failed to store document".to_string(),
            Self::Database { .. } => "Failed to access document records".to_string(),
            Self::Llm { .. } => "Failed to analyze document".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::PayloadTooLarge { .. } => Some("Reduce the file size or split the document"),
            Self::Extraction { source, .. } => source.suggestion(),
            Self::NotFound { .. } => Some("Please check the document ID and ensure it exists"),
            Self::Llm { .. } => Some("Please check your OpenRouter API key and model settings"),
            Self::Configuration(_) => Some("Check the DOCSUM_* environment variables"),
            _ => None,
        }
    }
}

impl From<ExtractError> for DocsumError {
    fn from(err: ExtractError) -> Self {
        Self::Extraction {
            code: err.kind().into(),
            source: err,
        }
    }
}

impl From<rusqlite::Error> for DocsumError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
