//! Core types for content extraction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::content_type::{self, ContentType};

/// An upload as it arrives at the system boundary.
///
/// Consumed once by extraction; the core never retains it.
#[derive(Debug, Clone)]
pub struct RawInput {
    /// File contents.
    pub bytes: Vec<u8>,
    /// Filename declared by the client.
    pub filename: String,
    /// Content type claimed by the client (may be empty or wrong).
    pub claimed_type: String,
}

impl RawInput {
    /// Create a new raw input.
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        claimed_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            claimed_type: claimed_type.into(),
        }
    }

    /// MIME type derived from the filename, falling back to the claimed type.
    pub fn resolved_type(&self) -> String {
        content_type::resolve(&self.filename, &self.claimed_type)
    }

    /// Size of the upload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the upload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Document structure metadata (optional, for structured documents).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// Total page count (for PDFs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,

    /// Text of each readable page, in page order (for PDFs).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub pages: Vec<String>,

    /// Number of top-level paragraphs and tables (for DOCX).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_count: Option<usize>,
}

/// Extracted content with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Extracted text: trimmed and never empty.
    pub text: String,

    /// Canonical format of the source document.
    pub content_type: ContentType,

    /// Document structure (if preserved).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<DocumentStructure>,

    /// Additional metadata (format-specific).
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ExtractedContent {
    /// Create new extracted content.
    pub fn new(text: String, content_type: ContentType) -> Self {
        Self {
            text,
            content_type,
            structure: None,
            metadata: HashMap::new(),
        }
    }

    /// Add structure information.
    pub fn with_structure(mut self, structure: DocumentStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Add metadata entry.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if extraction produced meaningful content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get content length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }
}
