//! Domain types shared by the service, stores and analyzers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A stored document and its analysis state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub file_size: u64,
    /// Canonical MIME type.
    pub content_type: String,
    /// Object-store key of the original bytes.
    pub storage_key: String,
    pub extracted_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once analysis has been persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create a new, not yet analyzed document.
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        file_size: u64,
        content_type: impl Into<String>,
        storage_key: impl Into<String>,
        extracted_text: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            filename: filename.into(),
            file_size,
            content_type: content_type.into(),
            storage_key: storage_key.into(),
            extracted_text: extracted_text.into(),
            summary: None,
            document_type: None,
            metadata: None,
            created_at: now,
            updated_at: now,
            analyzed_at: None,
        }
    }

    /// Check if an analysis has been persisted for this document.
    pub fn is_analyzed(&self) -> bool {
        self.analyzed_at.is_some()
    }

    /// Record an analysis result on this document.
    pub fn apply_analysis(&mut self, analysis: &DocumentAnalysis, analyzed_at: DateTime<Utc>) {
        self.summary = Some(analysis.summary.clone());
        self.document_type = Some(analysis.document_type.clone());
        self.metadata = Some(analysis.metadata.clone());
        self.updated_at = analyzed_at;
        self.analyzed_at = Some(analyzed_at);
    }

    /// The persisted analysis, if any.
    pub fn cached_analysis(&self) -> Option<AnalysisResponse> {
        let analyzed_at = self.analyzed_at?;
        Some(AnalysisResponse {
            id: self.id.clone(),
            summary: self.summary.clone().unwrap_or_default(),
            document_type: self.document_type.clone().unwrap_or_default(),
            metadata: self.metadata.clone().unwrap_or_default(),
            analyzed_at,
        })
    }
}

/// Returned from a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub filename: String,
    pub file_size: u64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// Returned from an analysis request, fresh or cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub id: String,
    pub summary: String,
    pub document_type: String,
    pub metadata: AnalysisMetadata,
    pub analyzed_at: DateTime<Utc>,
}

/// Structured result produced by an analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub summary: String,
    pub document_type: String,
    #[serde(default)]
    pub metadata: AnalysisMetadata,
}

/// Fields pulled out of the document by the analyzer. All nullable.
///
/// Keys beyond the known set are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub recipient: Option<String>,
    /// Models return this as a number or a string; stored as text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Accept a string, number or boolean; map null, blank and the literal
/// string "null" to `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            )))
        }
    };

    Ok(text
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null")))
}
