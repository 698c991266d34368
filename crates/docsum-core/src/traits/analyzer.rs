//! Analyzer trait.

use async_trait::async_trait;

use crate::error::DocsumResult;
use crate::types::DocumentAnalysis;

/// Produces a structured summary of extracted document text.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze document text.
    ///
    /// Implementations decide how much of the text to send; callers pass
    /// the full extracted text.
    async fn analyze(&self, text: &str) -> DocsumResult<DocumentAnalysis>;

    /// Get the model name used for analysis.
    fn model_name(&self) -> &str;
}
