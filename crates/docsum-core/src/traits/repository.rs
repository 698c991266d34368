//! Document repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DocsumResult;
use crate::types::{Document, DocumentAnalysis};

/// Persistence for document records.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document record.
    async fn create(&self, document: &Document) -> DocsumResult<()>;

    /// Get a document by id.
    async fn get(&self, id: &str) -> DocsumResult<Option<Document>>;

    /// Store an analysis result and mark the document analyzed.
    ///
    /// Returns `NotFound` if no document has the id.
    async fn update_analysis(
        &self,
        id: &str,
        analysis: &DocumentAnalysis,
        analyzed_at: DateTime<Utc>,
    ) -> DocsumResult<()>;
}
