//! In-memory document repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{DocsumError, DocsumResult};
use crate::traits::DocumentRepository;
use crate::types::{Document, DocumentAnalysis};

/// Repository keeping records in a map. For tests and dry runs.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> DocsumError {
    DocsumError::database("repository lock poisoned")
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: &Document) -> DocsumResult<()> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        if documents.contains_key(&document.id) {
            return Err(DocsumError::database(format!(
                "document '{}' already exists",
                document.id
            )));
        }
        documents.insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> DocsumResult<Option<Document>> {
        Ok(self
            .documents
            .read()
            .map_err(|_| poisoned())?
            .get(id)
            .cloned())
    }

    async fn update_analysis(
        &self,
        id: &str,
        analysis: &DocumentAnalysis,
        analyzed_at: DateTime<Utc>,
    ) -> DocsumResult<()> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| DocsumError::not_found(id))?;
        document.apply_analysis(analysis, analyzed_at);
        Ok(())
    }
}
