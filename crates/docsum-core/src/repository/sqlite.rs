//! SQLite-backed document repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{DocsumError, DocsumResult, ErrorCode};
use crate::traits::DocumentRepository;
use crate::types::{AnalysisMetadata, Document, DocumentAnalysis};

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository {
    conn: Mutex<Connection>,
}

impl SqliteDocumentRepository {
    /// Open (or create) a database at the given path.
    pub fn new(path: impl AsRef<Path>) -> DocsumResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| DocsumError::Database {
            message: format!("failed to open {}: {}", path.display(), e),
            code: ErrorCode::DbConnectionFailed,
            source: Some(Box::new(e)),
        })?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    /// Create an in-memory repository (for testing).
    pub fn in_memory() -> DocsumResult<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn lock(&self) -> DocsumResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DocsumError::database("connection lock poisoned"))
    }

    fn init_schema(&self) -> DocsumResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                content_type TEXT NOT NULL,
                storage_key TEXT NOT NULL,
                extracted_text TEXT NOT NULL,
                summary TEXT,
                document_type TEXT,
                metadata TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                analyzed_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_documents_created
                ON documents(created_at);
        "#,
        )?;
        Ok(())
    }

    fn parse_time(value: &str) -> DocsumResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DocsumError::database(format!("invalid timestamp '{}': {}", value, e)))
    }

    fn row_to_document(row: &Row<'_>) -> DocsumResult<Document> {
        let metadata: Option<String> = row.get(8)?;
        let created_at: String = row.get(9)?;
        let updated_at: String = row.get(10)?;
        let analyzed_at: Option<String> = row.get(11)?;
        let file_size: i64 = row.get(2)?;

        Ok(Document {
            id: row.get(0)?,
            filename: row.get(1)?,
            file_size: file_size.max(0) as u64,
            content_type: row.get(3)?,
            storage_key: row.get(4)?,
            extracted_text: row.get(5)?,
            summary: row.get(6)?,
            document_type: row.get(7)?,
            metadata: metadata
                .map(|m| serde_json::from_str::<AnalysisMetadata>(&m))
                .transpose()?,
            created_at: Self::parse_time(&created_at)?,
            updated_at: Self::parse_time(&updated_at)?,
            analyzed_at: analyzed_at.as_deref().map(Self::parse_time).transpose()?,
        })
    }
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn create(&self, document: &Document) -> DocsumResult<()> {
        let metadata = document
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO documents (
                id, filename, file_size, content_type, storage_key, extracted_text,
                summary, document_type, metadata, created_at, updated_at, analyzed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                document.id,
                document.filename,
                document.file_size as i64,
                document.content_type,
                document.storage_key,
                document.extracted_text,
                document.summary,
                document.document_type,
                metadata,
                document.created_at.to_rfc3339(),
                document.updated_at.to_rfc3339(),
                document.analyzed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    async fn get(&self, id: &str) -> DocsumResult<Option<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, filename, file_size, content_type, storage_key, extracted_text,
                   summary, document_type, metadata, created_at, updated_at, analyzed_at
            FROM documents
            WHERE id = ?1
            "#,
        )?;

        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_document(row)?)),
            None => Ok(None),
        }
    }

    async fn update_analysis(
        &self,
        id: &str,
        analysis: &DocumentAnalysis,
        analyzed_at: DateTime<Utc>,
    ) -> DocsumResult<()> {
        let metadata = serde_json::to_string(&analysis.metadata)?;
        let timestamp = analyzed_at.to_rfc3339();

        let conn = self.lock()?;
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM documents WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(DocsumError::not_found(id));
        }

        conn.execute(
            r#"
            UPDATE documents
            SET summary = ?1, document_type = ?2, metadata = ?3,
                analyzed_at = ?4, updated_at = ?4
            WHERE id = ?5
            "#,
            params![
                analysis.summary,
                analysis.document_type,
                metadata,
                timestamp,
                id
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Document {
        Document::new(
            "4b7c0e5e",
            "invoice.pdf",
            2048,
            "application/pdf",
            "documents/4b7c0e5e/invoice.pdf",
            "Invoice 2024-001\nTotal: 120 EUR",
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = SqliteDocumentRepository::in_memory().unwrap();
        let doc = sample();
        repo.create(&doc).await.unwrap();

        let loaded = repo.get(&doc.id).await.unwrap().unwrap();
        assert_eq!(loaded.filename, "invoice.pdf");
        assert_eq!(loaded.file_size, 2048);
        assert_eq!(loaded.extracted_text, doc.extracted_text);
        assert_eq!(loaded.created_at, doc.created_at);
        assert!(loaded.analyzed_at.is_none());
        assert!(loaded.metadata.is_none());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let repo = SqliteDocumentRepository::in_memory().unwrap();
        assert!(repo.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_fails() {
        let repo = SqliteDocumentRepository::in_memory().unwrap();
        repo.create(&sample()).await.unwrap();
        let err = repo.create(&sample()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DbOperationFailed);
    }

    #[tokio::test]
    async fn test_update_analysis() {
        let repo = SqliteDocumentRepository::in_memory().unwrap();
        let doc = sample();
        repo.create(&doc).await.unwrap();

        let analysis = DocumentAnalysis {
            summary: "An invoice for consulting services.".to_string(),
            document_type: "invoice".to_string(),
            metadata: AnalysisMetadata {
                amount: Some("120".to_string()),
                currency: Some("EUR".to_string()),
                ..Default::default()
            },
        };
        let at = Utc::now();
        repo.update_analysis(&doc.id, &analysis, at).await.unwrap();

        let loaded = repo.get(&doc.id).await.unwrap().unwrap();
        assert_eq!(loaded.summary.as_deref(), Some("An invoice for consulting services."));
        assert_eq!(loaded.document_type.as_deref(), Some("invoice"));
        assert_eq!(loaded.metadata.unwrap().currency.as_deref(), Some("EUR"));
        assert_eq!(loaded.analyzed_at, Some(at));
    }

    #[tokio::test]
    async fn test_update_analysis_missing_document() {
        let repo = SqliteDocumentRepository::in_memory().unwrap();
        let err = repo
            .update_analysis("ghost", &DocumentAnalysis::default(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DocNotFound);
    }

    #[tokio::test]
    async fn test_file_backed_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("docsum.db");

        {
            let repo = SqliteDocumentRepository::new(&path).unwrap();
            repo.create(&sample()).await.unwrap();
        }

        let repo = SqliteDocumentRepository::new(&path).unwrap();
        assert!(repo.get("4b7c0e5e").await.unwrap().is_some());
    }
}
