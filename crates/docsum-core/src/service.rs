//! Document service: upload, extraction, persistence and analysis.
//!
//! The service owns no state of its own. It validates the upload, runs the
//! extraction pipeline on the blocking pool, stores the original bytes,
//! persists the record and, on request, analyzes the extracted text.

use std::sync::Arc;

use chrono::Utc;
use docsum_extractors::text::detect_bom;
use docsum_extractors::{looks_like_text, ContentType, ExtractError, ExtractionPipeline, RawInput};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{DocsumConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::{DocsumError, DocsumResult};
use crate::traits::{Analyzer, DocumentRepository, ObjectStore};
use crate::types::{AnalysisResponse, Document, UploadResponse};

const UPLOAD_MESSAGE: &str =
    "Document uploaded successfully. Analyze it by id to get a summary.";

/// Object-store key for an upload: `documents/{id}/{filename}`.
///
/// Only the last path component of the client filename is used.
pub fn storage_key(id: &str, filename: &str) -> String {
    let name = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or("upload");
    format!("documents/{}/{}", id, name)
}

/// Orchestrates the document lifecycle over pluggable collaborators.
pub struct DocumentService {
    pipeline: Arc<ExtractionPipeline>,
    repository: Arc<dyn DocumentRepository>,
    store: Arc<dyn ObjectStore>,
    analyzer: Arc<dyn Analyzer>,
    max_upload_bytes: u64,
    sniff_text: bool,
}

impl DocumentService {
    /// Create a service with the default extraction pipeline and limits.
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        store: Arc<dyn ObjectStore>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            pipeline: Arc::new(ExtractionPipeline::with_defaults()),
            repository,
            store,
            analyzer,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            sniff_text: false,
        }
    }

    /// Apply upload limits and sniffing from configuration.
    pub fn with_config(mut self, config: &DocsumConfig) -> Self {
        self.max_upload_bytes = config.max_upload_bytes;
        self.sniff_text = config.sniff_text;
        self
    }

    /// Replace the extraction pipeline.
    pub fn with_pipeline(mut self, pipeline: ExtractionPipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    /// Set the upload size limit in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Enable or disable content sniffing of BOM-less plain-text uploads.
    pub fn with_text_sniffing(mut self, enabled: bool) -> Self {
        self.sniff_text = enabled;
        self
    }

    /// Check size and type before any parsing.
    fn validate(&self, input: &RawInput, mime: &str) -> DocsumResult<ContentType> {
        if input.is_empty() {
            warn!(filename = %input.filename, "rejected empty upload");
            return Err(DocsumError::empty_upload());
        }

        let size = input.len() as u64;
        if size > self.max_upload_bytes {
            warn!(filename = %input.filename, size, limit = self.max_upload_bytes, "rejected oversized upload");
            return Err(DocsumError::PayloadTooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let content_type = ContentType::parse(mime).ok_or_else(|| {
            warn!(filename = %input.filename, content_type = %mime, "unsupported content type");
            DocsumError::from(ExtractError::UnsupportedFormat(mime.to_string()))
        })?;

        if self.sniff_text
            && content_type == ContentType::PlainText
            && detect_bom(&input.bytes).is_none()
            && !looks_like_text(&input.bytes)
        {
            warn!(filename = %input.filename, "plain-text upload looks binary");
            return Err(DocsumError::validation_with_suggestion(
                "The file does not look like plain text",
                "Upload PDF and DOCX files with their own extension",
            ));
        }

        Ok(content_type)
    }

    /// Accept an upload: validate, extract, store and persist it.
    pub async fn upload(&self, input: RawInput) -> DocsumResult<UploadResponse> {
        let mime = input.resolved_type();
        let content_type = self.validate(&input, &mime)?;
        let RawInput {
            bytes, filename, ..
        } = input;

        let pipeline = Arc::clone(&self.pipeline);
        let (bytes, extracted) = tokio::task::spawn_blocking(move || {
            let extracted = pipeline.extract(&bytes, &mime);
            (bytes, extracted)
        })
        .await
        .map_err(|e| DocsumError::Internal(format!("extraction task failed: {}", e)))?;

        let extracted = extracted.map_err(|e| {
            warn!(filename = %filename, kind = e.kind().as_str(), error = %e, "text extraction failed");
            DocsumError::from(e)
        })?;

        let id = Uuid::new_v4().to_string();
        let key = storage_key(&id, &filename);
        let mime = content_type.mime();

        self.store.put(&key, &bytes, mime).await.map_err(|e| {
            error!(error = %e, key = %key, "failed to store document");
            e
        })?;

        let document = Document::new(
            id.clone(),
            filename.clone(),
            bytes.len() as u64,
            mime,
            key.clone(),
            extracted.text,
        );

        if let Err(e) = self.repository.create(&document).await {
            error!(error = %e, id = %id, "failed to save document record");
            if let Err(cleanup) = self.store.delete(&key).await {
                warn!(error = %cleanup, key = %key, "failed to remove stored object");
            }
            return Err(e);
        }

        info!(
            id = %id,
            filename = %filename,
            content_type = mime,
            text_length = document.extracted_text.len(),
            "document uploaded"
        );

        Ok(UploadResponse {
            id,
            filename,
            file_size: document.file_size,
            content_type: document.content_type,
            created_at: document.created_at,
            message: UPLOAD_MESSAGE.to_string(),
        })
    }

    /// Analyze a stored document, returning the cached result if present.
    pub async fn analyze(&self, id: &str) -> DocsumResult<AnalysisResponse> {
        let document = self.get(id).await?;

        if let Some(cached) = document.cached_analysis() {
            info!(id, "returning cached analysis");
            return Ok(cached);
        }

        debug!(
            id,
            model = self.analyzer.model_name(),
            text_length = document.extracted_text.len(),
            "starting analysis"
        );

        let analysis = self
            .analyzer
            .analyze(&document.extracted_text)
            .await
            .map_err(|e| {
                error!(error = %e, id, "analysis failed");
                e
            })?;

        let analyzed_at = Utc::now();
        self.repository
            .update_analysis(id, &analysis, analyzed_at)
            .await
            .map_err(|e| {
                error!(error = %e, id, "failed to save analysis");
                e
            })?;

        info!(id, document_type = %analysis.document_type, "document analyzed");

        Ok(AnalysisResponse {
            id: id.to_string(),
            summary: analysis.summary,
            document_type: analysis.document_type,
            metadata: analysis.metadata,
            analyzed_at,
        })
    }

    /// Get a document record by id.
    pub async fn get(&self, id: &str) -> DocsumResult<Document> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DocsumError::not_found(id))
    }

    /// Get the original bytes of a stored document.
    pub async fn original(&self, id: &str) -> DocsumResult<Vec<u8>> {
        let document = self.get(id).await?;
        self.store.get(&document.storage_key).await
    }
}
