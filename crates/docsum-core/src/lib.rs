//! docsum-core - Core library for docsum.
//!
//! This crate provides the error type, configuration, domain types,
//! collaborator traits and the [`DocumentService`] that ties extraction,
//! storage, persistence and analysis together.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docsum_core::{DocsumConfig, DocumentService, LocalObjectStore, SqliteDocumentRepository};
//! use docsum_extractors::RawInput;
//!
//! let config = DocsumConfig::from_env();
//! let service = DocumentService::new(
//!     Arc::new(SqliteDocumentRepository::new(config.database_path())?),
//!     Arc::new(LocalObjectStore::new(config.storage_dir())),
//!     analyzer,
//! )
//! .with_config(&config);
//!
//! let uploaded = service.upload(RawInput::new(bytes, "cv.docx", "")).await?;
//! let analysis = service.analyze(&uploaded.id).await?;
//! ```

pub mod config;
pub mod error;
pub mod repository;
pub mod service;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{DocsumConfig, LlmSettings};
pub use error::{DocsumError, DocsumResult, ErrorCode};
pub use repository::{InMemoryDocumentRepository, SqliteDocumentRepository};
pub use service::{storage_key, DocumentService};
pub use store::{InMemoryObjectStore, LocalObjectStore};
pub use traits::{Analyzer, DocumentRepository, ObjectStore};
pub use types::{AnalysisMetadata, AnalysisResponse, Document, DocumentAnalysis, UploadResponse};
