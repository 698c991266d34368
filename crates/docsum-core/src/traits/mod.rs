//! Collaborator traits for docsum.
//!
//! The document service depends only on these; concrete backends are
//! chosen by the binary.

mod analyzer;
mod object_store;
mod repository;

pub use analyzer::Analyzer;
pub use object_store::ObjectStore;
pub use repository::DocumentRepository;
