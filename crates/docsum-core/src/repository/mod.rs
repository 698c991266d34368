//! Document repository implementations.

mod memory;
mod sqlite;

pub use memory::InMemoryDocumentRepository;
pub use sqlite::SqliteDocumentRepository;
