//! Object store implementations.

mod local;
mod memory;

pub use local::LocalObjectStore;
pub use memory::InMemoryObjectStore;
