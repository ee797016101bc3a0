//! Document store implementations for Docent.

pub mod in_memory;

pub use in_memory::InMemoryDocumentStore;
