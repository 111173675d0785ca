//! Document store backends.

pub mod lmdb_backend;
pub mod memory;
pub mod traits;

pub use lmdb_backend::{LmdbDocumentStore, LmdbStoreError};
pub use memory::InMemoryDocumentStore;
pub use traits::{decode_doc, encode_doc, DocumentStore};
