//! CloudCMS Storage - document store and latest-value cache
//!
//! Two collaborators back every service:
//! - [`DocumentStore`]: keyed documents with ancestor-scoped, filtered,
//!   ordered queries (in-memory and LMDB implementations)
//! - [`LatestValueCache`]: lossy single-value cache for "latest" lookups

pub mod cache;
pub mod key;
pub mod query;
pub mod store;

pub use cache::{InMemoryLatestCache, LatestValueCache};
pub use key::{DocKey, KeyId};
pub use query::{Direction, FieldValue, Filter, FilterOp, Query};
pub use store::{
    decode_doc, encode_doc, DocumentStore, InMemoryDocumentStore, LmdbDocumentStore, LmdbStoreError,
};
