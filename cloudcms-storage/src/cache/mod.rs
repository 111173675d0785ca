//! Latest-value cache.
//!
//! A weak mirror of the most recent status and version records. Writers flush
//! it after every append; readers repopulate it on a miss.

pub mod memory;
pub mod traits;

pub use memory::InMemoryLatestCache;
pub use traits::LatestValueCache;
