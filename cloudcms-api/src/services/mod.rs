//! Services: store and cache orchestration around the core decisions.
//!
//! Handlers stay thin; everything that touches the store or cache lives
//! here and returns `CmsResult`.

pub mod content;
pub mod curator;
pub mod latest;
pub mod telemetry;
