//! Request middleware.
//!
//! Order on the versioned API, outermost first: auth, then the status gate
//! on routes that touch content or telemetry.

mod auth;
mod status_gate;

pub use auth::{auth_middleware, AuthMiddlewareError, AuthMiddlewareState};
pub use status_gate::status_gate_middleware;
