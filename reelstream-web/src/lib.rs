//! Reelstream Web - HTTP API for range-based media delivery
//!
//! Exposes the streaming core over axum: the `/stream/{resource_id}`
//! endpoint with full byte-range semantics, watch-progress endpoints, and a
//! catalog listing. Ships in-memory implementations of the access-gate and
//! session-tracker collaborators so the server runs standalone against a
//! directory of media files.

pub mod handlers;
pub mod server;
pub mod session_store;

pub use server::{AppState, build_router, run_server};
pub use session_store::{InMemorySessionTracker, OpenAccessGate};
