//! Task Store and Lifecycle
//!
//! Tracks every submission from creation to its terminal state:
//!
//! ```text
//! Processing ──▶ Done  (facts populated)
//!      │
//!      └──────▶ Error (reason kept internally)
//! ```
//!
//! `Processing` is written synchronously by the submitting request before the
//! pipeline is spawned, so a poller never observes a missing task right after a
//! successful submission. The background pipeline calls
//! [`store::TaskStore::complete`] exactly once.

/// Mutex-guarded in-memory task registry.
pub mod store;

pub use store::{Task, TaskHandle, TaskOutcome, TaskState, TaskStore};
