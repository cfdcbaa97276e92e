//! API request handlers.

/// Task submission and polling handlers.
pub mod tasks;
