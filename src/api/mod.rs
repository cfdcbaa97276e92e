//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//! It only translates requests into task-store operations; all work happens
//! in [`crate::pipeline`].
//!
//! # API Endpoints
//!
//! - `POST /submit_question_and_documents` - Register a task and start the pipeline
//! - `GET /get_question_and_facts?task_id=<id>` - Poll a task
//! - `GET /health` - Health check endpoint
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # Response Shapes
//!
//! ```text
//! {"message": "Processing started", "task_id": 1}
//! {"question": "...", "facts": null, "status": "processing"}
//! {"question": "...", "facts": ["The team has decided to ..."], "status": "done"}
//! {"question": "...", "facts": null, "status": "error"}
//! {"error": "Task 7 not found"}
//! ```
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
