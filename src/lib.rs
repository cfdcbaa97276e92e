//! # callfacts
//!
//! A server that answers a question from a series of meeting call logs.
//! Clients submit a question together with the URLs of the call-log
//! transcripts; the server fetches them, asks an LLM for the decisions the
//! team reached (later calls overriding earlier ones) and exposes the result
//! through a polling endpoint.
//!
//! ## Overview
//!
//! callfacts can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `callfacts-server` binary
//! 2. **As a library** - Embed the pipeline and task store in your own service
//!
//! ### Library Example
//!
//! ```rust,ignore
//! use callfacts::{DocumentFetcher, FactPipeline, LLMClientFactory, Provider, TaskStore};
//! use std::sync::Arc;
//!
//! let factory = Arc::new(LLMClientFactory::new(Provider::OpenAI {
//!     api_key: std::env::var("OPENAI_API_KEY")?,
//!     api_base: "https://api.openai.com/v1".to_string(),
//!     model: "gpt-4".to_string(),
//! }));
//! let pipeline = Arc::new(FactPipeline::new(
//!     DocumentFetcher::from_config(&Default::default())?,
//!     factory,
//! ));
//!
//! let store = Arc::new(TaskStore::new());
//! let handle = store.create(question.clone(), urls.clone());
//! pipeline.spawn(Arc::clone(&store), handle, question, urls).await?;
//! println!("{:?}", store.get(handle)?);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI API support (default) |
//! | `ollama` | Ollama local inference |
//! | `swagger-ui` | Interactive API documentation |
//!
//! ## Modules
//!
//! - [`api`] - REST handlers and routes
//! - [`pipeline`] - URL normalization, document fetching, fact synthesis
//! - [`tasks`] - Task store and lifecycle
//! - [`llm`] - LLM client implementations
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration with hot reloading

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Background document-to-facts pipeline.
pub mod pipeline;
/// Task store and lifecycle management.
pub mod tasks;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use llm::{
    ConfigBasedLLMFactory, LLMClient, LLMClientFactory, LLMClientFactoryTrait, Provider,
};
pub use pipeline::{DocumentFetcher, FactPipeline};
pub use tasks::{TaskHandle, TaskStore};
pub use types::{AppError, Result};
pub use utils::toml_config::{CallfactsConfig, ConfigManager};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// All submitted tasks
    pub tasks: Arc<TaskStore>,
    /// Background pipeline started for each submission
    pub pipeline: Arc<FactPipeline>,
}

impl AppState {
    /// Build the production state: LLM client and fetch settings follow the live config.
    pub fn from_config(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let llm_factory = Arc::new(ConfigBasedLLMFactory::new(Arc::clone(&config_manager)));
        let pipeline = FactPipeline::from_config(Arc::clone(&config_manager), llm_factory)?;

        Ok(Self {
            config_manager,
            tasks: Arc::new(TaskStore::new()),
            pipeline: Arc::new(pipeline),
        })
    }
}
