//! LLM Provider Clients and Abstractions
//!
//! This module provides the completion capability used by the fact
//! synthesizer. Provider-specific implementations sit behind common traits,
//! so the pipeline works with any supported LLM and tests can inject mocks.
//!
//! # Architecture
//!
//! The module follows a factory pattern:
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`LLMClientFactoryTrait`] - How the pipeline obtains a client per task
//! - [`ConfigBasedLLMFactory`] - Creates clients from the live `callfacts.toml`
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API (GPT-4 and compatible endpoints), enabled by default
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use callfacts::llm::{LLMClientFactory, LLMClientFactoryTrait, Provider};
//!
//! let factory = LLMClientFactory::new(Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! });
//! let client = factory.create_default().await?;
//! let completion = client.generate("List the decisions made.").await?;
//! ```

/// Core LLM client trait, providers and factories.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{
    ConfigBasedLLMFactory, LLMClient, LLMClientFactory, LLMClientFactoryTrait, Provider,
};
