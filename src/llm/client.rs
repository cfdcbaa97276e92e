//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for the completion capability the
//! fact synthesizer depends on:
//! - **OpenAI**: chat completions via `async-openai` (feature `openai`)
//! - **Ollama**: local inference via `ollama-rs` (feature `ollama`)

use crate::types::{AppError, Result};
use crate::utils::toml_config::{ConfigManager, ProviderConfig};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a single completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// # Supported Providers
///
/// | Provider | Feature | Notes |
/// |----------|---------|-------|
/// | OpenAI | `openai` (default) | Any OpenAI-compatible endpoint |
/// | Ollama | `ollama` | Local inference |
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Resolve a provider from configuration, reading secrets from the environment
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = std::env::var(api_key_env)
                    .ok()
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        AppError::Config(format!(
                            "Environment variable '{}' is not set",
                            api_key_env
                        ))
                    })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                })
            }
            ProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's Cargo feature is disabled or the
    /// configuration is invalid.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url, model.clone())?,
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Config(format!(
                "{} provider requested but the '{}' feature is not enabled",
                other.name(),
                other.name().to_lowercase()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Abstraction over how the pipeline obtains an LLM client.
///
/// The server uses [`ConfigBasedLLMFactory`]; tests substitute a mock.
#[async_trait]
pub trait LLMClientFactoryTrait: Send + Sync {
    /// Create a client for the currently configured provider
    async fn create_default(&self) -> Result<Box<dyn LLMClient>>;
}

/// Client factory with a fixed default provider
///
/// # Example
///
/// ```rust,ignore
/// use callfacts::llm::{LLMClientFactory, Provider};
///
/// let factory = LLMClientFactory::new(Provider::Ollama {
///     base_url: "http://localhost:11434".to_string(),
///     model: "llama3.2".to_string(),
/// });
///
/// let client = factory.create_default().await?;
/// ```
pub struct LLMClientFactory {
    default_provider: Provider,
}

impl LLMClientFactory {
    /// Create a new factory with the specified default provider
    pub fn new(default_provider: Provider) -> Self {
        Self { default_provider }
    }
}

#[async_trait]
impl LLMClientFactoryTrait for LLMClientFactory {
    async fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        self.default_provider.create_client().await
    }
}

/// Creates clients from the live configuration.
///
/// The provider is resolved on every call, so hot-reloaded settings apply to
/// the next task without restarting the server.
pub struct ConfigBasedLLMFactory {
    config: Arc<ConfigManager>,
}

impl ConfigBasedLLMFactory {
    pub fn new(config: Arc<ConfigManager>) -> Self {
        Self { config }
    }

    /// Provider the next client will be created for
    pub fn current_provider(&self) -> Result<Provider> {
        Provider::from_config(&self.config.config().llm)
    }
}

#[async_trait]
impl LLMClientFactoryTrait for ConfigBasedLLMFactory {
    async fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        self.current_provider()?.create_client().await
    }
}
