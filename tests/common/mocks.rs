//! Mock implementations for testing.
//!
//! This module provides mock LLM clients and factories that can be used
//! across different test files without duplication.

#![allow(dead_code)]

use async_trait::async_trait;
use callfacts::llm::{LLMClient, LLMClientFactoryTrait};
use callfacts::types::{AppError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

/// Mock LLM client with a canned completion.
///
/// Every prompt it receives is recorded, and clones share the record, so a
/// test can keep one clone and inspect what the pipeline sent.
///
/// # Examples
///
/// ```ignore
/// let client = MockLLMClient::new("The team has decided to ship.");
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Create a mock client that blocks every completion until `gate` is
    /// notified. Keeps a task in `processing` for as long as a test needs.
    pub fn gated(response: &str, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(response)
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    async fn respond(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock LLM factory for tests requiring complete isolation from external services.
///
/// Hands out clones of one `MockLLMClient`, or fails client creation the way a
/// missing API key would.
pub struct MockLLMFactory {
    client: MockLLMClient,
    unavailable: bool,
}

impl MockLLMFactory {
    /// Create a new mock factory that returns the given mock client.
    pub fn new(client: MockLLMClient) -> Self {
        Self {
            client,
            unavailable: false,
        }
    }

    /// Create a factory whose provider cannot be configured.
    pub fn unavailable() -> Self {
        Self {
            client: MockLLMClient::new(""),
            unavailable: true,
        }
    }
}

#[async_trait]
impl LLMClientFactoryTrait for MockLLMFactory {
    async fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        if self.unavailable {
            return Err(AppError::Config(
                "Environment variable 'OPENAI_API_KEY' is not set".to_string(),
            ));
        }
        Ok(Box::new(self.client.clone()))
    }
}
