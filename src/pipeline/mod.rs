//! Document-to-Facts Pipeline
//!
//! Runs in the background for every submitted task:
//!
//! 1. **Normalize** - clean the URLs and order them oldest call first
//! 2. **Fetch** - GET every call log concurrently, dropping non-2xx answers
//! 3. **Synthesize** - prompt the LLM and split its reply into facts
//! 4. **Complete** - write `Done` or `Error` into the task store
//!
//! Any failure along the way ends the task in `Error`; nothing is retried.
//!
//! # Usage
//!
//! ```ignore
//! use callfacts::pipeline::FactPipeline;
//! use callfacts::tasks::TaskStore;
//!
//! let store = Arc::new(TaskStore::new());
//! let handle = store.create(question.clone(), urls.clone());
//! pipeline.spawn(Arc::clone(&store), handle, question, urls);
//! ```

/// Concurrent HTTP retrieval of call logs.
pub mod fetcher;
/// Prompt construction and completion parsing.
pub mod synthesizer;
/// URL cleaning and date ordering.
pub mod urls;

pub use fetcher::{DocumentFetcher, FetchReport};
pub use synthesizer::FactSynthesizer;

use crate::llm::LLMClientFactoryTrait;
use crate::tasks::{TaskHandle, TaskOutcome, TaskStore};
use crate::types::Result;
use crate::utils::toml_config::{ConfigManager, FetchConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};

/// Where each task's [`DocumentFetcher`] comes from.
enum FetcherSource {
    Fixed(DocumentFetcher),
    /// Rebuilt from `[fetch]` whenever the live config changes
    Live {
        config: Arc<ConfigManager>,
        cached: Mutex<(FetchConfig, DocumentFetcher)>,
    },
}

impl FetcherSource {
    fn fetcher(&self) -> Result<DocumentFetcher> {
        match self {
            FetcherSource::Fixed(fetcher) => Ok(fetcher.clone()),
            FetcherSource::Live { config, cached } => {
                let current = config.config();
                let mut cached = cached.lock();
                if cached.0 != current.fetch {
                    let fetcher = DocumentFetcher::from_config(&current.fetch)?;
                    info!(policy = ?current.fetch.non_success, "Fetch settings changed");
                    *cached = (current.fetch.clone(), fetcher);
                }
                Ok(cached.1.clone())
            }
        }
    }
}

/// Owns the collaborators the background pipeline needs.
pub struct FactPipeline {
    fetcher: FetcherSource,
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
}

impl FactPipeline {
    /// Pipeline with fixed fetch settings
    pub fn new(fetcher: DocumentFetcher, llm_factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        Self {
            fetcher: FetcherSource::Fixed(fetcher),
            llm_factory,
        }
    }

    /// Pipeline that reads `[fetch]` from the live configuration for every
    /// task, so a hot reload applies to the next submission.
    pub fn from_config(
        config: Arc<ConfigManager>,
        llm_factory: Arc<dyn LLMClientFactoryTrait>,
    ) -> Result<Self> {
        let fetch = config.config().fetch.clone();
        let fetcher = DocumentFetcher::from_config(&fetch)?;
        Ok(Self {
            fetcher: FetcherSource::Live {
                config,
                cached: Mutex::new((fetch, fetcher)),
            },
            llm_factory,
        })
    }

    /// Normalize, fetch and synthesize. Does not touch the task store.
    pub async fn run(&self, question: &str, urls: &[String]) -> Result<Vec<String>> {
        let ordered = urls::normalize_urls(urls);
        info!(documents = ordered.len(), "Fetching call logs");

        let report = self.fetcher.fetcher()?.fetch_all(&ordered).await?;
        info!(
            kept = report.kept,
            dropped = report.dropped,
            "Call logs fetched"
        );

        let llm = self.llm_factory.create_default().await?;
        let synthesizer = FactSynthesizer::new(llm);
        info!(model = synthesizer.model_name(), "Synthesizing facts");

        synthesizer.synthesize(question, &report.combined).await
    }

    /// Run the pipeline for `handle` and record its outcome in `store`.
    pub async fn process(
        &self,
        store: &TaskStore,
        handle: TaskHandle,
        question: &str,
        urls: &[String],
    ) {
        let start = Instant::now();
        let result = self.run(question, urls).await;

        match &result {
            Ok(facts) => info!(
                facts = facts.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Task finished"
            ),
            Err(e) => error!(
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Task failed"
            ),
        }

        if let Err(e) = store.complete(handle, TaskOutcome::from(result)) {
            warn!(error = %e, "Discarding pipeline result");
        }
    }

    /// Start the pipeline in the background and return immediately.
    ///
    /// The caller must already have created `handle` in `store`; the returned
    /// handle may be dropped, the task runs to completion either way.
    pub fn spawn(
        self: &Arc<Self>,
        store: Arc<TaskStore>,
        handle: TaskHandle,
        question: String,
        urls: Vec<String>,
    ) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        let span = info_span!("task", id = handle.id());

        tokio::spawn(
            async move {
                pipeline.process(&store, handle, &question, &urls).await;
            }
            .instrument(span),
        )
    }
}
