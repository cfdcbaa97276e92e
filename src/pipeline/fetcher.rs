use crate::types::{AppError, Document, Result};
use crate::utils::toml_config::{FetchConfig, NonSuccessPolicy};
use futures::future::try_join_all;
use tracing::{debug, warn};

/// Everything the fetch stage produced for one task.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// One entry per input URL, in input order, including dropped ones
    pub documents: Vec<Document>,
    /// Labeled sections of the kept documents, ready for the prompt
    pub combined: String,
    pub kept: usize,
    pub dropped: usize,
}

/// Retrieves call logs over HTTP.
///
/// All GETs for a task are in flight at once. A transport failure on any of
/// them fails the whole batch; non-2xx answers are handled by the
/// configured [`NonSuccessPolicy`].
#[derive(Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
    policy: NonSuccessPolicy,
}

impl DocumentFetcher {
    pub fn new(client: reqwest::Client, policy: NonSuccessPolicy) -> Self {
        Self { client, policy }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::new(client, config.non_success))
    }

    pub fn policy(&self) -> NonSuccessPolicy {
        self.policy
    }

    /// Fetch every URL concurrently and combine the successful bodies.
    pub async fn fetch_all(&self, urls: &[String]) -> Result<FetchReport> {
        let documents = try_join_all(
            urls.iter()
                .enumerate()
                .map(|(i, url)| self.fetch_one(i + 1, url)),
        )
        .await?;

        let kept = documents.iter().filter(|d| d.is_success()).count();
        let dropped = documents.len() - kept;

        if dropped > 0 {
            warn!(
                dropped,
                kept, "Dropped call logs that did not answer with a success status"
            );
        }

        Ok(FetchReport {
            combined: combine_documents(&documents),
            documents,
            kept,
            dropped,
        })
    }

    async fn fetch_one(&self, position: usize, url: &str) -> Result<Document> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        debug!(%url, position, status = status.as_u16(), "Fetched call log");

        if !status.is_success() {
            if self.policy == NonSuccessPolicy::Fail {
                return Err(AppError::Fetch(format!("GET {} returned {}", url, status)));
            }
            debug!(%url, status = status.as_u16(), "Dropping call log");
            return Ok(Document {
                url: url.to_string(),
                position,
                status: status.as_u16(),
                text: String::new(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Reading body of {} failed: {}", url, e)))?;

        Ok(Document {
            url: url.to_string(),
            position,
            status: status.as_u16(),
            text,
        })
    }
}

/// Join successful documents as `Call Log <n>` sections.
///
/// `<n>` is the document's position in the normalized URL list, so a dropped
/// document leaves a gap instead of shifting later labels.
pub fn combine_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .filter(|d| d.is_success())
        .map(|d| format!("Call Log {}\n{}", d.position, d.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_log(server: &MockServer, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn fetcher(policy: NonSuccessPolicy) -> DocumentFetcher {
        DocumentFetcher::new(reqwest::Client::new(), policy)
    }

    fn doc(position: usize, status: u16, text: &str) -> Document {
        Document {
            url: format!("https://x.io/{}", position),
            position,
            status,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_combine_uses_positions_and_skips_failures() {
        let docs = [
            doc(1, 200, "John: modular design"),
            doc(2, 404, "Not Found"),
            doc(3, 200, "Sara: desktop first"),
        ];

        assert_eq!(
            combine_documents(&docs),
            "Call Log 1\nJohn: modular design\nCall Log 3\nSara: desktop first"
        );
    }

    #[test]
    fn test_combine_empty() {
        assert_eq!(combine_documents(&[]), "");
        assert_eq!(combine_documents(&[doc(1, 500, "oops")]), "");
    }

    #[tokio::test]
    async fn test_all_ok_gives_one_section_per_url() {
        let server = MockServer::start().await;
        mount_log(&server, "/log_20240101.txt", 200, "first call").await;
        mount_log(&server, "/log_20240102.txt", 200, "second call").await;
        mount_log(&server, "/log_20240103.txt", 200, "third call").await;

        let urls: Vec<String> = ["log_20240101.txt", "log_20240102.txt", "log_20240103.txt"]
            .iter()
            .map(|p| format!("{}/{}", server.uri(), p))
            .collect();

        let report = fetcher(NonSuccessPolicy::Drop).fetch_all(&urls).await.unwrap();

        assert_eq!(report.kept, 3);
        assert_eq!(report.dropped, 0);
        assert_eq!(report.combined.matches("Call Log ").count(), 3);
        assert_eq!(
            report.combined,
            "Call Log 1\nfirst call\nCall Log 2\nsecond call\nCall Log 3\nthird call"
        );
        assert_eq!(report.documents[2].url, urls[2]);
    }

    #[tokio::test]
    async fn test_non_success_is_dropped_and_counted() {
        let server = MockServer::start().await;
        mount_log(&server, "/a.txt", 200, "kept a").await;
        mount_log(&server, "/missing.txt", 404, "nope").await;
        mount_log(&server, "/b.txt", 200, "kept b").await;

        let urls = vec![
            format!("{}/a.txt", server.uri()),
            format!("{}/missing.txt", server.uri()),
            format!("{}/b.txt", server.uri()),
        ];

        let report = fetcher(NonSuccessPolicy::Drop).fetch_all(&urls).await.unwrap();

        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.documents[1].status, 404);
        assert_eq!(report.combined, "Call Log 1\nkept a\nCall Log 3\nkept b");
        assert!(!report.combined.contains("nope"));
    }

    #[tokio::test]
    async fn test_fail_policy_turns_non_success_into_fault() {
        let server = MockServer::start().await;
        mount_log(&server, "/a.txt", 200, "kept a").await;
        mount_log(&server, "/gone.txt", 410, "gone").await;

        let urls = vec![
            format!("{}/a.txt", server.uri()),
            format!("{}/gone.txt", server.uri()),
        ];

        let result = fetcher(NonSuccessPolicy::Fail).fetch_all(&urls).await;
        assert!(matches!(result, Err(AppError::Fetch(msg)) if msg.contains("410")));
    }

    #[tokio::test]
    async fn test_transport_fault_fails_the_batch() {
        let server = MockServer::start().await;
        mount_log(&server, "/a.txt", 200, "kept a").await;

        // Bind then release a port so nothing is listening on it
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed_addr = closed.local_addr().unwrap();
        drop(closed);

        let urls = vec![
            format!("{}/a.txt", server.uri()),
            format!("http://{}/log.txt", closed_addr),
        ];

        let result = fetcher(NonSuccessPolicy::Drop).fetch_all(&urls).await;
        assert!(matches!(result, Err(AppError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_malformed_url_is_a_fetch_fault() {
        let urls = vec!["bad url".to_string()];
        let result = fetcher(NonSuccessPolicy::Drop).fetch_all(&urls).await;
        assert!(matches!(result, Err(AppError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_requests_run_concurrently() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::sync::Barrier;

        // Each connection is answered only once all of them are open, so a
        // sequential fetcher would never get its first response.
        const N: usize = 5;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let barrier = Arc::new(Barrier::new(N));
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    barrier.wait().await;
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\ncontent-length: 4\r\nconnection: close\r\n\r\nslow",
                        )
                        .await;
                });
            }
        });

        let urls: Vec<String> = (0..N).map(|i| format!("http://{}/{}.txt", addr, i)).collect();

        let report = tokio::time::timeout(
            Duration::from_secs(10),
            fetcher(NonSuccessPolicy::Drop).fetch_all(&urls),
        )
        .await
        .expect("requests were not in flight together")
        .unwrap();

        assert_eq!(report.kept, N);
    }

    #[test]
    fn test_from_config_keeps_policy() {
        let config = FetchConfig {
            non_success: NonSuccessPolicy::Fail,
            user_agent: Some("callfacts-test/1.0".to_string()),
        };
        let fetcher = DocumentFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.policy(), NonSuccessPolicy::Fail);
    }
}
