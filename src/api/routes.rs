use crate::AppState;
use crate::api::handlers;
use crate::types::{SubmitRequest, SubmitResponse, TaskStatus, TaskView};
use axum::{Json, Router, routing::get, routing::post};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;

/// OpenAPI description of the task endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::tasks::submit_question_and_documents,
        handlers::tasks::get_question_and_facts,
    ),
    components(schemas(SubmitRequest, SubmitResponse, TaskView, TaskStatus)),
    tags((name = "tasks", description = "Question submission and result polling"))
)]
pub struct ApiDoc;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

pub fn create_router(static_dir: Option<&Path>) -> Router<AppState> {
    let mut router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/submit_question_and_documents",
            post(handlers::tasks::submit_question_and_documents),
        )
        .route(
            "/get_question_and_facts",
            get(handlers::tasks::get_question_and_facts),
        );

    #[cfg(feature = "swagger-ui")]
    {
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()),
        );
    }
    #[cfg(not(feature = "swagger-ui"))]
    {
        router = router.route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }));
    }

    // Browser front-end, when one is deployed next to the server
    if let Some(dir) = static_dir {
        router = router
            .nest_service("/static", ServeDir::new(dir))
            .route_service("/", ServeFile::new(dir.join("index.html")));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMClientFactory;
    use crate::pipeline::{DocumentFetcher, FactPipeline};
    use crate::tasks::TaskStore;
    use crate::utils::toml_config::{CallfactsConfig, ConfigManager, NonSuccessPolicy};
    use crate::{AppState, Provider};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let factory = LLMClientFactory::new(Provider::Ollama {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        });
        AppState {
            config_manager: Arc::new(ConfigManager::from_config(CallfactsConfig::default())),
            tasks: Arc::new(TaskStore::new()),
            pipeline: Arc::new(FactPipeline::new(
                DocumentFetcher::new(reqwest::Client::new(), NonSuccessPolicy::Drop),
                Arc::new(factory),
            )),
        }
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_health() {
        let router = create_router(None).with_state(test_state());
        let (status, body) = get(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_no_front_end_without_static_dir() {
        let router = create_router(None).with_state(test_state());
        let (status, _) = get(router, "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serves_front_end_from_static_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>callfacts</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "poll();").unwrap();

        let router = create_router(Some(dir.path())).with_state(test_state());
        let (status, body) = get(router.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("callfacts"));

        let (status, body) = get(router, "/static/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "poll();");
    }

    #[test]
    fn test_openapi_document_names_both_task_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/submit_question_and_documents"));
        assert!(doc.paths.paths.contains_key("/get_question_and_facts"));
    }
}
