use crate::{
    AppState,
    tasks::TaskHandle,
    types::{AppError, Result, SubmitRequest, SubmitResponse, TaskQuery, TaskView},
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use tracing::info;

/// Submit a question and the call logs to answer it from
///
/// The task is registered as `processing` before this returns; fetching and
/// synthesis continue in the background.
#[utoipa::path(
    post,
    path = "/submit_question_and_documents",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Processing started", body = SubmitResponse),
        (status = 400, description = "Malformed request body")
    ),
    tag = "tasks"
)]
pub async fn submit_question_and_documents(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>> {
    let Json(payload) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let handle = state
        .tasks
        .create(payload.question.clone(), payload.documents.clone());
    info!(
        task_id = handle.id(),
        documents = payload.documents.len(),
        "Task submitted"
    );

    // Not awaited: the pipeline outlives this request
    state.pipeline.spawn(
        state.tasks.clone(),
        handle,
        payload.question,
        payload.documents,
    );

    Ok(Json(SubmitResponse {
        message: "Processing started".to_string(),
        task_id: handle.id(),
    }))
}

/// Poll a task for its status and facts
#[utoipa::path(
    get,
    path = "/get_question_and_facts",
    params(TaskQuery),
    responses(
        (status = 200, description = "Current task snapshot", body = TaskView),
        (status = 400, description = "Missing or invalid task_id"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn get_question_and_facts(
    State(state): State<AppState>,
    query: std::result::Result<Query<TaskQuery>, QueryRejection>,
) -> Result<Json<TaskView>> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let task_id = query
        .task_id
        .ok_or_else(|| AppError::InvalidInput("task_id query parameter is required".to_string()))?;

    state.tasks.get(TaskHandle::new(task_id)).map(Json)
}
