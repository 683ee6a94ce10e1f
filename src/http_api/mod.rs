use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;

use crate::{
    CpmResult, DependencyCoverage, ProjectPlan, ScheduleEngine, ScheduleMetadata, TaskDescriptor,
    TaskInputError,
};

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
pub const HTTP_ADDR_ENV_VAR: &str = "CPM_HTTP_ADDR";

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<ProjectPlan>>,
}

impl AppState {
    pub fn new(plan: ProjectPlan) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
        }
    }

    pub fn with_shared(plan: Arc<RwLock<ProjectPlan>>) -> Self {
        Self { plan }
    }

    fn plan(&self) -> Arc<RwLock<ProjectPlan>> {
        self.plan.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<TaskInputError> for ApiError {
    fn from(value: TaskInputError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(get_metadata).put(update_metadata))
        .route("/tasks", get(list_tasks).put(replace_tasks).post(create_task))
        .route("/tasks/:id", delete(delete_task).get(get_task))
        .route("/schedule", get(get_schedule))
        .route("/coverage", get(get_coverage))
        .route("/calculate", post(calculate_tasks))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: ProjectPlan) -> std::io::Result<()> {
    let state = AppState::new(plan);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "cpm-engine HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_metadata(State(state): State<AppState>) -> Json<ScheduleMetadata> {
    let plan = state.plan();
    let metadata = plan.read().metadata.clone();
    Json(metadata)
}

async fn update_metadata(
    State(state): State<AppState>,
    Json(metadata): Json<ScheduleMetadata>,
) -> Json<ScheduleMetadata> {
    let plan = state.plan();
    plan.write().metadata = metadata.clone();
    Json(metadata)
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<TaskDescriptor>> {
    let plan = state.plan();
    let tasks = plan.read().tasks.clone();
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskDescriptor>, ApiError> {
    let plan = state.plan();
    let task = plan.read().find_task(&task_id).cloned();
    task.map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task '{task_id}' not found")))
}

async fn replace_tasks(
    State(state): State<AppState>,
    Json(tasks): Json<Vec<TaskDescriptor>>,
) -> Result<Json<Vec<TaskDescriptor>>, ApiError> {
    crate::task_validation::validate_descriptors(&tasks)?;
    let plan = state.plan();
    plan.write().tasks = tasks.clone();
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<TaskDescriptor>,
) -> Result<(StatusCode, Json<TaskDescriptor>), ApiError> {
    let plan = state.plan();
    let mut guard = plan.write();
    if guard.find_task(&task.id).is_some() {
        return Err(ApiError::Conflict(format!("task '{}' already exists", task.id)));
    }
    guard.upsert_task(task.clone())?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let plan = state.plan();
    let removed = plan.write().remove_task(&task_id);
    if !removed {
        return Err(ApiError::not_found(format!("task '{task_id}' not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_schedule(State(state): State<AppState>) -> Result<Json<CpmResult>, ApiError> {
    let plan = state.plan();
    let result = plan.read().calculate()?;
    Ok(Json(result))
}

async fn get_coverage(State(state): State<AppState>) -> Result<Json<DependencyCoverage>, ApiError> {
    let plan = state.plan();
    let engine = plan.read().engine()?;
    Ok(Json(engine.coverage()))
}

async fn calculate_tasks(
    Json(tasks): Json<Vec<TaskDescriptor>>,
) -> Result<Json<CpmResult>, ApiError> {
    let engine = ScheduleEngine::with_tasks(&tasks)?;
    Ok(Json(engine.calculate()))
}
