//! Task routes, plus the not-yet-implemented task-tracking stubs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::api::errors::{ApiError, ApiResult, ValidationErrors};
use crate::api::server::AppState;
use crate::api::validation;
use crate::arkiv::entity::{normalize_entity, NormalizedEntity};
use crate::arkiv::payload::{next_record_id, TaskPayloadV1, TaskStatus, PAYLOAD_VERSION};
use crate::arkiv::task::register_task;
use crate::arkiv::EntityQuery;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub proposal_key: String,
    pub dao_key: String,
    pub title: String,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    pub task_key: String,
    pub dao_key: String,
    pub proposal_key: String,
    pub tx_hash: String,
}

/// POST /api/arkiv/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    let mut errors = ValidationErrors::new();
    if let Err(e) = validation::require_non_empty("proposalKey", &request.proposal_key) {
        errors.push(e);
    }
    if let Err(e) = validation::require_non_empty("daoKey", &request.dao_key) {
        errors.push(e);
    }
    if let Err(e) = validation::require_non_empty("title", &request.title) {
        errors.push(e);
    }
    if let Some(deadline) = &request.deadline {
        if let Err(e) = validation::validate_deadline(deadline) {
            errors.push(e);
        }
    }
    if !errors.is_empty() {
        return Err(errors.to_api_error());
    }

    let task = TaskPayloadV1 {
        id: next_record_id(),
        created_at: chrono::Utc::now().to_rfc3339(),
        deadline: request.deadline,
        title: request.title,
        budget: request.budget,
        description: request.description,
        proposal_key: request.proposal_key.clone(),
        dao_key: request.dao_key.clone(),
        status: request.status,
        version: PAYLOAD_VERSION,
    };
    let receipt = register_task(state.ledger.as_ref(), &task)
        .await
        .map_err(|e| ApiError::upstream("Failed to create task in Arkiv", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            task_key: receipt.entity_key,
            dao_key: request.dao_key,
            proposal_key: request.proposal_key,
            tx_hash: receipt.tx_hash,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub count: usize,
    pub tasks: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/tasks
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<TaskListResponse>> {
    let entities = state
        .ledger
        .query_entities(EntityQuery::new().where_eq("type", "task").limit(1000))
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch tasks from Arkiv", &e))?;

    let tasks: Vec<NormalizedEntity> = entities.iter().map(normalize_entity).collect();
    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksByProposalResponse {
    pub proposal_key: String,
    pub tasks: Vec<NormalizedEntity>,
}

/// GET /api/arkiv/tasks/by-proposal/:proposalKey
pub async fn list_tasks_by_proposal(
    State(state): State<AppState>,
    Path(proposal_key): Path<String>,
) -> ApiResult<Json<TasksByProposalResponse>> {
    let entities = state
        .ledger
        .query_entities(
            EntityQuery::new()
                .where_eq("type", "task")
                .where_eq("proposalKey", &proposal_key)
                .limit(500),
        )
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch tasks from Arkiv", &e))?;

    Ok(Json(TasksByProposalResponse {
        proposal_key,
        tasks: entities.iter().map(normalize_entity).collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailResponse {
    pub task_key: String,
    pub task: NormalizedEntity,
}

/// GET /api/arkiv/tasks/:taskKey
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_key): Path<String>,
) -> ApiResult<Json<TaskDetailResponse>> {
    let entity = state
        .ledger
        .get_entity(&task_key)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch task from Arkiv", &e))?;

    Ok(Json(TaskDetailResponse {
        task_key,
        task: normalize_entity(&entity),
    }))
}

// Task-tracking endpoints below are reserved but not implemented; status
// changes would require a new ledger entity with a back-reference, which
// the frontend does not consume yet.

/// POST /api/tasks/:taskId/status
pub async fn update_task_status(Path(_task_id): Path<String>) -> ApiError {
    ApiError::not_implemented("task status updates are not implemented yet")
}

/// GET /api/tasks/:taskId/attachments
pub async fn list_task_attachments(Path(_task_id): Path<String>) -> ApiError {
    ApiError::not_implemented("task attachment listing is not implemented yet")
}

/// GET /api/tasks/:taskId/history
pub async fn get_task_history(Path(_task_id): Path<String>) -> ApiError {
    ApiError::not_implemented("task history is not implemented yet")
}
