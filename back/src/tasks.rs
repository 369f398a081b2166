use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode},
    routing::get,
    Json, Router,
};
use kanban_api::v1::{Deleted, Task, TaskFields, TaskId};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{error::ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/tasks",
        get(get_tasks)
            .post(create_task)
            .put(update_task)
            .patch(patch_task)
            .delete(delete_task)
            .options(preflight)
            .fallback(method_not_allowed),
    )
    .fallback(unknown_route)
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

fn task_id(query: Option<Query<IdQuery>>) -> Result<TaskId, ApiError> {
    query
        .and_then(|Query(query)| query.id)
        .and_then(|id| id.trim().parse::<TaskId>().ok())
        .filter(|id| *id > 0)
        .ok_or(ApiError::InvalidId)
}

/// Bodies must be a JSON object with at least one key.
fn task_fields(body: &[u8]) -> Result<TaskFields, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => {
            serde_json::from_value(Value::Object(map)).map_err(|_| ApiError::InvalidBody)
        }
        _ => Err(ApiError::InvalidBody),
    }
}

async fn ensure_exists(state: &AppState, id: TaskId) -> Result<(), ApiError> {
    let exists = (state.store.exists(id).await)
        .map_err(ApiError::storage("Failed to look up task"))?;

    match exists {
        true => Ok(()),
        false => Err(ApiError::NotFound),
    }
}

async fn get_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = (state.store.all().await).map_err(ApiError::storage("Failed to load tasks"))?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let input = task_fields(&body)?.with_defaults().into_input()?;

    let task = (state.store.create(&input).await)
        .map_err(ApiError::storage("Failed to create task"))?;

    info!(
        id = task.id,
        description = %task.description,
        status = %task.status,
        priority = %task.priority,
        "created task"
    );

    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    query: Option<Query<IdQuery>>,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(query)?;
    let input = task_fields(&body)?.into_input()?;
    ensure_exists(&state, id).await?;

    let task = (state.store.update(id, &input).await)
        .map_err(ApiError::storage("Failed to update task"))?;

    info!(
        id = task.id,
        description = %task.description,
        status = %task.status,
        priority = %task.priority,
        "updated task"
    );

    Ok(Json(task))
}

async fn patch_task(
    State(state): State<Arc<AppState>>,
    query: Option<Query<IdQuery>>,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(query)?;
    let fields = task_fields(&body)?;
    ensure_exists(&state, id).await?;
    let patch = fields.into_patch()?;

    let task = (state.store.patch(id, &patch).await)
        .map_err(ApiError::storage("Failed to update task"))?;

    info!(id = task.id, patch = ?patch, "patched task");

    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    query: Option<Query<IdQuery>>,
) -> Result<Json<Deleted>, ApiError> {
    let id = task_id(query)?;
    ensure_exists(&state, id).await?;

    let deleted = (state.store.delete(id).await)
        .map_err(ApiError::storage("Failed to delete task"))?;

    info!(id, "deleted task");

    Ok(Json(deleted))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Preflights are answered for any path; everything else off `/tasks` is a 404.
async fn unknown_route(method: Method) -> Result<StatusCode, ApiError> {
    if method == Method::OPTIONS {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::UnknownRoute)
    }
}
