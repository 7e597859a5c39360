use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;

use super::message;
use crate::domain::board::{ListDraft, ListId, ReorderRequest, Task, TaskDraft, TodoList};
use crate::http::{dev_store::DevApi, extract::CurrentUser, types::ApiError};

pub fn router() -> Router<DevApi> {
    Router::new()
        .route("/todo_lists/:id", put(update_list).delete(delete_list))
        .route("/todo_lists/:id/reorder", put(reorder))
        .route("/todo_lists/:id/tasks", get(list_tasks).post(create_task))
}

async fn update_list(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(draft): Json<ListDraft>,
) -> Result<Json<TodoList>, ApiError> {
    api.store().update_list(user, ListId(id), draft).map(Json)
}

async fn delete_list(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    api.store().delete_list(user, ListId(id))?;
    Ok(message("Todo list deleted"))
}

async fn reorder(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<Value>, ApiError> {
    api.store().reorder(user, ListId(id), &body.task_ids)?;
    Ok(message("Tasks reordered"))
}

async fn list_tasks(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Task>>, ApiError> {
    api.store().tasks(user, ListId(id)).map(Json)
}

async fn create_task(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = api.store().create_task(user, ListId(id), draft)?;
    Ok((StatusCode::CREATED, Json(task)))
}
