use axum::{
    extract::{Path, State},
    routing::put,
    Json, Router,
};
use serde_json::Value;

use super::message;
use crate::domain::board::{Task, TaskId, TaskUpdate};
use crate::http::{dev_store::DevApi, extract::CurrentUser, types::ApiError};

pub fn router() -> Router<DevApi> {
    Router::new().route("/tasks/:id", put(update_task).delete(delete_task))
}

async fn update_task(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    api.store().update_task(user, TaskId(id), update).map(Json)
}

async fn delete_task(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    api.store().delete_task(user, TaskId(id))?;
    Ok(message("Task deleted"))
}
