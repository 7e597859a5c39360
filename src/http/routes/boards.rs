use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::Value;

use super::message;
use crate::domain::board::{Board, BoardDraft, BoardId, ListDraft, ShareRequest, TodoList};
use crate::http::{dev_store::DevApi, extract::CurrentUser, types::ApiError};

pub fn router() -> Router<DevApi> {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/:id", put(update_board).delete(delete_board))
        .route("/boards/:id/share", post(share_board))
        .route("/boards/:id/todo_lists", get(list_lists).post(create_list))
}

async fn list_boards(State(api): State<DevApi>, CurrentUser(user): CurrentUser) -> Json<Vec<Board>> {
    Json(api.store().boards(user))
}

async fn create_board(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<BoardDraft>,
) -> (StatusCode, Json<Board>) {
    (StatusCode::CREATED, Json(api.store().create_board(user, draft)))
}

async fn update_board(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(draft): Json<BoardDraft>,
) -> Result<Json<Board>, ApiError> {
    api.store().update_board(user, BoardId(id), draft).map(Json)
}

async fn delete_board(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    api.store().delete_board(user, BoardId(id))?;
    Ok(message("Board deleted"))
}

async fn share_board(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<ShareRequest>,
) -> Result<Json<Value>, ApiError> {
    api.store().share_board(user, BoardId(id), &body.email)?;
    Ok(message("Board shared"))
}

async fn list_lists(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<TodoList>>, ApiError> {
    api.store().lists(user, BoardId(id)).map(Json)
}

async fn create_list(
    State(api): State<DevApi>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(draft): Json<ListDraft>,
) -> Result<(StatusCode, Json<TodoList>), ApiError> {
    let list = api.store().create_list(user, BoardId(id), draft)?;
    Ok((StatusCode::CREATED, Json(list)))
}
