use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;

use crate::domain::account::{Account, Credentials, LoginForm, MessageResponse, TokenResponse};
use crate::http::{dev_store::DevApi, types::ApiError};

pub fn router() -> Router<DevApi> {
    Router::new()
        .route("/users", post(signup))
        .route("/confirm/:token", get(confirm))
        .route("/auth/token", post(login))
}

async fn signup(State(api): State<DevApi>, Json(body): Json<Credentials>) -> Result<(StatusCode, Json<Account>), ApiError> {
    let account = api.store().signup(body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn confirm(State(api): State<DevApi>, Path(token): Path<String>) -> Result<Json<MessageResponse>, ApiError> {
    let message = api.store().confirm(&token, Utc::now())?;
    Ok(Json(MessageResponse { message }))
}

async fn login(State(api): State<DevApi>, Form(form): Form<LoginForm>) -> Result<Json<TokenResponse>, ApiError> {
    api.store().login(form).map(Json)
}
