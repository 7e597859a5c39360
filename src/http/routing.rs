use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::dev_store::DevApi;
use super::routes;

pub fn app(state: DevApi) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(routes::auth::router())
        .merge(routes::boards::router())
        .merge(routes::lists::router())
        .merge(routes::tasks::router())
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
