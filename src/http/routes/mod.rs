pub mod auth;
pub mod boards;
pub mod lists;
pub mod tasks;

use axum::Json;
use serde_json::{json, Value};

pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}
