use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use http::header::AUTHORIZATION;

use super::dev_store::DevApi;
use super::types::ApiError;

/// The account behind the request's bearer token.
pub struct CurrentUser(pub i64);

#[async_trait]
impl FromRequestParts<DevApi> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &DevApi) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);
        state.store().authenticate(bearer).map(CurrentUser)
    }
}
