use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{auth::extractors::AuthUser, error::ApiError, review::heuristic, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review: String,
}

pub fn review_routes() -> Router<AppState> {
    Router::new().route("/ai/get-review", post(get_review))
}

#[instrument(skip(claims, payload), fields(user_id = %claims.id))]
pub async fn get_review(
    AuthUser(claims): AuthUser,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let Json(payload) = payload?;
    let code = payload
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Code is required".into()))?;

    let review = heuristic::review(&code, &claims.email);
    info!(bytes = code.len(), "review generated");
    Ok(Json(ReviewResponse { review }))
}
