//! Results API for the interactive assessment components
//! (multiple choice, fill in the blank, parsons, drag and drop, clickable
//! area, ...).

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router, middleware};
use utoipa::OpenApi;

use crate::entities::AnswerTableEntry;
use crate::error::ServerError;
use crate::handlers::assessment::assessment_results;
use crate::middleware::CurrentUser;
use crate::middleware::auth::identity_middleware;
use crate::schemas::ValidJson;
use crate::schemas::assessment::AssessmentRequest;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(get_assessment_results),
    components(schemas(AssessmentRequest, AnswerTableEntry))
)]
pub struct AssessmentApi;

/// Routes nested under `/assessment`.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/results", post(get_assessment_results))
        .route_layer(middleware::from_fn_with_state(state, identity_middleware))
}

#[utoipa::path(
    post,
    path = "/assessment/results",
    tag = "assessment",
    request_body = AssessmentRequest,
    responses(
        (status = 200, description = "Most recent answer, or \"\" when the server has none", body = AnswerTableEntry),
        (status = 400, description = "Malformed request or unknown event"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Store error"),
    )
)]
pub async fn get_assessment_results(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    ValidJson(req): ValidJson<AssessmentRequest>,
) -> Result<Response, ServerError> {
    let store = state.store.as_ref();
    let row = assessment_results(store, store, &caller, req).await?;
    Ok(match row {
        Some(entry) => Json(entry).into_response(),
        // Client falls back to the answer it keeps in local storage.
        None => Json("").into_response(),
    })
}
