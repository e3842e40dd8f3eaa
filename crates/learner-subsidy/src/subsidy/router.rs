use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::domain::LearnerId;
use super::service::{ResolutionRequest, ResolutionServiceError, SubsidyResolutionService};
use super::source::SubsidySource;

/// Router builder exposing subsidy resolution over HTTP.
pub fn subsidy_router<S>(service: Arc<SubsidyResolutionService<S>>) -> Router
where
    S: SubsidySource + 'static,
{
    Router::new()
        .route("/api/v1/subsidies/resolve", post(resolve_handler::<S>))
        .route(
            "/api/v1/learners/:learner_id/courses/:course_key/subsidy",
            get(learner_course_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn resolve_handler<S>(
    State(service): State<Arc<SubsidyResolutionService<S>>>,
    axum::Json(request): axum::Json<ResolutionRequest>,
) -> Response
where
    S: SubsidySource + 'static,
{
    let report = service.resolve_request(&request, Utc::now());
    (StatusCode::OK, axum::Json(report)).into_response()
}

pub(crate) async fn learner_course_handler<S>(
    State(service): State<Arc<SubsidyResolutionService<S>>>,
    Path((learner_id, course_key)): Path<(String, String)>,
) -> Response
where
    S: SubsidySource + 'static,
{
    let learner = LearnerId(learner_id);
    match service.resolve_for_learner(&learner, &course_key, Utc::now()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(
            error @ (ResolutionServiceError::CourseNotFound(_)
            | ResolutionServiceError::LearnerNotFound(_)),
        ) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(ResolutionServiceError::Source(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
