//! Dashboard endpoint: the sample catalog re-optimized on every slider change.

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use forgeline_scheduling::sample::optimize_sample;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/optimize", post(optimize))
}

pub async fn optimize(body: Result<Json<dto::RealtimeWeightsBody>, JsonRejection>) -> axum::response::Response {
    let body = match body {
        Ok(Json(b)) => b,
        // A bare POST means "current defaults".
        Err(JsonRejection::MissingJsonContentType(_)) => dto::RealtimeWeightsBody::default(),
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match optimize_sample(body.weights(), Utc::now()) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
