use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/optimize", post(optimize))
        .route("/predictor/health", get(predictor_health))
}

/// Full optimization over caller-supplied jobs and machines.
pub async fn optimize(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::OptimizeBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    let request = body.into_request(services.default_costs);
    match services.optimizer.optimize(request, &services.enrichment).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Probe the failure predictor. Always 200; the body carries the verdict.
pub async fn predictor_health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    Json(services.predictor_health().await).into_response()
}
