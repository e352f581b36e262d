use axum::Router;

pub mod realtime;
pub mod scheduling;
pub mod system;

/// Router for all API endpoints except `/health`.
pub fn router() -> Router {
    Router::new()
        .nest("/api/v1/scheduling", scheduling::router())
        .nest("/api/schedule", realtime::router())
}
