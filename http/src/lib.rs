use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use sentinel_application::AnalyzeCallUseCase;

pub mod error;
pub mod handlers;

pub use error::HttpError;
pub use handlers::*;

pub type SharedUseCase = Arc<dyn AnalyzeCallUseCase>;

pub fn create_app_routes(usecase: SharedUseCase, max_body_bytes: usize) -> Router {
    // Raw WAV uploads can be large; raise the analyze route body limit.
    let analyze_route = post(analyze_call).layer(DefaultBodyLimit::max(max_body_bytes));

    Router::new()
        .route("/health", get(health))
        .route("/api/calls/analyze", analyze_route)
        .with_state(usecase)
}
