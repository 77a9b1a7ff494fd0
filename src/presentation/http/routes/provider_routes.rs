use axum::{Router, routing::get};
use std::sync::Arc;

use crate::presentation::http::handlers::ProviderHandler;

pub fn provider_routes(provider_handler: Arc<ProviderHandler>) -> Router {
    Router::new()
        .route(
            "/providers/status",
            get(ProviderHandler::provider_status),
        )
        .with_state(provider_handler)
}
