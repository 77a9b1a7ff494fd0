use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::SessionHandler;

pub fn session_routes(session_handler: Arc<SessionHandler>) -> Router {
    Router::new()
        .route("/sessions", post(SessionHandler::create_session))
        .route("/sessions/{session_id}/chat", post(SessionHandler::chat))
        .route(
            "/sessions/{session_id}/messages",
            get(SessionHandler::get_history),
        )
        .with_state(session_handler)
}
