use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::DocumentHandler;

pub fn document_routes(document_handler: Arc<DocumentHandler>) -> Router {
    Router::new()
        .route(
            "/collections/{collection_id}/documents",
            post(DocumentHandler::ingest_document),
        )
        .route(
            "/collections/{collection_id}/documents",
            get(DocumentHandler::list_documents),
        )
        .route(
            "/documents/{document_id}/reprocess",
            post(DocumentHandler::reprocess_document),
        )
        .route(
            "/documents/{document_id}/cancel",
            post(DocumentHandler::cancel_ingestion),
        )
        .with_state(document_handler)
}
