use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::CollectionHandler;

pub fn collection_routes(collection_handler: Arc<CollectionHandler>) -> Router {
    Router::new()
        .route("/collections", post(CollectionHandler::create_collection))
        .route("/collections", get(CollectionHandler::list_collections))
        .route(
            "/collections/{collection_id}",
            delete(CollectionHandler::delete_collection),
        )
        .with_state(collection_handler)
}
