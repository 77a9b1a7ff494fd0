use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::infrastructure::messaging::BackgroundProcessor;
use crate::presentation::http::{
    handlers::{CollectionHandler, DocumentHandler, ProviderHandler, SessionHandler},
    routes::{
        collection_routes, document_routes, health_routes, provider_routes, session_routes,
    },
};

/// Raw documents arrive as JSON text; 50MB covers very large extractions.
const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

pub struct HttpServer {
    collection_handler: Arc<CollectionHandler>,
    document_handler: Arc<DocumentHandler>,
    session_handler: Arc<SessionHandler>,
    provider_handler: Arc<ProviderHandler>,
    background_processor: Arc<BackgroundProcessor>,
    port: u16,
}

impl HttpServer {
    pub fn new(
        collection_handler: Arc<CollectionHandler>,
        document_handler: Arc<DocumentHandler>,
        session_handler: Arc<SessionHandler>,
        provider_handler: Arc<ProviderHandler>,
        background_processor: Arc<BackgroundProcessor>,
        port: Option<u16>,
    ) -> Self {
        Self {
            collection_handler,
            document_handler,
            session_handler,
            provider_handler,
            background_processor,
            port: port.unwrap_or(4000),
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        // Reprocessing workers live for the life of the server
        let background_processor = self.background_processor.clone();
        tokio::spawn(async move {
            background_processor.start().await;
        });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .merge(health_routes())
            .merge(collection_routes(self.collection_handler))
            .merge(document_routes(self.document_handler))
            .merge(session_routes(self.session_handler))
            .merge(provider_routes(self.provider_handler))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!("Listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
