mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::env;

use infrastructure::AppContainer;
use presentation::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let container = AppContainer::new().await?;

    let port = env::var("PORT").ok().and_then(|p| p.parse().ok());

    let server = HttpServer::new(
        container.collection_handler.clone(),
        container.document_handler.clone(),
        container.session_handler.clone(),
        container.provider_handler.clone(),
        container.background_processor.clone(),
        port,
    );

    server.run().await
}
