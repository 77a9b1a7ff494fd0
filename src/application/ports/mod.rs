pub mod ai_provider;
pub mod ingestion_queue;

pub use ai_provider::AiProvider;
pub use ingestion_queue::IngestionQueue;
