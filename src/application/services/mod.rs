pub mod chat_session_manager;
pub mod chunker;
pub mod fallback_chain;
pub mod ingestion_pipeline;
pub mod ingestion_tracker;
pub mod retrieval_engine;

pub use chat_session_manager::ChatSessionManager;
pub use chunker::Chunker;
pub use fallback_chain::ProviderFallbackChain;
pub use ingestion_pipeline::DocumentIngestionPipeline;
pub use ingestion_tracker::IngestionTracker;
pub use retrieval_engine::RetrievalEngine;
