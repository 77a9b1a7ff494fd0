pub mod cancel_ingestion;
pub mod chat;
pub mod create_collection;
pub mod create_session;
pub mod delete_collection;
pub mod get_history;
pub mod ingest_document;
pub mod list_collections;
pub mod list_documents;
pub mod provider_status;
pub mod reprocess_document;

pub use cancel_ingestion::CancelIngestionUseCase;
pub use chat::ChatUseCase;
pub use create_collection::CreateCollectionUseCase;
pub use create_session::CreateSessionUseCase;
pub use delete_collection::DeleteCollectionUseCase;
pub use get_history::GetHistoryUseCase;
pub use ingest_document::IngestDocumentUseCase;
pub use list_collections::ListCollectionsUseCase;
pub use list_documents::ListDocumentsUseCase;
pub use provider_status::ProviderStatusUseCase;
pub use reprocess_document::ReprocessDocumentUseCase;
