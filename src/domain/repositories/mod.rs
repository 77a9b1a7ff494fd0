pub mod chunk_repository;
pub mod collection_repository;
pub mod document_repository;
pub mod message_repository;
pub mod session_repository;

pub use chunk_repository::ChunkRepository;
pub use collection_repository::CollectionRepository;
pub use document_repository::DocumentRepository;
pub use message_repository::MessageRepository;
pub use session_repository::SessionRepository;
