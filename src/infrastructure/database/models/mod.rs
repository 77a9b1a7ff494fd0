pub mod chunk_model;
pub mod collection_model;
pub mod document_model;
pub mod message_model;
pub mod session_model;

pub use chunk_model::{ChunkModel, NewChunkModel};
pub use collection_model::{CollectionModel, NewCollectionModel};
pub use document_model::{DocumentModel, NewDocumentModel};
pub use message_model::{MessageModel, NewMessageModel};
pub use session_model::{NewSessionModel, SessionModel};
