pub mod chunk;
pub mod collection;
pub mod document;
pub mod message;
pub mod session;

pub use chunk::Chunk;
pub use collection::Collection;
pub use document::Document;
pub use message::{Message, MessageRole, SourceRef};
pub use session::Session;
