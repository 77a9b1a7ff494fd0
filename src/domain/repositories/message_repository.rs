use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Message;

#[derive(Debug)]
pub enum MessageRepositoryError {
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for MessageRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            MessageRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for MessageRepositoryError {}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends the message and returns it with the store-assigned monotonic
    /// seq. History is append-only: there is no update or delete.
    async fn append(&self, message: &Message) -> Result<Message, MessageRepositoryError>;

    /// Full history in seq order (ascending).
    async fn find_by_session(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<Message>, MessageRepositoryError>;

    /// Most recent `limit` messages, still returned in ascending seq order.
    async fn find_recent_by_session(
        &self,
        session_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, MessageRepositoryError>;
}
