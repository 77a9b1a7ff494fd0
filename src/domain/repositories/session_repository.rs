use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Session;

#[derive(Debug)]
pub enum SessionRepositoryError {
    NotFound(Uuid),
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for SessionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionRepositoryError::NotFound(id) => write!(f, "Session not found: {}", id),
            SessionRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            SessionRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SessionRepositoryError {}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn save(&self, session: &Session) -> Result<(), SessionRepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, SessionRepositoryError>;

    async fn find_by_collection(
        &self,
        collection_id: Uuid,
    ) -> Result<Vec<Session>, SessionRepositoryError>;
}
