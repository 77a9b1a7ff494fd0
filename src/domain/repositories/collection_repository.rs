use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Collection;

#[derive(Debug)]
pub enum CollectionRepositoryError {
    NotFound(Uuid),
    DuplicateName(String),
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for CollectionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionRepositoryError::NotFound(id) => write!(f, "Collection not found: {}", id),
            CollectionRepositoryError::DuplicateName(name) => {
                write!(f, "Collection name already in use: {}", name)
            }
            CollectionRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            CollectionRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CollectionRepositoryError {}

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn save(&self, collection: &Collection) -> Result<(), CollectionRepositoryError>;

    /// Soft-deleted collections are not returned.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Collection>, CollectionRepositoryError>;

    async fn find_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Collection>, CollectionRepositoryError>;

    /// Marks the collection deleted. Documents under it become unreachable
    /// through the collection-scoped queries; returns false if already gone.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, CollectionRepositoryError>;
}
