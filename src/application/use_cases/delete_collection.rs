use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repositories::CollectionRepository;

#[derive(Debug)]
pub enum DeleteCollectionError {
    NotFound(Uuid),
    IsolationViolation,
    RepositoryError(String),
}

impl std::fmt::Display for DeleteCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteCollectionError::NotFound(id) => write!(f, "Collection not found: {}", id),
            DeleteCollectionError::IsolationViolation => {
                write!(f, "Collection belongs to a different owner")
            }
            DeleteCollectionError::RepositoryError(msg) => {
                write!(f, "Repository error: {}", msg)
            }
        }
    }
}

impl std::error::Error for DeleteCollectionError {}

#[derive(Debug, Clone)]
pub struct DeleteCollectionRequest {
    pub owner_id: String,
    pub collection_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct DeleteCollectionResponse {
    pub collection_id: Uuid,
}

pub struct DeleteCollectionUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
}

impl DeleteCollectionUseCase {
    pub fn new(collection_repository: Arc<dyn CollectionRepository>) -> Self {
        Self {
            collection_repository,
        }
    }

    pub async fn execute(
        &self,
        request: DeleteCollectionRequest,
    ) -> Result<DeleteCollectionResponse, DeleteCollectionError> {
        let collection = self
            .collection_repository
            .find_by_id(request.collection_id)
            .await
            .map_err(|e| DeleteCollectionError::RepositoryError(e.to_string()))?
            .ok_or(DeleteCollectionError::NotFound(request.collection_id))?;

        if !collection.is_owned_by(&request.owner_id) {
            tracing::warn!(
                "Owner {} attempted to delete collection {} owned by {}",
                request.owner_id,
                collection.id(),
                collection.owner_id()
            );
            return Err(DeleteCollectionError::IsolationViolation);
        }

        self.collection_repository
            .soft_delete(request.collection_id)
            .await
            .map_err(|e| DeleteCollectionError::RepositoryError(e.to_string()))?;

        tracing::info!("Soft-deleted collection {}", request.collection_id);

        Ok(DeleteCollectionResponse {
            collection_id: request.collection_id,
        })
    }
}
