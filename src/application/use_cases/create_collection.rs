use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Collection;
use crate::domain::repositories::CollectionRepository;

pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_EMBEDDING_DIMENSION: i32 = 768;
pub const DEFAULT_CHUNK_SIZE: i32 = 500;
pub const DEFAULT_CHUNK_OVERLAP: i32 = 50;
pub const DEFAULT_MAX_RETRIEVAL_COUNT: i32 = 5;

#[derive(Debug)]
pub enum CreateCollectionError {
    ValidationError(String),
    DuplicateName(String),
    RepositoryError(String),
}

impl std::fmt::Display for CreateCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateCollectionError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            CreateCollectionError::DuplicateName(name) => {
                write!(f, "Collection name already in use: {}", name)
            }
            CreateCollectionError::RepositoryError(msg) => {
                write!(f, "Repository error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CreateCollectionError {}

#[derive(Debug, Clone)]
pub struct CreateCollectionRequest {
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_dimension: Option<i32>,
    pub chunk_size: Option<i32>,
    pub chunk_overlap: Option<i32>,
    pub max_retrieval_count: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CreateCollectionResponse {
    pub collection_id: Uuid,
    pub name: String,
    pub embedding_model: String,
}

pub struct CreateCollectionUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
}

impl CreateCollectionUseCase {
    pub fn new(collection_repository: Arc<dyn CollectionRepository>) -> Self {
        Self {
            collection_repository,
        }
    }

    pub async fn execute(
        &self,
        request: CreateCollectionRequest,
    ) -> Result<CreateCollectionResponse, CreateCollectionError> {
        let collection = Collection::new(
            request.owner_id.clone(),
            request.name,
            request.description,
            request
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            request
                .embedding_dimension
                .unwrap_or(DEFAULT_EMBEDDING_DIMENSION),
            request.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            request.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            request
                .max_retrieval_count
                .unwrap_or(DEFAULT_MAX_RETRIEVAL_COUNT),
        )
        .map_err(CreateCollectionError::ValidationError)?;

        let existing = self
            .collection_repository
            .find_by_owner(&request.owner_id)
            .await
            .map_err(|e| CreateCollectionError::RepositoryError(e.to_string()))?;
        if existing.iter().any(|c| c.name() == collection.name()) {
            return Err(CreateCollectionError::DuplicateName(
                collection.name().to_string(),
            ));
        }

        self.collection_repository
            .save(&collection)
            .await
            .map_err(|e| CreateCollectionError::RepositoryError(e.to_string()))?;

        tracing::info!(
            "Created collection {} ({}) for owner {}",
            collection.id(),
            collection.name(),
            collection.owner_id()
        );

        Ok(CreateCollectionResponse {
            collection_id: collection.id(),
            name: collection.name().to_string(),
            embedding_model: collection.embedding_model().to_string(),
        })
    }
}
