use std::sync::Arc;

use crate::domain::entities::Collection;
use crate::domain::repositories::CollectionRepository;

#[derive(Debug)]
pub enum ListCollectionsError {
    RepositoryError(String),
}

impl std::fmt::Display for ListCollectionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListCollectionsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ListCollectionsError {}

#[derive(Debug, Clone)]
pub struct ListCollectionsRequest {
    pub owner_id: String,
}

#[derive(Debug, Clone)]
pub struct ListCollectionsResponse {
    pub collections: Vec<Collection>,
}

pub struct ListCollectionsUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
}

impl ListCollectionsUseCase {
    pub fn new(collection_repository: Arc<dyn CollectionRepository>) -> Self {
        Self {
            collection_repository,
        }
    }

    pub async fn execute(
        &self,
        request: ListCollectionsRequest,
    ) -> Result<ListCollectionsResponse, ListCollectionsError> {
        let collections = self
            .collection_repository
            .find_by_owner(&request.owner_id)
            .await
            .map_err(|e| ListCollectionsError::RepositoryError(e.to_string()))?;

        Ok(ListCollectionsResponse { collections })
    }
}
