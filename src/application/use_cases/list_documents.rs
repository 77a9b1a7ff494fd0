use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{CollectionRepository, DocumentRepository};

#[derive(Debug)]
pub enum ListDocumentsError {
    CollectionNotFound(Uuid),
    IsolationViolation,
    RepositoryError(String),
}

impl std::fmt::Display for ListDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListDocumentsError::CollectionNotFound(id) => {
                write!(f, "Collection not found: {}", id)
            }
            ListDocumentsError::IsolationViolation => {
                write!(f, "Collection belongs to a different owner")
            }
            ListDocumentsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ListDocumentsError {}

#[derive(Debug, Clone)]
pub struct ListDocumentsRequest {
    pub owner_id: String,
    pub collection_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct ListDocumentsResponse {
    pub documents: Vec<Document>,
}

pub struct ListDocumentsUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
    document_repository: Arc<dyn DocumentRepository>,
}

impl ListDocumentsUseCase {
    pub fn new(
        collection_repository: Arc<dyn CollectionRepository>,
        document_repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            collection_repository,
            document_repository,
        }
    }

    pub async fn execute(
        &self,
        request: ListDocumentsRequest,
    ) -> Result<ListDocumentsResponse, ListDocumentsError> {
        let collection = self
            .collection_repository
            .find_by_id(request.collection_id)
            .await
            .map_err(|e| ListDocumentsError::RepositoryError(e.to_string()))?
            .ok_or(ListDocumentsError::CollectionNotFound(request.collection_id))?;

        if !collection.is_owned_by(&request.owner_id) {
            tracing::warn!(
                "Owner {} attempted to list documents of collection {} owned by {}",
                request.owner_id,
                collection.id(),
                collection.owner_id()
            );
            return Err(ListDocumentsError::IsolationViolation);
        }

        let documents = self
            .document_repository
            .find_by_collection(request.collection_id)
            .await
            .map_err(|e| ListDocumentsError::RepositoryError(e.to_string()))?;

        Ok(ListDocumentsResponse { documents })
    }
}
