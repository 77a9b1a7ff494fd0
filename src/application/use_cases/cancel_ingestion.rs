use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::ingestion_tracker::IngestionTracker;
use crate::domain::repositories::{CollectionRepository, DocumentRepository};

#[derive(Debug)]
pub enum CancelIngestionError {
    DocumentNotFound(Uuid),
    IsolationViolation,
    NotInFlight(Uuid),
    RepositoryError(String),
}

impl std::fmt::Display for CancelIngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelIngestionError::DocumentNotFound(id) => {
                write!(f, "Document not found: {}", id)
            }
            CancelIngestionError::IsolationViolation => {
                write!(f, "Document belongs to a different owner")
            }
            CancelIngestionError::NotInFlight(id) => {
                write!(f, "No ingestion in flight for document: {}", id)
            }
            CancelIngestionError::RepositoryError(msg) => {
                write!(f, "Repository error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CancelIngestionError {}

#[derive(Debug, Clone)]
pub struct CancelIngestionRequest {
    pub owner_id: String,
    pub document_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CancelIngestionResponse {
    pub document_id: Uuid,
}

pub struct CancelIngestionUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
    document_repository: Arc<dyn DocumentRepository>,
    tracker: Arc<IngestionTracker>,
}

impl CancelIngestionUseCase {
    pub fn new(
        collection_repository: Arc<dyn CollectionRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        tracker: Arc<IngestionTracker>,
    ) -> Self {
        Self {
            collection_repository,
            document_repository,
            tracker,
        }
    }

    pub async fn execute(
        &self,
        request: CancelIngestionRequest,
    ) -> Result<CancelIngestionResponse, CancelIngestionError> {
        let document = self
            .document_repository
            .find_by_id(request.document_id)
            .await
            .map_err(|e| CancelIngestionError::RepositoryError(e.to_string()))?
            .ok_or(CancelIngestionError::DocumentNotFound(request.document_id))?;

        let collection = self
            .collection_repository
            .find_by_id(document.collection_id())
            .await
            .map_err(|e| CancelIngestionError::RepositoryError(e.to_string()))?;

        match collection {
            Some(collection) if collection.is_owned_by(&request.owner_id) => {}
            Some(collection) => {
                tracing::warn!(
                    "Owner {} attempted to cancel ingestion of document {} owned by {}",
                    request.owner_id,
                    document.id(),
                    collection.owner_id()
                );
                return Err(CancelIngestionError::IsolationViolation);
            }
            None => return Err(CancelIngestionError::DocumentNotFound(request.document_id)),
        }

        if !self.tracker.cancel(request.document_id).await {
            return Err(CancelIngestionError::NotInFlight(request.document_id));
        }

        tracing::info!("Cancelled ingestion of document {}", request.document_id);

        Ok(CancelIngestionResponse {
            document_id: request.document_id,
        })
    }
}
