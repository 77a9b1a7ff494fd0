use std::sync::Arc;

use uuid::Uuid;

use crate::application::ports::ingestion_queue::{IngestionJob, IngestionQueue};
use crate::domain::repositories::{CollectionRepository, DocumentRepository};

#[derive(Debug)]
pub enum ReprocessDocumentError {
    DocumentNotFound(Uuid),
    CollectionNotFound(Uuid),
    IsolationViolation,
    NotReprocessable(String),
    QueueError(String),
    RepositoryError(String),
}

impl std::fmt::Display for ReprocessDocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReprocessDocumentError::DocumentNotFound(id) => {
                write!(f, "Document not found: {}", id)
            }
            ReprocessDocumentError::CollectionNotFound(id) => {
                write!(f, "Collection not found: {}", id)
            }
            ReprocessDocumentError::IsolationViolation => {
                write!(f, "Document belongs to a different owner")
            }
            ReprocessDocumentError::NotReprocessable(msg) => {
                write!(f, "Document cannot be reprocessed: {}", msg)
            }
            ReprocessDocumentError::QueueError(msg) => write!(f, "Queue error: {}", msg),
            ReprocessDocumentError::RepositoryError(msg) => {
                write!(f, "Repository error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ReprocessDocumentError {}

#[derive(Debug, Clone)]
pub struct ReprocessDocumentRequest {
    pub owner_id: String,
    pub document_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct ReprocessDocumentResponse {
    pub document_id: Uuid,
    pub status: String,
}

/// Resets a terminal document to pending and hands it to the background
/// worker pool. The pipeline's replace-on-write keeps ordinals unique no
/// matter how many times a document goes around.
pub struct ReprocessDocumentUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
    document_repository: Arc<dyn DocumentRepository>,
    ingestion_queue: Arc<dyn IngestionQueue>,
}

impl ReprocessDocumentUseCase {
    pub fn new(
        collection_repository: Arc<dyn CollectionRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        ingestion_queue: Arc<dyn IngestionQueue>,
    ) -> Self {
        Self {
            collection_repository,
            document_repository,
            ingestion_queue,
        }
    }

    pub async fn execute(
        &self,
        request: ReprocessDocumentRequest,
    ) -> Result<ReprocessDocumentResponse, ReprocessDocumentError> {
        let mut document = self
            .document_repository
            .find_by_id(request.document_id)
            .await
            .map_err(|e| ReprocessDocumentError::RepositoryError(e.to_string()))?
            .ok_or(ReprocessDocumentError::DocumentNotFound(request.document_id))?;

        let collection = self
            .collection_repository
            .find_by_id(document.collection_id())
            .await
            .map_err(|e| ReprocessDocumentError::RepositoryError(e.to_string()))?
            .ok_or_else(|| ReprocessDocumentError::CollectionNotFound(document.collection_id()))?;

        if !collection.is_owned_by(&request.owner_id) {
            tracing::warn!(
                "Owner {} attempted to reprocess document {} in collection {} owned by {}",
                request.owner_id,
                document.id(),
                collection.id(),
                collection.owner_id()
            );
            return Err(ReprocessDocumentError::IsolationViolation);
        }

        document
            .reset_for_reprocessing()
            .map_err(ReprocessDocumentError::NotReprocessable)?;
        self.document_repository
            .update(&document)
            .await
            .map_err(|e| ReprocessDocumentError::RepositoryError(e.to_string()))?;

        self.ingestion_queue
            .enqueue(IngestionJob::new(document.id(), collection.id()))
            .await
            .map_err(|e| ReprocessDocumentError::QueueError(e.to_string()))?;

        tracing::info!("Queued document {} for reprocessing", document.id());

        Ok(ReprocessDocumentResponse {
            document_id: document.id(),
            status: document.processing_status().to_string(),
        })
    }
}
