use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::ingestion_pipeline::{
    DocumentIngestionPipeline, IngestionError,
};
use crate::application::services::ingestion_tracker::IngestionTracker;
use crate::domain::entities::Document;
use crate::domain::repositories::{CollectionRepository, DocumentRepository};

#[derive(Debug)]
pub enum IngestDocumentError {
    CollectionNotFound(Uuid),
    IsolationViolation,
    ValidationError(String),
    Cancelled,
    IngestionFailed(String),
    RepositoryError(String),
}

impl std::fmt::Display for IngestDocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestDocumentError::CollectionNotFound(id) => {
                write!(f, "Collection not found: {}", id)
            }
            IngestDocumentError::IsolationViolation => {
                write!(f, "Collection belongs to a different owner")
            }
            IngestDocumentError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            IngestDocumentError::Cancelled => write!(f, "Ingestion cancelled"),
            IngestDocumentError::IngestionFailed(msg) => write!(f, "Ingestion failed: {}", msg),
            IngestDocumentError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for IngestDocumentError {}

#[derive(Debug, Clone)]
pub struct IngestDocumentRequest {
    pub owner_id: String,
    pub collection_id: Uuid,
    pub title: String,
    pub text: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IngestDocumentResponse {
    pub document_id: Uuid,
    pub chunk_count: usize,
}

pub struct IngestDocumentUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
    document_repository: Arc<dyn DocumentRepository>,
    pipeline: Arc<DocumentIngestionPipeline>,
    tracker: Arc<IngestionTracker>,
}

impl IngestDocumentUseCase {
    pub fn new(
        collection_repository: Arc<dyn CollectionRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        pipeline: Arc<DocumentIngestionPipeline>,
        tracker: Arc<IngestionTracker>,
    ) -> Self {
        Self {
            collection_repository,
            document_repository,
            pipeline,
            tracker,
        }
    }

    pub async fn execute(
        &self,
        request: IngestDocumentRequest,
    ) -> Result<IngestDocumentResponse, IngestDocumentError> {
        let collection = self
            .collection_repository
            .find_by_id(request.collection_id)
            .await
            .map_err(|e| IngestDocumentError::RepositoryError(e.to_string()))?
            .ok_or(IngestDocumentError::CollectionNotFound(request.collection_id))?;

        if !collection.is_owned_by(&request.owner_id) {
            tracing::warn!(
                "Owner {} attempted to ingest into collection {} owned by {}",
                request.owner_id,
                collection.id(),
                collection.owner_id()
            );
            return Err(IngestDocumentError::IsolationViolation);
        }

        let document = Document::new(
            request.collection_id,
            request.title,
            request.text,
            request
                .content_type
                .unwrap_or_else(|| "text/plain".to_string()),
        )
        .map_err(IngestDocumentError::ValidationError)?;

        self.document_repository
            .save(&document)
            .await
            .map_err(|e| IngestDocumentError::RepositoryError(e.to_string()))?;

        let document_id = document.id();
        let cancel = self.tracker.register(document_id).await;

        // The pipeline runs in its own task: a caller that goes away does not
        // strand the document mid-state, and an explicit cancel still reaches
        // it through the tracker's flag.
        let pipeline = self.pipeline.clone();
        let handle = tokio::spawn(async move {
            let outcome = pipeline.ingest(document_id, &collection, cancel).await;
            (document_id, outcome)
        });

        let join_result = handle.await;
        self.tracker.complete(document_id).await;
        let (_, outcome) = join_result.map_err(|e| {
            IngestDocumentError::IngestionFailed(format!("Ingestion task failed: {}", e))
        })?;

        match outcome {
            Ok(result) => Ok(IngestDocumentResponse {
                document_id,
                chunk_count: result.chunk_count,
            }),
            Err(IngestionError::Cancelled) => Err(IngestDocumentError::Cancelled),
            Err(error) => Err(IngestDocumentError::IngestionFailed(error.to_string())),
        }
    }
}
