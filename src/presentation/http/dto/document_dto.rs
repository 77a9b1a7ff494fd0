use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::ingest_document::IngestDocumentResponse;
use crate::domain::entities::Document;

#[derive(Debug, Deserialize)]
pub struct IngestDocumentDto {
    pub title: String,
    pub text: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentIngestedDto {
    pub document_id: Uuid,
    pub chunk_count: usize,
}

impl From<IngestDocumentResponse> for DocumentIngestedDto {
    fn from(response: IngestDocumentResponse) -> Self {
        Self {
            document_id: response.document_id,
            chunk_count: response.chunk_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub title: String,
    pub content_type: String,
    pub status: String,
    pub status_reason: Option<String>,
    pub chunk_count: i32,
    pub created_at: String,
}

impl From<Document> for DocumentResponseDto {
    fn from(document: Document) -> Self {
        Self {
            id: document.id(),
            title: document.title().to_string(),
            content_type: document.content_type().to_string(),
            status: document.processing_status().to_string(),
            status_reason: document
                .processing_status()
                .failure_reason()
                .map(|r| r.to_string()),
            chunk_count: document.chunk_count(),
            created_at: document.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentQueuedDto {
    pub document_id: Uuid,
    pub status: String,
}
