use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::{
    CancelIngestionUseCase, IngestDocumentUseCase, ListDocumentsUseCase,
    ReprocessDocumentUseCase,
    cancel_ingestion::{CancelIngestionError, CancelIngestionRequest},
    ingest_document::{IngestDocumentError, IngestDocumentRequest},
    list_documents::{ListDocumentsError, ListDocumentsRequest},
    reprocess_document::{ReprocessDocumentError, ReprocessDocumentRequest},
};
use crate::presentation::http::dto::{
    ApiResponse, DocumentIngestedDto, DocumentQueuedDto, DocumentResponseDto, IngestDocumentDto,
};
use crate::presentation::http::handlers::identity::owner_from_headers;

pub struct DocumentHandler {
    ingest_document_use_case: Arc<IngestDocumentUseCase>,
    list_documents_use_case: Arc<ListDocumentsUseCase>,
    reprocess_document_use_case: Arc<ReprocessDocumentUseCase>,
    cancel_ingestion_use_case: Arc<CancelIngestionUseCase>,
}

impl DocumentHandler {
    pub fn new(
        ingest_document_use_case: Arc<IngestDocumentUseCase>,
        list_documents_use_case: Arc<ListDocumentsUseCase>,
        reprocess_document_use_case: Arc<ReprocessDocumentUseCase>,
        cancel_ingestion_use_case: Arc<CancelIngestionUseCase>,
    ) -> Self {
        Self {
            ingest_document_use_case,
            list_documents_use_case,
            reprocess_document_use_case,
            cancel_ingestion_use_case,
        }
    }

    pub async fn ingest_document(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
        Path(collection_id): Path<Uuid>,
        Json(body): Json<IngestDocumentDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let owner_id = match owner_from_headers(&headers) {
            Some(owner_id) => owner_id,
            None => {
                return Ok((
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::error(
                        "MISSING_IDENTITY".to_string(),
                        "x-user-id header required".to_string(),
                    )),
                ));
            }
        };

        let request = IngestDocumentRequest {
            owner_id,
            collection_id,
            title: body.title,
            text: body.text,
            content_type: body.content_type,
        };

        match handler.ingest_document_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(DocumentIngestedDto::from(response))),
            )),
            Err(IngestDocumentError::CollectionNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Collection not found: {}", id),
                )),
            )),
            Err(IngestDocumentError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Collection belongs to a different owner".to_string(),
                )),
            )),
            Err(IngestDocumentError::ValidationError(msg)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("INVALID_DOCUMENT".to_string(), msg)),
            )),
            Err(IngestDocumentError::Cancelled) => Ok((
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "CANCELLED".to_string(),
                    "Ingestion was cancelled".to_string(),
                )),
            )),
            Err(error) => Ok((
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(
                    "INGESTION_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }

    pub async fn list_documents(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
        Path(collection_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let owner_id = match owner_from_headers(&headers) {
            Some(owner_id) => owner_id,
            None => {
                return Ok((
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::error(
                        "MISSING_IDENTITY".to_string(),
                        "x-user-id header required".to_string(),
                    )),
                ));
            }
        };

        let request = ListDocumentsRequest {
            owner_id,
            collection_id,
        };

        match handler.list_documents_use_case.execute(request).await {
            Ok(response) => {
                let documents: Vec<DocumentResponseDto> = response
                    .documents
                    .into_iter()
                    .map(DocumentResponseDto::from)
                    .collect();
                Ok((StatusCode::OK, Json(ApiResponse::success(documents))))
            }
            Err(ListDocumentsError::CollectionNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Collection not found: {}", id),
                )),
            )),
            Err(ListDocumentsError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Collection belongs to a different owner".to_string(),
                )),
            )),
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "LIST_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }

    pub async fn reprocess_document(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
        Path(document_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let owner_id = match owner_from_headers(&headers) {
            Some(owner_id) => owner_id,
            None => {
                return Ok((
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::error(
                        "MISSING_IDENTITY".to_string(),
                        "x-user-id header required".to_string(),
                    )),
                ));
            }
        };

        let request = ReprocessDocumentRequest {
            owner_id,
            document_id,
        };

        match handler.reprocess_document_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::ACCEPTED,
                Json(ApiResponse::success(DocumentQueuedDto {
                    document_id: response.document_id,
                    status: response.status,
                })),
            )),
            Err(ReprocessDocumentError::DocumentNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Document not found: {}", id),
                )),
            )),
            Err(ReprocessDocumentError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Document belongs to a different owner".to_string(),
                )),
            )),
            Err(ReprocessDocumentError::NotReprocessable(msg)) => Ok((
                StatusCode::CONFLICT,
                Json(ApiResponse::error("NOT_REPROCESSABLE".to_string(), msg)),
            )),
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "REPROCESS_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }

    pub async fn cancel_ingestion(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
        Path(document_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let owner_id = match owner_from_headers(&headers) {
            Some(owner_id) => owner_id,
            None => {
                return Ok((
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::error(
                        "MISSING_IDENTITY".to_string(),
                        "x-user-id header required".to_string(),
                    )),
                ));
            }
        };

        let request = CancelIngestionRequest {
            owner_id,
            document_id,
        };

        match handler.cancel_ingestion_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success_with_message(
                    response.document_id,
                    "Ingestion cancelled".to_string(),
                )),
            )),
            Err(CancelIngestionError::DocumentNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Document not found: {}", id),
                )),
            )),
            Err(CancelIngestionError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Document belongs to a different owner".to_string(),
                )),
            )),
            Err(CancelIngestionError::NotInFlight(id)) => Ok((
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "NOT_IN_FLIGHT".to_string(),
                    format!("No ingestion in flight for document: {}", id),
                )),
            )),
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "CANCEL_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }
}
