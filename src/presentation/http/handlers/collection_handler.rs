use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::{
    CreateCollectionUseCase, DeleteCollectionUseCase, ListCollectionsUseCase,
    create_collection::{CreateCollectionError, CreateCollectionRequest},
    delete_collection::{DeleteCollectionError, DeleteCollectionRequest},
    list_collections::ListCollectionsRequest,
};
use crate::presentation::http::dto::{
    ApiResponse, CollectionCreatedDto, CollectionResponseDto, CreateCollectionDto,
};
use crate::presentation::http::handlers::identity::owner_from_headers;

pub struct CollectionHandler {
    create_collection_use_case: Arc<CreateCollectionUseCase>,
    list_collections_use_case: Arc<ListCollectionsUseCase>,
    delete_collection_use_case: Arc<DeleteCollectionUseCase>,
}

impl CollectionHandler {
    pub fn new(
        create_collection_use_case: Arc<CreateCollectionUseCase>,
        list_collections_use_case: Arc<ListCollectionsUseCase>,
        delete_collection_use_case: Arc<DeleteCollectionUseCase>,
    ) -> Self {
        Self {
            create_collection_use_case,
            list_collections_use_case,
            delete_collection_use_case,
        }
    }

    pub async fn create_collection(
        State(handler): State<Arc<CollectionHandler>>,
        headers: HeaderMap,
        Json(body): Json<CreateCollectionDto>,
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

        let request = CreateCollectionRequest {
            owner_id,
            name: body.name,
            description: body.description,
            embedding_model: body.embedding_model,
            embedding_dimension: body.embedding_dimension,
            chunk_size: body.chunk_size,
            chunk_overlap: body.chunk_overlap,
            max_retrieval_count: body.max_retrieval_count,
        };

        match handler.create_collection_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(CollectionCreatedDto::from(response))),
            )),
            Err(CreateCollectionError::ValidationError(msg)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("INVALID_CONFIGURATION".to_string(), msg)),
            )),
            Err(CreateCollectionError::DuplicateName(name)) => Ok((
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "DUPLICATE_NAME".to_string(),
                    format!("Collection name already in use: {}", name),
                )),
            )),
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "CREATE_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }

    pub async fn list_collections(
        State(handler): State<Arc<CollectionHandler>>,
        headers: HeaderMap,
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

        match handler
            .list_collections_use_case
            .execute(ListCollectionsRequest { owner_id })
            .await
        {
            Ok(response) => {
                let collections: Vec<CollectionResponseDto> = response
                    .collections
                    .into_iter()
                    .map(CollectionResponseDto::from)
                    .collect();
                Ok((StatusCode::OK, Json(ApiResponse::success(collections))))
            }
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "LIST_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }

    pub async fn delete_collection(
        State(handler): State<Arc<CollectionHandler>>,
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

        let request = DeleteCollectionRequest {
            owner_id,
            collection_id,
        };

        match handler.delete_collection_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success_with_message(
                    response.collection_id,
                    "Collection deleted".to_string(),
                )),
            )),
            Err(DeleteCollectionError::NotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Collection not found: {}", id),
                )),
            )),
            Err(DeleteCollectionError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Collection belongs to a different owner".to_string(),
                )),
            )),
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "DELETE_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }
}
