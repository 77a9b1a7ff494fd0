use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::{
    ChatUseCase, CreateSessionUseCase, GetHistoryUseCase,
    chat::{ChatRequest, ChatUseCaseError},
    create_session::{CreateSessionError, CreateSessionRequest},
    get_history::{GetHistoryError, GetHistoryRequest},
};
use crate::presentation::http::dto::{
    ApiResponse, ChatMessageDto, ChatResponseDto, CreateSessionDto, MessageResponseDto,
    SessionCreatedDto,
};
use crate::presentation::http::handlers::identity::owner_from_headers;

pub struct SessionHandler {
    create_session_use_case: Arc<CreateSessionUseCase>,
    chat_use_case: Arc<ChatUseCase>,
    get_history_use_case: Arc<GetHistoryUseCase>,
}

impl SessionHandler {
    pub fn new(
        create_session_use_case: Arc<CreateSessionUseCase>,
        chat_use_case: Arc<ChatUseCase>,
        get_history_use_case: Arc<GetHistoryUseCase>,
    ) -> Self {
        Self {
            create_session_use_case,
            chat_use_case,
            get_history_use_case,
        }
    }

    pub async fn create_session(
        State(handler): State<Arc<SessionHandler>>,
        headers: HeaderMap,
        Json(body): Json<CreateSessionDto>,
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

        let request = CreateSessionRequest {
            owner_id,
            collection_id: body.collection_id,
            title: body.title,
            model: body.model,
            context_window: body.context_window,
            temperature: body.temperature,
            max_retrieval_count: body.max_retrieval_count,
        };

        match handler.create_session_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(SessionCreatedDto {
                    session_id: response.session_id,
                    model: response.model,
                })),
            )),
            Err(CreateSessionError::CollectionNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Collection not found: {}", id),
                )),
            )),
            Err(CreateSessionError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Collection belongs to a different owner".to_string(),
                )),
            )),
            Err(CreateSessionError::ValidationError(msg)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("INVALID_CONFIGURATION".to_string(), msg)),
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

    pub async fn chat(
        State(handler): State<Arc<SessionHandler>>,
        headers: HeaderMap,
        Path(session_id): Path<Uuid>,
        Json(body): Json<ChatMessageDto>,
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

        let request = ChatRequest {
            owner_id,
            session_id,
            message: body.message,
        };

        match handler.chat_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(ChatResponseDto::from(response.turn))),
            )),
            Err(ChatUseCaseError::SessionNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Session not found: {}", id),
                )),
            )),
            Err(ChatUseCaseError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Session belongs to a different owner".to_string(),
                )),
            )),
            Err(ChatUseCaseError::ValidationError(msg)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("INVALID_MESSAGE".to_string(), msg)),
            )),
            Err(ChatUseCaseError::GenerationFailed(msg)) => Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error("GENERATION_FAILED".to_string(), msg)),
            )),
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "CHAT_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }

    pub async fn get_history(
        State(handler): State<Arc<SessionHandler>>,
        headers: HeaderMap,
        Path(session_id): Path<Uuid>,
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

        let request = GetHistoryRequest {
            owner_id,
            session_id,
        };

        match handler.get_history_use_case.execute(request).await {
            Ok(response) => {
                let messages: Vec<MessageResponseDto> = response
                    .messages
                    .into_iter()
                    .map(MessageResponseDto::from)
                    .collect();
                Ok((StatusCode::OK, Json(ApiResponse::success(messages))))
            }
            Err(GetHistoryError::SessionNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "NOT_FOUND".to_string(),
                    format!("Session not found: {}", id),
                )),
            )),
            Err(GetHistoryError::IsolationViolation) => Ok((
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error(
                    "ISOLATION_VIOLATION".to_string(),
                    "Session belongs to a different owner".to_string(),
                )),
            )),
            Err(error) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "HISTORY_FAILED".to_string(),
                    error.to_string(),
                )),
            )),
        }
    }
}
