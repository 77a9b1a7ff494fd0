use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::chat_session_manager::ChatSessionManager;
use crate::domain::entities::Message;
use crate::domain::repositories::{CollectionRepository, SessionRepository};

#[derive(Debug)]
pub enum GetHistoryError {
    SessionNotFound(Uuid),
    IsolationViolation,
    RepositoryError(String),
}

impl std::fmt::Display for GetHistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetHistoryError::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            GetHistoryError::IsolationViolation => {
                write!(f, "Session belongs to a different owner")
            }
            GetHistoryError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GetHistoryError {}

#[derive(Debug, Clone)]
pub struct GetHistoryRequest {
    pub owner_id: String,
    pub session_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct GetHistoryResponse {
    pub messages: Vec<Message>,
}

pub struct GetHistoryUseCase {
    chat_session_manager: Arc<ChatSessionManager>,
    session_repository: Arc<dyn SessionRepository>,
    collection_repository: Arc<dyn CollectionRepository>,
}

impl GetHistoryUseCase {
    pub fn new(
        chat_session_manager: Arc<ChatSessionManager>,
        session_repository: Arc<dyn SessionRepository>,
        collection_repository: Arc<dyn CollectionRepository>,
    ) -> Self {
        Self {
            chat_session_manager,
            session_repository,
            collection_repository,
        }
    }

    pub async fn execute(
        &self,
        request: GetHistoryRequest,
    ) -> Result<GetHistoryResponse, GetHistoryError> {
        let session = self
            .session_repository
            .find_by_id(request.session_id)
            .await
            .map_err(|e| GetHistoryError::RepositoryError(e.to_string()))?
            .ok_or(GetHistoryError::SessionNotFound(request.session_id))?;

        let collection = self
            .collection_repository
            .find_by_id(session.collection_id())
            .await
            .map_err(|e| GetHistoryError::RepositoryError(e.to_string()))?
            .ok_or(GetHistoryError::SessionNotFound(request.session_id))?;

        if !collection.is_owned_by(&request.owner_id) {
            tracing::warn!(
                "Owner {} attempted to read history of session {} owned by {}",
                request.owner_id,
                request.session_id,
                collection.owner_id()
            );
            return Err(GetHistoryError::IsolationViolation);
        }

        let messages = self
            .chat_session_manager
            .history(request.session_id)
            .await
            .map_err(|e| GetHistoryError::RepositoryError(e.to_string()))?;

        Ok(GetHistoryResponse { messages })
    }
}
