use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::chat_session_manager::{ChatError, ChatSessionManager, ChatTurn};
use crate::domain::repositories::{CollectionRepository, SessionRepository};

#[derive(Debug)]
pub enum ChatUseCaseError {
    SessionNotFound(Uuid),
    IsolationViolation,
    ValidationError(String),
    GenerationFailed(String),
    ChatFailed(String),
    RepositoryError(String),
}

impl std::fmt::Display for ChatUseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatUseCaseError::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            ChatUseCaseError::IsolationViolation => {
                write!(f, "Session belongs to a different owner")
            }
            ChatUseCaseError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ChatUseCaseError::GenerationFailed(msg) => write!(f, "Generation failed: {}", msg),
            ChatUseCaseError::ChatFailed(msg) => write!(f, "Chat failed: {}", msg),
            ChatUseCaseError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ChatUseCaseError {}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub owner_id: String,
    pub session_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub turn: ChatTurn,
}

pub struct ChatUseCase {
    chat_session_manager: Arc<ChatSessionManager>,
    session_repository: Arc<dyn SessionRepository>,
    collection_repository: Arc<dyn CollectionRepository>,
}

impl ChatUseCase {
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

    pub async fn execute(&self, request: ChatRequest) -> Result<ChatResponse, ChatUseCaseError> {
        self.check_ownership(&request.owner_id, request.session_id)
            .await?;

        let turn = self
            .chat_session_manager
            .chat(request.session_id, request.message)
            .await
            .map_err(|error| match error {
                ChatError::SessionNotFound(id) => ChatUseCaseError::SessionNotFound(id),
                ChatError::InvalidMessage(msg) => ChatUseCaseError::ValidationError(msg),
                ChatError::GenerationFailed(msg) => ChatUseCaseError::GenerationFailed(msg),
                other => ChatUseCaseError::ChatFailed(other.to_string()),
            })?;

        Ok(ChatResponse { turn })
    }

    async fn check_ownership(
        &self,
        owner_id: &str,
        session_id: Uuid,
    ) -> Result<(), ChatUseCaseError> {
        let session = self
            .session_repository
            .find_by_id(session_id)
            .await
            .map_err(|e| ChatUseCaseError::RepositoryError(e.to_string()))?
            .ok_or(ChatUseCaseError::SessionNotFound(session_id))?;

        let collection = self
            .collection_repository
            .find_by_id(session.collection_id())
            .await
            .map_err(|e| ChatUseCaseError::RepositoryError(e.to_string()))?
            .ok_or(ChatUseCaseError::SessionNotFound(session_id))?;

        if !collection.is_owned_by(owner_id) {
            tracing::warn!(
                "Owner {} attempted to chat on session {} owned by {}",
                owner_id,
                session_id,
                collection.owner_id()
            );
            return Err(ChatUseCaseError::IsolationViolation);
        }

        Ok(())
    }
}
