use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Session;
use crate::domain::repositories::{CollectionRepository, SessionRepository};

pub const DEFAULT_CHAT_MODEL: &str = "llama3";
pub const DEFAULT_CONTEXT_WINDOW: i32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug)]
pub enum CreateSessionError {
    CollectionNotFound(Uuid),
    IsolationViolation,
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for CreateSessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateSessionError::CollectionNotFound(id) => {
                write!(f, "Collection not found: {}", id)
            }
            CreateSessionError::IsolationViolation => {
                write!(f, "Collection belongs to a different owner")
            }
            CreateSessionError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            CreateSessionError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for CreateSessionError {}

#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub owner_id: String,
    pub collection_id: Uuid,
    pub title: Option<String>,
    pub model: Option<String>,
    pub context_window: Option<i32>,
    pub temperature: Option<f32>,
    pub max_retrieval_count: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub model: String,
}

pub struct CreateSessionUseCase {
    collection_repository: Arc<dyn CollectionRepository>,
    session_repository: Arc<dyn SessionRepository>,
}

impl CreateSessionUseCase {
    pub fn new(
        collection_repository: Arc<dyn CollectionRepository>,
        session_repository: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            collection_repository,
            session_repository,
        }
    }

    pub async fn execute(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, CreateSessionError> {
        let collection = self
            .collection_repository
            .find_by_id(request.collection_id)
            .await
            .map_err(|e| CreateSessionError::RepositoryError(e.to_string()))?
            .ok_or(CreateSessionError::CollectionNotFound(request.collection_id))?;

        if !collection.is_owned_by(&request.owner_id) {
            tracing::warn!(
                "Owner {} attempted to open a session on collection {} owned by {}",
                request.owner_id,
                collection.id(),
                collection.owner_id()
            );
            return Err(CreateSessionError::IsolationViolation);
        }

        let session = Session::new(
            request.collection_id,
            request
                .title
                .unwrap_or_else(|| format!("Chat on {}", collection.name())),
            request
                .model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            request.context_window.unwrap_or(DEFAULT_CONTEXT_WINDOW),
            request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            request
                .max_retrieval_count
                .unwrap_or_else(|| collection.max_retrieval_count()),
        )
        .map_err(CreateSessionError::ValidationError)?;

        self.session_repository
            .save(&session)
            .await
            .map_err(|e| CreateSessionError::RepositoryError(e.to_string()))?;

        tracing::info!(
            "Created session {} on collection {}",
            session.id(),
            collection.id()
        );

        Ok(CreateSessionResponse {
            session_id: session.id(),
            model: session.model().to_string(),
        })
    }
}
