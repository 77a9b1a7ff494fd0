use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::chat_session_manager::ChatTurn;
use crate::domain::entities::Message;

#[derive(Debug, Deserialize)]
pub struct CreateSessionDto {
    pub collection_id: Uuid,
    pub title: Option<String>,
    pub model: Option<String>,
    pub context_window: Option<i32>,
    pub temperature: Option<f32>,
    pub max_retrieval_count: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreatedDto {
    pub session_id: Uuid,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageDto {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SourceDto {
    pub title: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseDto {
    pub response: String,
    pub sources: Vec<SourceDto>,
}

impl From<ChatTurn> for ChatResponseDto {
    fn from(turn: ChatTurn) -> Self {
        Self {
            sources: turn
                .assistant_message
                .sources()
                .iter()
                .map(|s| SourceDto {
                    title: s.document_title.clone(),
                    score: s.score,
                })
                .collect(),
            response: turn.assistant_message.content().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponseDto {
    pub id: Uuid,
    pub seq: i64,
    pub role: String,
    pub content: String,
    pub sources: Vec<SourceDto>,
    pub created_at: String,
}

impl From<Message> for MessageResponseDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id(),
            seq: message.seq(),
            role: message.role().to_string(),
            content: message.content().to_string(),
            sources: message
                .sources()
                .iter()
                .map(|s| SourceDto {
                    title: s.document_title.clone(),
                    score: s.score,
                })
                .collect(),
            created_at: message.created_at().to_rfc3339(),
        }
    }
}
