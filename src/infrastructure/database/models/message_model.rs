use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Message as DomainMessage, MessageRole, SourceRef};
use crate::infrastructure::database::schema::messages;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(super::SessionModel, foreign_key = session_id))]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageModel {
    pub id: Uuid,
    pub session_id: Uuid,
    pub seq: i64,
    pub role: String,
    pub content: String,
    pub sources: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// seq is deliberately absent: the store assigns it from the sequence, which
/// is what gives messages their monotonic total order.
#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMessageModel {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: String,
    pub content: String,
    pub sources: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&DomainMessage> for NewMessageModel {
    type Error = String;

    fn try_from(message: &DomainMessage) -> Result<Self, Self::Error> {
        let sources = serde_json::to_value(message.sources())
            .map_err(|e| format!("Could not serialize sources: {}", e))?;

        Ok(Self {
            id: message.id(),
            session_id: message.session_id(),
            role: message.role().as_str().to_string(),
            content: message.content().to_string(),
            sources,
            created_at: message.created_at(),
        })
    }
}

impl TryFrom<MessageModel> for DomainMessage {
    type Error = String;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let role = MessageRole::from_str(&model.role)?;
        let sources: Vec<SourceRef> = serde_json::from_value(model.sources)
            .map_err(|e| format!("Could not deserialize sources: {}", e))?;

        Ok(DomainMessage::from_database(
            model.id,
            model.session_id,
            model.seq,
            role,
            model.content,
            sources,
            model.created_at,
        ))
    }
}
