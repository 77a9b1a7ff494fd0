use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::Session as DomainSession;
use crate::infrastructure::database::schema::sessions;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(super::CollectionModel, foreign_key = collection_id))]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionModel {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub title: String,
    pub model: String,
    pub context_window: i32,
    pub temperature: f32,
    pub max_retrieval_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSessionModel {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub title: String,
    pub model: String,
    pub context_window: i32,
    pub temperature: f32,
    pub max_retrieval_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&DomainSession> for NewSessionModel {
    fn from(session: &DomainSession) -> Self {
        Self {
            id: session.id(),
            collection_id: session.collection_id(),
            title: session.title().to_string(),
            model: session.model().to_string(),
            context_window: session.context_window(),
            temperature: session.temperature(),
            max_retrieval_count: session.max_retrieval_count(),
            created_at: session.created_at(),
        }
    }
}

impl From<SessionModel> for DomainSession {
    fn from(model: SessionModel) -> Self {
        DomainSession::from_database(
            model.id,
            model.collection_id,
            model.title,
            model.model,
            model.context_window,
            model.temperature,
            model.max_retrieval_count,
            model.created_at,
        )
    }
}
