use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Message;
use crate::domain::repositories::message_repository::{MessageRepository, MessageRepositoryError};
use crate::infrastructure::database::models::{MessageModel, NewMessageModel};
use crate::infrastructure::database::schema::messages::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresMessageRepository {
    pool: DbPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn append(&self, message: &Message) -> Result<Message, MessageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| MessageRepositoryError::DatabaseError(e.to_string()))?;

        let new_message = NewMessageModel::try_from(message)
            .map_err(MessageRepositoryError::ValidationError)?;

        // RETURNING hands back the sequence-assigned seq
        let persisted = diesel::insert_into(messages)
            .values(&new_message)
            .get_result::<MessageModel>(&mut conn)
            .map_err(|e| MessageRepositoryError::DatabaseError(e.to_string()))?;

        Message::try_from(persisted).map_err(MessageRepositoryError::ValidationError)
    }

    async fn find_by_session(
        &self,
        session: Uuid,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| MessageRepositoryError::DatabaseError(e.to_string()))?;

        let models = messages
            .filter(session_id.eq(session))
            .order(seq.asc())
            .load::<MessageModel>(&mut conn)
            .map_err(|e| MessageRepositoryError::DatabaseError(e.to_string()))?;

        models
            .into_iter()
            .map(|model| Message::try_from(model).map_err(MessageRepositoryError::ValidationError))
            .collect()
    }

    async fn find_recent_by_session(
        &self,
        session: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| MessageRepositoryError::DatabaseError(e.to_string()))?;

        let mut models = messages
            .filter(session_id.eq(session))
            .order(seq.desc())
            .limit(limit)
            .load::<MessageModel>(&mut conn)
            .map_err(|e| MessageRepositoryError::DatabaseError(e.to_string()))?;

        // Fetched newest-first for the limit, returned oldest-first
        models.reverse();

        models
            .into_iter()
            .map(|model| Message::try_from(model).map_err(MessageRepositoryError::ValidationError))
            .collect()
    }
}
