use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Session;
use crate::domain::repositories::session_repository::{SessionRepository, SessionRepositoryError};
use crate::infrastructure::database::models::{NewSessionModel, SessionModel};
use crate::infrastructure::database::schema::sessions::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresSessionRepository {
    pool: DbPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SessionRepositoryError::DatabaseError(e.to_string()))?;

        let new_session = NewSessionModel::from(session);

        diesel::insert_into(sessions)
            .values(&new_session)
            .execute(&mut conn)
            .map_err(|e| SessionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
    ) -> Result<Option<Session>, SessionRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SessionRepositoryError::DatabaseError(e.to_string()))?;

        let result = sessions
            .find(session_id)
            .first::<SessionModel>(&mut conn)
            .optional()
            .map_err(|e| SessionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.map(Session::from))
    }

    async fn find_by_collection(
        &self,
        collection: Uuid,
    ) -> Result<Vec<Session>, SessionRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SessionRepositoryError::DatabaseError(e.to_string()))?;

        let models = sessions
            .filter(collection_id.eq(collection))
            .order(created_at.asc())
            .load::<SessionModel>(&mut conn)
            .map_err(|e| SessionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Session::from).collect())
    }
}
