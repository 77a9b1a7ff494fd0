use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Collection;
use crate::domain::repositories::collection_repository::{
    CollectionRepository, CollectionRepositoryError,
};
use crate::infrastructure::database::models::{CollectionModel, NewCollectionModel};
use crate::infrastructure::database::schema::collections::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresCollectionRepository {
    pool: DbPool,
}

impl PostgresCollectionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionRepository for PostgresCollectionRepository {
    async fn save(&self, collection: &Collection) -> Result<(), CollectionRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| CollectionRepositoryError::DatabaseError(e.to_string()))?;

        let new_collection = NewCollectionModel::from(collection);

        diesel::insert_into(collections)
            .values(&new_collection)
            .execute(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => CollectionRepositoryError::DuplicateName(collection.name().to_string()),
                other => CollectionRepositoryError::DatabaseError(other.to_string()),
            })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        collection_id: Uuid,
    ) -> Result<Option<Collection>, CollectionRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| CollectionRepositoryError::DatabaseError(e.to_string()))?;

        let result = collections
            .find(collection_id)
            .filter(deleted_at.is_null())
            .first::<CollectionModel>(&mut conn)
            .optional()
            .map_err(|e| CollectionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.map(Collection::from))
    }

    async fn find_by_owner(
        &self,
        owner: &str,
    ) -> Result<Vec<Collection>, CollectionRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| CollectionRepositoryError::DatabaseError(e.to_string()))?;

        let models = collections
            .filter(owner_id.eq(owner))
            .filter(deleted_at.is_null())
            .order(created_at.asc())
            .load::<CollectionModel>(&mut conn)
            .map_err(|e| CollectionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Collection::from).collect())
    }

    async fn soft_delete(&self, collection_id: Uuid) -> Result<bool, CollectionRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| CollectionRepositoryError::DatabaseError(e.to_string()))?;

        let updated = diesel::update(
            collections
                .find(collection_id)
                .filter(deleted_at.is_null()),
        )
        .set(deleted_at.eq(Some(Utc::now())))
        .execute(&mut conn)
        .map_err(|e| CollectionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(updated > 0)
    }
}
