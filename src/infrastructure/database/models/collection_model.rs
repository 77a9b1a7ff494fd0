use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::Collection as DomainCollection;
use crate::infrastructure::database::schema::collections;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CollectionModel {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub embedding_model: String,
    pub embedding_dimension: i32,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    pub max_retrieval_count: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCollectionModel {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub embedding_model: String,
    pub embedding_dimension: i32,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    pub max_retrieval_count: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&DomainCollection> for NewCollectionModel {
    fn from(collection: &DomainCollection) -> Self {
        Self {
            id: collection.id(),
            owner_id: collection.owner_id().to_string(),
            name: collection.name().to_string(),
            description: collection.description().map(|s| s.to_string()),
            embedding_model: collection.embedding_model().to_string(),
            embedding_dimension: collection.embedding_dimension(),
            chunk_size: collection.chunk_size(),
            chunk_overlap: collection.chunk_overlap(),
            max_retrieval_count: collection.max_retrieval_count(),
            created_at: collection.created_at(),
            deleted_at: collection.deleted_at(),
        }
    }
}

impl From<CollectionModel> for DomainCollection {
    fn from(model: CollectionModel) -> Self {
        DomainCollection::from_database(
            model.id,
            model.owner_id,
            model.name,
            model.description,
            model.embedding_model,
            model.embedding_dimension,
            model.chunk_size,
            model.chunk_overlap,
            model.max_retrieval_count,
            model.created_at,
            model.deleted_at,
        )
    }
}
