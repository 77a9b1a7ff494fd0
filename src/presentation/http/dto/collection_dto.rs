use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::create_collection::CreateCollectionResponse;
use crate::domain::entities::Collection;

#[derive(Debug, Deserialize)]
pub struct CreateCollectionDto {
    pub name: String,
    pub description: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_dimension: Option<i32>,
    pub chunk_size: Option<i32>,
    pub chunk_overlap: Option<i32>,
    pub max_retrieval_count: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CollectionCreatedDto {
    pub collection_id: Uuid,
    pub name: String,
    pub embedding_model: String,
}

impl From<CreateCollectionResponse> for CollectionCreatedDto {
    fn from(response: CreateCollectionResponse) -> Self {
        Self {
            collection_id: response.collection_id,
            name: response.name,
            embedding_model: response.embedding_model,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub embedding_model: String,
    pub embedding_dimension: i32,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    pub max_retrieval_count: i32,
    pub created_at: String,
}

impl From<Collection> for CollectionResponseDto {
    fn from(collection: Collection) -> Self {
        Self {
            id: collection.id(),
            name: collection.name().to_string(),
            description: collection.description().map(|s| s.to_string()),
            embedding_model: collection.embedding_model().to_string(),
            embedding_dimension: collection.embedding_dimension(),
            chunk_size: collection.chunk_size(),
            chunk_overlap: collection.chunk_overlap(),
            max_retrieval_count: collection.max_retrieval_count(),
            created_at: collection.created_at().to_rfc3339(),
        }
    }
}
