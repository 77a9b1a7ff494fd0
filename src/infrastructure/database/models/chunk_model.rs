use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::Chunk as DomainChunk;
use crate::infrastructure::database::schema::chunks;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(super::DocumentModel, foreign_key = document_id))]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChunkModel {
    pub id: Uuid,
    pub document_id: Uuid,
    pub ordinal: i32,
    pub chunk_text: String,
    pub embedding: Vector,
    pub embedding_model: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChunkModel {
    pub id: Uuid,
    pub document_id: Uuid,
    pub ordinal: i32,
    pub chunk_text: String,
    pub embedding: Vector,
    pub embedding_model: String,
    pub created_at: DateTime<Utc>,
}

impl From<&DomainChunk> for NewChunkModel {
    fn from(chunk: &DomainChunk) -> Self {
        Self {
            id: chunk.id(),
            document_id: chunk.document_id(),
            ordinal: chunk.ordinal(),
            chunk_text: chunk.text().to_string(),
            embedding: chunk.embedding().clone(),
            embedding_model: chunk.embedding_model().to_string(),
            created_at: chunk.created_at(),
        }
    }
}

impl From<ChunkModel> for DomainChunk {
    fn from(model: ChunkModel) -> Self {
        DomainChunk::from_database(
            model.id,
            model.document_id,
            model.ordinal,
            model.chunk_text,
            model.embedding,
            model.embedding_model,
            model.created_at,
        )
    }
}
