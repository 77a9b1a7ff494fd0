use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::{Vector, VectorExpressionMethods};
use uuid::Uuid;

use crate::domain::entities::Chunk;
use crate::domain::repositories::chunk_repository::{
    ChunkRepository, ChunkRepositoryError, ScoredChunk,
};
use crate::infrastructure::database::models::{ChunkModel, NewChunkModel};
use crate::infrastructure::database::schema::{chunks, documents};
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresChunkRepository {
    pool: DbPool,
}

impl PostgresChunkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChunkRepository for PostgresChunkRepository {
    async fn replace_for_document(
        &self,
        document: Uuid,
        new_chunks: &[Chunk],
    ) -> Result<usize, ChunkRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))?;

        let models: Vec<NewChunkModel> = new_chunks.iter().map(NewChunkModel::from).collect();

        // Delete-then-insert in one transaction: a reprocess can never leave
        // duplicate ordinals, and a failed insert leaves the prior rows
        // untouched.
        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(chunks::table.filter(chunks::document_id.eq(document)))
                .execute(conn)?;
            diesel::insert_into(chunks::table)
                .values(&models)
                .execute(conn)
        })
        .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))
    }

    async fn delete_by_document(&self, document: Uuid) -> Result<usize, ChunkRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))?;

        diesel::delete(chunks::table.filter(chunks::document_id.eq(document)))
            .execute(&mut conn)
            .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))
    }

    async fn count_by_document(&self, document: Uuid) -> Result<i64, ChunkRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))?;

        chunks::table
            .filter(chunks::document_id.eq(document))
            .count()
            .get_result(&mut conn)
            .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))
    }

    async fn similarity_search(
        &self,
        collection: Uuid,
        query_vector: &Vector,
        limit: i32,
    ) -> Result<Vec<ScoredChunk>, ChunkRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))?;

        // Cosine distance ascending is similarity descending; creation time
        // and ordinal keep equal-distance rows in a stable, reproducible
        // order.
        let rows = chunks::table
            .inner_join(documents::table)
            .filter(documents::collection_id.eq(collection))
            .order(chunks::embedding.cosine_distance(query_vector.clone()).asc())
            .then_order_by(documents::created_at.asc())
            .then_order_by(chunks::ordinal.asc())
            .limit(limit as i64)
            .select((
                ChunkModel::as_select(),
                documents::title,
                documents::created_at,
                chunks::embedding.cosine_distance(query_vector.clone()),
            ))
            .load::<(ChunkModel, String, DateTime<Utc>, f64)>(&mut conn)
            .map_err(|e| ChunkRepositoryError::DatabaseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(model, title, doc_created_at, distance)| ScoredChunk {
                chunk: Chunk::from(model),
                document_title: title,
                document_created_at: doc_created_at,
                score: 1.0 - distance as f32,
            })
            .collect())
    }
}
