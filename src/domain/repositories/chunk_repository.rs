use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::Chunk;

#[derive(Debug)]
pub enum ChunkRepositoryError {
    DatabaseError(String),
    DimensionMismatch { expected: i32, actual: i32 },
    ValidationError(String),
}

impl std::fmt::Display for ChunkRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ChunkRepositoryError::DimensionMismatch { expected, actual } => write!(
                f,
                "Vector dimension mismatch: expected {}, got {}",
                expected, actual
            ),
            ChunkRepositoryError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ChunkRepositoryError {}

/// A chunk returned from similarity search, joined with the owning document
/// for citation display and deterministic tie-breaking.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub document_title: String,
    pub document_created_at: DateTime<Utc>,
    pub score: f32,
}

/// The vector store: chunk rows carry the embedding column, and all reads are
/// scoped to one collection.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Atomically replaces all chunks of a document: prior rows are deleted
    /// and the new batch inserted inside one transaction, so a reprocess can
    /// never leave duplicate ordinals and a failure leaves zero rows written.
    async fn replace_for_document(
        &self,
        document_id: Uuid,
        chunks: &[Chunk],
    ) -> Result<usize, ChunkRepositoryError>;

    async fn delete_by_document(&self, document_id: Uuid) -> Result<usize, ChunkRepositoryError>;

    async fn count_by_document(&self, document_id: Uuid) -> Result<i64, ChunkRepositoryError>;

    /// Nearest-neighbour search by cosine distance, strictly scoped to the
    /// given collection. Results are ordered by descending similarity, ties
    /// broken by earlier document creation time, then lower ordinal.
    async fn similarity_search(
        &self,
        collection_id: Uuid,
        query_vector: &Vector,
        limit: i32,
    ) -> Result<Vec<ScoredChunk>, ChunkRepositoryError>;
}
