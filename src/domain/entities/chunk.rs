use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    id: Uuid,
    document_id: Uuid,
    ordinal: i32,
    text: String,
    embedding: Vector,
    embedding_model: String,
    created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(
        document_id: Uuid,
        ordinal: i32,
        text: String,
        embedding: Vector,
        embedding_model: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            ordinal,
            text,
            embedding,
            embedding_model,
            created_at: Utc::now(),
        }
    }

    /// Reconstruct a chunk from persisted values.
    pub fn from_database(
        id: Uuid,
        document_id: Uuid,
        ordinal: i32,
        text: String,
        embedding: Vector,
        embedding_model: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            document_id,
            ordinal,
            text,
            embedding,
            embedding_model,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn ordinal(&self) -> i32 {
        self.ordinal
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &Vector {
        &self.embedding
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn dimension(&self) -> usize {
        self.embedding.as_slice().len()
    }

    pub fn matches_dimension(&self, expected: i32) -> bool {
        self.dimension() == expected as usize
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_creation() {
        let document_id = Uuid::new_v4();
        let chunk = Chunk::new(
            document_id,
            0,
            "The first segment of the document.".to_string(),
            Vector::from(vec![0.1, 0.2, 0.3]),
            "nomic-embed-text".to_string(),
        );

        assert_eq!(chunk.document_id(), document_id);
        assert_eq!(chunk.ordinal(), 0);
        assert_eq!(chunk.dimension(), 3);
        assert_eq!(chunk.word_count(), 6);
    }

    #[test]
    fn test_dimension_check() {
        let chunk = Chunk::new(
            Uuid::new_v4(),
            0,
            "text".to_string(),
            Vector::from(vec![0.0; 768]),
            "nomic-embed-text".to_string(),
        );

        assert!(chunk.matches_dimension(768));
        assert!(!chunk.matches_dimension(1536));
    }
}
