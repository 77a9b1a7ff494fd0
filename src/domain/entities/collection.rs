use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    id: Uuid,
    owner_id: String,
    name: String,
    description: Option<String>,
    embedding_model: String,
    embedding_dimension: i32,
    chunk_size: i32,
    chunk_overlap: i32,
    max_retrieval_count: i32,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Collection {
    pub fn new(
        owner_id: String,
        name: String,
        description: Option<String>,
        embedding_model: String,
        embedding_dimension: i32,
        chunk_size: i32,
        chunk_overlap: i32,
        max_retrieval_count: i32,
    ) -> Result<Self, String> {
        if owner_id.trim().is_empty() {
            return Err("Owner id cannot be empty".to_string());
        }
        if name.trim().is_empty() {
            return Err("Collection name cannot be empty".to_string());
        }
        if embedding_model.trim().is_empty() {
            return Err("Embedding model cannot be empty".to_string());
        }
        if embedding_dimension <= 0 {
            return Err(format!(
                "Embedding dimension must be positive, got {}",
                embedding_dimension
            ));
        }
        if chunk_size <= 0 {
            return Err(format!("Chunk size must be positive, got {}", chunk_size));
        }
        if chunk_overlap < 0 || chunk_overlap >= chunk_size {
            return Err(format!(
                "Chunk overlap must be non-negative and smaller than chunk size ({} >= {})",
                chunk_overlap, chunk_size
            ));
        }
        if max_retrieval_count <= 0 {
            return Err(format!(
                "Max retrieval count must be positive, got {}",
                max_retrieval_count
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            description,
            embedding_model,
            embedding_dimension,
            chunk_size,
            chunk_overlap,
            max_retrieval_count,
            created_at: Utc::now(),
            deleted_at: None,
        })
    }

    /// Reconstruct a collection from persisted values.
    #[allow(clippy::too_many_arguments)]
    pub fn from_database(
        id: Uuid,
        owner_id: String,
        name: String,
        description: Option<String>,
        embedding_model: String,
        embedding_dimension: i32,
        chunk_size: i32,
        chunk_overlap: i32,
        max_retrieval_count: i32,
        created_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            description,
            embedding_model,
            embedding_dimension,
            chunk_size,
            chunk_overlap,
            max_retrieval_count,
            created_at,
            deleted_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn embedding_dimension(&self) -> i32 {
        self.embedding_dimension
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> i32 {
        self.chunk_overlap
    }

    pub fn max_retrieval_count(&self) -> i32 {
        self.max_retrieval_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }

    pub fn mark_deleted(&mut self) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_collection() -> Collection {
        Collection::new(
            "user-1".to_string(),
            "research notes".to_string(),
            Some("papers and summaries".to_string()),
            "nomic-embed-text".to_string(),
            768,
            500,
            50,
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_collection_creation() {
        let collection = valid_collection();

        assert_eq!(collection.owner_id(), "user-1");
        assert_eq!(collection.name(), "research notes");
        assert_eq!(collection.embedding_dimension(), 768);
        assert!(!collection.is_deleted());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let result = Collection::new(
            "user-1".to_string(),
            "bad".to_string(),
            None,
            "nomic-embed-text".to_string(),
            768,
            100,
            100,
            5,
        );
        assert!(result.is_err());

        let result = Collection::new(
            "user-1".to_string(),
            "bad".to_string(),
            None,
            "nomic-embed-text".to_string(),
            768,
            100,
            200,
            5,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_positive_dimension() {
        let result = Collection::new(
            "user-1".to_string(),
            "bad".to_string(),
            None,
            "nomic-embed-text".to_string(),
            0,
            500,
            50,
            5,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ownership_check() {
        let collection = valid_collection();

        assert!(collection.is_owned_by("user-1"));
        assert!(!collection.is_owned_by("user-2"));
    }

    #[test]
    fn test_soft_delete_is_idempotent() {
        let mut collection = valid_collection();

        collection.mark_deleted();
        let first = collection.deleted_at();
        assert!(collection.is_deleted());

        collection.mark_deleted();
        assert_eq!(collection.deleted_at(), first);
    }
}
