use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ContentHash, ProcessingStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: Uuid,
    collection_id: Uuid,
    title: String,
    source_text: String,
    content_type: String,
    content_hash: ContentHash,
    processing_status: ProcessingStatus,
    chunk_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        collection_id: Uuid,
        title: String,
        source_text: String,
        content_type: String,
    ) -> Result<Self, String> {
        if title.trim().is_empty() {
            return Err("Document title cannot be empty".to_string());
        }

        let content_hash = ContentHash::from_text(&source_text);
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            collection_id,
            title,
            content_hash,
            source_text,
            content_type,
            processing_status: ProcessingStatus::Pending,
            chunk_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstruct a document from persisted values.
    #[allow(clippy::too_many_arguments)]
    pub fn from_database(
        id: Uuid,
        collection_id: Uuid,
        title: String,
        source_text: String,
        content_type: String,
        content_hash: ContentHash,
        processing_status: ProcessingStatus,
        chunk_count: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            collection_id,
            title,
            source_text,
            content_type,
            content_hash,
            processing_status,
            chunk_count,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn collection_id(&self) -> Uuid {
        self.collection_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn processing_status(&self) -> &ProcessingStatus {
        &self.processing_status
    }

    pub fn chunk_count(&self) -> i32 {
        self.chunk_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn transition_to(&mut self, new_status: ProcessingStatus) -> Result<(), String> {
        if !self.processing_status.can_transition_to(&new_status) {
            return Err(format!(
                "Invalid status transition: {} -> {}",
                self.processing_status, new_status
            ));
        }
        self.processing_status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn begin_chunking(&mut self) -> Result<(), String> {
        self.transition_to(ProcessingStatus::Chunking)
    }

    pub fn begin_embedding(&mut self) -> Result<(), String> {
        self.transition_to(ProcessingStatus::Embedding)
    }

    pub fn complete(&mut self, chunk_count: i32) -> Result<(), String> {
        self.transition_to(ProcessingStatus::Completed)?;
        self.chunk_count = chunk_count;
        Ok(())
    }

    pub fn fail(&mut self, reason: String) -> Result<(), String> {
        self.transition_to(ProcessingStatus::Failed(reason))?;
        self.chunk_count = 0;
        Ok(())
    }

    /// Re-enter the pipeline from a terminal state; chunks written by the
    /// previous run are replaced, never accumulated.
    pub fn reset_for_reprocessing(&mut self) -> Result<(), String> {
        self.transition_to(ProcessingStatus::Pending)?;
        self.chunk_count = 0;
        Ok(())
    }

    pub fn is_reprocessable(&self) -> bool {
        self.processing_status.is_terminal()
    }

    pub fn has_same_content(&self, other_text: &str) -> bool {
        self.content_hash.matches(&ContentHash::from_text(other_text))
    }
}
