use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A queued reprocessing request. The document already exists with its source
/// text persisted; workers re-run the pipeline against it.
#[derive(Debug, Clone)]
pub struct IngestionJob {
    pub document_id: Uuid,
    pub collection_id: Uuid,
    pub queued_at: DateTime<Utc>,
}

impl IngestionJob {
    pub fn new(document_id: Uuid, collection_id: Uuid) -> Self {
        Self {
            document_id,
            collection_id,
            queued_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub enum IngestionQueueError {
    QueueClosed,
    ConnectionError(String),
}

impl std::fmt::Display for IngestionQueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionQueueError::QueueClosed => write!(f, "Ingestion queue is closed"),
            IngestionQueueError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
        }
    }
}

impl std::error::Error for IngestionQueueError {}

#[async_trait]
pub trait IngestionQueue: Send + Sync {
    async fn enqueue(&self, job: IngestionJob) -> Result<(), IngestionQueueError>;

    async fn size(&self) -> Result<usize, IngestionQueueError>;
}
