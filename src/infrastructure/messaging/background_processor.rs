use std::sync::Arc;

use crate::application::ports::ingestion_queue::IngestionJob;
use crate::application::services::DocumentIngestionPipeline;
use crate::application::services::ingestion_tracker::IngestionTracker;
use crate::domain::repositories::{CollectionRepository, DocumentRepository};
use crate::infrastructure::messaging::MpscIngestionQueueReceiver;

/// Bounded worker pool draining the reprocessing queue. Each worker runs the
/// full pipeline per job; cancellation arrives through the shared tracker.
pub struct BackgroundProcessor {
    receiver: Arc<MpscIngestionQueueReceiver>,
    collection_repository: Arc<dyn CollectionRepository>,
    document_repository: Arc<dyn DocumentRepository>,
    pipeline: Arc<DocumentIngestionPipeline>,
    tracker: Arc<IngestionTracker>,
    worker_count: usize,
}

impl BackgroundProcessor {
    pub fn new(
        receiver: Arc<MpscIngestionQueueReceiver>,
        collection_repository: Arc<dyn CollectionRepository>,
        document_repository: Arc<dyn DocumentRepository>,
        pipeline: Arc<DocumentIngestionPipeline>,
        tracker: Arc<IngestionTracker>,
    ) -> Self {
        Self {
            receiver,
            collection_repository,
            document_repository,
            pipeline,
            tracker,
            worker_count: 3,
        }
    }

    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    pub async fn start(&self) {
        tracing::info!(
            "Starting background processor with {} workers",
            self.worker_count
        );

        let mut handles = Vec::new();

        for worker_id in 0..self.worker_count {
            let processor = self.clone_for_worker();
            let handle = tokio::spawn(async move {
                processor.worker_loop(worker_id).await;
            });
            handles.push(handle);
        }

        for (i, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} panicked: {}", i, e);
            }
        }

        tracing::info!("Background processor stopped");
    }

    async fn worker_loop(&self, worker_id: usize) {
        tracing::debug!("Worker {} started", worker_id);

        while let Some(job) = self.receiver.recv().await {
            tracing::info!(
                "Worker {} reprocessing document {}",
                worker_id,
                job.document_id
            );
            self.process_job(job).await;
        }

        tracing::debug!("Worker {} stopped, queue closed", worker_id);
    }

    async fn process_job(&self, job: IngestionJob) {
        let collection = match self.collection_repository.find_by_id(job.collection_id).await {
            Ok(Some(collection)) => collection,
            Ok(None) => {
                // Collection vanished between enqueue and pickup (soft
                // delete); the job is void.
                tracing::warn!(
                    "Dropping job for document {}: collection {} is gone",
                    job.document_id,
                    job.collection_id
                );
                self.mark_orphaned(job.document_id).await;
                return;
            }
            Err(e) => {
                tracing::error!("Could not load collection {}: {}", job.collection_id, e);
                return;
            }
        };

        let cancel = self.tracker.register(job.document_id).await;
        let outcome = self
            .pipeline
            .ingest(job.document_id, &collection, cancel)
            .await;
        self.tracker.complete(job.document_id).await;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    "Reprocessed document {}: {} chunks",
                    job.document_id,
                    result.chunk_count
                );
            }
            Err(e) => {
                // The pipeline already moved the document to failed with a
                // reason; this is operator visibility only.
                tracing::warn!("Reprocess of document {} failed: {}", job.document_id, e);
            }
        }
    }

    async fn mark_orphaned(&self, document_id: uuid::Uuid) {
        let document = match self.document_repository.find_by_id(document_id).await {
            Ok(Some(document)) => document,
            _ => return,
        };

        let mut document = document;
        if document.begin_chunking().is_ok()
            && document
                .fail("Collection was deleted before reprocessing".to_string())
                .is_ok()
        {
            if let Err(e) = self.document_repository.update(&document).await {
                tracing::error!("Could not persist orphaned document status: {}", e);
            }
        }
    }

    fn clone_for_worker(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            collection_repository: self.collection_repository.clone(),
            document_repository: self.document_repository.clone(),
            pipeline: self.pipeline.clone(),
            tracker: self.tracker.clone(),
            worker_count: self.worker_count,
        }
    }
}
