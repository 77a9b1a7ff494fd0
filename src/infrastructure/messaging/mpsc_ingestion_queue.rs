use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::application::ports::ingestion_queue::{
    IngestionJob, IngestionQueue, IngestionQueueError,
};

#[derive(Debug, Default)]
struct QueueStats {
    total_enqueued: u64,
    total_dequeued: u64,
}

/// In-process queue feeding the background worker pool.
pub struct MpscIngestionQueue {
    sender: mpsc::UnboundedSender<IngestionJob>,
    stats: Arc<Mutex<QueueStats>>,
}

impl MpscIngestionQueue {
    pub fn create_pair() -> (Self, MpscIngestionQueueReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let stats = Arc::new(Mutex::new(QueueStats::default()));

        let queue = Self {
            sender,
            stats: stats.clone(),
        };
        let receiver = MpscIngestionQueueReceiver {
            receiver: Mutex::new(receiver),
            stats,
        };

        (queue, receiver)
    }
}

#[async_trait]
impl IngestionQueue for MpscIngestionQueue {
    async fn enqueue(&self, job: IngestionJob) -> Result<(), IngestionQueueError> {
        self.sender
            .send(job)
            .map_err(|_| IngestionQueueError::QueueClosed)?;

        let mut stats = self.stats.lock().await;
        stats.total_enqueued += 1;

        Ok(())
    }

    async fn size(&self) -> Result<usize, IngestionQueueError> {
        let stats = self.stats.lock().await;
        Ok((stats.total_enqueued - stats.total_dequeued) as usize)
    }
}

/// The worker pool's end of the channel.
pub struct MpscIngestionQueueReceiver {
    receiver: Mutex<mpsc::UnboundedReceiver<IngestionJob>>,
    stats: Arc<Mutex<QueueStats>>,
}

impl MpscIngestionQueueReceiver {
    pub async fn recv(&self) -> Option<IngestionJob> {
        let job = {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        };

        if job.is_some() {
            let mut stats = self.stats.lock().await;
            stats.total_dequeued += 1;
        }

        job
    }
}
