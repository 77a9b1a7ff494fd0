use std::collections::HashMap;

use tokio::sync::{Mutex, watch};
use uuid::Uuid;

/// Registry of in-flight ingestions, keyed by document id. Each flight holds
/// a watch sender whose flag the pipeline polls between embed completions;
/// cancelling flips the flag and the pipeline lands the document in
/// `failed`/`Cancelled` instead of leaving it mid-state.
#[derive(Default)]
pub struct IngestionTracker {
    flights: Mutex<HashMap<Uuid, watch::Sender<bool>>>,
}

impl IngestionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flight and returns the cancel flag the pipeline observes.
    pub async fn register(&self, document_id: Uuid) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        self.flights.lock().await.insert(document_id, tx);
        rx
    }

    /// Returns false when no such flight is registered.
    pub async fn cancel(&self, document_id: Uuid) -> bool {
        let flights = self.flights.lock().await;
        match flights.get(&document_id) {
            Some(tx) => tx.send(true).is_ok(),
            None => false,
        }
    }

    pub async fn complete(&self, document_id: Uuid) {
        self.flights.lock().await.remove(&document_id);
    }

    pub async fn is_in_flight(&self, document_id: Uuid) -> bool {
        self.flights.lock().await.contains_key(&document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_flips_the_registered_flag() {
        let tracker = IngestionTracker::new();
        let document_id = Uuid::new_v4();

        let rx = tracker.register(document_id).await;
        assert!(!*rx.borrow());
        assert!(tracker.is_in_flight(document_id).await);

        assert!(tracker.cancel(document_id).await);
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_cancel_unknown_flight_is_a_noop() {
        let tracker = IngestionTracker::new();
        assert!(!tracker.cancel(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_complete_unregisters() {
        let tracker = IngestionTracker::new();
        let document_id = Uuid::new_v4();

        let _rx = tracker.register(document_id).await;
        tracker.complete(document_id).await;

        assert!(!tracker.is_in_flight(document_id).await);
        assert!(!tracker.cancel(document_id).await);
    }
}
