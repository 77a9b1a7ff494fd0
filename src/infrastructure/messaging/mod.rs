pub mod background_processor;
pub mod mpsc_ingestion_queue;

pub use background_processor::BackgroundProcessor;
pub use mpsc_ingestion_queue::{MpscIngestionQueue, MpscIngestionQueueReceiver};
