pub mod content_hash;
pub mod processing_status;

pub use content_hash::ContentHash;
pub use processing_status::ProcessingStatus;
