use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Pending,
    Chunking,
    Embedding,
    Completed,
    Failed(String),
}

impl ProcessingStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ProcessingStatus::Pending)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ProcessingStatus::Chunking | ProcessingStatus::Embedding
        )
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProcessingStatus::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProcessingStatus::Failed(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessingStatus::Completed | ProcessingStatus::Failed(_)
        )
    }

    pub fn can_transition_to(&self, new_status: &ProcessingStatus) -> bool {
        match (self, new_status) {
            (ProcessingStatus::Pending, ProcessingStatus::Chunking) => true,
            (ProcessingStatus::Chunking, ProcessingStatus::Embedding) => true,
            (ProcessingStatus::Chunking, ProcessingStatus::Failed(_)) => true,
            (ProcessingStatus::Embedding, ProcessingStatus::Completed) => true,
            (ProcessingStatus::Embedding, ProcessingStatus::Failed(_)) => true,
            // Terminal states may only be left through explicit reprocessing.
            (ProcessingStatus::Completed, ProcessingStatus::Pending) => true,
            (ProcessingStatus::Failed(_), ProcessingStatus::Pending) => true,
            _ => false,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ProcessingStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Chunking => "chunking",
            ProcessingStatus::Embedding => "embedding",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed(_) => "failed",
        }
    }

    pub fn from_parts(status: &str, reason: Option<String>) -> Result<Self, String> {
        match status.to_lowercase().as_str() {
            "pending" => Ok(ProcessingStatus::Pending),
            "chunking" => Ok(ProcessingStatus::Chunking),
            "embedding" => Ok(ProcessingStatus::Embedding),
            "completed" => Ok(ProcessingStatus::Completed),
            "failed" => Ok(ProcessingStatus::Failed(
                reason.unwrap_or_else(|| "Unknown error".to_string()),
            )),
            _ => Err(format!("Invalid processing status: {}", status)),
        }
    }
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        ProcessingStatus::Pending
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_checks() {
        assert!(ProcessingStatus::Pending.is_pending());
        assert!(ProcessingStatus::Chunking.is_in_flight());
        assert!(ProcessingStatus::Embedding.is_in_flight());
        assert!(ProcessingStatus::Completed.is_terminal());
        assert!(ProcessingStatus::Failed("boom".to_string()).is_terminal());
    }

    #[test]
    fn test_valid_transitions() {
        let failed = ProcessingStatus::Failed("err".to_string());

        assert!(ProcessingStatus::Pending.can_transition_to(&ProcessingStatus::Chunking));
        assert!(ProcessingStatus::Chunking.can_transition_to(&ProcessingStatus::Embedding));
        assert!(ProcessingStatus::Chunking.can_transition_to(&failed));
        assert!(ProcessingStatus::Embedding.can_transition_to(&ProcessingStatus::Completed));
        assert!(ProcessingStatus::Embedding.can_transition_to(&failed));

        // Reprocessing re-enters the pipeline from either terminal state
        assert!(ProcessingStatus::Completed.can_transition_to(&ProcessingStatus::Pending));
        assert!(failed.can_transition_to(&ProcessingStatus::Pending));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!ProcessingStatus::Pending.can_transition_to(&ProcessingStatus::Completed));
        assert!(!ProcessingStatus::Pending.can_transition_to(&ProcessingStatus::Embedding));
        assert!(!ProcessingStatus::Completed.can_transition_to(&ProcessingStatus::Chunking));
        assert!(
            !ProcessingStatus::Completed
                .can_transition_to(&ProcessingStatus::Failed("x".to_string()))
        );
    }

    #[test]
    fn test_failure_reason() {
        let failed = ProcessingStatus::Failed("provider exhausted".to_string());
        assert_eq!(failed.failure_reason(), Some("provider exhausted"));
        assert_eq!(ProcessingStatus::Pending.failure_reason(), None);
    }

    #[test]
    fn test_round_trip_through_parts() {
        let statuses = vec![
            ProcessingStatus::Pending,
            ProcessingStatus::Chunking,
            ProcessingStatus::Embedding,
            ProcessingStatus::Completed,
            ProcessingStatus::Failed("test error".to_string()),
        ];

        for status in statuses {
            let reason = status.failure_reason().map(|r| r.to_string());
            let parsed = ProcessingStatus::from_parts(status.as_str(), reason).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_invalid_status_string() {
        assert!(ProcessingStatus::from_parts("uploading", None).is_err());
    }
}
