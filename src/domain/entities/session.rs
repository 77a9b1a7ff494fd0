use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    collection_id: Uuid,
    title: String,
    model: String,
    context_window: i32,
    temperature: f32,
    max_retrieval_count: i32,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        collection_id: Uuid,
        title: String,
        model: String,
        context_window: i32,
        temperature: f32,
        max_retrieval_count: i32,
    ) -> Result<Self, String> {
        if title.trim().is_empty() {
            return Err("Session title cannot be empty".to_string());
        }
        if model.trim().is_empty() {
            return Err("Session model cannot be empty".to_string());
        }
        if context_window <= 0 {
            return Err(format!(
                "Context window must be positive, got {}",
                context_window
            ));
        }
        if !(0.0..=2.0).contains(&temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                temperature
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
            collection_id,
            title,
            model,
            context_window,
            temperature,
            max_retrieval_count,
            created_at: Utc::now(),
        })
    }

    /// Reconstruct a session from persisted values. Session configuration is
    /// immutable after creation, so there are no mutators.
    pub fn from_database(
        id: Uuid,
        collection_id: Uuid,
        title: String,
        model: String,
        context_window: i32,
        temperature: f32,
        max_retrieval_count: i32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            collection_id,
            title,
            model,
            context_window,
            temperature,
            max_retrieval_count,
            created_at,
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

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context_window(&self) -> i32 {
        self.context_window
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_retrieval_count(&self) -> i32 {
        self.max_retrieval_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let collection_id = Uuid::new_v4();
        let session = Session::new(
            collection_id,
            "notes chat".to_string(),
            "llama3".to_string(),
            4096,
            0.7,
            5,
        )
        .unwrap();

        assert_eq!(session.collection_id(), collection_id);
        assert_eq!(session.context_window(), 4096);
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        let collection_id = Uuid::new_v4();

        assert!(
            Session::new(collection_id, "t".to_string(), "m".to_string(), 0, 0.7, 5).is_err()
        );
        assert!(
            Session::new(collection_id, "t".to_string(), "m".to_string(), 4096, 2.5, 5).is_err()
        );
        assert!(
            Session::new(collection_id, "t".to_string(), "m".to_string(), 4096, 0.7, 0).is_err()
        );
    }
}
