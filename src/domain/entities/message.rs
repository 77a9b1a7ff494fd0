use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(format!("Invalid message role: {}", s)),
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chunk reference attached to an assistant message for citation display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub document_title: String,
    pub score: f32,
}

/// One turn half in a conversation. Messages are append-only; `seq` is the
/// store-assigned monotonic position that defines conversation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    session_id: Uuid,
    seq: i64,
    role: MessageRole,
    content: String,
    sources: Vec<SourceRef>,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(session_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            seq: 0,
            role: MessageRole::User,
            content,
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(session_id: Uuid, content: String, sources: Vec<SourceRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            seq: 0,
            role: MessageRole::Assistant,
            content,
            sources,
            created_at: Utc::now(),
        }
    }

    /// Reconstruct a message from persisted values, including its assigned seq.
    pub fn from_database(
        id: Uuid,
        session_id: Uuid,
        seq: i64,
        role: MessageRole,
        content: String,
        sources: Vec<SourceRef>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            seq,
            role,
            content,
            sources,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Zero until persisted; the store assigns the authoritative value.
    pub fn seq(&self) -> i64 {
        self.seq
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sources(&self) -> &[SourceRef] {
        &self.sources
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_has_no_sources() {
        let message = Message::user(Uuid::new_v4(), "what changed last quarter?".to_string());

        assert_eq!(message.role(), MessageRole::User);
        assert!(message.sources().is_empty());
        assert_eq!(message.seq(), 0);
    }

    #[test]
    fn test_assistant_message_carries_sources() {
        let source = SourceRef {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            document_title: "quarterly report".to_string(),
            score: 0.87,
        };
        let message = Message::assistant(
            Uuid::new_v4(),
            "Revenue grew by 12%.".to_string(),
            vec![source.clone()],
        );

        assert_eq!(message.role(), MessageRole::Assistant);
        assert_eq!(message.sources(), &[source]);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            assert_eq!(MessageRole::from_str(role.as_str()).unwrap(), role);
        }
        assert!(MessageRole::from_str("system").is_err());
    }
}
