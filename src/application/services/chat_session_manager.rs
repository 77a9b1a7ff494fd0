use std::sync::Arc;

use uuid::Uuid;

use crate::application::ports::ai_provider::CompletionRequest;
use crate::application::services::fallback_chain::{FallbackChainError, ProviderFallbackChain};
use crate::application::services::retrieval_engine::{
    RetrievalEngine, RetrievalError, RetrievedChunk,
};
use crate::domain::entities::{Message, SourceRef};
use crate::domain::repositories::{CollectionRepository, MessageRepository, SessionRepository};

#[derive(Debug)]
pub enum ChatError {
    SessionNotFound(Uuid),
    CollectionNotFound(Uuid),
    InvalidMessage(String),
    RetrievalFailed(String),
    /// The chain ran out of providers; the user message is already durable,
    /// so a retry needs no resubmission.
    GenerationFailed(String),
    RepositoryError(String),
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            ChatError::CollectionNotFound(id) => write!(f, "Collection not found: {}", id),
            ChatError::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            ChatError::RetrievalFailed(msg) => write!(f, "Retrieval failed: {}", msg),
            ChatError::GenerationFailed(msg) => write!(f, "Generation failed: {}", msg),
            ChatError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ChatError {}

#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub user_message: Message,
    pub assistant_message: Message,
}

const SYSTEM_INSTRUCTIONS: &str = "You are a document assistant. Answer using the provided \
context passages. When the context does not cover the question, say so instead of guessing. \
Cite passages by their bracketed number.";

/// Rough budget arithmetic: ~4 characters per token.
const CHARS_PER_TOKEN: usize = 4;

/// How many trailing messages are even considered before token fitting.
const HISTORY_FETCH_LIMIT: i64 = 100;

/// Drives one conversation turn: persist the user message, retrieve context,
/// compose a bounded prompt, generate, persist the assistant reply with its
/// sources. The user message is written before any provider work so a crash
/// mid-generation never loses input.
pub struct ChatSessionManager {
    retrieval_engine: Arc<RetrievalEngine>,
    fallback_chain: Arc<ProviderFallbackChain>,
    collection_repository: Arc<dyn CollectionRepository>,
    session_repository: Arc<dyn SessionRepository>,
    message_repository: Arc<dyn MessageRepository>,
}

impl ChatSessionManager {
    pub fn new(
        retrieval_engine: Arc<RetrievalEngine>,
        fallback_chain: Arc<ProviderFallbackChain>,
        collection_repository: Arc<dyn CollectionRepository>,
        session_repository: Arc<dyn SessionRepository>,
        message_repository: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            retrieval_engine,
            fallback_chain,
            collection_repository,
            session_repository,
            message_repository,
        }
    }

    pub async fn chat(&self, session_id: Uuid, user_text: String) -> Result<ChatTurn, ChatError> {
        if user_text.trim().is_empty() {
            return Err(ChatError::InvalidMessage(
                "Message cannot be empty".to_string(),
            ));
        }

        let session = self
            .session_repository
            .find_by_id(session_id)
            .await
            .map_err(|e| ChatError::RepositoryError(e.to_string()))?
            .ok_or(ChatError::SessionNotFound(session_id))?;

        let collection = self
            .collection_repository
            .find_by_id(session.collection_id())
            .await
            .map_err(|e| ChatError::RepositoryError(e.to_string()))?
            .ok_or_else(|| ChatError::CollectionNotFound(session.collection_id()))?;

        // Durability precedes generation.
        let user_message = self
            .message_repository
            .append(&Message::user(session_id, user_text.clone()))
            .await
            .map_err(|e| ChatError::RepositoryError(e.to_string()))?;

        tracing::debug!("Session {}: retrieving context", session_id);
        let retrieved = self
            .retrieval_engine
            .retrieve(&collection, &user_text, session.max_retrieval_count())
            .await
            .map_err(|error| match error {
                RetrievalError::ProvidersExhausted(msg) => ChatError::GenerationFailed(msg),
                other => ChatError::RetrievalFailed(other.to_string()),
            })?;

        let history = self
            .message_repository
            .find_recent_by_session(session_id, HISTORY_FETCH_LIMIT)
            .await
            .map_err(|e| ChatError::RepositoryError(e.to_string()))?;
        let prior: Vec<Message> = history
            .into_iter()
            .filter(|m| m.id() != user_message.id())
            .collect();

        tracing::debug!("Session {}: composing prompt", session_id);
        let prompt = compose_prompt(
            session.context_window() as usize,
            &prior,
            &retrieved,
            &user_text,
        );

        tracing::debug!("Session {}: generating", session_id);
        let completion = self
            .fallback_chain
            .complete(CompletionRequest {
                prompt,
                model: session.model().to_string(),
                temperature: session.temperature(),
                max_tokens: None,
            })
            .await
            .map_err(|error| match error {
                FallbackChainError::AllProvidersUnavailable(_) => {
                    ChatError::GenerationFailed(error.to_string())
                }
                other => ChatError::GenerationFailed(other.to_string()),
            })?;

        let sources: Vec<SourceRef> = retrieved
            .iter()
            .map(|r| SourceRef {
                chunk_id: r.chunk_id,
                document_id: r.document_id,
                document_title: r.document_title.clone(),
                score: r.score,
            })
            .collect();

        let assistant_message = self
            .message_repository
            .append(&Message::assistant(session_id, completion.text, sources))
            .await
            .map_err(|e| ChatError::RepositoryError(e.to_string()))?;

        tracing::info!(
            "Session {}: turn persisted (user seq {}, assistant seq {})",
            session_id,
            user_message.seq(),
            assistant_message.seq()
        );

        Ok(ChatTurn {
            user_message,
            assistant_message,
        })
    }

    pub async fn history(&self, session_id: Uuid) -> Result<Vec<Message>, ChatError> {
        self.session_repository
            .find_by_id(session_id)
            .await
            .map_err(|e| ChatError::RepositoryError(e.to_string()))?
            .ok_or(ChatError::SessionNotFound(session_id))?;

        self.message_repository
            .find_by_session(session_id)
            .await
            .map_err(|e| ChatError::RepositoryError(e.to_string()))
    }
}

fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// System instructions and the current turn are non-negotiable; retrieved
/// context comes next; whatever budget is left goes to history, oldest
/// dropped first.
fn compose_prompt(
    context_window: usize,
    history: &[Message],
    retrieved: &[RetrievedChunk],
    user_text: &str,
) -> String {
    let context_block = format_context(retrieved);

    let fixed_tokens = estimate_tokens(SYSTEM_INSTRUCTIONS)
        + estimate_tokens(&context_block)
        + estimate_tokens(user_text);
    let history_budget = context_window.saturating_sub(fixed_tokens);

    let kept = fit_history(history, history_budget);

    let mut prompt = String::new();
    prompt.push_str(SYSTEM_INSTRUCTIONS);
    prompt.push_str("\n\n");
    if !context_block.is_empty() {
        prompt.push_str(&context_block);
        prompt.push('\n');
    }
    prompt.push_str("Conversation:\n");
    for message in kept {
        prompt.push_str(&format!("{}: {}\n", message.role(), message.content()));
    }
    prompt.push_str(&format!("user: {}\n", user_text));
    prompt.push_str("assistant:");
    prompt
}

fn format_context(retrieved: &[RetrievedChunk]) -> String {
    if retrieved.is_empty() {
        return String::new();
    }

    let mut block = String::from("Context passages:\n");
    for (i, chunk) in retrieved.iter().enumerate() {
        block.push_str(&format!(
            "[{}] ({}) {}\n",
            i + 1,
            chunk.document_title,
            chunk.text
        ));
    }
    block
}

/// Keeps the longest suffix of history that fits the token budget.
fn fit_history(history: &[Message], budget_tokens: usize) -> &[Message] {
    let mut used = 0;
    let mut start = history.len();

    for (i, message) in history.iter().enumerate().rev() {
        let cost = estimate_tokens(message.content()) + estimate_tokens(message.role().as_str()) + 1;
        if used + cost > budget_tokens {
            break;
        }
        used += cost;
        start = i;
    }

    &history[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pgvector::Vector;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tokio::sync::Mutex;

    use crate::application::ports::ai_provider::{
        AiProvider, AiProviderError, CompletionResponse, EmbedRequest, EmbedResponse,
        ProviderKind, ProviderProfile,
    };
    use crate::domain::entities::{Chunk, Collection, MessageRole, Session};
    use crate::domain::repositories::chunk_repository::{
        ChunkRepository, ChunkRepositoryError, ScoredChunk,
    };
    use crate::domain::repositories::collection_repository::CollectionRepositoryError;
    use crate::domain::repositories::message_repository::MessageRepositoryError;
    use crate::domain::repositories::session_repository::SessionRepositoryError;

    struct StubProvider {
        complete_fails: bool,
    }

    #[async_trait]
    impl AiProvider for StubProvider {
        fn describe(&self) -> ProviderProfile {
            ProviderProfile {
                name: "stub".to_string(),
                kind: ProviderKind::Local,
                embedding_model: "nomic-embed-text".to_string(),
                embedding_dimension: 3,
                max_context_length: 4096,
            }
        }

        async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, AiProviderError> {
            Ok(EmbedResponse {
                vector: Vector::from(vec![0.1, 0.2, 0.3]),
                model_name: request.model,
            })
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, AiProviderError> {
            if self.complete_fails {
                return Err(AiProviderError::ServiceUnavailable);
            }
            Ok(CompletionResponse {
                text: "Here is the answer.".to_string(),
                model_name: request.model,
            })
        }

        async fn health_check(&self) -> Result<bool, AiProviderError> {
            Ok(true)
        }
    }

    struct OneCollection {
        collection: Collection,
    }

    #[async_trait]
    impl CollectionRepository for OneCollection {
        async fn save(&self, _c: &Collection) -> Result<(), CollectionRepositoryError> {
            Ok(())
        }

        async fn find_by_id(
            &self,
            id: Uuid,
        ) -> Result<Option<Collection>, CollectionRepositoryError> {
            Ok((self.collection.id() == id).then(|| self.collection.clone()))
        }

        async fn find_by_owner(
            &self,
            _owner_id: &str,
        ) -> Result<Vec<Collection>, CollectionRepositoryError> {
            Ok(vec![self.collection.clone()])
        }

        async fn soft_delete(&self, _id: Uuid) -> Result<bool, CollectionRepositoryError> {
            Ok(false)
        }
    }

    struct OneSession {
        session: Session,
    }

    #[async_trait]
    impl SessionRepository for OneSession {
        async fn save(&self, _s: &Session) -> Result<(), SessionRepositoryError> {
            Ok(())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, SessionRepositoryError> {
            Ok((self.session.id() == id).then(|| self.session.clone()))
        }

        async fn find_by_collection(
            &self,
            _collection_id: Uuid,
        ) -> Result<Vec<Session>, SessionRepositoryError> {
            Ok(vec![self.session.clone()])
        }
    }

    #[derive(Default)]
    struct InMemoryMessages {
        messages: Mutex<Vec<Message>>,
        next_seq: AtomicI64,
    }

    #[async_trait]
    impl MessageRepository for InMemoryMessages {
        async fn append(&self, message: &Message) -> Result<Message, MessageRepositoryError> {
            let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
            let persisted = Message::from_database(
                message.id(),
                message.session_id(),
                seq,
                message.role(),
                message.content().to_string(),
                message.sources().to_vec(),
                message.created_at(),
            );
            self.messages.lock().await.push(persisted.clone());
            Ok(persisted)
        }

        async fn find_by_session(
            &self,
            session_id: Uuid,
        ) -> Result<Vec<Message>, MessageRepositoryError> {
            let mut messages: Vec<Message> = self
                .messages
                .lock()
                .await
                .iter()
                .filter(|m| m.session_id() == session_id)
                .cloned()
                .collect();
            messages.sort_by_key(|m| m.seq());
            Ok(messages)
        }

        async fn find_recent_by_session(
            &self,
            session_id: Uuid,
            limit: i64,
        ) -> Result<Vec<Message>, MessageRepositoryError> {
            let mut messages = self.find_by_session(session_id).await?;
            let overflow = messages.len().saturating_sub(limit as usize);
            messages.drain(..overflow);
            Ok(messages)
        }
    }

    #[derive(Default)]
    struct EmptyChunks;

    #[async_trait]
    impl ChunkRepository for EmptyChunks {
        async fn replace_for_document(
            &self,
            _document_id: Uuid,
            chunks: &[Chunk],
        ) -> Result<usize, ChunkRepositoryError> {
            Ok(chunks.len())
        }

        async fn delete_by_document(
            &self,
            _document_id: Uuid,
        ) -> Result<usize, ChunkRepositoryError> {
            Ok(0)
        }

        async fn count_by_document(
            &self,
            _document_id: Uuid,
        ) -> Result<i64, ChunkRepositoryError> {
            Ok(0)
        }

        async fn similarity_search(
            &self,
            _collection_id: Uuid,
            _query_vector: &Vector,
            _limit: i32,
        ) -> Result<Vec<ScoredChunk>, ChunkRepositoryError> {
            Ok(Vec::new())
        }
    }

    fn manager(complete_fails: bool) -> (ChatSessionManager, Uuid, Arc<InMemoryMessages>) {
        let collection = Collection::new(
            "user-1".to_string(),
            "notes".to_string(),
            None,
            "nomic-embed-text".to_string(),
            3,
            500,
            50,
            5,
        )
        .unwrap();
        let session = Session::new(
            collection.id(),
            "chat".to_string(),
            "llama3".to_string(),
            2000,
            0.7,
            5,
        )
        .unwrap();
        let session_id = session.id();

        let chain = Arc::new(
            ProviderFallbackChain::new(vec![Arc::new(StubProvider { complete_fails })]).unwrap(),
        );
        let retrieval = Arc::new(RetrievalEngine::new(
            chain.clone(),
            Arc::new(EmptyChunks),
        ));
        let messages = Arc::new(InMemoryMessages::default());

        let manager = ChatSessionManager::new(
            retrieval,
            chain,
            Arc::new(OneCollection { collection }),
            Arc::new(OneSession { session }),
            messages.clone(),
        );

        (manager, session_id, messages)
    }

    #[tokio::test]
    async fn test_turn_persists_user_then_assistant() {
        let (manager, session_id, messages) = manager(false);

        let turn = manager
            .chat(session_id, "what do the notes say?".to_string())
            .await
            .unwrap();

        assert_eq!(turn.user_message.role(), MessageRole::User);
        assert_eq!(turn.assistant_message.role(), MessageRole::Assistant);
        assert!(turn.user_message.seq() < turn.assistant_message.seq());

        let stored = messages.find_by_session(session_id).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_user_message() {
        let (manager, session_id, messages) = manager(true);

        let error = manager
            .chat(session_id, "will this survive?".to_string())
            .await
            .unwrap_err();

        assert!(matches!(error, ChatError::GenerationFailed(_)));

        let stored = messages.find_by_session(session_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].role(), MessageRole::User);
        assert_eq!(stored[0].content(), "will this survive?");
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let (manager, _session_id, _messages) = manager(false);

        let error = manager
            .chat(Uuid::new_v4(), "hello".to_string())
            .await
            .unwrap_err();

        assert!(matches!(error, ChatError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_before_persisting() {
        let (manager, session_id, messages) = manager(false);

        let error = manager.chat(session_id, "   ".to_string()).await.unwrap_err();

        assert!(matches!(error, ChatError::InvalidMessage(_)));
        assert!(messages.find_by_session(session_id).await.unwrap().is_empty());
    }

    #[test]
    fn test_fit_history_drops_oldest_first() {
        let session_id = Uuid::new_v4();
        // 50 exchanges of 100 chars each: far more than a 2000-token window
        // leaves room for
        let history: Vec<Message> = (0..100)
            .map(|i| {
                let content = format!("{:0>100}", i);
                if i % 2 == 0 {
                    Message::user(session_id, content)
                } else {
                    Message::assistant(session_id, content, Vec::new())
                }
            })
            .collect();

        let kept = fit_history(&history, 500);

        assert!(!kept.is_empty());
        assert!(kept.len() < history.len());
        // Kept messages are exactly the most recent suffix
        assert_eq!(
            kept.iter().map(|m| m.content()).collect::<Vec<_>>(),
            history[history.len() - kept.len()..]
                .iter()
                .map(|m| m.content())
                .collect::<Vec<_>>()
        );

        let used: usize = kept
            .iter()
            .map(|m| estimate_tokens(m.content()) + estimate_tokens(m.role().as_str()) + 1)
            .sum();
        assert!(used <= 500);
    }

    #[test]
    fn test_compose_prompt_contains_context_and_turn() {
        let retrieved = vec![RetrievedChunk {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            document_title: "report".to_string(),
            text: "Revenue grew by 12%.".to_string(),
            ordinal: 0,
            score: 0.9,
        }];

        let prompt = compose_prompt(2000, &[], &retrieved, "how did revenue do?");

        assert!(prompt.contains("[1] (report) Revenue grew by 12%."));
        assert!(prompt.contains("user: how did revenue do?"));
        assert!(prompt.ends_with("assistant:"));
    }
}
