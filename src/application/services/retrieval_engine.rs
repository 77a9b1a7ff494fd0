use std::sync::Arc;

use uuid::Uuid;

use crate::application::ports::ai_provider::EmbedRequest;
use crate::application::services::fallback_chain::ProviderFallbackChain;
use crate::domain::entities::Collection;
use crate::domain::repositories::ChunkRepository;

#[derive(Debug)]
pub enum RetrievalError {
    InvalidQuery(String),
    EmbeddingModelMismatch { expected: String, actual: String },
    DimensionMismatch { expected: i32, actual: usize },
    ProvidersExhausted(String),
    StoreError(String),
}

impl std::fmt::Display for RetrievalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalError::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
            RetrievalError::EmbeddingModelMismatch { expected, actual } => write!(
                f,
                "Embedding model mismatch: collection uses {}, query embedded with {}",
                expected, actual
            ),
            RetrievalError::DimensionMismatch { expected, actual } => write!(
                f,
                "Query vector dimension mismatch: expected {}, got {}",
                expected, actual
            ),
            RetrievalError::ProvidersExhausted(msg) => {
                write!(f, "Embedding providers exhausted: {}", msg)
            }
            RetrievalError::StoreError(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for RetrievalError {}

#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub document_title: String,
    pub text: String,
    pub ordinal: i32,
    pub score: f32,
}

/// Embeds a query through the fallback chain and ranks the collection's
/// chunks by cosine similarity. Results never cross collection boundaries;
/// the store query is scoped by collection id.
pub struct RetrievalEngine {
    fallback_chain: Arc<ProviderFallbackChain>,
    chunk_repository: Arc<dyn ChunkRepository>,
}

impl RetrievalEngine {
    pub fn new(
        fallback_chain: Arc<ProviderFallbackChain>,
        chunk_repository: Arc<dyn ChunkRepository>,
    ) -> Self {
        Self {
            fallback_chain,
            chunk_repository,
        }
    }

    pub async fn retrieve(
        &self,
        collection: &Collection,
        query_text: &str,
        top_k: i32,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if query_text.trim().is_empty() {
            return Err(RetrievalError::InvalidQuery(
                "Query cannot be empty".to_string(),
            ));
        }
        if top_k <= 0 {
            return Err(RetrievalError::InvalidQuery(format!(
                "top_k must be positive, got {}",
                top_k
            )));
        }

        let response = self
            .fallback_chain
            .embed(EmbedRequest {
                text: query_text.to_string(),
                model: collection.embedding_model().to_string(),
            })
            .await
            .map_err(|e| RetrievalError::ProvidersExhausted(e.to_string()))?;

        // The stored vectors were produced by the collection's configured
        // model; comparing against anything else is meaningless.
        if response.model_name != collection.embedding_model() {
            return Err(RetrievalError::EmbeddingModelMismatch {
                expected: collection.embedding_model().to_string(),
                actual: response.model_name,
            });
        }

        let dimension = response.vector.as_slice().len();
        if dimension != collection.embedding_dimension() as usize {
            return Err(RetrievalError::DimensionMismatch {
                expected: collection.embedding_dimension(),
                actual: dimension,
            });
        }

        let scored = self
            .chunk_repository
            .similarity_search(collection.id(), &response.vector, top_k)
            .await
            .map_err(|e| RetrievalError::StoreError(e.to_string()))?;

        Ok(scored
            .into_iter()
            .map(|s| RetrievedChunk {
                chunk_id: s.chunk.id(),
                document_id: s.chunk.document_id(),
                document_title: s.document_title,
                ordinal: s.chunk.ordinal(),
                text: s.chunk.text().to_string(),
                score: s.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use pgvector::Vector;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    use crate::application::ports::ai_provider::{
        AiProvider, AiProviderError, CompletionRequest, CompletionResponse, EmbedResponse,
        ProviderKind, ProviderProfile,
    };
    use crate::domain::entities::Chunk;
    use crate::domain::repositories::chunk_repository::{ChunkRepositoryError, ScoredChunk};

    struct StubEmbedder {
        served_model: Option<String>,
        dimension: usize,
    }

    #[async_trait]
    impl AiProvider for StubEmbedder {
        fn describe(&self) -> ProviderProfile {
            ProviderProfile {
                name: "stub".to_string(),
                kind: ProviderKind::Local,
                embedding_model: "nomic-embed-text".to_string(),
                embedding_dimension: self.dimension,
                max_context_length: 4096,
            }
        }

        async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, AiProviderError> {
            Ok(EmbedResponse {
                vector: Vector::from(vec![1.0; self.dimension]),
                model_name: self
                    .served_model
                    .clone()
                    .unwrap_or(request.model),
            })
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, AiProviderError> {
            Err(AiProviderError::InvalidInput("embed-only stub".to_string()))
        }

        async fn health_check(&self) -> Result<bool, AiProviderError> {
            Ok(true)
        }
    }

    /// Chunks bucketed by collection id; scores pre-assigned and returned
    /// sorted, mirroring the store contract.
    #[derive(Default)]
    struct ScopedChunks {
        by_collection: Mutex<HashMap<Uuid, Vec<(Chunk, f32)>>>,
    }

    impl ScopedChunks {
        async fn put(&self, collection_id: Uuid, chunk: Chunk, score: f32) {
            self.by_collection
                .lock()
                .await
                .entry(collection_id)
                .or_default()
                .push((chunk, score));
        }
    }

    #[async_trait]
    impl ChunkRepository for ScopedChunks {
        async fn replace_for_document(
            &self,
            _document_id: Uuid,
            _chunks: &[Chunk],
        ) -> Result<usize, ChunkRepositoryError> {
            unimplemented!("not used by retrieval tests")
        }

        async fn delete_by_document(
            &self,
            _document_id: Uuid,
        ) -> Result<usize, ChunkRepositoryError> {
            unimplemented!("not used by retrieval tests")
        }

        async fn count_by_document(
            &self,
            _document_id: Uuid,
        ) -> Result<i64, ChunkRepositoryError> {
            unimplemented!("not used by retrieval tests")
        }

        async fn similarity_search(
            &self,
            collection_id: Uuid,
            _query_vector: &Vector,
            limit: i32,
        ) -> Result<Vec<ScoredChunk>, ChunkRepositoryError> {
            let map = self.by_collection.lock().await;
            let mut rows: Vec<ScoredChunk> = map
                .get(&collection_id)
                .map(|chunks| {
                    chunks
                        .iter()
                        .map(|(chunk, score)| ScoredChunk {
                            chunk: chunk.clone(),
                            document_title: "doc".to_string(),
                            document_created_at: Utc::now(),
                            score: *score,
                        })
                        .collect()
                })
                .unwrap_or_default();
            rows.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            rows.truncate(limit as usize);
            Ok(rows)
        }
    }

    fn collection() -> Collection {
        Collection::new(
            "user-1".to_string(),
            "notes".to_string(),
            None,
            "nomic-embed-text".to_string(),
            3,
            500,
            50,
            5,
        )
        .unwrap()
    }

    fn chunk(document_id: Uuid, ordinal: i32) -> Chunk {
        Chunk::new(
            document_id,
            ordinal,
            format!("chunk {}", ordinal),
            Vector::from(vec![0.1, 0.2, 0.3]),
            "nomic-embed-text".to_string(),
        )
    }

    fn engine(
        store: Arc<ScopedChunks>,
        served_model: Option<String>,
        dimension: usize,
    ) -> RetrievalEngine {
        let chain = Arc::new(
            ProviderFallbackChain::new(vec![Arc::new(StubEmbedder {
                served_model,
                dimension,
            })])
            .unwrap(),
        );
        RetrievalEngine::new(chain, store)
    }

    #[tokio::test]
    async fn test_empty_collection_returns_empty_not_error() {
        let store = Arc::new(ScopedChunks::default());
        let engine = engine(store, None, 3);

        let results = engine
            .retrieve(&collection(), "anything", 5)
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_results_scoped_to_collection() {
        let coll = collection();
        let other = collection();
        let store = Arc::new(ScopedChunks::default());
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();
        store.put(coll.id(), chunk(doc_a, 0), 0.9).await;
        store.put(other.id(), chunk(doc_b, 0), 0.95).await;
        let engine = engine(store, None, 3);

        let results = engine.retrieve(&coll, "query", 5).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, doc_a);
    }

    #[tokio::test]
    async fn test_results_sorted_descending_and_bounded() {
        let coll = collection();
        let store = Arc::new(ScopedChunks::default());
        let doc = Uuid::new_v4();
        for (i, score) in [0.3_f32, 0.9, 0.5, 0.7, 0.1].iter().enumerate() {
            store.put(coll.id(), chunk(doc, i as i32), *score).await;
        }
        let engine = engine(store, None, 3);

        let results = engine.retrieve(&coll, "query", 3).await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].score, 0.9);
    }

    #[tokio::test]
    async fn test_model_mismatch_is_rejected() {
        let store = Arc::new(ScopedChunks::default());
        let engine = engine(store, Some("text-embedding-3-small".to_string()), 3);

        let error = engine
            .retrieve(&collection(), "query", 5)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            RetrievalError::EmbeddingModelMismatch { .. }
        ));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let store = Arc::new(ScopedChunks::default());
        let engine = engine(store, None, 5);

        let error = engine
            .retrieve(&collection(), "query", 5)
            .await
            .unwrap_err();

        assert!(matches!(error, RetrievalError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_rejects_empty_query_and_bad_top_k() {
        let store = Arc::new(ScopedChunks::default());
        let engine = engine(store, None, 3);

        assert!(engine.retrieve(&collection(), "  ", 5).await.is_err());
        assert!(engine.retrieve(&collection(), "query", 0).await.is_err());
    }
}
