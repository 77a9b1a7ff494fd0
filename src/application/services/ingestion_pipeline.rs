use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use uuid::Uuid;

use crate::application::ports::ai_provider::EmbedRequest;
use crate::application::services::chunker::{ChunkSpan, Chunker, ChunkerError};
use crate::application::services::fallback_chain::{FallbackChainError, ProviderFallbackChain};
use crate::domain::entities::{Chunk, Collection, Document};
use crate::domain::repositories::{ChunkRepository, DocumentRepository};

#[derive(Debug)]
pub enum IngestionError {
    InvalidConfiguration(String),
    DocumentNotFound(Uuid),
    InvalidState(String),
    ProvidersExhausted(String),
    DimensionMismatch { expected: i32, actual: usize },
    ModelMismatch { expected: String, actual: String },
    RepositoryError(String),
    Cancelled,
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            IngestionError::DocumentNotFound(id) => write!(f, "Document not found: {}", id),
            IngestionError::InvalidState(msg) => write!(f, "Invalid document state: {}", msg),
            IngestionError::ProvidersExhausted(msg) => {
                write!(f, "Embedding providers exhausted: {}", msg)
            }
            IngestionError::DimensionMismatch { expected, actual } => write!(
                f,
                "Embedding dimension mismatch: expected {}, got {}",
                expected, actual
            ),
            IngestionError::ModelMismatch { expected, actual } => write!(
                f,
                "Embedding model mismatch: collection uses {}, provider served {}",
                expected, actual
            ),
            IngestionError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            IngestionError::Cancelled => write!(f, "Ingestion cancelled"),
        }
    }
}

impl std::error::Error for IngestionError {}

impl From<ChunkerError> for IngestionError {
    fn from(error: ChunkerError) -> Self {
        match error {
            ChunkerError::InvalidConfiguration(msg) => IngestionError::InvalidConfiguration(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionOutcome {
    pub chunk_count: usize,
    pub embedded_count: usize,
}

/// Turns a document's raw text into embedded, searchable chunks.
///
/// The walk is chunking -> embedding -> completed, with every failure landing
/// the document in `failed` carrying a queryable reason. Embedded chunks are
/// staged in memory and written in a single transactional batch, so the store
/// ends up with either every chunk of a run or none of them.
pub struct DocumentIngestionPipeline {
    chunker: Chunker,
    fallback_chain: Arc<ProviderFallbackChain>,
    document_repository: Arc<dyn DocumentRepository>,
    chunk_repository: Arc<dyn ChunkRepository>,
    embed_concurrency: usize,
}

impl DocumentIngestionPipeline {
    pub fn new(
        fallback_chain: Arc<ProviderFallbackChain>,
        document_repository: Arc<dyn DocumentRepository>,
        chunk_repository: Arc<dyn ChunkRepository>,
    ) -> Self {
        Self {
            chunker: Chunker::default(),
            fallback_chain,
            document_repository,
            chunk_repository,
            embed_concurrency: 4,
        }
    }

    /// Bounds parallel embed calls within one document; provider rate limits
    /// are the constraint, not CPU.
    pub fn with_embed_concurrency(mut self, embed_concurrency: usize) -> Self {
        self.embed_concurrency = embed_concurrency.max(1);
        self
    }

    pub async fn ingest(
        &self,
        document_id: Uuid,
        collection: &Collection,
        cancel: watch::Receiver<bool>,
    ) -> Result<IngestionOutcome, IngestionError> {
        // Configuration problems are rejected before the document is touched.
        Chunker::validate(
            collection.chunk_size() as usize,
            collection.chunk_overlap() as usize,
        )?;

        let mut document = self
            .document_repository
            .find_by_id(document_id)
            .await
            .map_err(|e| IngestionError::RepositoryError(e.to_string()))?
            .ok_or(IngestionError::DocumentNotFound(document_id))?;

        if !document.processing_status().is_pending() {
            return Err(IngestionError::InvalidState(format!(
                "Document {} is {}, expected pending",
                document_id,
                document.processing_status()
            )));
        }

        document
            .begin_chunking()
            .map_err(IngestionError::InvalidState)?;
        self.update_document(&document).await?;

        let spans = match self.chunker.chunk(
            document.source_text(),
            collection.chunk_size() as usize,
            collection.chunk_overlap() as usize,
        ) {
            Ok(spans) => spans,
            Err(error) => {
                self.fail_document(&mut document, error.to_string()).await;
                return Err(error.into());
            }
        };

        document
            .begin_embedding()
            .map_err(IngestionError::InvalidState)?;
        self.update_document(&document).await?;

        let staged = match self.embed_spans(document_id, spans, collection, cancel).await {
            Ok(staged) => staged,
            Err(error) => {
                self.fail_document(&mut document, failure_reason(&error))
                    .await;
                return Err(error);
            }
        };

        let chunk_count = staged.len();

        // Replaces any chunks from a previous run in the same transaction, so
        // ordinals stay unique across reprocessing.
        if let Err(error) = self
            .chunk_repository
            .replace_for_document(document_id, &staged)
            .await
        {
            self.fail_document(&mut document, error.to_string()).await;
            return Err(IngestionError::RepositoryError(error.to_string()));
        }

        document
            .complete(chunk_count as i32)
            .map_err(IngestionError::InvalidState)?;
        self.update_document(&document).await?;

        tracing::info!(
            "Ingested document {}: {} chunks embedded",
            document_id,
            chunk_count
        );

        Ok(IngestionOutcome {
            chunk_count,
            embedded_count: chunk_count,
        })
    }

    /// Embeds every span with bounded concurrency. Ordinals were fixed by the
    /// chunker before dispatch, so completion order is irrelevant.
    async fn embed_spans(
        &self,
        document_id: Uuid,
        spans: Vec<ChunkSpan>,
        collection: &Collection,
        cancel: watch::Receiver<bool>,
    ) -> Result<Vec<Chunk>, IngestionError> {
        let document_model = collection.embedding_model().to_string();
        let expected_dimension = collection.embedding_dimension();

        let mut embedded = futures::stream::iter(spans.into_iter().map(|span| {
            let chain = self.fallback_chain.clone();
            let model = document_model.clone();
            async move {
                let response = chain
                    .embed(EmbedRequest {
                        text: span.text.clone(),
                        model,
                    })
                    .await?;
                Ok::<_, FallbackChainError>((span, response))
            }
        }))
        .buffered(self.embed_concurrency);

        let mut staged = Vec::new();

        while let Some(result) = embedded.next().await {
            if *cancel.borrow() {
                return Err(IngestionError::Cancelled);
            }

            let (span, response) = result
                .map_err(|error| IngestionError::ProvidersExhausted(error.to_string()))?;

            if response.model_name != document_model {
                return Err(IngestionError::ModelMismatch {
                    expected: document_model.clone(),
                    actual: response.model_name,
                });
            }

            let actual_dimension = response.vector.as_slice().len();
            if actual_dimension != expected_dimension as usize {
                return Err(IngestionError::DimensionMismatch {
                    expected: expected_dimension,
                    actual: actual_dimension,
                });
            }

            staged.push(Chunk::new(
                document_id,
                span.ordinal,
                span.text,
                response.vector,
                document_model.clone(),
            ));
        }

        Ok(staged)
    }

    async fn update_document(&self, document: &Document) -> Result<(), IngestionError> {
        self.document_repository
            .update(document)
            .await
            .map_err(|e| IngestionError::RepositoryError(e.to_string()))
    }

    async fn fail_document(&self, document: &mut Document, reason: String) {
        if let Err(error) = document.fail(reason) {
            tracing::error!("Could not mark document failed: {}", error);
            return;
        }
        if let Err(error) = self.document_repository.update(document).await {
            tracing::error!("Could not persist failed document status: {}", error);
        }
    }
}

fn failure_reason(error: &IngestionError) -> String {
    match error {
        IngestionError::Cancelled => "Cancelled".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pgvector::Vector;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    use crate::application::ports::ai_provider::{
        AiProvider, AiProviderError, CompletionRequest, CompletionResponse, EmbedResponse,
        ProviderKind, ProviderProfile,
    };
    use crate::domain::repositories::chunk_repository::{ChunkRepositoryError, ScoredChunk};
    use crate::domain::repositories::document_repository::DocumentRepositoryError;

    struct InMemoryDocuments {
        documents: Mutex<HashMap<Uuid, Document>>,
    }

    impl InMemoryDocuments {
        fn with(document: Document) -> Arc<Self> {
            let mut map = HashMap::new();
            map.insert(document.id(), document);
            Arc::new(Self {
                documents: Mutex::new(map),
            })
        }

        async fn get(&self, id: Uuid) -> Document {
            self.documents.lock().await.get(&id).cloned().unwrap()
        }
    }

    #[async_trait]
    impl DocumentRepository for InMemoryDocuments {
        async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
            self.documents
                .lock()
                .await
                .insert(document.id(), document.clone());
            Ok(())
        }

        async fn update(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
            self.save(document).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
            Ok(self.documents.lock().await.get(&id).cloned())
        }

        async fn find_by_collection(
            &self,
            collection_id: Uuid,
        ) -> Result<Vec<Document>, DocumentRepositoryError> {
            Ok(self
                .documents
                .lock()
                .await
                .values()
                .filter(|d| d.collection_id() == collection_id)
                .cloned()
                .collect())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
            Ok(self.documents.lock().await.remove(&id).is_some())
        }
    }

    #[derive(Default)]
    struct InMemoryChunks {
        chunks: Mutex<HashMap<Uuid, Vec<Chunk>>>,
    }

    impl InMemoryChunks {
        async fn stored(&self, document_id: Uuid) -> Vec<Chunk> {
            self.chunks
                .lock()
                .await
                .get(&document_id)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ChunkRepository for InMemoryChunks {
        async fn replace_for_document(
            &self,
            document_id: Uuid,
            chunks: &[Chunk],
        ) -> Result<usize, ChunkRepositoryError> {
            self.chunks
                .lock()
                .await
                .insert(document_id, chunks.to_vec());
            Ok(chunks.len())
        }

        async fn delete_by_document(
            &self,
            document_id: Uuid,
        ) -> Result<usize, ChunkRepositoryError> {
            Ok(self
                .chunks
                .lock()
                .await
                .remove(&document_id)
                .map(|c| c.len())
                .unwrap_or(0))
        }

        async fn count_by_document(&self, document_id: Uuid) -> Result<i64, ChunkRepositoryError> {
            Ok(self.stored(document_id).await.len() as i64)
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

    struct StubEmbedder {
        dimension: usize,
        fail: bool,
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
            if self.fail {
                return Err(AiProviderError::ServiceUnavailable);
            }
            Ok(EmbedResponse {
                vector: Vector::from(vec![0.5; self.dimension]),
                model_name: request.model,
            })
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, AiProviderError> {
            Err(AiProviderError::InvalidInput("embed-only stub".to_string()))
        }

        async fn health_check(&self) -> Result<bool, AiProviderError> {
            Ok(!self.fail)
        }
    }

    fn collection(dimension: i32) -> Collection {
        Collection::new(
            "user-1".to_string(),
            "notes".to_string(),
            None,
            "nomic-embed-text".to_string(),
            dimension,
            60,
            10,
            5,
        )
        .unwrap()
    }

    fn pipeline_with(
        dimension: usize,
        fail: bool,
        documents: Arc<InMemoryDocuments>,
        chunks: Arc<InMemoryChunks>,
    ) -> DocumentIngestionPipeline {
        let chain = Arc::new(
            ProviderFallbackChain::new(vec![Arc::new(StubEmbedder { dimension, fail })]).unwrap(),
        );
        DocumentIngestionPipeline::new(chain, documents, chunks)
    }

    fn no_cancel() -> watch::Receiver<bool> {
        // A dropped sender leaves the last value readable, which is all the
        // pipeline's borrow() checks need.
        let (_tx, rx) = watch::channel(false);
        rx
    }

    #[tokio::test]
    async fn test_successful_ingest_completes_document() {
        let coll = collection(3);
        let document = Document::new(
            coll.id(),
            "report".to_string(),
            "First sentence here. Second sentence follows. Third one closes the text."
                .to_string(),
            "text/plain".to_string(),
        )
        .unwrap();
        let document_id = document.id();
        let documents = InMemoryDocuments::with(document);
        let chunks = Arc::new(InMemoryChunks::default());
        let pipeline = pipeline_with(3, false, documents.clone(), chunks.clone());

        let outcome = pipeline.ingest(document_id, &coll, no_cancel()).await.unwrap();

        assert!(outcome.chunk_count > 0);
        assert_eq!(outcome.chunk_count, outcome.embedded_count);

        let stored = chunks.stored(document_id).await;
        let updated = documents.get(document_id).await;
        assert_eq!(stored.len(), updated.chunk_count() as usize);
        assert!(updated.processing_status().is_completed());
        for (i, chunk) in stored.iter().enumerate() {
            assert_eq!(chunk.ordinal(), i as i32);
        }
    }

    #[tokio::test]
    async fn test_provider_exhaustion_fails_without_partial_writes() {
        let coll = collection(3);
        let document = Document::new(
            coll.id(),
            "report".to_string(),
            "Some text long enough to produce at least one chunk of content.".to_string(),
            "text/plain".to_string(),
        )
        .unwrap();
        let document_id = document.id();
        let documents = InMemoryDocuments::with(document);
        let chunks = Arc::new(InMemoryChunks::default());
        let pipeline = pipeline_with(3, true, documents.clone(), chunks.clone());

        let error = pipeline
            .ingest(document_id, &coll, no_cancel())
            .await
            .unwrap_err();

        assert!(matches!(error, IngestionError::ProvidersExhausted(_)));
        assert!(chunks.stored(document_id).await.is_empty());
        let updated = documents.get(document_id).await;
        assert!(updated.processing_status().is_failed());
        assert_eq!(updated.chunk_count(), 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_a_hard_failure() {
        // Collection expects 4-dimensional vectors, provider returns 3
        let coll = collection(4);
        let document = Document::new(
            coll.id(),
            "report".to_string(),
            "Some text long enough to produce at least one chunk of content.".to_string(),
            "text/plain".to_string(),
        )
        .unwrap();
        let document_id = document.id();
        let documents = InMemoryDocuments::with(document);
        let chunks = Arc::new(InMemoryChunks::default());
        let pipeline = pipeline_with(3, false, documents.clone(), chunks.clone());

        let error = pipeline
            .ingest(document_id, &coll, no_cancel())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            IngestionError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
        assert!(chunks.stored(document_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_completes_with_zero_chunks() {
        let coll = collection(3);
        let document = Document::new(
            coll.id(),
            "blank".to_string(),
            "   ".to_string(),
            "text/plain".to_string(),
        )
        .unwrap();
        let document_id = document.id();
        let documents = InMemoryDocuments::with(document);
        let chunks = Arc::new(InMemoryChunks::default());
        let pipeline = pipeline_with(3, false, documents.clone(), chunks.clone());

        let outcome = pipeline.ingest(document_id, &coll, no_cancel()).await.unwrap();

        assert_eq!(outcome.chunk_count, 0);
        let updated = documents.get(document_id).await;
        assert!(updated.processing_status().is_completed());
    }

    #[tokio::test]
    async fn test_cancellation_lands_in_failed_with_reason() {
        let coll = collection(3);
        let document = Document::new(
            coll.id(),
            "report".to_string(),
            "Some text long enough to produce at least one chunk of content.".to_string(),
            "text/plain".to_string(),
        )
        .unwrap();
        let document_id = document.id();
        let documents = InMemoryDocuments::with(document);
        let chunks = Arc::new(InMemoryChunks::default());
        let pipeline = pipeline_with(3, false, documents.clone(), chunks.clone());

        let (tx, rx) = watch::channel(true);
        drop(tx);

        let error = pipeline.ingest(document_id, &coll, rx).await.unwrap_err();

        assert!(matches!(error, IngestionError::Cancelled));
        let updated = documents.get(document_id).await;
        assert!(updated.processing_status().is_failed());
        assert_eq!(
            updated.processing_status().failure_reason(),
            Some("Cancelled")
        );
        assert!(chunks.stored(document_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_reprocessing_replaces_chunks() {
        let coll = collection(3);
        let document = Document::new(
            coll.id(),
            "report".to_string(),
            "First sentence here. Second sentence follows. Third one closes the text."
                .to_string(),
            "text/plain".to_string(),
        )
        .unwrap();
        let document_id = document.id();
        let documents = InMemoryDocuments::with(document);
        let chunks = Arc::new(InMemoryChunks::default());
        let pipeline = pipeline_with(3, false, documents.clone(), chunks.clone());

        pipeline.ingest(document_id, &coll, no_cancel()).await.unwrap();
        let first_count = chunks.stored(document_id).await.len();
        assert!(first_count > 0);

        let mut updated = documents.get(document_id).await;
        updated.reset_for_reprocessing().unwrap();
        documents.update(&updated).await.unwrap();

        let outcome = pipeline.ingest(document_id, &coll, no_cancel()).await.unwrap();

        // Replaced, not accumulated
        assert_eq!(chunks.stored(document_id).await.len(), outcome.chunk_count);
    }
}
