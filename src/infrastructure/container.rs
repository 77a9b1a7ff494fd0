use std::{env, sync::Arc, time::Duration};

use crate::{
    application::{
        ports::{AiProvider, IngestionQueue},
        services::{
            ChatSessionManager, DocumentIngestionPipeline, IngestionTracker,
            ProviderFallbackChain, RetrievalEngine,
        },
        use_cases::{
            CancelIngestionUseCase, ChatUseCase, CreateCollectionUseCase, CreateSessionUseCase,
            DeleteCollectionUseCase, GetHistoryUseCase, IngestDocumentUseCase,
            ListCollectionsUseCase, ListDocumentsUseCase, ProviderStatusUseCase,
            ReprocessDocumentUseCase,
        },
    },
    domain::repositories::{
        ChunkRepository, CollectionRepository, DocumentRepository, MessageRepository,
        SessionRepository,
    },
    infrastructure::{
        database::{
            create_connection_pool, get_database_connection,
            repositories::{
                PostgresChunkRepository, PostgresCollectionRepository,
                PostgresDocumentRepository, PostgresMessageRepository,
                PostgresSessionRepository,
            },
            run_migrations,
        },
        external_services::{OllamaProvider, OpenAiConfig, OpenAiProvider},
        messaging::{BackgroundProcessor, MpscIngestionQueue},
    },
    presentation::http::handlers::{
        CollectionHandler, DocumentHandler, ProviderHandler, SessionHandler,
    },
};

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub struct AppContainer {
    // Repositories
    pub collection_repository: Arc<dyn CollectionRepository>,
    pub document_repository: Arc<dyn DocumentRepository>,
    pub chunk_repository: Arc<dyn ChunkRepository>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub message_repository: Arc<dyn MessageRepository>,

    // Provider orchestration
    pub fallback_chain: Arc<ProviderFallbackChain>,

    // Application services
    pub ingestion_pipeline: Arc<DocumentIngestionPipeline>,
    pub ingestion_tracker: Arc<IngestionTracker>,
    pub retrieval_engine: Arc<RetrievalEngine>,
    pub chat_session_manager: Arc<ChatSessionManager>,

    // Queue and background processing
    pub ingestion_queue: Arc<dyn IngestionQueue>,
    pub background_processor: Arc<BackgroundProcessor>,

    // Use cases
    pub create_collection_use_case: Arc<CreateCollectionUseCase>,
    pub list_collections_use_case: Arc<ListCollectionsUseCase>,
    pub delete_collection_use_case: Arc<DeleteCollectionUseCase>,
    pub ingest_document_use_case: Arc<IngestDocumentUseCase>,
    pub list_documents_use_case: Arc<ListDocumentsUseCase>,
    pub reprocess_document_use_case: Arc<ReprocessDocumentUseCase>,
    pub cancel_ingestion_use_case: Arc<CancelIngestionUseCase>,
    pub create_session_use_case: Arc<CreateSessionUseCase>,
    pub chat_use_case: Arc<ChatUseCase>,
    pub get_history_use_case: Arc<GetHistoryUseCase>,
    pub provider_status_use_case: Arc<ProviderStatusUseCase>,

    // HTTP handlers
    pub collection_handler: Arc<CollectionHandler>,
    pub document_handler: Arc<DocumentHandler>,
    pub session_handler: Arc<SessionHandler>,
    pub provider_handler: Arc<ProviderHandler>,
}

impl AppContainer {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Database pool and migrations
        let db_pool = create_connection_pool()?;
        let mut conn = get_database_connection()
            .map_err(|e| format!("Failed to create database connection: {}", e))?;
        run_migrations(&mut conn)
            .map_err(|e| format!("Failed to run database migrations: {}", e))?;

        // Repositories
        let collection_repository: Arc<dyn CollectionRepository> =
            Arc::new(PostgresCollectionRepository::new(db_pool.clone()));
        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(PostgresDocumentRepository::new(db_pool.clone()));
        let chunk_repository: Arc<dyn ChunkRepository> =
            Arc::new(PostgresChunkRepository::new(db_pool.clone()));
        let session_repository: Arc<dyn SessionRepository> =
            Arc::new(PostgresSessionRepository::new(db_pool.clone()));
        let message_repository: Arc<dyn MessageRepository> =
            Arc::new(PostgresMessageRepository::new(db_pool));

        // Providers, local first; the cloud tier only joins when configured
        let mut providers: Vec<Arc<dyn AiProvider>> =
            vec![Arc::new(OllamaProvider::from_env()?)];
        if let Some(openai_config) = OpenAiConfig::from_env() {
            providers.push(Arc::new(OpenAiProvider::new(openai_config)?));
        }
        tracing::info!("Fallback chain holds {} providers", providers.len());

        let fallback_chain = Arc::new(
            ProviderFallbackChain::new(providers)?
                .with_attempt_timeout(Duration::from_secs(env_u64(
                    "PROVIDER_ATTEMPT_TIMEOUT_SECS",
                    30,
                )))
                .with_probe_ttl(Duration::from_secs(env_u64("PROVIDER_PROBE_TTL_SECS", 30))),
        );

        // Core services
        let ingestion_tracker = Arc::new(IngestionTracker::new());
        let ingestion_pipeline = Arc::new(
            DocumentIngestionPipeline::new(
                fallback_chain.clone(),
                document_repository.clone(),
                chunk_repository.clone(),
            )
            .with_embed_concurrency(env_usize("EMBED_CONCURRENCY", 4)),
        );
        let retrieval_engine = Arc::new(RetrievalEngine::new(
            fallback_chain.clone(),
            chunk_repository.clone(),
        ));
        let chat_session_manager = Arc::new(ChatSessionManager::new(
            retrieval_engine.clone(),
            fallback_chain.clone(),
            collection_repository.clone(),
            session_repository.clone(),
            message_repository.clone(),
        ));

        // Reprocessing queue and worker pool
        let (ingestion_queue, queue_receiver) = MpscIngestionQueue::create_pair();
        let ingestion_queue: Arc<dyn IngestionQueue> = Arc::new(ingestion_queue);
        let background_processor = Arc::new(
            BackgroundProcessor::new(
                Arc::new(queue_receiver),
                collection_repository.clone(),
                document_repository.clone(),
                ingestion_pipeline.clone(),
                ingestion_tracker.clone(),
            )
            .with_worker_count(env_usize("INGEST_WORKERS", 3)),
        );

        // Use cases
        let create_collection_use_case =
            Arc::new(CreateCollectionUseCase::new(collection_repository.clone()));
        let list_collections_use_case =
            Arc::new(ListCollectionsUseCase::new(collection_repository.clone()));
        let delete_collection_use_case =
            Arc::new(DeleteCollectionUseCase::new(collection_repository.clone()));

        let ingest_document_use_case = Arc::new(IngestDocumentUseCase::new(
            collection_repository.clone(),
            document_repository.clone(),
            ingestion_pipeline.clone(),
            ingestion_tracker.clone(),
        ));
        let list_documents_use_case = Arc::new(ListDocumentsUseCase::new(
            collection_repository.clone(),
            document_repository.clone(),
        ));
        let reprocess_document_use_case = Arc::new(ReprocessDocumentUseCase::new(
            collection_repository.clone(),
            document_repository.clone(),
            ingestion_queue.clone(),
        ));
        let cancel_ingestion_use_case = Arc::new(CancelIngestionUseCase::new(
            collection_repository.clone(),
            document_repository.clone(),
            ingestion_tracker.clone(),
        ));

        let create_session_use_case = Arc::new(CreateSessionUseCase::new(
            collection_repository.clone(),
            session_repository.clone(),
        ));
        let chat_use_case = Arc::new(ChatUseCase::new(
            chat_session_manager.clone(),
            session_repository.clone(),
            collection_repository.clone(),
        ));
        let get_history_use_case = Arc::new(GetHistoryUseCase::new(
            chat_session_manager.clone(),
            session_repository.clone(),
            collection_repository.clone(),
        ));

        let provider_status_use_case =
            Arc::new(ProviderStatusUseCase::new(fallback_chain.clone()));

        // HTTP handlers
        let collection_handler = Arc::new(CollectionHandler::new(
            create_collection_use_case.clone(),
            list_collections_use_case.clone(),
            delete_collection_use_case.clone(),
        ));
        let document_handler = Arc::new(DocumentHandler::new(
            ingest_document_use_case.clone(),
            list_documents_use_case.clone(),
            reprocess_document_use_case.clone(),
            cancel_ingestion_use_case.clone(),
        ));
        let session_handler = Arc::new(SessionHandler::new(
            create_session_use_case.clone(),
            chat_use_case.clone(),
            get_history_use_case.clone(),
        ));
        let provider_handler = Arc::new(ProviderHandler::new(provider_status_use_case.clone()));

        Ok(Self {
            collection_repository,
            document_repository,
            chunk_repository,
            session_repository,
            message_repository,
            fallback_chain,
            ingestion_pipeline,
            ingestion_tracker,
            retrieval_engine,
            chat_session_manager,
            ingestion_queue,
            background_processor,
            create_collection_use_case,
            list_collections_use_case,
            delete_collection_use_case,
            ingest_document_use_case,
            list_documents_use_case,
            reprocess_document_use_case,
            cancel_ingestion_use_case,
            create_session_use_case,
            chat_use_case,
            get_history_use_case,
            provider_status_use_case,
            collection_handler,
            document_handler,
            session_handler,
            provider_handler,
        })
    }
}
