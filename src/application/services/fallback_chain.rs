use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::application::ports::ai_provider::{
    AiProvider, AiProviderError, CompletionRequest, CompletionResponse, EmbedRequest,
    EmbedResponse, ProviderKind,
};

#[derive(Debug, Clone)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
}

#[derive(Debug)]
pub enum FallbackChainError {
    /// Every provider in the chain was attempted (or known down) and none
    /// produced a result; carries the per-provider failure reasons in
    /// priority order.
    AllProvidersUnavailable(Vec<ProviderFailure>),
    InvalidConfiguration(String),
}

impl std::fmt::Display for FallbackChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackChainError::AllProvidersUnavailable(failures) => {
                let detail: Vec<String> = failures
                    .iter()
                    .map(|fail| format!("{}: {}", fail.provider, fail.reason))
                    .collect();
                write!(f, "All providers unavailable [{}]", detail.join("; "))
            }
            FallbackChainError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for FallbackChainError {}

#[derive(Debug, Clone)]
pub struct ProviderAvailability {
    pub name: String,
    pub kind: ProviderKind,
    pub available: bool,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct ProbeEntry {
    available: bool,
    checked_at: Instant,
}

/// Ordered attempts across providers, local first. Each operation runs its
/// own walk down the chain; the only shared state is the read-mostly
/// availability cache, whose staleness is bounded by `probe_ttl` (a dead
/// provider costs at most one failed attempt per TTL window).
pub struct ProviderFallbackChain {
    providers: Vec<Arc<dyn AiProvider>>,
    attempt_timeout: Duration,
    probe_ttl: Duration,
    availability: RwLock<HashMap<String, ProbeEntry>>,
}

impl ProviderFallbackChain {
    pub fn new(providers: Vec<Arc<dyn AiProvider>>) -> Result<Self, FallbackChainError> {
        if providers.is_empty() {
            return Err(FallbackChainError::InvalidConfiguration(
                "Fallback chain requires at least one provider".to_string(),
            ));
        }

        Ok(Self {
            providers,
            attempt_timeout: Duration::from_secs(30),
            probe_ttl: Duration::from_secs(30),
            availability: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn with_probe_ttl(mut self, probe_ttl: Duration) -> Self {
        self.probe_ttl = probe_ttl;
        self
    }

    pub async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, FallbackChainError> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let name = provider.describe().name;

            if let Some(reason) = self.skip_reason(&name).await {
                failures.push(ProviderFailure {
                    provider: name,
                    reason,
                });
                continue;
            }

            match timeout(self.attempt_timeout, provider.embed(request.clone())).await {
                Ok(Ok(response)) => {
                    self.record(&name, true).await;
                    return Ok(response);
                }
                Ok(Err(error)) => {
                    if marks_provider_down(&error) {
                        self.record(&name, false).await;
                    }
                    tracing::warn!("Provider {} failed to embed: {}", name, error);
                    failures.push(ProviderFailure {
                        provider: name,
                        reason: error.to_string(),
                    });
                }
                Err(_) => {
                    self.record(&name, false).await;
                    tracing::warn!("Provider {} timed out embedding", name);
                    failures.push(ProviderFailure {
                        provider: name,
                        reason: format!("Timed out after {:?}", self.attempt_timeout),
                    });
                }
            }
        }

        Err(FallbackChainError::AllProvidersUnavailable(failures))
    }

    pub async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, FallbackChainError> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let name = provider.describe().name;

            if let Some(reason) = self.skip_reason(&name).await {
                failures.push(ProviderFailure {
                    provider: name,
                    reason,
                });
                continue;
            }

            match timeout(self.attempt_timeout, provider.complete(request.clone())).await {
                Ok(Ok(response)) => {
                    self.record(&name, true).await;
                    return Ok(response);
                }
                Ok(Err(error)) => {
                    if marks_provider_down(&error) {
                        self.record(&name, false).await;
                    }
                    tracing::warn!("Provider {} failed to complete: {}", name, error);
                    failures.push(ProviderFailure {
                        provider: name,
                        reason: error.to_string(),
                    });
                }
                Err(_) => {
                    self.record(&name, false).await;
                    tracing::warn!("Provider {} timed out completing", name);
                    failures.push(ProviderFailure {
                        provider: name,
                        reason: format!("Timed out after {:?}", self.attempt_timeout),
                    });
                }
            }
        }

        Err(FallbackChainError::AllProvidersUnavailable(failures))
    }

    /// Probes every provider's health endpoint and refreshes the cache.
    pub async fn status(&self) -> Vec<ProviderAvailability> {
        let probes = self.providers.iter().map(|provider| {
            let provider = provider.clone();
            let attempt_timeout = self.attempt_timeout;
            async move {
                let profile = provider.describe();
                let available = matches!(
                    timeout(attempt_timeout, provider.health_check()).await,
                    Ok(Ok(true))
                );
                (profile, available)
            }
        });

        let results = futures::future::join_all(probes).await;

        let mut cache = self.availability.write().await;
        let now = Instant::now();
        let checked_at = Utc::now();

        results
            .into_iter()
            .map(|(profile, available)| {
                cache.insert(
                    profile.name.clone(),
                    ProbeEntry {
                        available,
                        checked_at: now,
                    },
                );
                ProviderAvailability {
                    name: profile.name,
                    kind: profile.kind,
                    available,
                    checked_at,
                }
            })
            .collect()
    }

    /// Some(reason) when the cache has a fresh entry marking this provider
    /// unavailable.
    async fn skip_reason(&self, name: &str) -> Option<String> {
        let cache = self.availability.read().await;
        let entry = cache.get(name)?;
        if !entry.available && entry.checked_at.elapsed() < self.probe_ttl {
            return Some("Recently unavailable, skipped until probe expiry".to_string());
        }
        None
    }

    async fn record(&self, name: &str, available: bool) {
        let mut cache = self.availability.write().await;
        cache.insert(
            name.to_string(),
            ProbeEntry {
                available,
                checked_at: Instant::now(),
            },
        );
    }
}

/// Only availability-shaped failures poison the cache; a provider rejecting a
/// particular model or input stays eligible for other requests.
fn marks_provider_down(error: &AiProviderError) -> bool {
    matches!(
        error,
        AiProviderError::NetworkError(_) | AiProviderError::ServiceUnavailable
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pgvector::Vector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::application::ports::ai_provider::ProviderProfile;

    struct StubProvider {
        name: String,
        kind: ProviderKind,
        healthy: bool,
        attempts: AtomicUsize,
    }

    impl StubProvider {
        fn up(name: &str, kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                kind,
                healthy: true,
                attempts: AtomicUsize::new(0),
            })
        }

        fn down(name: &str, kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                kind,
                healthy: false,
                attempts: AtomicUsize::new(0),
            })
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AiProvider for StubProvider {
        fn describe(&self) -> ProviderProfile {
            ProviderProfile {
                name: self.name.clone(),
                kind: self.kind,
                embedding_model: "nomic-embed-text".to_string(),
                embedding_dimension: 3,
                max_context_length: 4096,
            }
        }

        async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, AiProviderError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.healthy {
                Ok(EmbedResponse {
                    vector: Vector::from(vec![0.1, 0.2, 0.3]),
                    model_name: request.model,
                })
            } else {
                Err(AiProviderError::NetworkError("connection refused".to_string()))
            }
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, AiProviderError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.healthy {
                Ok(CompletionResponse {
                    text: "answer".to_string(),
                    model_name: request.model,
                })
            } else {
                Err(AiProviderError::ServiceUnavailable)
            }
        }

        async fn health_check(&self) -> Result<bool, AiProviderError> {
            Ok(self.healthy)
        }
    }

    fn embed_request() -> EmbedRequest {
        EmbedRequest {
            text: "hello".to_string(),
            model: "nomic-embed-text".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_invalid() {
        assert!(ProviderFallbackChain::new(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_first_healthy_provider_wins() {
        let local = StubProvider::up("ollama", ProviderKind::Local);
        let cloud = StubProvider::up("openai", ProviderKind::Cloud);
        let chain = ProviderFallbackChain::new(vec![local.clone(), cloud.clone()]).unwrap();

        let response = chain.embed(embed_request()).await.unwrap();

        assert_eq!(response.model_name, "nomic-embed-text");
        assert_eq!(local.attempts(), 1);
        assert_eq!(cloud.attempts(), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_secondary() {
        let local = StubProvider::down("ollama", ProviderKind::Local);
        let cloud = StubProvider::up("openai", ProviderKind::Cloud);
        let chain = ProviderFallbackChain::new(vec![local.clone(), cloud.clone()]).unwrap();

        let response = chain.embed(embed_request()).await.unwrap();

        assert_eq!(response.vector.as_slice().len(), 3);
        assert_eq!(local.attempts(), 1);
        assert_eq!(cloud.attempts(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_every_provider_in_priority_order() {
        let providers: Vec<Arc<StubProvider>> = (0..4)
            .map(|i| StubProvider::down(&format!("provider-{}", i), ProviderKind::Cloud))
            .collect();
        let chain = ProviderFallbackChain::new(
            providers.iter().map(|p| p.clone() as Arc<dyn AiProvider>).collect(),
        )
        .unwrap();

        let error = chain.embed(embed_request()).await.unwrap_err();

        match error {
            FallbackChainError::AllProvidersUnavailable(failures) => {
                assert_eq!(failures.len(), 4);
                for (i, failure) in failures.iter().enumerate() {
                    assert_eq!(failure.provider, format!("provider-{}", i));
                }
            }
            other => panic!("expected AllProvidersUnavailable, got {}", other),
        }
        for provider in &providers {
            assert_eq!(provider.attempts(), 1);
        }
    }

    #[tokio::test]
    async fn test_cached_failure_skips_repeat_attempts_within_ttl() {
        let local = StubProvider::down("ollama", ProviderKind::Local);
        let cloud = StubProvider::up("openai", ProviderKind::Cloud);
        let chain = ProviderFallbackChain::new(vec![local.clone(), cloud.clone()])
            .unwrap()
            .with_probe_ttl(Duration::from_secs(60));

        chain.embed(embed_request()).await.unwrap();
        chain.embed(embed_request()).await.unwrap();

        // First call pays the failed attempt, second is served from cache
        assert_eq!(local.attempts(), 1);
        assert_eq!(cloud.attempts(), 2);
    }

    #[tokio::test]
    async fn test_status_reflects_availability() {
        let local = StubProvider::down("ollama", ProviderKind::Local);
        let cloud = StubProvider::up("openai", ProviderKind::Cloud);
        let chain = ProviderFallbackChain::new(vec![local, cloud]).unwrap();

        let statuses = chain.status().await;

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "ollama");
        assert!(!statuses[0].available);
        assert_eq!(statuses[1].name, "openai");
        assert!(statuses[1].available);
    }

    #[tokio::test]
    async fn test_completion_falls_back_too() {
        let local = StubProvider::down("ollama", ProviderKind::Local);
        let cloud = StubProvider::up("openai", ProviderKind::Cloud);
        let chain = ProviderFallbackChain::new(vec![local, cloud]).unwrap();

        let response = chain
            .complete(CompletionRequest {
                prompt: "say hi".to_string(),
                model: "llama3".to_string(),
                temperature: 0.7,
                max_tokens: None,
            })
            .await
            .unwrap();

        assert_eq!(response.text, "answer");
    }
}
