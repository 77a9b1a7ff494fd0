use async_trait::async_trait;
use pgvector::Vector;

#[derive(Debug)]
pub enum AiProviderError {
    NetworkError(String),
    ApiError(String),
    InvalidInput(String),
    ModelUnsupported(String),
    ServiceUnavailable,
}

impl std::fmt::Display for AiProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            AiProviderError::ApiError(msg) => write!(f, "API error: {}", msg),
            AiProviderError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AiProviderError::ModelUnsupported(model) => {
                write!(f, "Model not served by this provider: {}", model)
            }
            AiProviderError::ServiceUnavailable => write!(f, "Service unavailable"),
        }
    }
}

impl std::error::Error for AiProviderError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Self-hosted, no egress cost, may be down.
    Local,
    /// Metered remote API, higher availability, added latency and cost.
    Cloud,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Local => write!(f, "local"),
            ProviderKind::Cloud => write!(f, "cloud"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub name: String,
    pub kind: ProviderKind,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub max_context_length: usize,
}

#[derive(Debug, Clone)]
pub struct EmbedRequest {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct EmbedResponse {
    pub vector: Vector,
    pub model_name: String,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub model_name: String,
}

/// Uniform capability interface over heterogeneous AI backends. The fallback
/// chain depends only on this trait; adapters translate to each wire format.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn describe(&self) -> ProviderProfile;

    async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, AiProviderError>;

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AiProviderError>;

    /// Cheap availability probe; must not perform a full inference call.
    async fn health_check(&self) -> Result<bool, AiProviderError>;
}
