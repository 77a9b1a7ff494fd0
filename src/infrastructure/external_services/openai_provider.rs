use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::application::ports::ai_provider::{
    AiProvider, AiProviderError, CompletionRequest, CompletionResponse, EmbedRequest,
    EmbedResponse, ProviderKind, ProviderProfile,
};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub max_context_length: usize,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// None when no API key is configured; the chain then runs local-only.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let embedding_model =
            env::var("OPENAI_EMBEDDING_MODEL").unwrap_or_else(|_| "nomic-embed-text".to_string());
        let embedding_dimension = env::var("OPENAI_EMBEDDING_DIMENSION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(768);

        Some(Self {
            base_url,
            api_key,
            embedding_model,
            embedding_dimension,
            max_context_length: 16384,
            timeout_secs: 60,
        })
    }
}

#[derive(Serialize)]
struct OpenAiEmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingsResponse {
    model: String,
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Serialize)]
struct OpenAiChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct OpenAiChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct OpenAiChatChoice {
    message: OpenAiChatChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    model: String,
    choices: Vec<OpenAiChatChoice>,
}

/// Metered OpenAI-compatible backend, last in the chain. Works against the
/// hosted API or any gateway speaking the same wire format.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn describe(&self) -> ProviderProfile {
        ProviderProfile {
            name: "openai".to_string(),
            kind: ProviderKind::Cloud,
            embedding_model: self.config.embedding_model.clone(),
            embedding_dimension: self.config.embedding_dimension,
            max_context_length: self.config.max_context_length,
        }
    }

    async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, AiProviderError> {
        let body = OpenAiEmbeddingsRequest {
            model: &request.model,
            input: &request.text,
        };

        let response = self
            .client
            .post(self.url("/v1/embeddings"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiProviderError::NetworkError(e.without_url().to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AiProviderError::ModelUnsupported(request.model));
            }
            status if !status.is_success() => {
                return Err(AiProviderError::ApiError(format!(
                    "Embeddings request failed with status {}",
                    status
                )));
            }
            _ => {}
        }

        let payload: OpenAiEmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AiProviderError::ApiError(e.to_string()))?;

        let first = payload
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AiProviderError::ApiError("No embedding returned".to_string()))?;

        Ok(EmbedResponse {
            vector: Vector::from(first.embedding),
            model_name: payload.model,
        })
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AiProviderError> {
        let body = OpenAiChatRequest {
            model: &request.model,
            messages: vec![OpenAiChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.url("/v1/chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiProviderError::NetworkError(e.without_url().to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AiProviderError::ModelUnsupported(request.model));
            }
            status if !status.is_success() => {
                return Err(AiProviderError::ApiError(format!(
                    "Chat request failed with status {}",
                    status
                )));
            }
            _ => {}
        }

        let payload: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| AiProviderError::ApiError(e.to_string()))?;

        let first = payload
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiProviderError::ApiError("No completion returned".to_string()))?;

        Ok(CompletionResponse {
            text: first.message.content,
            model_name: payload.model,
        })
    }

    async fn health_check(&self) -> Result<bool, AiProviderError> {
        let result = self
            .client
            .get(self.url("/v1/models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match result {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OpenAiConfig {
        OpenAiConfig {
            base_url: "https://api.openai.com/".to_string(),
            api_key: "test-key".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimension: 768,
            max_context_length: 16384,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let provider = OpenAiProvider::new(config()).unwrap();

        assert_eq!(
            provider.url("/v1/models"),
            "https://api.openai.com/v1/models"
        );
    }

    #[test]
    fn test_profile_is_cloud() {
        let provider = OpenAiProvider::new(config()).unwrap();
        let profile = provider.describe();

        assert_eq!(profile.name, "openai");
        assert_eq!(profile.kind, ProviderKind::Cloud);
    }
}
