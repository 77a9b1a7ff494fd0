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
pub struct OllamaConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub max_context_length: usize,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        let base_url = env::var("OLLAMA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());
        let embedding_model =
            env::var("OLLAMA_EMBEDDING_MODEL").unwrap_or_else(|_| "nomic-embed-text".to_string());
        let embedding_dimension = env::var("OLLAMA_EMBEDDING_DIMENSION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(768);

        Self {
            base_url,
            embedding_model,
            embedding_dimension,
            max_context_length: 8192,
            timeout_secs: 60,
        }
    }
}

#[derive(Serialize)]
struct OllamaEmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct OllamaChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaChatOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
    options: OllamaChatOptions,
}

#[derive(Deserialize)]
struct OllamaChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaChatResponseMessage,
}

/// Local self-hosted backend. First in the chain: no egress cost, but it may
/// simply not be running.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ReqwestError> {
        Self::new(OllamaConfig::default())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    fn describe(&self) -> ProviderProfile {
        ProviderProfile {
            name: "ollama".to_string(),
            kind: ProviderKind::Local,
            embedding_model: self.config.embedding_model.clone(),
            embedding_dimension: self.config.embedding_dimension,
            max_context_length: self.config.max_context_length,
        }
    }

    async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, AiProviderError> {
        let body = OllamaEmbeddingsRequest {
            model: &request.model,
            prompt: &request.text,
        };

        let response = self
            .client
            .post(self.url("/api/embeddings"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AiProviderError::NetworkError(e.without_url().to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AiProviderError::ModelUnsupported(request.model));
        }
        if !response.status().is_success() {
            return Err(AiProviderError::ApiError(format!(
                "Embeddings request failed with status {}",
                response.status()
            )));
        }

        let payload: OllamaEmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AiProviderError::ApiError(e.to_string()))?;

        if payload.embedding.is_empty() {
            return Err(AiProviderError::ApiError(
                "No embedding returned".to_string(),
            ));
        }

        Ok(EmbedResponse {
            vector: Vector::from(payload.embedding),
            model_name: request.model,
        })
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AiProviderError> {
        let body = OllamaChatRequest {
            model: &request.model,
            messages: vec![OllamaChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            stream: false,
            options: OllamaChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AiProviderError::NetworkError(e.without_url().to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AiProviderError::ModelUnsupported(request.model));
        }
        if !response.status().is_success() {
            return Err(AiProviderError::ApiError(format!(
                "Chat request failed with status {}",
                response.status()
            )));
        }

        let payload: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AiProviderError::ApiError(e.to_string()))?;

        Ok(CompletionResponse {
            text: payload.message.content,
            model_name: payload.model,
        })
    }

    async fn health_check(&self) -> Result<bool, AiProviderError> {
        match self.client.get(self.url("/api/version")).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let provider = OllamaProvider::new(OllamaConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..OllamaConfig::default()
        })
        .unwrap();

        assert_eq!(
            provider.url("/api/version"),
            "http://localhost:11434/api/version"
        );
    }

    #[test]
    fn test_profile_is_local() {
        let provider = OllamaProvider::from_env().unwrap();
        let profile = provider.describe();

        assert_eq!(profile.name, "ollama");
        assert_eq!(profile.kind, ProviderKind::Local);
    }
}
