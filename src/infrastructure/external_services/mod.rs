pub mod ollama_provider;
pub mod openai_provider;

pub use ollama_provider::{OllamaConfig, OllamaProvider};
pub use openai_provider::{OpenAiConfig, OpenAiProvider};
