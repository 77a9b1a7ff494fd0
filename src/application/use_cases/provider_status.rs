use std::sync::Arc;

use crate::application::services::fallback_chain::{ProviderAvailability, ProviderFallbackChain};

#[derive(Debug, Clone)]
pub struct ProviderStatusResponse {
    pub providers: Vec<ProviderAvailability>,
}

pub struct ProviderStatusUseCase {
    fallback_chain: Arc<ProviderFallbackChain>,
}

impl ProviderStatusUseCase {
    pub fn new(fallback_chain: Arc<ProviderFallbackChain>) -> Self {
        Self { fallback_chain }
    }

    pub async fn execute(&self) -> ProviderStatusResponse {
        ProviderStatusResponse {
            providers: self.fallback_chain.status().await,
        }
    }
}
