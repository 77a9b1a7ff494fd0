use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::application::use_cases::ProviderStatusUseCase;
use crate::presentation::http::dto::{ApiResponse, ProviderStatusDto};

pub struct ProviderHandler {
    provider_status_use_case: Arc<ProviderStatusUseCase>,
}

impl ProviderHandler {
    pub fn new(provider_status_use_case: Arc<ProviderStatusUseCase>) -> Self {
        Self {
            provider_status_use_case,
        }
    }

    pub async fn provider_status(
        State(handler): State<Arc<ProviderHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let response = handler.provider_status_use_case.execute().await;

        let providers: Vec<ProviderStatusDto> = response
            .providers
            .into_iter()
            .map(ProviderStatusDto::from)
            .collect();

        Ok((StatusCode::OK, Json(ApiResponse::success(providers))))
    }
}
