use serde::Serialize;

use crate::application::services::fallback_chain::ProviderAvailability;

#[derive(Debug, Serialize)]
pub struct ProviderStatusDto {
    pub name: String,
    pub kind: String,
    pub available: bool,
    pub checked_at: String,
}

impl From<ProviderAvailability> for ProviderStatusDto {
    fn from(availability: ProviderAvailability) -> Self {
        Self {
            name: availability.name,
            kind: availability.kind.to_string(),
            available: availability.available,
            checked_at: availability.checked_at.to_rfc3339(),
        }
    }
}
