//! Client for the text-cleaning service.

use async_trait::async_trait;
use cybulde_core::CleanedText;
use tracing::debug;

use crate::ServiceError;
use crate::http::{Endpoint, field};
use crate::pipeline::TextCleaner;

/// Response field holding the cleaned text.
pub const CLEANED_TEXT_FIELD: &str = "cleaned_text";

/// HTTP client for the data-processing (cleaning) endpoint.
#[derive(Debug, Clone)]
pub struct TextCleaningClient {
    endpoint: Endpoint,
}

impl TextCleaningClient {
    /// Create a client for the full endpoint URL, e.g. `http://localhost:8001/clean`,
    /// on a pool built by [`http_client`](crate::http_client).
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::new(client, url.into()),
        }
    }

    pub fn url(&self) -> &str {
        self.endpoint.url()
    }

    /// Send raw text to the cleaning service. Empty text is forwarded as-is.
    pub async fn clean(&self, text: &str) -> Result<CleanedText, ServiceError> {
        let body = self.endpoint.get_json(text).await?;
        let cleaned = field(&body, CLEANED_TEXT_FIELD)?
            .as_str()
            .ok_or(ServiceError::FieldType {
                field: CLEANED_TEXT_FIELD,
                expected: "a string",
            })?;
        debug!(chars = cleaned.chars().count(), "text cleaned");
        Ok(CleanedText::new(cleaned))
    }
}

#[async_trait]
impl TextCleaner for TextCleaningClient {
    async fn clean(&self, text: &str) -> Result<CleanedText, ServiceError> {
        TextCleaningClient::clean(self, text).await
    }
}
