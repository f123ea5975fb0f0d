//! Client for the cyberbullying classification service.

use async_trait::async_trait;
use cybulde_core::{CleanedText, Verdict};
use tracing::debug;

use crate::ServiceError;
use crate::http::{Endpoint, field};
use crate::pipeline::VerdictPredictor;

/// Response field holding the verdict.
pub const VERDICT_FIELD: &str = "is_cyberbullying";

/// HTTP client for the model-prediction endpoint.
#[derive(Debug, Clone)]
pub struct ClassificationClient {
    endpoint: Endpoint,
}

impl ClassificationClient {
    /// Create a client for the full endpoint URL, e.g. `http://localhost:8002/predict`.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::new(client, url.into()),
        }
    }

    pub fn url(&self) -> &str {
        self.endpoint.url()
    }

    /// Classify cleaned text.
    ///
    /// The `is_cyberbullying` field may be an integer, boolean, or float; any
    /// value other than 0/1 is [`ServiceError::InvalidVerdict`].
    pub async fn predict(&self, cleaned: &CleanedText) -> Result<Verdict, ServiceError> {
        let body = self.endpoint.get_json(cleaned.as_str()).await?;
        let verdict = Verdict::try_from(field(&body, VERDICT_FIELD)?)?;
        debug!(%verdict, "text classified");
        Ok(verdict)
    }
}

#[async_trait]
impl VerdictPredictor for ClassificationClient {
    async fn predict(&self, cleaned: &CleanedText) -> Result<Verdict, ServiceError> {
        ClassificationClient::predict(self, cleaned).await
    }
}
