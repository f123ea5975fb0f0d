//! Shared GET-with-`text` transport used by both service clients.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::ServiceError;

/// A single service endpoint taking its input as a `text` query parameter.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    client: reqwest::Client,
    url: String,
}

/// Build the connection pool shared by both service clients.
///
/// `timeout` bounds each request end to end.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

impl Endpoint {
    pub(crate) fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// `GET <url>?text=<text>` and parse the body as a JSON object.
    ///
    /// Non-2xx statuses become [`ServiceError::Status`]; the body is read as
    /// text first so a malformed body surfaces as [`ServiceError::Json`].
    pub(crate) async fn get_json(&self, text: &str) -> Result<Value, ServiceError> {
        debug!(url = %self.url, chars = text.chars().count(), "calling service");
        let resp = self
            .client
            .get(&self.url)
            .query(&[("text", text)])
            .send()
            .await
            .inspect_err(|e| warn!(url = %self.url, error = %e, "service request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(url = %self.url, status = status.as_u16(), "service returned error status");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Look up a top-level field of a JSON response.
pub(crate) fn field<'a>(body: &'a Value, name: &'static str) -> Result<&'a Value, ServiceError> {
    body.get(name).ok_or(ServiceError::MissingField(name))
}
