//! The two pipeline stages as traits, so callers can swap in stub services.

use async_trait::async_trait;
use cybulde_core::{CleanedText, Verdict};

use crate::ServiceError;

/// First stage: normalize raw text.
#[async_trait]
pub trait TextCleaner: Send + Sync {
    async fn clean(&self, text: &str) -> Result<CleanedText, ServiceError>;
}

/// Second stage: classify text produced by a [`TextCleaner`].
#[async_trait]
pub trait VerdictPredictor: Send + Sync {
    async fn predict(&self, cleaned: &CleanedText) -> Result<Verdict, ServiceError>;
}
