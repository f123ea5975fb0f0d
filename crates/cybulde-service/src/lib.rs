//! Service layer: HTTP clients for the cleaning and classification endpoints.

mod error;
mod http;

pub mod cleaning;
pub mod pipeline;
pub mod prediction;

pub use cleaning::TextCleaningClient;
pub use error::{ErrorKind, ServiceError};
pub use http::http_client;
pub use pipeline::{TextCleaner, VerdictPredictor};
pub use prediction::ClassificationClient;
