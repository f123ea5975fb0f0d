pub mod config;
pub mod schema;
pub mod verdict;

pub use config::{AppConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use schema::dataset;
pub use verdict::{AssetPool, CleanedText, InvalidVerdict, PresentationOutcome, Verdict};
