//! Prediction layer: clean-then-classify orchestration and asset selection.

pub mod chooser;
pub mod orchestrator;

pub use chooser::{AssetChooser, RandomChooser};
pub use orchestrator::{AssetPools, BatchItem, Prediction, PredictionOrchestrator};
