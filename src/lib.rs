pub mod augment;
pub mod error;
pub mod lexicon;
pub mod models;
pub mod orchestrator;
pub mod services;

pub use error::FabulaError;
pub use orchestrator::{AnalysisOrchestrator, CachedAnalysisService};
