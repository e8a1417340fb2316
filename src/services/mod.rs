pub mod extractor;
pub mod graph_builder;
pub mod plot_holes;
pub mod scoring;
pub mod structure;
pub mod threads;

pub(crate) mod logic;
pub(crate) mod timeline;
pub(crate) mod traits;

pub use extractor::TextSignalExtractor;
pub use graph_builder::CharacterGraphBuilder;
pub use plot_holes::{build_summary, calculate_score, PlotHoleDetector};
pub use scoring::QualityScorer;
pub use structure::StoryStructureClassifier;
pub use threads::ThreadConfig;
