pub mod analysis;
pub mod chapter;
pub mod character;
pub mod graph;
pub mod plot_hole;
pub mod signal;
pub mod structure;

pub use analysis::{
    AnalysisFeedback, AnalysisOptions, AnalysisResult, DegradedReason, QualityBreakdown,
};
pub use chapter::{sort_chapters, Chapter};
pub use character::{Character, CharacterRole};
pub use graph::{CharacterGraph, CharacterNode, Evolution, PairKey, RelationshipEdge, RelationshipKind};
pub use plot_hole::{PlotHole, PlotHoleAnalysis, PlotHoleKind, Severity, MIN_DESCRIPTION_LEN};
pub use signal::{InteractionSignal, MentionSignal, Polarity, SignalSet, TemporalSignal};
pub use structure::{BeatKind, MatchedBeat, StoryStructure, StructureTemplate};
