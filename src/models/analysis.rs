use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::graph::CharacterGraph;
use crate::models::plot_hole::PlotHole;
use crate::models::structure::StoryStructure;

/// Why an analysis fell back to heuristic-only output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegradedReason {
    AugmentationTimeout,
    AugmentationRateLimited,
    AugmentationAuthFailed,
    AugmentationMalformedResponse,
    AugmentationUnavailable,
}

/// Per-pillar contributions to the final quality score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityBreakdown {
    /// Plot-hole score in [0, 100], weighted at 50%.
    pub plot_hole_score: u32,
    /// Structure confidence in [0, 1], weighted at 30%.
    pub structure_confidence: f32,
    /// Graph health in [0, 1], weighted at 20%.
    pub graph_health: f32,
}

/// Options controlling a single analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Refine ambiguous findings through the external completion service.
    /// Failures degrade silently to heuristic-only output.
    pub use_external_augmentation: bool,
}

/// The single value returned to callers. Created fresh per run; the engine
/// keeps no copy and owns no persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub plot_holes: Vec<PlotHole>,
    pub character_graph: CharacterGraph,
    pub story_structure: StoryStructure,
    /// Aggregate quality score, 0-100.
    pub quality_score: u8,
    pub quality: QualityBreakdown,
    pub summary: String,
    /// True when augmentation was requested but fell back to heuristics.
    pub degraded: bool,
    pub degraded_reason: Option<DegradedReason>,
    /// Wall-clock stamp, excluded from determinism comparisons.
    pub analyzed_at: DateTime<Utc>,
}

/// Caller feedback on a finding (false positive/negative reports).
///
/// The engine only defines the shape; storing and acting on feedback is the
/// caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFeedback {
    /// 1 (useless) to 5 (accurate).
    pub rating: u8,
    pub message: String,
    /// Free-form pointer at the finding, e.g. a plot-hole id.
    pub context: String,
}
