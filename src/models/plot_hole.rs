use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum length for a plot-hole description. Shorter descriptions are
/// extended with their evidence so output never reads as vague.
pub const MIN_DESCRIPTION_LEN: usize = 50;

/// Category of a detected plot hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotHoleKind {
    Timeline,
    Character,
    UnresolvedThread,
    Logical,
}

/// Severity of a plot hole's impact on narrative coherence.
///
/// Ordered from least to most severe so violations can be sorted by
/// importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Points subtracted from the plot-hole score per hole of this severity.
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Low => 3,
            Severity::Medium => 8,
            Severity::High => 15,
            Severity::Critical => 25,
        }
    }
}

/// A single detected narrative inconsistency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotHole {
    pub id: String,
    pub kind: PlotHoleKind,
    pub severity: Severity,
    /// Human-readable explanation, always at least [`MIN_DESCRIPTION_LEN`]
    /// characters.
    pub description: String,
    /// Chapters supporting the finding, in narrative order. Never empty.
    pub evidence_chapter_ids: Vec<String>,
}

impl PlotHole {
    /// Build a plot hole, enforcing the description-length and non-empty
    /// evidence invariants at the type boundary.
    ///
    /// Short descriptions get their evidence appended rather than being
    /// rejected, so detectors can stay terse.
    pub fn new(
        kind: PlotHoleKind,
        severity: Severity,
        description: impl Into<String>,
        evidence_chapter_ids: Vec<String>,
    ) -> Self {
        debug_assert!(
            !evidence_chapter_ids.is_empty(),
            "plot hole must cite at least one chapter"
        );
        let mut description = description.into();
        if description.len() < MIN_DESCRIPTION_LEN {
            description = format!(
                "{} (supporting chapters: {})",
                description,
                evidence_chapter_ids.join(", ")
            );
        }
        // Pathological case: tiny description and tiny evidence list.
        while description.len() < MIN_DESCRIPTION_LEN {
            description.push_str(" Review the cited chapters for details.");
        }
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            severity,
            description,
            evidence_chapter_ids,
        }
    }

    /// Dedup key: two holes of the same kind citing the same chapters are
    /// the same finding.
    pub fn dedup_key(&self) -> (PlotHoleKind, Vec<String>) {
        (self.kind, self.evidence_chapter_ids.clone())
    }
}

/// Output of the plot-hole detector: the holes plus a 0-100 score and a
/// framed summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotHoleAnalysis {
    pub plot_holes: Vec<PlotHole>,
    pub score: u32,
    pub summary: String,
}
