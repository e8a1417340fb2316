use serde::{Deserialize, Serialize};

/// Known structural templates a manuscript can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureTemplate {
    ThreeAct,
    FiveAct,
    HerosJourney,
    Unknown,
}

/// Named structural beats inferred from the text.
///
/// The serialized names double as display labels in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeatKind {
    IncitingIncident,
    RisingAction,
    Midpoint,
    Crisis,
    Climax,
    Resolution,
}

impl BeatKind {
    pub fn label(&self) -> &'static str {
        match self {
            BeatKind::IncitingIncident => "inciting incident",
            BeatKind::RisingAction => "rising action",
            BeatKind::Midpoint => "midpoint",
            BeatKind::Crisis => "crisis",
            BeatKind::Climax => "climax",
            BeatKind::Resolution => "resolution",
        }
    }
}

/// A beat mapped to the chapter range where its cues cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedBeat {
    pub beat: BeatKind,
    pub chapter_start: String,
    pub chapter_end: String,
    /// Relative position of the beat in the manuscript, in [0, 1].
    pub position: f32,
}

/// Classification of a manuscript against the known templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryStructure {
    pub template: StructureTemplate,
    pub confidence: f32,
    /// Matched beats in narrative order.
    pub matched_beats: Vec<MatchedBeat>,
}

impl StoryStructure {
    /// The low-information classification used for empty or unclassifiable
    /// manuscripts.
    pub fn unknown() -> Self {
        Self {
            template: StructureTemplate::Unknown,
            confidence: 0.0,
            matched_beats: Vec::new(),
        }
    }
}
