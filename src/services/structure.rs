//! Story-structure classification.
//!
//! Infers structural beats from lexical cues and pacing, then scores each
//! known template by how well the found beats sit at the template's
//! expected relative positions. A poor best fit classifies as unknown
//! rather than guessing.

use std::sync::Arc;

use tracing::debug;

use crate::lexicon::{
    LexiconMatcher, PatternMatcher, CLIMAX_CUES, CRISIS_CUES, INCITING_CUES, MIDPOINT_CUES,
    RESOLUTION_CUES, RISING_CUES,
};
use crate::models::{
    sort_chapters, BeatKind, Chapter, MatchedBeat, SignalSet, StoryStructure, StructureTemplate,
};

/// Best-fit confidence below this classifies as unknown.
pub const MIN_CONFIDENCE: f32 = 0.4;

/// Positional error (as a fraction of the manuscript) at which a beat's
/// fit reaches zero.
const FIT_FALLOFF: f32 = 0.35;

/// Expected beats and relative positions per template.
const THREE_ACT: &[(BeatKind, f32)] = &[
    (BeatKind::IncitingIncident, 0.12),
    (BeatKind::Midpoint, 0.5),
    (BeatKind::Climax, 0.85),
    (BeatKind::Resolution, 0.97),
];

const FIVE_ACT: &[(BeatKind, f32)] = &[
    (BeatKind::IncitingIncident, 0.1),
    (BeatKind::RisingAction, 0.3),
    (BeatKind::Climax, 0.5),
    (BeatKind::Crisis, 0.7),
    (BeatKind::Resolution, 0.95),
];

const HEROS_JOURNEY: &[(BeatKind, f32)] = &[
    (BeatKind::IncitingIncident, 0.08),
    (BeatKind::RisingAction, 0.35),
    (BeatKind::Crisis, 0.6),
    (BeatKind::Climax, 0.8),
    (BeatKind::Resolution, 0.95),
];

/// Classifies manuscripts against known structural templates.
pub struct StoryStructureClassifier {
    matcher: Arc<dyn PatternMatcher>,
}

impl Default for StoryStructureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryStructureClassifier {
    pub fn new() -> Self {
        Self {
            matcher: Arc::new(LexiconMatcher::new()),
        }
    }

    pub fn with_matcher(matcher: Arc<dyn PatternMatcher>) -> Self {
        Self { matcher }
    }

    /// Classify the manuscript. Empty input yields `Unknown` at zero
    /// confidence.
    pub fn classify(&self, chapters: &[Chapter], signals: &SignalSet) -> StoryStructure {
        let mut ordered: Vec<Chapter> = chapters.to_vec();
        sort_chapters(&mut ordered);
        ordered.retain(|c| !c.is_blank());

        if ordered.is_empty() {
            return StoryStructure::unknown();
        }

        let beats = self.infer_beats(&ordered, signals);
        if beats.is_empty() {
            return StoryStructure::unknown();
        }

        let candidates = [
            (StructureTemplate::ThreeAct, THREE_ACT),
            (StructureTemplate::FiveAct, FIVE_ACT),
            (StructureTemplate::HerosJourney, HEROS_JOURNEY),
        ];

        let (template, confidence) = candidates
            .iter()
            .map(|(template, expected)| (*template, positional_fit(&beats, expected)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or((StructureTemplate::Unknown, 0.0));

        debug!(?template, confidence, beats = beats.len(), "structure classified");

        if confidence < MIN_CONFIDENCE {
            return StoryStructure {
                template: StructureTemplate::Unknown,
                confidence,
                matched_beats: beats,
            };
        }

        StoryStructure {
            template,
            confidence,
            matched_beats: beats,
        }
    }

    /// One beat per kind at most: the chapter whose cues for that kind score
    /// highest. Dialogue density breaks climax ties, since confrontation
    /// scenes run dialogue-heavy.
    fn infer_beats(&self, ordered: &[Chapter], signals: &SignalSet) -> Vec<MatchedBeat> {
        let total = ordered.len() as f32;
        let kinds: [(BeatKind, &[&str]); 6] = [
            (BeatKind::IncitingIncident, INCITING_CUES),
            (BeatKind::RisingAction, RISING_CUES),
            (BeatKind::Midpoint, MIDPOINT_CUES),
            (BeatKind::Crisis, CRISIS_CUES),
            (BeatKind::Climax, CLIMAX_CUES),
            (BeatKind::Resolution, RESOLUTION_CUES),
        ];

        let mut beats = Vec::new();
        for (kind, cues) in kinds {
            let mut best: Option<(f32, usize)> = None;
            for (index, chapter) in ordered.iter().enumerate() {
                let cue_count = self.matcher.count_any(&chapter.content, cues);
                if cue_count == 0 {
                    continue;
                }
                let dialogue = signals
                    .dialogue_spans
                    .get(&chapter.id)
                    .copied()
                    .unwrap_or(0) as f32;
                let score = cue_count as f32
                    + if kind == BeatKind::Climax {
                        (dialogue / 100.0).min(0.5)
                    } else {
                        0.0
                    };
                if best.map(|(s, _)| score > s).unwrap_or(true) {
                    best = Some((score, index));
                }
            }
            if let Some((_, index)) = best {
                let chapter = &ordered[index];
                beats.push(MatchedBeat {
                    beat: kind,
                    chapter_start: chapter.id.clone(),
                    chapter_end: chapter.id.clone(),
                    position: (index as f32 + 0.5) / total,
                });
            }
        }

        beats.sort_by(|a, b| {
            a.position
                .partial_cmp(&b.position)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        beats
    }
}

/// Average positional fit of found beats against a template's expectations.
/// Missing expected beats contribute zero, so sparse evidence cannot win a
/// confident classification.
pub(crate) fn positional_fit(beats: &[MatchedBeat], expected: &[(BeatKind, f32)]) -> f32 {
    if expected.is_empty() {
        return 0.0;
    }
    let total: f32 = expected
        .iter()
        .map(|(kind, position)| {
            beats
                .iter()
                .find(|b| b.beat == *kind)
                .map(|b| (1.0 - (b.position - position).abs() / FIT_FALLOFF).max(0.0))
                .unwrap_or(0.0)
        })
        .sum();
    total / expected.len() as f32
}
