//! Character-consistency detection.
//!
//! Compares each character's declared traits against trait-contradicting
//! action language attributed to that character near its mentions.

use std::collections::HashMap;

use crate::lexicon::{PatternMatcher, TRAIT_CONTRADICTIONS};
use crate::models::{Chapter, Character, PlotHole, PlotHoleKind, Severity, SignalSet};

/// Action vocabulary this close to a mention is attributed to the character.
const ATTRIBUTION_BEFORE: usize = 40;
const ATTRIBUTION_AFTER: usize = 160;

/// Detect trait contradictions. Empty when no characters are supplied.
pub(crate) fn detect(
    chapters: &[Chapter],
    characters: &[Character],
    signals: &SignalSet,
    matcher: &dyn PatternMatcher,
) -> Vec<PlotHole> {
    if characters.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<&str, &Chapter> = chapters.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut holes = Vec::new();

    for character in characters {
        for contradiction in TRAIT_CONTRADICTIONS {
            let declared = character.traits.iter().any(|t| {
                let t_lower = t.to_lowercase();
                contradiction
                    .trait_markers
                    .iter()
                    .any(|marker| t_lower.contains(marker))
            });
            if !declared {
                continue;
            }

            let mut evidence: Vec<(u32, String)> = Vec::new();
            for mention in signals.mentions_of(&character.id) {
                let Some(chapter) = by_id.get(mention.chapter_id.as_str()) else {
                    continue;
                };
                let window = attribution_window(&chapter.content, mention.position);
                if matcher.contains_any(window, contradiction.action_markers)
                    && !evidence.iter().any(|(_, id)| id == &chapter.id)
                {
                    evidence.push((chapter.order_index, chapter.id.clone()));
                }
            }

            if !evidence.is_empty() {
                evidence.sort();
                let chapter_ids: Vec<String> = evidence.into_iter().map(|(_, id)| id).collect();
                holes.push(PlotHole::new(
                    PlotHoleKind::Character,
                    Severity::Medium,
                    format!(
                        "{} is described as \"{}\", yet the text attributes actions to them \
                         that contradict that trait.",
                        character.name, contradiction.label
                    ),
                    chapter_ids,
                ));
            }
        }
    }

    holes
}

fn attribution_window(content: &str, position: usize) -> &str {
    let mut start = position.saturating_sub(ATTRIBUTION_BEFORE);
    while start > 0 && !content.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (position + ATTRIBUTION_AFTER).min(content.len());
    while end < content.len() && !content.is_char_boundary(end) {
        end += 1;
    }
    &content[start..end]
}
