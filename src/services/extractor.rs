//! Low-level text signal extraction.
//!
//! Pulls character mentions, temporal markers, interaction spans, and
//! dialogue density out of raw chapter text. Pure and deterministic:
//! identical inputs always yield byte-identical signal sets, and malformed
//! or blank chapters contribute an empty subset instead of failing the run.

use std::sync::Arc;

use crate::lexicon::{
    LexiconMatcher, PatternMatcher, FLASHBACK_MARKERS, NEGATIVE_WORDS, NUMBER_WORDS,
    POSITIVE_WORDS, RELATIVE_FUTURE, RELATIVE_PAST,
};
use crate::models::{
    sort_chapters, Chapter, Character, InteractionSignal, MentionSignal, Polarity, SignalSet,
    TemporalSignal,
};

/// Two mentions within this many bytes form a candidate interaction.
const INTERACTION_WINDOW: usize = 200;

/// Context captured around an interaction span for vocabulary voting.
const CONTEXT_PADDING: usize = 80;

/// Flashback markers are honored when they appear this close before a
/// temporal expression.
const FLASHBACK_LOOKBEHIND: usize = 150;

/// Minimum rapidfuzz similarity for a fuzzy name match, and the minimum
/// name length the fuzzy pass applies to. Short names stay exact-only to
/// keep false positives down.
const FUZZY_NAME_THRESHOLD: f64 = 0.85;
const FUZZY_NAME_MIN_LEN: usize = 5;

/// Extracts [`SignalSet`]s from manuscripts.
pub struct TextSignalExtractor {
    matcher: Arc<dyn PatternMatcher>,
}

impl Default for TextSignalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSignalExtractor {
    pub fn new() -> Self {
        Self {
            matcher: Arc::new(LexiconMatcher::new()),
        }
    }

    /// Use a non-default matcher (e.g. a statistical one).
    pub fn with_matcher(matcher: Arc<dyn PatternMatcher>) -> Self {
        Self { matcher }
    }

    /// Extract all signals from the manuscript. Never fails.
    pub fn extract(&self, chapters: &[Chapter], characters: &[Character]) -> SignalSet {
        let mut ordered: Vec<Chapter> = chapters.to_vec();
        sort_chapters(&mut ordered);

        let mut set = SignalSet::default();

        for chapter in &ordered {
            if chapter.is_blank() {
                continue;
            }

            let mentions = self.extract_mentions(chapter, characters);
            set.temporal
                .extend(self.extract_temporal(chapter));
            set.interactions
                .extend(self.extract_interactions(chapter, &mentions));
            set.dialogue_spans
                .insert(chapter.id.clone(), count_dialogue_spans(&chapter.content));
            set.mentions.extend(mentions);
        }

        set
    }

    /// Character mentions: exact name/alias matches plus a fuzzy pass over
    /// capitalized tokens for longer names.
    fn extract_mentions(&self, chapter: &Chapter, characters: &[Character]) -> Vec<MentionSignal> {
        let mut mentions: Vec<MentionSignal> = Vec::new();

        for character in characters {
            for name in character.known_names() {
                for position in self.matcher.find_term(&chapter.content, name) {
                    mentions.push(MentionSignal {
                        character_id: character.id.clone(),
                        chapter_id: chapter.id.clone(),
                        position,
                    });
                }
            }
        }

        // Fuzzy pass: capitalized tokens that nearly match a longer name.
        let claimed: std::collections::HashSet<(usize, String)> = mentions
            .iter()
            .map(|m| (m.position, m.character_id.clone()))
            .collect();
        for (position, token) in capitalized_tokens(&chapter.content) {
            for character in characters {
                if claimed.contains(&(position, character.id.clone())) {
                    continue;
                }
                let matched = character.known_names().any(|name| {
                    name.len() >= FUZZY_NAME_MIN_LEN
                        && token.len() >= FUZZY_NAME_MIN_LEN
                        && self.matcher.name_similarity(&token, name) >= FUZZY_NAME_THRESHOLD
                        && !token.eq_ignore_ascii_case(name)
                });
                if matched {
                    mentions.push(MentionSignal {
                        character_id: character.id.clone(),
                        chapter_id: chapter.id.clone(),
                        position,
                    });
                }
            }
        }

        mentions.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.character_id.cmp(&b.character_id))
        });
        mentions.dedup_by(|a, b| a.position == b.position && a.character_id == b.character_id);
        mentions
    }

    /// Temporal expressions: explicit years and relative markers, each with
    /// a normalized story-time order anchored at the chapter's own index.
    fn extract_temporal(&self, chapter: &Chapter) -> Vec<TemporalSignal> {
        let base = chapter.order_index as f32;
        let mut signals = Vec::new();

        for (position, year) in explicit_years(&chapter.content) {
            signals.push(TemporalSignal {
                chapter_id: chapter.id.clone(),
                expression: year.to_string(),
                normalized_order: base,
                year: Some(year),
                is_flashback_marked: self.flashback_nearby(&chapter.content, position),
            });
        }

        for &(marker, unit) in RELATIVE_PAST {
            for position in self.matcher.find_term(&chapter.content, marker) {
                let quantity = leading_quantity(&chapter.content, position);
                let offset = -(quantity * unit);
                signals.push(TemporalSignal {
                    chapter_id: chapter.id.clone(),
                    expression: expression_at(&chapter.content, position, marker),
                    normalized_order: base + (offset / 10.0).clamp(-0.5, 0.5),
                    year: None,
                    is_flashback_marked: self.flashback_nearby(&chapter.content, position),
                });
            }
        }

        for &(marker, unit) in RELATIVE_FUTURE {
            for position in self.matcher.find_term(&chapter.content, marker) {
                let quantity = leading_quantity(&chapter.content, position);
                let offset = quantity * unit;
                signals.push(TemporalSignal {
                    chapter_id: chapter.id.clone(),
                    expression: expression_at(&chapter.content, position, marker),
                    normalized_order: base + (offset / 10.0).clamp(-0.5, 0.5),
                    year: None,
                    is_flashback_marked: self.flashback_nearby(&chapter.content, position),
                });
            }
        }

        signals
    }

    /// Candidate interactions: two distinct characters mentioned within a
    /// bounded window, with polarity from nearby sentiment vocabulary.
    fn extract_interactions(
        &self,
        chapter: &Chapter,
        mentions: &[MentionSignal],
    ) -> Vec<InteractionSignal> {
        let mut interactions = Vec::new();

        for (i, first) in mentions.iter().enumerate() {
            for second in mentions.iter().skip(i + 1) {
                if second.position - first.position > INTERACTION_WINDOW {
                    break;
                }
                if second.character_id == first.character_id {
                    continue;
                }
                let context = context_window(
                    &chapter.content,
                    first.position,
                    second.position,
                    CONTEXT_PADDING,
                );
                let polarity = self.span_polarity(&context);
                interactions.push(InteractionSignal::new(
                    first.character_id.clone(),
                    second.character_id.clone(),
                    chapter.id.clone(),
                    polarity,
                    context,
                ));
            }
        }

        interactions
    }

    fn span_polarity(&self, context: &str) -> Polarity {
        let positive = self.matcher.count_any(context, POSITIVE_WORDS);
        let negative = self.matcher.count_any(context, NEGATIVE_WORDS);
        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Polarity::Positive,
            std::cmp::Ordering::Less => Polarity::Negative,
            std::cmp::Ordering::Equal => Polarity::Neutral,
        }
    }

    fn flashback_nearby(&self, content: &str, position: usize) -> bool {
        let start = floor_char_boundary(content, position.saturating_sub(FLASHBACK_LOOKBEHIND));
        let end = floor_char_boundary(content, position);
        self.matcher
            .contains_any(&content[start..end], FLASHBACK_MARKERS)
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Largest char boundary at or below `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary at or above `index`.
fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Slice around a co-mention span, clamped to char boundaries.
fn context_window(content: &str, first: usize, second: usize, padding: usize) -> String {
    let start = floor_char_boundary(content, first.saturating_sub(padding));
    let end = ceil_char_boundary(content, (second + padding).min(content.len()));
    content[start..end].to_string()
}

/// Four-digit years (1000-2999) at word boundaries, with byte positions.
fn explicit_years(content: &str) -> Vec<(usize, i32)> {
    let bytes = content.as_bytes();
    let mut years = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let run = &content[start..i];
            let boundary_before = start == 0 || !char_before(content, start).is_alphanumeric();
            let boundary_after = i >= bytes.len() || !content[i..].chars().next().unwrap().is_alphanumeric();
            if run.len() == 4 && boundary_before && boundary_after {
                if let Ok(year) = run.parse::<i32>() {
                    if (1000..3000).contains(&year) {
                        years.push((start, year));
                    }
                }
            }
        } else {
            i += 1;
        }
    }
    years
}

fn char_before(text: &str, index: usize) -> char {
    text[..index].chars().next_back().unwrap_or(' ')
}

/// Quantity token directly before a relative marker ("five years earlier",
/// "3 days later"). Defaults to 1 when absent or unparseable.
fn leading_quantity(content: &str, marker_position: usize) -> f32 {
    let prefix = content[..floor_char_boundary(content, marker_position)].trim_end();
    let token = prefix
        .rsplit(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or("");
    let token_lower = token.to_lowercase();
    if let Ok(n) = token_lower.parse::<u32>() {
        return n as f32;
    }
    for &(word, value) in NUMBER_WORDS {
        if token_lower == word {
            return value;
        }
    }
    1.0
}

/// Human-readable expression: the marker plus its leading quantity token.
fn expression_at(content: &str, marker_position: usize, marker: &str) -> String {
    let window_start =
        floor_char_boundary(content, marker_position.saturating_sub(12));
    let end = ceil_char_boundary(content, (marker_position + marker.len()).min(content.len()));
    content[window_start..end].trim().to_string()
}

/// Tokens starting with an uppercase letter, with byte positions.
fn capitalized_tokens(content: &str) -> Vec<(usize, String)> {
    let mut tokens = Vec::new();
    let mut chars = content.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c.is_uppercase() && (start == 0 || !char_before(content, start).is_alphanumeric()) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if next.is_alphanumeric() {
                    end = i + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push((start, content[start..end].to_string()));
        }
    }
    tokens
}

/// Dialogue spans per chapter, counted as quote pairs.
fn count_dialogue_spans(content: &str) -> usize {
    let straight = content.matches('"').count() / 2;
    let curly = content.matches('\u{201C}').count();
    straight + curly
}
