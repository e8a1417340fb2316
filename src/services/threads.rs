//! Unresolved-thread detection.
//!
//! Finds narrative setups (promises, mysteries, planted objects) whose key
//! terms never recur in the trailing window of chapters. Lexical recurrence
//! cannot tell an intentional open mystery from an oversight, so the
//! severity and window are tunable instead of hardcoding a policy.

use std::collections::BTreeSet;

use crate::lexicon::{PatternMatcher, FORESHADOW_MARKERS};
use crate::models::{Chapter, PlotHole, PlotHoleKind, Severity};

const STOPWORDS: &[&str] = &[
    "that", "this", "with", "would", "could", "there", "their", "about", "never", "after",
    "before", "which", "where", "when", "them", "then", "than", "have", "been", "were", "into",
    "from", "they", "what", "will", "said", "little",
];

/// Tunables for the unresolved-thread detector.
#[derive(Debug, Clone)]
pub struct ThreadConfig {
    /// How many chapters after the setup to search for a resolution.
    /// `None` means the whole remaining manuscript.
    pub trailing_window: Option<usize>,
    /// Severity assigned to unresolved setups (default: medium). Genres
    /// that embrace open endings tune this down.
    pub severity: Severity,
    /// Minimum distinct key terms a setup sentence must carry to count as
    /// significant.
    pub min_key_terms: usize,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            trailing_window: None,
            severity: Severity::Medium,
            min_key_terms: 2,
        }
    }
}

/// Detect setups with no lexical resolution, over chapters already sorted
/// into narrative order.
pub(crate) fn detect(
    ordered_chapters: &[Chapter],
    matcher: &dyn PatternMatcher,
    config: &ThreadConfig,
) -> Vec<PlotHole> {
    let mut holes = Vec::new();

    // A setup in the final chapter has no trailing window; skip it rather
    // than flag every cliffhanger ending.
    for (index, chapter) in ordered_chapters.iter().enumerate() {
        if index + 1 >= ordered_chapters.len() || chapter.is_blank() {
            continue;
        }

        let window_end = match config.trailing_window {
            Some(n) => (index + 1 + n).min(ordered_chapters.len()),
            None => ordered_chapters.len(),
        };
        let trailing = &ordered_chapters[index + 1..window_end];

        for sentence in sentences(&chapter.content) {
            if !matcher.contains_any(sentence, FORESHADOW_MARKERS) {
                continue;
            }
            let terms = key_terms(sentence);
            if terms.len() < config.min_key_terms {
                continue;
            }

            let resolved = terms.iter().any(|term| {
                trailing
                    .iter()
                    .any(|later| !matcher.find_term(&later.content, term).is_empty())
            });

            if !resolved {
                holes.push(PlotHole::new(
                    PlotHoleKind::UnresolvedThread,
                    config.severity,
                    format!(
                        "Chapter '{}' plants a setup (\"{}\") whose key terms never \
                         recur in the remaining chapters.",
                        chapter.id,
                        truncate(sentence.trim(), 80)
                    ),
                    vec![chapter.id.clone()],
                ));
            }
        }
    }

    holes
}

fn sentences(content: &str) -> impl Iterator<Item = &str> {
    content
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
}

/// Distinct content words of a setup sentence, minus foreshadowing
/// vocabulary itself and common stopwords.
fn key_terms(sentence: &str) -> BTreeSet<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() >= 4)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .filter(|w| !FORESHADOW_MARKERS.contains(&w.as_str()))
        .collect()
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
