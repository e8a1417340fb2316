//! Logical-consistency detection.
//!
//! Tracks facts the text establishes about objects (destroyed, lost, dead)
//! and flags later chapters that contradict them by using the same noun
//! phrase intact. Co-reference is lexical: the same definite noun phrase
//! stands for the same object.

use std::collections::HashSet;

use crate::lexicon::{PatternMatcher, DEATH_WORDS, DESTRUCTION_WORDS, INTACT_USE_WORDS};
use crate::models::{Chapter, PlotHole, PlotHoleKind, Severity};

/// Vocabulary that legitimately clears a destroyed state.
const REPAIR_WORDS: &[&str] = &["repaired", "rebuilt", "restored", "mended", "reforged", "replaced"];

/// Determiners that introduce a trackable noun phrase.
const DETERMINERS: &[&str] = &["the", "his", "her", "their", "its"];

#[derive(Debug, Clone)]
struct EstablishedState {
    noun: String,
    chapter_id: String,
}

/// Detect contradictions of established states, over chapters already
/// sorted into narrative order.
pub(crate) fn detect(ordered_chapters: &[Chapter], matcher: &dyn PatternMatcher) -> Vec<PlotHole> {
    let mut holes = Vec::new();
    let mut destroyed: Vec<EstablishedState> = Vec::new();
    let mut flagged: HashSet<(String, String, String)> = HashSet::new();

    for chapter in ordered_chapters {
        if chapter.is_blank() {
            continue;
        }

        for sentence in sentences(&chapter.content) {
            // Contradiction check runs before this sentence can register new
            // states, so a destruction sentence never contradicts itself.
            for state in &destroyed {
                if state.chapter_id == chapter.id {
                    continue;
                }
                if !matcher.find_term(sentence, &state.noun).is_empty()
                    && matcher.contains_any(sentence, INTACT_USE_WORDS)
                    && flagged.insert((
                        state.noun.clone(),
                        state.chapter_id.clone(),
                        chapter.id.clone(),
                    ))
                {
                    holes.push(PlotHole::new(
                        PlotHoleKind::Logical,
                        Severity::Critical,
                        format!(
                            "The {} is established as destroyed or gone in chapter '{}' \
                             but chapter '{}' has it used intact with no explanation.",
                            state.noun, state.chapter_id, chapter.id
                        ),
                        vec![state.chapter_id.clone(), chapter.id.clone()],
                    ));
                }
            }

            // Repair vocabulary clears the state for nouns in this sentence.
            if matcher.contains_any(sentence, REPAIR_WORDS) {
                destroyed.retain(|state| matcher.find_term(sentence, &state.noun).is_empty());
            }

            if matcher.contains_any(sentence, DESTRUCTION_WORDS)
                || matcher.contains_any(sentence, DEATH_WORDS)
            {
                for noun in determiner_nouns(sentence) {
                    if !destroyed.iter().any(|s| s.noun == noun) {
                        destroyed.push(EstablishedState {
                            noun,
                            chapter_id: chapter.id.clone(),
                        });
                    }
                }
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

/// Nouns introduced by a determiner in the sentence ("the amulet" -> "amulet").
fn determiner_nouns(sentence: &str) -> Vec<String> {
    let words: Vec<&str> = sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let mut nouns = Vec::new();
    for pair in words.windows(2) {
        let det = pair[0].to_lowercase();
        let noun = pair[1].to_lowercase();
        if DETERMINERS.contains(&det.as_str())
            && noun.len() >= 4
            && !DESTRUCTION_WORDS.contains(&noun.as_str())
            && !DEATH_WORDS.contains(&noun.as_str())
            && !nouns.contains(&noun)
        {
            nouns.push(noun);
        }
    }
    nouns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconMatcher;

    #[test]
    fn test_destroyed_object_reused_is_flagged() {
        let chapters = vec![
            Chapter::new("ch1", 0, "The amulet shattered on the temple floor."),
            Chapter::new("ch2", 1, "They fled the burning city."),
            Chapter::new("ch3", 2, "She held the amulet up to the moonlight."),
        ];
        let holes = detect(&chapters, &LexiconMatcher::new());
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].kind, PlotHoleKind::Logical);
        assert_eq!(holes[0].severity, Severity::Critical);
        assert_eq!(
            holes[0].evidence_chapter_ids,
            vec!["ch1".to_string(), "ch3".to_string()]
        );
    }

    #[test]
    fn test_repaired_object_is_cleared() {
        let chapters = vec![
            Chapter::new("ch1", 0, "The sword broke against the gate."),
            Chapter::new("ch2", 1, "A smith reforged the sword overnight."),
            Chapter::new("ch3", 2, "He drew the sword and stepped forward."),
        ];
        assert!(detect(&chapters, &LexiconMatcher::new()).is_empty());
    }

    #[test]
    fn test_mention_without_use_is_not_flagged() {
        let chapters = vec![
            Chapter::new("ch1", 0, "The bridge was destroyed in the flood."),
            Chapter::new("ch2", 1, "She thought about the bridge and wept."),
        ];
        assert!(detect(&chapters, &LexiconMatcher::new()).is_empty());
    }

    #[test]
    fn test_same_chapter_destruction_and_use_is_not_flagged() {
        // Use before destruction inside one chapter is ordinary narration.
        let chapters = vec![Chapter::new(
            "ch1",
            0,
            "He raised the shield one last time. The shield shattered.",
        )];
        assert!(detect(&chapters, &LexiconMatcher::new()).is_empty());
    }

    #[test]
    fn test_duplicate_reuse_is_reported_once_per_chapter_pair() {
        let chapters = vec![
            Chapter::new("ch1", 0, "The lantern was crushed under the cart."),
            Chapter::new(
                "ch2",
                1,
                "She carried the lantern inside. Later she held the lantern again.",
            ),
        ];
        assert_eq!(detect(&chapters, &LexiconMatcher::new()).len(), 1);
    }

    #[test]
    fn test_determiner_nouns_extraction() {
        let nouns = determiner_nouns("The amulet and her necklace burned");
        assert_eq!(nouns, vec!["amulet".to_string(), "necklace".to_string()]);
    }

    #[test]
    fn test_empty_manuscript() {
        assert!(detect(&[], &LexiconMatcher::new()).is_empty());
    }
}
