//! Shared vocabularies and the pattern-matching seam.
//!
//! Every detector that touches raw text goes through [`PatternMatcher`]
//! rather than string logic of its own, so the lexicon-based matcher can be
//! swapped for a statistical one without touching detector code.

use rapidfuzz::distance::levenshtein;

// ============================================================================
// Sentiment vocabulary
// ============================================================================

pub const POSITIVE_WORDS: &[&str] = &[
    "love", "loved", "kissed", "embraced", "smiled", "laughed", "thanked", "helped", "saved",
    "trusted", "forgave", "comforted", "praised", "adored", "cherished", "rejoiced", "happy",
    "joy", "warmly", "gently", "tenderly",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "hate", "hated", "killed", "stabbed", "betrayed", "screamed", "attacked", "threatened",
    "struck", "cursed", "despised", "feared", "fought", "wounded", "accused", "mocked", "angry",
    "furious", "coldly", "cruelly", "bitterly",
];

// ============================================================================
// Relationship vocabulary (edge-kind voting)
// ============================================================================

pub const ROMANTIC_WORDS: &[&str] = &[
    "love", "loved", "kissed", "kiss", "embraced", "married", "wedding", "darling", "beloved",
    "romance", "passion", "caressed", "longing", "sweetheart",
];

pub const CONFLICT_WORDS: &[&str] = &[
    "hated", "killed", "fought", "betrayed", "enemy", "attacked", "stabbed", "revenge", "rival",
    "threatened", "despised", "sworn enemy", "duel", "murdered",
];

pub const KINSHIP_WORDS: &[&str] = &[
    "mother", "father", "sister", "brother", "son", "daughter", "uncle", "aunt", "cousin",
    "grandmother", "grandfather", "parents", "sibling", "family",
];

pub const FRIEND_WORDS: &[&str] = &[
    "friend", "friends", "laughed together", "confided", "trusted", "companion", "comforted",
    "joked", "shared",
];

pub const ALLY_WORDS: &[&str] = &[
    "allied", "alliance", "fought alongside", "partnered", "joined forces", "cooperated",
    "worked together", "sided with", "pledged",
];

// ============================================================================
// Temporal vocabulary
// ============================================================================

/// Markers that legitimize an out-of-order temporal reference.
pub const FLASHBACK_MARKERS: &[&str] = &[
    "flashback", "remembered", "recalled", "memory", "looking back", "had once", "in those days",
    "thought back", "reminisced",
];

/// Relative past expressions, with their approximate shift in years.
pub const RELATIVE_PAST: &[(&str, f32)] = &[
    ("years earlier", 1.0),
    ("years before", 1.0),
    ("years ago", 1.0),
    ("a year earlier", 1.0),
    ("the previous year", 1.0),
    ("months earlier", 0.1),
    ("the day before", 0.01),
    ("the previous night", 0.01),
];

/// Relative future expressions, with their approximate shift in years.
pub const RELATIVE_FUTURE: &[(&str, f32)] = &[
    ("years later", 1.0),
    ("a year later", 1.0),
    ("months later", 0.1),
    ("weeks later", 0.02),
    ("days later", 0.01),
    ("the next morning", 0.003),
    ("the next day", 0.003),
    ("the following day", 0.003),
    ("that evening", 0.001),
];

/// Spelled-out quantities in front of relative markers ("five years earlier").
pub const NUMBER_WORDS: &[(&str, f32)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("twenty", 20.0),
];

// ============================================================================
// Foreshadowing vocabulary (unresolved-thread setups)
// ============================================================================

pub const FORESHADOW_MARKERS: &[&str] = &[
    "promised", "vowed", "swore", "secret", "mystery", "mysterious", "would never forget",
    "little did", "one day", "someday", "hidden", "prophecy", "warned", "destined",
];

// ============================================================================
// Established-state vocabulary (logical-consistency detector)
// ============================================================================

/// Verbs establishing that an object no longer exists.
pub const DESTRUCTION_WORDS: &[&str] = &[
    "destroyed", "shattered", "burned", "burnt", "smashed", "broke", "broken", "crushed",
    "ruined", "demolished", "lost forever", "sank",
];

/// Verbs establishing that a character is dead.
pub const DEATH_WORDS: &[&str] = &["died", "dead", "killed", "perished", "was buried", "lifeless"];

/// Verbs indicating an object is being used intact.
pub const INTACT_USE_WORDS: &[&str] = &[
    "held", "wore", "used", "drew", "raised", "wielded", "carried", "opened", "unsheathed",
    "clutched", "picked up", "handed",
];

// ============================================================================
// Structural beat cues
// ============================================================================

pub const INCITING_CUES: &[&str] = &[
    "suddenly", "everything changed", "for the first time", "a stranger", "the letter arrived",
    "without warning", "shattered the quiet",
];

pub const RISING_CUES: &[&str] = &[
    "set out", "the journey began", "trained", "obstacles", "grew stronger", "prepared for",
    "gathered allies", "deeper into",
];

pub const MIDPOINT_CUES: &[&str] = &[
    "revelation", "discovered the truth", "realized", "turning point", "nothing would be the same",
    "the truth about",
];

pub const CRISIS_CUES: &[&str] = &[
    "all was lost", "darkest", "despair", "defeated", "no way out", "abandoned", "rock bottom",
];

pub const CLIMAX_CUES: &[&str] = &[
    "final battle", "confrontation", "confronted", "showdown", "face to face", "at last they met",
    "the end had come", "decisive",
];

pub const RESOLUTION_CUES: &[&str] = &[
    "at peace", "ever after", "finally home", "the dust settled", "a new beginning", "epilogue",
    "years of quiet", "order was restored",
];

// ============================================================================
// Trait contradictions (character-consistency detector)
// ============================================================================

/// A declared trait paired with action vocabulary that contradicts it.
#[derive(Debug, Clone, Copy)]
pub struct TraitContradiction {
    /// Substrings matched against a character's declared traits.
    pub trait_markers: &'static [&'static str],
    /// Action vocabulary that, attributed to the character, contradicts the
    /// trait.
    pub action_markers: &'static [&'static str],
    /// Short label for descriptions ("cannot swim").
    pub label: &'static str,
}

pub const TRAIT_CONTRADICTIONS: &[TraitContradiction] = &[
    TraitContradiction {
        trait_markers: &["cannot swim", "can't swim", "never learned to swim"],
        action_markers: &["swam", "swimming", "dove into"],
        label: "cannot swim",
    },
    TraitContradiction {
        trait_markers: &["honest", "never lies", "truthful"],
        action_markers: &["lied", "lying", "deceived", "falsely claimed"],
        label: "honest",
    },
    TraitContradiction {
        trait_markers: &["blind"],
        action_markers: &["watched", "stared at", "glanced at", "admired the view"],
        label: "blind",
    },
    TraitContradiction {
        trait_markers: &["mute", "cannot speak", "can't speak"],
        action_markers: &["said", "shouted", "whispered", "replied", "exclaimed"],
        label: "mute",
    },
    TraitContradiction {
        trait_markers: &["pacifist", "never fights", "abhors violence"],
        action_markers: &["killed", "stabbed", "punched", "shot", "struck"],
        label: "pacifist",
    },
    TraitContradiction {
        trait_markers: &["illiterate", "cannot read", "can't read"],
        action_markers: &["read the letter", "read the note", "wrote"],
        label: "illiterate",
    },
    TraitContradiction {
        trait_markers: &["afraid of heights", "fear of heights", "vertigo"],
        action_markers: &["climbed the tower", "scaled the cliff", "leapt across the rooftops"],
        label: "afraid of heights",
    },
];

// ============================================================================
// PatternMatcher
// ============================================================================

/// Text-matching capability used by every detector.
///
/// The contract is deterministic and pure: identical inputs produce
/// identical matches.
pub trait PatternMatcher: Send + Sync {
    /// Byte offsets of case-insensitive, word-boundary occurrences of `term`
    /// in `text`. Multi-word terms are matched as phrases.
    fn find_term(&self, text: &str, term: &str) -> Vec<usize>;

    /// Whether any of `terms` occurs in `text`.
    fn contains_any(&self, text: &str, terms: &[&str]) -> bool {
        terms.iter().any(|t| !self.find_term(text, t).is_empty())
    }

    /// How many of `terms` occur in `text`, counting repeats.
    fn count_any(&self, text: &str, terms: &[&str]) -> usize {
        terms.iter().map(|t| self.find_term(text, t).len()).sum()
    }

    /// Name similarity in [0, 1], for alias tolerance.
    fn name_similarity(&self, a: &str, b: &str) -> f64;
}

/// Exact lexicon matcher: case-folded word-boundary scanning plus rapidfuzz
/// Levenshtein similarity for near-miss names.
#[derive(Debug, Clone, Default)]
pub struct LexiconMatcher;

impl LexiconMatcher {
    pub fn new() -> Self {
        Self
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Case-insensitive match of `needle` starting at byte `pos` of `text`.
/// Returns the end offset in the original text on success. Folding happens
/// per source char, so offsets stay valid even when lowercasing changes
/// byte length.
fn match_at(text: &str, pos: usize, needle: &[char]) -> Option<usize> {
    let mut i = 0;
    let mut end = pos;
    for c in text[pos..].chars() {
        for folded in c.to_lowercase() {
            if i >= needle.len() || needle[i] != folded {
                return None;
            }
            i += 1;
        }
        end += c.len_utf8();
        if i == needle.len() {
            return Some(end);
        }
    }
    None
}

impl PatternMatcher for LexiconMatcher {
    fn find_term(&self, text: &str, term: &str) -> Vec<usize> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle: Vec<char> = term.to_lowercase().chars().collect();
        let mut positions = Vec::new();
        let mut prev: Option<char> = None;

        for (pos, current) in text.char_indices() {
            if let Some(end) = match_at(text, pos, &needle) {
                let before_ok = prev.map(|c| !is_word_char(c)).unwrap_or(true);
                let after_ok = text[end..]
                    .chars()
                    .next()
                    .map(|c| !is_word_char(c))
                    .unwrap_or(true);
                if before_ok && after_ok {
                    positions.push(pos);
                }
            }
            prev = Some(current);
        }
        positions
    }

    fn name_similarity(&self, a: &str, b: &str) -> f64 {
        let a_lower = a.to_lowercase();
        let b_lower = b.to_lowercase();
        levenshtein::normalized_similarity(a_lower.chars(), b_lower.chars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_term_word_boundary() {
        let matcher = LexiconMatcher::new();
        // "art" must not match inside "Martha"
        assert!(matcher.find_term("Martha painted.", "art").is_empty());
        assert_eq!(matcher.find_term("Art is long.", "art"), vec![0]);
    }

    #[test]
    fn test_find_term_case_insensitive() {
        let matcher = LexiconMatcher::new();
        assert_eq!(matcher.find_term("SARAH and sarah", "Sarah").len(), 2);
    }

    #[test]
    fn test_find_term_phrase() {
        let matcher = LexiconMatcher::new();
        assert_eq!(
            matcher.find_term("Five years earlier, all was well.", "years earlier"),
            vec![5]
        );
    }

    // Lowercasing 'İ' grows from two bytes to three; offsets must still
    // index the original content.
    #[test]
    fn test_find_term_offsets_index_original_text() {
        let matcher = LexiconMatcher::new();
        let text = "İstanbul fog rolled in as the promise held.";
        assert_eq!(
            matcher.find_term(text, "promise"),
            vec![text.find("promise").unwrap()]
        );
    }

    #[test]
    fn test_find_term_empty_term() {
        let matcher = LexiconMatcher::new();
        assert!(matcher.find_term("anything", "").is_empty());
    }

    #[test]
    fn test_contains_any() {
        let matcher = LexiconMatcher::new();
        assert!(matcher.contains_any("They kissed at dawn.", ROMANTIC_WORDS));
        assert!(!matcher.contains_any("They walked to town.", ROMANTIC_WORDS));
    }

    #[test]
    fn test_count_any_counts_repeats() {
        let matcher = LexiconMatcher::new();
        let n = matcher.count_any("He lied, and lied again.", &["lied"]);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_name_similarity_exact_and_near() {
        let matcher = LexiconMatcher::new();
        assert_eq!(matcher.name_similarity("Sarah", "sarah"), 1.0);
        assert!(matcher.name_similarity("Katherine", "Katharine") > 0.85);
        assert!(matcher.name_similarity("Sarah", "Tom") < 0.5);
    }

    #[test]
    fn test_lexicons_are_lowercase() {
        for list in [
            POSITIVE_WORDS,
            NEGATIVE_WORDS,
            ROMANTIC_WORDS,
            CONFLICT_WORDS,
            KINSHIP_WORDS,
            FRIEND_WORDS,
            ALLY_WORDS,
            FLASHBACK_MARKERS,
            FORESHADOW_MARKERS,
            DESTRUCTION_WORDS,
            DEATH_WORDS,
            INTACT_USE_WORDS,
        ] {
            for word in list {
                assert_eq!(*word, word.to_lowercase(), "lexicon entry not lowercase");
            }
        }
    }
}
