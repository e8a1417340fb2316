use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Coarse sentiment polarity of an interaction span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    /// Numeric value for trend arithmetic (+1 / -1 / 0).
    pub fn value(&self) -> f32 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
            Polarity::Neutral => 0.0,
        }
    }
}

/// A character mention located within a chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionSignal {
    pub character_id: String,
    pub chapter_id: String,
    /// Byte offset of the matched name within the chapter content.
    pub position: usize,
}

/// A temporal expression located within a chapter.
///
/// `normalized_order` places the expression on the story-time axis relative
/// to the chapter's own `order_index`: "five years earlier" in chapter 3
/// normalizes below 3.0, "the next morning" slightly above it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalSignal {
    pub chapter_id: String,
    pub expression: String,
    pub normalized_order: f32,
    /// Explicit calendar year when the expression names one ("in 2018").
    pub year: Option<i32>,
    /// Whether an explicit flashback/flashforward marker covers this span.
    pub is_flashback_marked: bool,
}

/// A candidate interaction between two characters within a bounded window.
///
/// The pair is normalized so `character_a <= character_b`; interaction
/// signals for a pair are order-independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionSignal {
    pub character_a: String,
    pub character_b: String,
    pub chapter_id: String,
    pub polarity: Polarity,
    /// Text window surrounding the co-mention, for vocabulary voting.
    pub context: String,
}

impl InteractionSignal {
    /// Create an interaction with the pair normalized to canonical order.
    pub fn new(
        id_a: impl Into<String>,
        id_b: impl Into<String>,
        chapter_id: impl Into<String>,
        polarity: Polarity,
        context: impl Into<String>,
    ) -> Self {
        let (mut a, mut b) = (id_a.into(), id_b.into());
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        Self {
            character_a: a,
            character_b: b,
            chapter_id: chapter_id.into(),
            polarity,
            context: context.into(),
        }
    }

    pub fn pair(&self) -> (&str, &str) {
        (&self.character_a, &self.character_b)
    }
}

/// All signals extracted from one manuscript, consumed within a single
/// analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSet {
    pub mentions: Vec<MentionSignal>,
    pub temporal: Vec<TemporalSignal>,
    pub interactions: Vec<InteractionSignal>,
    /// Dialogue span count per chapter id, a pacing cue for structure
    /// classification. Ordered so serialized signal sets are byte-stable
    /// across runs.
    pub dialogue_spans: BTreeMap<String, usize>,
}

impl SignalSet {
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty() && self.temporal.is_empty() && self.interactions.is_empty()
    }

    /// Mentions of one character across the manuscript.
    pub fn mentions_of<'a>(
        &'a self,
        character_id: &'a str,
    ) -> impl Iterator<Item = &'a MentionSignal> + 'a {
        self.mentions
            .iter()
            .filter(move |m| m.character_id == character_id)
    }

    /// Interaction signals grouped by normalized pair.
    pub fn interactions_by_pair(&self) -> HashMap<(String, String), Vec<&InteractionSignal>> {
        let mut by_pair: HashMap<(String, String), Vec<&InteractionSignal>> = HashMap::new();
        for signal in &self.interactions {
            by_pair
                .entry((signal.character_a.clone(), signal.character_b.clone()))
                .or_default()
                .push(signal);
        }
        by_pair
    }

    /// Temporal signals for one chapter.
    pub fn temporal_in<'a>(
        &'a self,
        chapter_id: &'a str,
    ) -> impl Iterator<Item = &'a TemporalSignal> + 'a {
        self.temporal
            .iter()
            .filter(move |t| t.chapter_id == chapter_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_pair_is_normalized() {
        let signal = InteractionSignal::new("zoe", "adam", "ch1", Polarity::Neutral, "");
        assert_eq!(signal.pair(), ("adam", "zoe"));
    }

    #[test]
    fn test_interaction_pair_already_ordered() {
        let signal = InteractionSignal::new("adam", "zoe", "ch1", Polarity::Neutral, "");
        assert_eq!(signal.pair(), ("adam", "zoe"));
    }

    #[test]
    fn test_polarity_values() {
        assert_eq!(Polarity::Positive.value(), 1.0);
        assert_eq!(Polarity::Negative.value(), -1.0);
        assert_eq!(Polarity::Neutral.value(), 0.0);
    }

    #[test]
    fn test_interactions_by_pair_merges_orderings() {
        let mut set = SignalSet::default();
        set.interactions
            .push(InteractionSignal::new("a", "b", "ch1", Polarity::Positive, ""));
        set.interactions
            .push(InteractionSignal::new("b", "a", "ch2", Polarity::Negative, ""));
        let by_pair = set.interactions_by_pair();
        assert_eq!(by_pair.len(), 1);
        assert_eq!(by_pair[&("a".to_string(), "b".to_string())].len(), 2);
    }

    #[test]
    fn test_empty_signal_set() {
        let set = SignalSet::default();
        assert!(set.is_empty());
        assert_eq!(set.mentions_of("anyone").count(), 0);
    }
}
