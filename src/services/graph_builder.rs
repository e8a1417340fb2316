//! Character relationship graph construction.
//!
//! Builds a typed, weighted graph from interaction signals: edge kinds come
//! from vocabulary voting over interaction contexts, strength from
//! normalized interaction volume, and evolution from the polarity trend
//! across early/mid/late thirds of the manuscript.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::lexicon::{
    LexiconMatcher, PatternMatcher, ALLY_WORDS, CONFLICT_WORDS, FRIEND_WORDS, KINSHIP_WORDS,
    ROMANTIC_WORDS,
};
use crate::models::{
    sort_chapters, Chapter, Character, CharacterGraph, CharacterNode, Evolution, InteractionSignal,
    PairKey, RelationshipEdge, RelationshipKind, SignalSet,
};

/// Polarity averages closer than this across thirds count as flat.
const TREND_EPSILON: f32 = 0.1;

/// Share of importance contributed by relationship weight vs. declared role.
const IMPORTANCE_STRENGTH_WEIGHT: f32 = 0.6;
const IMPORTANCE_ROLE_WEIGHT: f32 = 0.4;

/// Builds [`CharacterGraph`]s from extracted signals.
pub struct CharacterGraphBuilder {
    matcher: Arc<dyn PatternMatcher>,
}

impl Default for CharacterGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterGraphBuilder {
    pub fn new() -> Self {
        Self {
            matcher: Arc::new(LexiconMatcher::new()),
        }
    }

    pub fn with_matcher(matcher: Arc<dyn PatternMatcher>) -> Self {
        Self { matcher }
    }

    /// Build the relationship graph. An empty roster yields an empty graph,
    /// never an error.
    pub fn build(
        &self,
        project_id: &str,
        chapters: &[Chapter],
        characters: &[Character],
        signals: &SignalSet,
    ) -> CharacterGraph {
        if characters.is_empty() {
            debug!(project_id, "empty roster, returning empty graph");
            return CharacterGraph::default();
        }

        let mut ordered: Vec<Chapter> = chapters.to_vec();
        sort_chapters(&mut ordered);
        let chapter_order: HashMap<&str, u32> = ordered
            .iter()
            .map(|c| (c.id.as_str(), c.order_index))
            .collect();
        let roster: HashSet<&str> = characters.iter().map(|c| c.id.as_str()).collect();

        let by_pair = signals.interactions_by_pair();
        let max_count = by_pair
            .iter()
            .filter(|((a, b), _)| roster.contains(a.as_str()) && roster.contains(b.as_str()))
            .map(|(_, v)| v.len())
            .max()
            .unwrap_or(0);

        let mut edges: Vec<RelationshipEdge> = Vec::new();
        for ((a, b), interactions) in &by_pair {
            if !roster.contains(a.as_str()) || !roster.contains(b.as_str()) {
                continue;
            }
            let kind = self.classify_kind(interactions);
            let strength = if max_count > 0 {
                interactions.len() as f32 / max_count as f32
            } else {
                0.0
            };
            let evolution = detect_relationship_trend(interactions, &chapter_order);
            let evidence = evidence_chapters(interactions, &chapter_order);

            edges.push(RelationshipEdge {
                pair: PairKey::new(a.clone(), b.clone()),
                kind,
                strength,
                evolution,
                evidence_chapter_ids: evidence,
            });
        }
        edges.sort_by(|x, y| x.pair.cmp(&y.pair));

        let nodes = build_nodes(characters, &edges);
        debug!(
            project_id,
            nodes = nodes.len(),
            edges = edges.len(),
            "character graph built"
        );

        CharacterGraph { nodes, edges }
    }

    /// Vote an edge kind from vocabulary categories across all interaction
    /// contexts for the pair. The category with the most matches wins; on a
    /// tie, the more specific categories take precedence over the generic
    /// ones. No matches at all means a neutral edge.
    fn classify_kind(&self, interactions: &[&InteractionSignal]) -> RelationshipKind {
        let mut votes: Vec<(RelationshipKind, usize)> = vec![
            (RelationshipKind::Romantic, 0),
            (RelationshipKind::Enemy, 0),
            (RelationshipKind::Family, 0),
            (RelationshipKind::Friend, 0),
            (RelationshipKind::Ally, 0),
        ];

        for interaction in interactions {
            let context = interaction.context.as_str();
            votes[0].1 += self.matcher.count_any(context, ROMANTIC_WORDS);
            votes[1].1 += self.matcher.count_any(context, CONFLICT_WORDS);
            votes[2].1 += self.matcher.count_any(context, KINSHIP_WORDS);
            votes[3].1 += self.matcher.count_any(context, FRIEND_WORDS);
            votes[4].1 += self.matcher.count_any(context, ALLY_WORDS);
        }

        // max_by_key takes the last maximum; iterate in reverse so the
        // precedence order above wins ties.
        votes
            .iter()
            .rev()
            .max_by_key(|(_, count)| *count)
            .filter(|(_, count)| *count > 0)
            .map(|(kind, _)| *kind)
            .unwrap_or(RelationshipKind::Neutral)
    }
}

// ---------------------------------------------------------------------------
// Pure functions
// ---------------------------------------------------------------------------

/// Partition a pair's interactions into early/mid/late thirds by chapter
/// order and classify the polarity trend.
pub(crate) fn detect_relationship_trend(
    interactions: &[&InteractionSignal],
    chapter_order: &HashMap<&str, u32>,
) -> Evolution {
    if interactions.len() < 3 {
        return Evolution::Stable;
    }

    let mut sorted: Vec<&InteractionSignal> = interactions.to_vec();
    sorted.sort_by_key(|i| {
        chapter_order
            .get(i.chapter_id.as_str())
            .copied()
            .unwrap_or(u32::MAX)
    });

    let third = sorted.len().div_ceil(3);
    let averages: Vec<f32> = sorted
        .chunks(third)
        .map(|chunk| {
            chunk.iter().map(|i| i.polarity.value()).sum::<f32>() / chunk.len() as f32
        })
        .collect();

    let first = *averages.first().unwrap_or(&0.0);
    let last = *averages.last().unwrap_or(&0.0);
    let rising = averages.windows(2).all(|w| w[1] >= w[0] - TREND_EPSILON);
    let falling = averages.windows(2).all(|w| w[1] <= w[0] + TREND_EPSILON);

    if rising && last - first > TREND_EPSILON {
        Evolution::Improving
    } else if falling && first - last > TREND_EPSILON {
        Evolution::Deteriorating
    } else if rising && falling {
        Evolution::Stable
    } else {
        Evolution::Complex
    }
}

/// Chapters where the pair interacts, in narrative order without repeats.
fn evidence_chapters(
    interactions: &[&InteractionSignal],
    chapter_order: &HashMap<&str, u32>,
) -> Vec<String> {
    let mut chapters: Vec<(u32, String)> = Vec::new();
    for interaction in interactions {
        if chapters.iter().any(|(_, id)| id == &interaction.chapter_id) {
            continue;
        }
        let order = chapter_order
            .get(interaction.chapter_id.as_str())
            .copied()
            .unwrap_or(u32::MAX);
        chapters.push((order, interaction.chapter_id.clone()));
    }
    chapters.sort();
    chapters.into_iter().map(|(_, id)| id).collect()
}

/// Node importance: normalized total relationship strength blended with the
/// declared role weight.
fn build_nodes(characters: &[Character], edges: &[RelationshipEdge]) -> Vec<CharacterNode> {
    let mut totals: HashMap<&str, f32> = HashMap::new();
    for edge in edges {
        *totals.entry(edge.pair.a.as_str()).or_default() += edge.strength;
        *totals.entry(edge.pair.b.as_str()).or_default() += edge.strength;
    }
    let max_total = totals.values().cloned().fold(0.0f32, f32::max);

    characters
        .iter()
        .map(|character| {
            let total = totals.get(character.id.as_str()).copied().unwrap_or(0.0);
            let normalized = if max_total > 0.0 { total / max_total } else { 0.0 };
            let importance = (IMPORTANCE_STRENGTH_WEIGHT * normalized
                + IMPORTANCE_ROLE_WEIGHT * character.role.weight())
            .clamp(0.0, 1.0);
            CharacterNode {
                character_id: character.id.clone(),
                name: character.name.clone(),
                role: character.role,
                importance,
            }
        })
        .collect()
}
