use serde::{Deserialize, Serialize};

use crate::models::character::CharacterRole;

/// Canonical unordered character pair.
///
/// Normalized on construction so `(a, b)` and `(b, a)` compare and hash
/// identically; at most one edge per pair exists in a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub a: String,
    pub b: String,
}

impl PairKey {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        let (mut a, mut b) = (x.into(), y.into());
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        Self { a, b }
    }

    pub fn contains(&self, character_id: &str) -> bool {
        self.a == character_id || self.b == character_id
    }
}

/// Classified kind of a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Romantic,
    Enemy,
    Friend,
    Family,
    Ally,
    Neutral,
}

/// Temporal trend of a relationship across the manuscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evolution {
    Stable,
    Improving,
    Deteriorating,
    Complex,
}

/// A typed, weighted relationship between two characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub pair: PairKey,
    pub kind: RelationshipKind,
    /// Interaction volume normalized against the busiest pair, in [0, 1].
    pub strength: f32,
    pub evolution: Evolution,
    /// Chapters in which the pair interacts, in narrative order.
    pub evidence_chapter_ids: Vec<String>,
}

/// A graph node: one roster character with its computed importance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterNode {
    pub character_id: String,
    pub name: String,
    pub role: CharacterRole,
    /// Blend of relationship weight and declared role, in [0, 1].
    pub importance: f32,
}

/// Weighted relationship graph over the character roster.
///
/// Stored as flat id-keyed node and edge lists rather than linked objects,
/// so the structure serializes cleanly and adjacency is answered by query
/// methods instead of back-pointers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterGraph {
    pub nodes: Vec<CharacterNode>,
    pub edges: Vec<RelationshipEdge>,
}

impl CharacterGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// All edges touching the given character. Empty when the character has
    /// no relationships (or is unknown).
    pub fn character_relationships(&self, character_id: &str) -> Vec<&RelationshipEdge> {
        self.edges
            .iter()
            .filter(|e| e.pair.contains(character_id))
            .collect()
    }

    /// The `n` strongest edges, descending by strength with a stable pair
    /// tie-break. Returns every edge when the graph has fewer than `n`.
    pub fn strongest_relationships(&self, n: usize) -> Vec<&RelationshipEdge> {
        let mut edges: Vec<&RelationshipEdge> = self.edges.iter().collect();
        edges.sort_by(|x, y| {
            y.strength
                .partial_cmp(&x.strength)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| x.pair.cmp(&y.pair))
        });
        edges.truncate(n);
        edges
    }

    pub fn node(&self, character_id: &str) -> Option<&CharacterNode> {
        self.nodes.iter().find(|n| n.character_id == character_id)
    }
}
