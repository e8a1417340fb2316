//! Aggregate quality scoring.
//!
//! Combines the plot-hole score, structure confidence, and relationship
//! graph health into the final 0-100 quality score with fixed weights, and
//! writes the user-facing summary.

use graphrs::{Edge, Graph, GraphSpecs, Node};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::models::{
    CharacterGraph, PlotHoleAnalysis, QualityBreakdown, RelationshipKind, StoryStructure,
    StructureTemplate,
};

/// Fixed pillar weights: plot holes 50%, structure 30%, graph health 20%.
const PLOT_WEIGHT: f32 = 0.5;
const STRUCTURE_WEIGHT: f32 = 0.3;
const GRAPH_WEIGHT: f32 = 0.2;

/// Graph health blend: connected share vs. edge-kind balance.
const CONNECTIVITY_WEIGHT: f32 = 0.6;
const BALANCE_WEIGHT: f32 = 0.4;

/// Aggregates detector outputs into the final quality score.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Compute the final score, its breakdown, and the summary.
    ///
    /// `chapter_count` distinguishes a genuinely empty manuscript (which
    /// scores a neutral 100) from one the classifier could not place.
    pub fn score(
        &self,
        plot: &PlotHoleAnalysis,
        graph: &CharacterGraph,
        structure: &StoryStructure,
        chapter_count: usize,
    ) -> (u8, QualityBreakdown, String) {
        let graph_health = graph_health(graph);
        // Nothing to classify is not a structural defect.
        let structure_confidence = if chapter_count == 0 {
            1.0
        } else {
            structure.confidence
        };

        let weighted = PLOT_WEIGHT * plot.score as f32
            + STRUCTURE_WEIGHT * structure_confidence * 100.0
            + GRAPH_WEIGHT * graph_health * 100.0;
        let quality = weighted.round().clamp(0.0, 100.0) as u8;

        let breakdown = QualityBreakdown {
            plot_hole_score: plot.score,
            structure_confidence,
            graph_health,
        };
        let summary = build_summary(quality, plot, graph, structure);
        debug!(quality, graph_health, structure_confidence, "quality scored");

        (quality, breakdown, summary)
    }
}

/// Graph health in [0, 1]: share of connected characters blended with
/// edge-kind balance. An empty roster is neutral (1.0); a populated roster
/// with no interactions at all reads as a defect (0.5).
pub(crate) fn graph_health(graph: &CharacterGraph) -> f32 {
    if graph.nodes.is_empty() {
        return 1.0;
    }
    if graph.edges.is_empty() {
        return 0.5;
    }

    // Degree per character over an undirected graphrs graph.
    let mut g = Graph::<String, ()>::new(GraphSpecs::undirected());
    for node in &graph.nodes {
        g.add_node(Node::from_name(node.character_id.clone()));
    }
    for edge in &graph.edges {
        // Edge endpoints always come from the roster; a failure here would
        // be an internal invariant violation.
        let result = g.add_edge(Edge::new(edge.pair.a.clone(), edge.pair.b.clone()));
        debug_assert!(result.is_ok(), "edge endpoints missing from graph");
    }

    let mut degree: HashMap<&String, usize> = HashMap::new();
    for edge in g.get_all_edges() {
        *degree.entry(&edge.u).or_default() += 1;
        *degree.entry(&edge.v).or_default() += 1;
    }
    let connected = graph
        .nodes
        .iter()
        .filter(|n| degree.get(&n.character_id).copied().unwrap_or(0) > 0)
        .count();
    let connectivity = connected as f32 / graph.nodes.len() as f32;

    let kinds: HashSet<RelationshipKind> = graph.edges.iter().map(|e| e.kind).collect();
    // Three or more distinct kinds is a fully varied cast.
    let balance = (kinds.len() as f32 / 3.0).min(1.0);

    CONNECTIVITY_WEIGHT * connectivity + BALANCE_WEIGHT * balance
}

/// Final summary: framed by quality band, always stating the exact
/// plot-hole count.
fn build_summary(
    quality: u8,
    plot: &PlotHoleAnalysis,
    graph: &CharacterGraph,
    structure: &StoryStructure,
) -> String {
    let count = plot.plot_holes.len();
    let structure_note = match structure.template {
        StructureTemplate::Unknown => "no clear structural template".to_string(),
        template => {
            let mut note = format!(
                "a {} structure (confidence {:.0}%)",
                template_label(template),
                structure.confidence * 100.0
            );
            if let Some(last) = structure.matched_beats.last() {
                note.push_str(&format!(", closing on its {}", last.beat.label()));
            }
            note
        }
    };

    let framing = if quality >= 80 {
        format!(
            "Overall quality is strong ({}/100): {} plot hole(s) found",
            quality, count
        )
    } else if quality < 50 {
        format!(
            "Overall quality is concerning ({}/100): {} plot hole(s) found",
            quality, count
        )
    } else {
        format!(
            "Overall quality is fair ({}/100): {} plot hole(s) found",
            quality, count
        )
    };

    format!(
        "{}, {} character relationship(s) mapped across {} character(s), and {}.",
        framing,
        graph.edges.len(),
        graph.nodes.len(),
        structure_note
    )
}

fn template_label(template: StructureTemplate) -> &'static str {
    match template {
        StructureTemplate::ThreeAct => "three-act",
        StructureTemplate::FiveAct => "five-act",
        StructureTemplate::HerosJourney => "hero's-journey",
        StructureTemplate::Unknown => "unknown",
    }
}
