//! Integration tests for plot-hole detection over full manuscripts.

mod common;

use fabula::models::{CharacterRole, PlotHole, PlotHoleKind, Severity};
use fabula::services::{calculate_score, PlotHoleDetector, TextSignalExtractor};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use common::builders::{ChapterBuilder, CharacterBuilder};

// ============================================================================
// TIMELINE CONTRADICTIONS
// ============================================================================

/// A chapter dated 2020 followed by one dated "five years earlier, in 2018"
/// without flashback framing yields exactly one timeline hole citing both
/// chapters.
#[test]
fn test_backdated_chapter_yields_one_timeline_hole() {
    let chapters = vec![
        ChapterBuilder::new("ch1", 0)
            .content("The year was 2020 when the brothers last spoke.")
            .build(),
        ChapterBuilder::new("ch2", 1)
            .content("Five years earlier, in 2018, the orchard was still theirs.")
            .build(),
    ];
    let signals = TextSignalExtractor::new().extract(&chapters, &[]);
    let analysis = PlotHoleDetector::new().detect(&chapters, &[], &signals);

    assert_eq!(analysis.plot_holes.len(), 1);
    let hole = &analysis.plot_holes[0];
    assert_eq!(hole.kind, PlotHoleKind::Timeline);
    assert_eq!(hole.severity, Severity::High);
    assert_eq!(
        hole.evidence_chapter_ids,
        vec!["ch1".to_string(), "ch2".to_string()]
    );
    assert_eq!(analysis.score, 100 - 15);
}

#[test]
fn test_flashback_framing_suppresses_timeline_hole() {
    let chapters = vec![
        ChapterBuilder::new("ch1", 0)
            .content("The year was 2020 when the brothers last spoke.")
            .build(),
        ChapterBuilder::new("ch2", 1)
            .content("She remembered five years earlier, in 2018, when the orchard was still theirs.")
            .build(),
    ];
    let signals = TextSignalExtractor::new().extract(&chapters, &[]);
    let analysis = PlotHoleDetector::new().detect(&chapters, &[], &signals);

    assert!(analysis.plot_holes.is_empty());
    assert_eq!(analysis.score, 100);
}

// ============================================================================
// LOGICAL AND CHARACTER CONSISTENCY
// ============================================================================

#[test]
fn test_destroyed_object_reused_is_critical() {
    let chapters = vec![
        ChapterBuilder::new("ch1", 0)
            .content("The amulet shattered on the temple floor.")
            .build(),
        ChapterBuilder::new("ch2", 1)
            .content("She held the amulet up to the light.")
            .build(),
    ];
    let signals = TextSignalExtractor::new().extract(&chapters, &[]);
    let analysis = PlotHoleDetector::new().detect(&chapters, &[], &signals);

    assert_eq!(analysis.plot_holes.len(), 1);
    assert_eq!(analysis.plot_holes[0].kind, PlotHoleKind::Logical);
    assert_eq!(analysis.plot_holes[0].severity, Severity::Critical);
}

#[test]
fn test_declared_trait_contradiction_is_flagged() {
    let chapters = vec![ChapterBuilder::new("ch1", 0)
        .content("Without hesitation Mira swam across the flooded river.")
        .build()];
    let characters = vec![CharacterBuilder::new("Mira")
        .role(CharacterRole::Protagonist)
        .declared_trait("cannot swim")
        .build()];
    let signals = TextSignalExtractor::new().extract(&chapters, &characters);
    let analysis = PlotHoleDetector::new().detect(&chapters, &characters, &signals);

    assert_eq!(analysis.plot_holes.len(), 1);
    assert_eq!(analysis.plot_holes[0].kind, PlotHoleKind::Character);
    assert!(analysis.plot_holes[0].description.contains("Mira"));
}

#[test]
fn test_clean_manuscript_scores_perfect_with_positive_framing() {
    let chapters = vec![
        ChapterBuilder::new("ch1", 0)
            .content("Rain fell over the harbour while the ships waited.")
            .build(),
        ChapterBuilder::new("ch2", 1)
            .content("The merchants argued about prices until dusk.")
            .build(),
    ];
    let signals = TextSignalExtractor::new().extract(&chapters, &[]);
    let analysis = PlotHoleDetector::new().detect(&chapters, &[], &signals);

    assert!(analysis.plot_holes.is_empty());
    assert_eq!(analysis.score, 100);
    assert!(analysis.summary.contains("holds together well"));
}

// ============================================================================
// SCORE PROPERTIES
// ============================================================================

fn severity_from(index: u8) -> Severity {
    match index {
        0 => Severity::Low,
        1 => Severity::Medium,
        2 => Severity::High,
        _ => Severity::Critical,
    }
}

proptest! {
    /// Adding a hole never raises the score.
    #[test]
    fn prop_score_never_increases_when_holes_added(
        severities in proptest::collection::vec(0u8..4, 0..12),
        extra in 0u8..4,
    ) {
        let holes: Vec<PlotHole> = severities
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                PlotHole::new(
                    PlotHoleKind::Logical,
                    severity_from(s),
                    "A finding with enough descriptive text to satisfy the minimum length.",
                    vec![format!("ch{}", i)],
                )
            })
            .collect();
        let base = calculate_score(&holes);

        let mut more = holes.clone();
        more.push(PlotHole::new(
            PlotHoleKind::Timeline,
            severity_from(extra),
            "A finding with enough descriptive text to satisfy the minimum length.",
            vec!["ch-extra".to_string()],
        ));

        prop_assert!(calculate_score(&more) <= base);
    }

    /// Raising one hole's severity never raises the score.
    #[test]
    fn prop_score_monotone_in_severity(low in 0u8..4, high in 0u8..4) {
        prop_assume!(low <= high);
        let make = |s: Severity| {
            vec![PlotHole::new(
                PlotHoleKind::Logical,
                s,
                "A finding with enough descriptive text to satisfy the minimum length.",
                vec!["ch1".to_string()],
            )]
        };
        prop_assert!(
            calculate_score(&make(severity_from(high)))
                <= calculate_score(&make(severity_from(low)))
        );
    }
}
