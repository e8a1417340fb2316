//! Timeline contradiction detection.
//!
//! Walks temporal signals in narrative order and flags chapters whose
//! story-time dating contradicts an order already established by an earlier
//! chapter. Explicit flashback markers suppress the flag.

use std::collections::HashSet;

use crate::models::{Chapter, PlotHole, PlotHoleKind, Severity, SignalSet};

/// Tolerance below which a relative shift does not count as a past jump.
const PAST_SHIFT_EPSILON: f32 = 0.05;

/// Detect timeline holes over chapters already sorted into narrative order.
pub(crate) fn detect(ordered_chapters: &[Chapter], signals: &SignalSet) -> Vec<PlotHole> {
    let mut holes = Vec::new();
    // One hole per (established chapter, offending chapter) pair.
    let mut flagged: HashSet<(String, String)> = HashSet::new();
    // Latest story-time year established so far, with the chapter that set it.
    let mut established: Option<(String, i32)> = None;

    for chapter in ordered_chapters {
        for signal in signals.temporal_in(&chapter.id) {
            if let Some(year) = signal.year {
                if let Some((est_chapter, est_year)) = &established {
                    if year < *est_year
                        && !signal.is_flashback_marked
                        && est_chapter != &chapter.id
                        && flagged.insert((est_chapter.clone(), chapter.id.clone()))
                    {
                        holes.push(PlotHole::new(
                            PlotHoleKind::Timeline,
                            Severity::High,
                            format!(
                                "Chapter '{}' dates its events to {} although chapter '{}' \
                                 already established {}, and no flashback framing covers \
                                 the jump backwards in story time.",
                                chapter.id, year, est_chapter, est_year
                            ),
                            vec![est_chapter.clone(), chapter.id.clone()],
                        ));
                    }
                }
            } else {
                // Relative past shift after an explicitly dated event.
                let past_shift =
                    (chapter.order_index as f32) - signal.normalized_order > PAST_SHIFT_EPSILON;
                if past_shift && !signal.is_flashback_marked {
                    if let Some((est_chapter, est_year)) = &established {
                        if est_chapter != &chapter.id
                            && flagged.insert((est_chapter.clone(), chapter.id.clone()))
                        {
                            holes.push(PlotHole::new(
                                PlotHoleKind::Timeline,
                                Severity::High,
                                format!(
                                    "Chapter '{}' steps back in story time (\"{}\") after \
                                     chapter '{}' established events in {}, without any \
                                     flashback marker.",
                                    chapter.id, signal.expression, est_chapter, est_year
                                ),
                                vec![est_chapter.clone(), chapter.id.clone()],
                            ));
                        }
                    }
                }
            }
        }

        // Only unmarked explicit dates establish story-time order.
        for signal in signals.temporal_in(&chapter.id) {
            if let Some(year) = signal.year {
                if !signal.is_flashback_marked {
                    match &established {
                        Some((_, est_year)) if year <= *est_year => {}
                        _ => established = Some((chapter.id.clone(), year)),
                    }
                }
            }
        }
    }

    holes
}
