//! Integration tests for external augmentation and its fallback paths.

mod common;

use std::sync::Arc;

use fabula::augment::{AugmentError, MockCompletionProvider, NoopCompletionProvider};
use fabula::models::{AnalysisOptions, DegradedReason, Severity};
use fabula::services::{PlotHoleDetector, ThreadConfig};
use fabula::AnalysisOrchestrator;
use pretty_assertions::assert_eq;

use common::builders::ChapterBuilder;

fn augmented() -> AnalysisOptions {
    AnalysisOptions {
        use_external_augmentation: true,
    }
}

/// A manuscript the classifier cannot place, so augmentation always has
/// something to refine.
fn unclassifiable_manuscript() -> Vec<fabula::models::Chapter> {
    vec![
        ChapterBuilder::new("ch1", 0)
            .content("They talked about the weather for a while.")
            .build(),
        ChapterBuilder::new("ch2", 1)
            .content("Lunch was served cold, as always.")
            .build(),
    ]
}

#[tokio::test]
async fn test_unavailable_provider_degrades() {
    let orchestrator = AnalysisOrchestrator::new("augment")
        .with_provider(Arc::new(NoopCompletionProvider));
    let result = orchestrator
        .analyze(&unclassifiable_manuscript(), &[], &augmented())
        .await
        .expect("analysis");

    assert!(result.degraded);
    assert_eq!(
        result.degraded_reason,
        Some(DegradedReason::AugmentationUnavailable)
    );
}

async fn degraded_reason_for(error: AugmentError) -> Option<DegradedReason> {
    let provider = MockCompletionProvider::default();
    provider.fail_with(error);
    let orchestrator =
        AnalysisOrchestrator::new("augment").with_provider(Arc::new(provider));
    let result = orchestrator
        .analyze(&unclassifiable_manuscript(), &[], &augmented())
        .await
        .expect("analysis");

    assert!(result.degraded);
    result.degraded_reason
}

#[tokio::test]
async fn test_timeout_degrades_with_reason() {
    assert_eq!(
        degraded_reason_for(AugmentError::Timeout).await,
        Some(DegradedReason::AugmentationTimeout)
    );
}

#[tokio::test]
async fn test_rate_limit_degrades_with_reason() {
    assert_eq!(
        degraded_reason_for(AugmentError::RateLimited).await,
        Some(DegradedReason::AugmentationRateLimited)
    );
}

#[tokio::test]
async fn test_auth_failure_degrades_with_reason() {
    assert_eq!(
        degraded_reason_for(AugmentError::Auth).await,
        Some(DegradedReason::AugmentationAuthFailed)
    );
}

#[tokio::test]
async fn test_malformed_response_degrades_with_reason() {
    assert_eq!(
        degraded_reason_for(AugmentError::MalformedResponse("truncated".to_string())).await,
        Some(DegradedReason::AugmentationMalformedResponse)
    );
}

/// A provider failure keeps the heuristic output intact: same findings,
/// same scores as an unaugmented run.
#[tokio::test]
async fn test_failed_augmentation_preserves_heuristic_result() {
    let chapters = unclassifiable_manuscript();

    let plain = AnalysisOrchestrator::new("augment")
        .analyze(&chapters, &[], &AnalysisOptions::default())
        .await
        .expect("plain run");

    let provider = MockCompletionProvider::default();
    provider.fail_with(AugmentError::Timeout);
    let degraded = AnalysisOrchestrator::new("augment")
        .with_provider(Arc::new(provider))
        .analyze(&chapters, &[], &augmented())
        .await
        .expect("degraded run");

    assert_eq!(plain.quality_score, degraded.quality_score);
    assert_eq!(plain.summary, degraded.summary);
    assert_eq!(plain.plot_holes.len(), degraded.plot_holes.len());
}

#[tokio::test]
async fn test_successful_augmentation_refines_wording() {
    // An unresolved setup tuned down to low severity, so its description
    // is eligible for refinement.
    let chapters = vec![
        ChapterBuilder::new("ch1", 0)
            .content(
                "Her mother pressed the silver locket into her hand and vowed she \
                 would understand one day.",
            )
            .build(),
        ChapterBuilder::new("ch2", 1)
            .content("The war ended and everyone went home across the sea.")
            .build(),
    ];

    let provider = MockCompletionProvider::default();
    provider.add_response(
        "Rewrite this manuscript finding",
        "The silver locket is set up in chapter one but never returns.",
    );
    provider.add_response(
        "structural template",
        "Clearer act boundaries would help the pacing.",
    );

    let detector = PlotHoleDetector::new().with_thread_config(ThreadConfig {
        severity: Severity::Low,
        ..Default::default()
    });
    let orchestrator = AnalysisOrchestrator::new("augment")
        .with_plot_hole_detector(detector)
        .with_provider(Arc::new(provider.clone()));

    let result = orchestrator
        .analyze(&chapters, &[], &augmented())
        .await
        .expect("analysis");

    assert!(!result.degraded);
    assert!(result.degraded_reason.is_none());
    assert!(provider.call_count() >= 1);

    let refined = result
        .plot_holes
        .iter()
        .find(|h| h.severity == Severity::Low)
        .expect("low-severity finding");
    assert_eq!(
        refined.description,
        "The silver locket is set up in chapter one but never returns."
    );
}

/// Augmentation off means the provider is never consulted.
#[tokio::test]
async fn test_disabled_augmentation_never_calls_provider() {
    let provider = MockCompletionProvider::default();
    let orchestrator = AnalysisOrchestrator::new("augment")
        .with_provider(Arc::new(provider.clone()));

    let result = orchestrator
        .analyze(&unclassifiable_manuscript(), &[], &AnalysisOptions::default())
        .await
        .expect("analysis");

    assert!(!result.degraded);
    assert_eq!(provider.call_count(), 0);
}
