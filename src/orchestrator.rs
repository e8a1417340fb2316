//! Analysis pipeline orchestration.
//!
//! [`AnalysisOrchestrator`] runs signal extraction once, fans the three
//! detector pipelines out on blocking worker threads, aggregates the
//! quality score, and optionally passes the result through an external
//! completion provider for wording refinement. Provider failures never
//! fail the run; the heuristic result is returned with a degraded marker.
//!
//! [`CachedAnalysisService`] adds a read-through cache keyed by a content
//! hash of the manuscript and roster.

use chrono::Utc;
use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::augment::{
    AugmentError, CompletionProvider, CompletionRequest, NoopCompletionProvider,
};
use crate::error::FabulaError;
use crate::models::{
    sort_chapters, AnalysisOptions, AnalysisResult, Chapter, Character, DegradedReason, Severity,
    StructureTemplate,
};
use crate::services::{
    CharacterGraphBuilder, PlotHoleDetector, QualityScorer, StoryStructureClassifier,
    TextSignalExtractor,
};

/// Runs the full analysis pipeline for one project.
pub struct AnalysisOrchestrator {
    project_id: String,
    extractor: Arc<TextSignalExtractor>,
    plot_hole_detector: Arc<PlotHoleDetector>,
    graph_builder: Arc<CharacterGraphBuilder>,
    structure_classifier: Arc<StoryStructureClassifier>,
    scorer: QualityScorer,
    provider: Arc<dyn CompletionProvider>,
}

impl AnalysisOrchestrator {
    /// Orchestrator with default services and augmentation disabled.
    pub fn new(project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        info!(project_id, "analysis orchestrator created");
        Self {
            project_id,
            extractor: Arc::new(TextSignalExtractor::new()),
            plot_hole_detector: Arc::new(PlotHoleDetector::new()),
            graph_builder: Arc::new(CharacterGraphBuilder::new()),
            structure_classifier: Arc::new(StoryStructureClassifier::new()),
            scorer: QualityScorer::new(),
            provider: Arc::new(NoopCompletionProvider),
        }
    }

    /// Attach an external completion provider.
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Replace the plot-hole detector (e.g. with a tuned `ThreadConfig`).
    pub fn with_plot_hole_detector(mut self, detector: PlotHoleDetector) -> Self {
        self.plot_hole_detector = Arc::new(detector);
        self
    }

    /// Analyze a manuscript.
    ///
    /// Extraction runs once; the three detector pipelines run concurrently
    /// on blocking worker threads. When `options.use_external_augmentation`
    /// is set, low-severity finding descriptions are refined through the
    /// completion provider; any provider failure returns the heuristic
    /// result with `degraded: true` and a reason code.
    pub async fn analyze(
        &self,
        chapters: &[Chapter],
        characters: &[Character],
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, FabulaError> {
        let mut ordered: Vec<Chapter> = chapters.to_vec();
        sort_chapters(&mut ordered);
        let chapters: Arc<Vec<Chapter>> = Arc::new(ordered);
        let characters: Arc<Vec<Character>> = Arc::new(characters.to_vec());

        let signals = {
            let extractor = Arc::clone(&self.extractor);
            let chapters = Arc::clone(&chapters);
            let characters = Arc::clone(&characters);
            tokio::task::spawn_blocking(move || extractor.extract(&chapters, &characters)).await?
        };
        let signals = Arc::new(signals);
        debug!(
            project_id = self.project_id,
            mentions = signals.mentions.len(),
            interactions = signals.interactions.len(),
            "signal extraction complete"
        );

        let plot_task = {
            let detector = Arc::clone(&self.plot_hole_detector);
            let chapters = Arc::clone(&chapters);
            let characters = Arc::clone(&characters);
            let signals = Arc::clone(&signals);
            tokio::task::spawn_blocking(move || detector.detect(&chapters, &characters, &signals))
        };
        let graph_task = {
            let builder = Arc::clone(&self.graph_builder);
            let project_id = self.project_id.clone();
            let chapters = Arc::clone(&chapters);
            let characters = Arc::clone(&characters);
            let signals = Arc::clone(&signals);
            tokio::task::spawn_blocking(move || {
                builder.build(&project_id, &chapters, &characters, &signals)
            })
        };
        let structure_task = {
            let classifier = Arc::clone(&self.structure_classifier);
            let chapters = Arc::clone(&chapters);
            let signals = Arc::clone(&signals);
            tokio::task::spawn_blocking(move || classifier.classify(&chapters, &signals))
        };

        let (plot, character_graph, story_structure) =
            tokio::try_join!(plot_task, graph_task, structure_task)?;

        let (quality_score, quality, summary) =
            self.scorer
                .score(&plot, &character_graph, &story_structure, chapters.len());

        let mut result = AnalysisResult {
            plot_holes: plot.plot_holes,
            character_graph,
            story_structure,
            quality_score,
            quality,
            summary,
            degraded: false,
            degraded_reason: None,
            analyzed_at: Utc::now(),
        };

        if options.use_external_augmentation {
            self.augment(&mut result).await;
        }

        info!(
            project_id = self.project_id,
            quality = result.quality_score,
            holes = result.plot_holes.len(),
            degraded = result.degraded,
            "analysis complete"
        );
        Ok(result)
    }

    /// Refine wording through the completion provider. Applied atomically:
    /// on any failure the heuristic result is kept untouched and the
    /// degraded marker is set.
    async fn augment(&self, result: &mut AnalysisResult) {
        if !self.provider.is_available() {
            warn!(
                project_id = self.project_id,
                "augmentation requested but provider unavailable"
            );
            result.degraded = true;
            result.degraded_reason = Some(DegradedReason::AugmentationUnavailable);
            return;
        }

        match self.refine(result).await {
            Ok(refined) => *result = refined,
            Err(error) => {
                warn!(project_id = self.project_id, %error, "augmentation failed, keeping heuristic result");
                result.degraded = true;
                result.degraded_reason = Some(map_degraded(&error));
            }
        }
    }

    async fn refine(&self, base: &AnalysisResult) -> Result<AnalysisResult, AugmentError> {
        let mut refined = base.clone();

        // Only low-severity findings get reworded; detection output itself
        // is never altered.
        for hole in refined
            .plot_holes
            .iter_mut()
            .filter(|h| h.severity == Severity::Low)
        {
            let request = CompletionRequest::new(format!(
                "Rewrite this manuscript finding clearly and concisely, \
                 keeping every factual detail intact:\n{}",
                hole.description
            ));
            let response = self.provider.complete(request).await?;
            let text = response.text.trim();
            if !text.is_empty() {
                hole.description = text.to_string();
            }
        }

        if refined.story_structure.template == StructureTemplate::Unknown {
            let request = CompletionRequest::new(
                "In one sentence, describe what a manuscript with no clear \
                 structural template could clarify about its act boundaries.",
            );
            let response = self.provider.complete(request).await?;
            let note = response.text.trim();
            if !note.is_empty() {
                refined.summary = format!("{} {}", refined.summary, note);
            }
        }

        Ok(refined)
    }
}

fn map_degraded(error: &AugmentError) -> DegradedReason {
    match error {
        AugmentError::Timeout => DegradedReason::AugmentationTimeout,
        AugmentError::RateLimited => DegradedReason::AugmentationRateLimited,
        AugmentError::Auth => DegradedReason::AugmentationAuthFailed,
        AugmentError::MalformedResponse(_) => DegradedReason::AugmentationMalformedResponse,
        AugmentError::Http(_) => DegradedReason::AugmentationUnavailable,
    }
}

// =============================================================================
// Cached wrapper
// =============================================================================

/// Read-through cache over the orchestrator, keyed by a content hash of
/// the ordered manuscript, the roster, and the augmentation flag.
pub struct CachedAnalysisService {
    inner: Arc<AnalysisOrchestrator>,
    cache: Cache<String, AnalysisResult>,
}

/// Default cache TTL (5 minutes).
const CACHE_TTL_SECS: u64 = 300;

impl CachedAnalysisService {
    pub fn new(inner: AnalysisOrchestrator) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();
        Self {
            inner: Arc::new(inner),
            cache,
        }
    }

    /// Analyze through the cache. Concurrent identical requests coalesce
    /// onto a single computation per key.
    pub async fn analyze(
        &self,
        chapters: &[Chapter],
        characters: &[Character],
        options: &AnalysisOptions,
    ) -> Result<AnalysisResult, FabulaError> {
        let key = content_hash(chapters, characters, options);
        let inner = Arc::clone(&self.inner);
        let chapters = chapters.to_vec();
        let characters = characters.to_vec();
        let options = options.clone();
        self.cache
            .try_get_with(key.clone(), async move {
                debug!(key, "analysis cache miss");
                inner.analyze(&chapters, &characters, &options).await
            })
            .await
            .map_err(|error: Arc<FabulaError>| (*error).clone())
    }
}

/// Content hash over ordered chapters, roster, and options. Identical
/// inputs map to the same key regardless of input chapter order.
fn content_hash(chapters: &[Chapter], characters: &[Character], options: &AnalysisOptions) -> String {
    let mut ordered: Vec<Chapter> = chapters.to_vec();
    sort_chapters(&mut ordered);

    let mut hasher = DefaultHasher::new();
    for chapter in &ordered {
        chapter.id.hash(&mut hasher);
        chapter.order_index.hash(&mut hasher);
        chapter.content.hash(&mut hasher);
        chapter.summary.hash(&mut hasher);
    }
    for character in characters {
        character.id.hash(&mut hasher);
        character.name.hash(&mut hasher);
        character.aliases.hash(&mut hasher);
        character.role.hash(&mut hasher);
        character.traits.hash(&mut hasher);
    }
    options.use_external_augmentation.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
