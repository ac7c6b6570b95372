/*!
 * Pipeline orchestrator for the editorial stages.
 *
 * The orchestrator runs an explicit, ordered list of stages:
 * 1. Style: derive guidelines from published posts (or the draft)
 * 2. Typo: spelling and grammar suggestions
 * 3. Structure: organisation suggestions
 * 4. Coherence: logical-flow suggestions
 *
 * Completion calls are awaited one after the other. A failing stage
 * contributes nothing and the run carries on.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::document::Document;
use crate::editorial::suggestion::Suggestion;
use crate::errors::StageError;
use crate::providers::CompletionProvider;
use crate::store::DocumentStore;

use super::stages;
use super::state::{PipelineState, Stage, StageFailure};

/// Configuration for the editorial pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of published documents fetched for style derivation
    pub corpus_size: usize,

    /// Pause between consecutive stages
    pub stage_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus_size: 15,
            stage_delay: Duration::ZERO,
        }
    }
}

impl PipelineConfig {
    /// Build from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            corpus_size: config.review.corpus_size,
            stage_delay: Duration::from_millis(config.completion.common.stage_delay_ms),
        }
    }

    /// Set the pause between stages
    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    /// Set the corpus size
    pub fn with_corpus_size(mut self, corpus_size: usize) -> Self {
        self.corpus_size = corpus_size;
        self
    }
}

/// Progress information during pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineProgress {
    /// Stage about to run
    pub stage: Stage,

    /// 1-based position of the stage
    pub position: usize,

    /// Number of stages
    pub total: usize,

    /// Suggestions collected before this stage
    pub suggestions_so_far: usize,
}

impl PipelineProgress {
    /// Status line for display
    pub fn status(&self) -> String {
        format!("[{}/{}] Running {}...", self.position, self.total, self.stage)
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Guidelines from the style stage; `None` if it failed
    pub guidelines: Option<String>,

    /// Suggestions from all analysis stages, in stage order
    pub suggestions: Vec<Suggestion>,

    /// Stages that contributed nothing because they failed
    pub failures: Vec<StageFailure>,

    /// Set when no analysis stage completed
    pub error: Option<String>,

    /// Total duration of the run
    pub duration: Duration,
}

impl PipelineResult {
    /// Whether a given stage failed
    pub fn stage_failed(&self, stage: Stage) -> bool {
        self.failures.iter().any(|f| f.stage == stage)
    }

    /// Get a summary of the pipeline result.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        parts.push(format!("Duration: {:.2}s", self.duration.as_secs_f32()));
        parts.push(format!("Suggestions: {}", self.suggestions.len()));
        parts.push(format!(
            "Style: {}",
            match &self.guidelines {
                Some(g) if !g.is_empty() => "derived",
                _ => "none",
            }
        ));

        if !self.failures.is_empty() {
            let failed: Vec<&str> = self.failures.iter().map(|f| f.stage.label()).collect();
            parts.push(format!("Failed: {}", failed.join(", ")));
        }

        parts.join(" | ")
    }
}

/// The editorial pipeline orchestrator.
#[derive(Debug)]
pub struct EditorialPipeline {
    config: PipelineConfig,
    provider: Arc<dyn CompletionProvider>,
    store: Option<Arc<dyn DocumentStore>>,
}

impl EditorialPipeline {
    /// Create a pipeline using `provider` for every stage
    pub fn new(config: PipelineConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            config,
            provider,
            store: None,
        }
    }

    /// Use `store` as the source of the style corpus
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run every stage over `document`
    pub async fn run(&self, document: &Document) -> PipelineResult {
        self.run_with_progress(document, None).await
    }

    /// Run every stage over `document`, reporting each stage before it starts
    pub async fn run_with_progress(
        &self,
        document: &Document,
        progress_callback: Option<&(dyn Fn(&PipelineProgress) + Send + Sync)>,
    ) -> PipelineResult {
        let start_time = Instant::now();
        let mut state = PipelineState::new(document);
        let total = Stage::ORDER.len();

        info!(
            "Reviewing '{}' ({} body)",
            document.title,
            document.body.representation()
        );

        for (index, stage) in Stage::ORDER.into_iter().enumerate() {
            if index > 0 && !self.config.stage_delay.is_zero() {
                tokio::time::sleep(self.config.stage_delay).await;
            }

            if let Some(callback) = progress_callback {
                callback(&PipelineProgress {
                    stage,
                    position: index + 1,
                    total,
                    suggestions_so_far: state.suggestions().len(),
                });
            }

            self.run_stage(stage, &mut state).await;
        }

        state.settle();
        if let Some(error) = state.error() {
            warn!("{}", error);
        }

        let parts = state.into_parts();
        let result = PipelineResult {
            guidelines: parts.guidelines,
            suggestions: parts.suggestions,
            failures: parts.failures,
            error: parts.error,
            duration: start_time.elapsed(),
        };
        info!("Pipeline finished: {}", result.summary());
        result
    }

    async fn run_stage(&self, stage: Stage, state: &mut PipelineState<'_>) {
        let provider = self.provider.as_ref();
        let document = state.document();

        let outcome: Result<(), StageError> = match stage.suggestion_kind() {
            None => {
                let corpus = stages::load_corpus(self.store.as_deref(), self.config.corpus_size).await;
                let result = stages::derive_style(provider, document, corpus).await;
                result.map(|guidelines| {
                    debug!("Style guidelines: {} chars", guidelines.len());
                    state.set_guidelines(guidelines);
                })
            }
            Some(kind) => {
                let result = stages::analyse(provider, kind, document, state.guidelines()).await;
                result.map(|suggestions| {
                    debug!("{} produced {} suggestion(s)", stage, suggestions.len());
                    state.extend_suggestions(suggestions);
                })
            }
        };

        if let Err(e) = outcome {
            warn!("{} failed, continuing without it: {}", stage, e);
            state.record_failure(stage, e.to_string());
        }
    }
}

/// Run every stage over `document` with default settings and no corpus store
pub async fn run_pipeline(
    document: &Document,
    provider: Arc<dyn CompletionProvider>,
) -> PipelineResult {
    EditorialPipeline::new(PipelineConfig::default(), provider)
        .run(document)
        .await
}
