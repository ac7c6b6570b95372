use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use similar::{ChangeTag, TextDiff};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::audit::{AuditSink, NullAuditSink, SqliteAuditSink};
use crate::database::{SessionOutcome, SessionStatus};
use crate::document::{Document, DocumentStatus};
use crate::editorial::guard::ConflictGuard;
use crate::editorial::patcher::{PatchResult, Patcher};
use crate::editorial::pipeline::{EditorialPipeline, PipelineConfig, PipelineProgress, PipelineResult};
use crate::editorial::review::{advance_review, ReviewDecision, ReviewItem, ReviewState};
use crate::editorial::suggestion::Suggestion;
use crate::errors::{AppError, ApplyError};
use crate::providers::{self, CompletionProvider};
use crate::store::{DocumentStore, GhostClient};

// @module: Application controller for editorial review sessions

/// Interactive side of a review session
pub trait Reviewer: Send {
    /// Decide on the suggestion currently presented
    ///
    /// An error ends the session without writing anything.
    fn decide(&mut self, item: &ReviewItem<'_>) -> Result<ReviewDecision>;

    /// Show the patched body before it is written, or instead of writing on
    /// a dry run
    fn show_preview(&mut self, preview: &WritePreview<'_>) -> Result<()>;

    /// Confirm the final write
    fn confirm_write(&mut self, preview: &WritePreview<'_>) -> Result<bool>;
}

/// What is about to be written, shown before confirmation
#[derive(Debug)]
pub struct WritePreview<'a> {
    /// Document as read
    pub document: &'a Document,
    /// Patch about to be written
    pub patch: &'a PatchResult,
    /// Fraction of visible text the patch removes
    pub shrink_ratio: f64,
    /// Whether `shrink_ratio` exceeds the configured threshold
    pub exceeds_threshold: bool,
}

impl WritePreview<'_> {
    /// Patched body as it will be stored; trees are pretty-printed
    pub fn rendered_body(&self) -> String {
        self.patch.body.rendered()
    }

    /// Word diff of the visible text before and after the patch
    pub fn visible_diff(&self) -> String {
        word_diff(
            &self.patch.original_text(&self.document.body),
            &self.patch.body.visible_text(),
        )
    }
}

/// Switches for one session
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Patch but never write
    pub dry_run: bool,
    /// Write without asking, unless the deletion threshold is exceeded
    pub assume_yes: bool,
    /// Show a spinner while the pipeline runs
    pub show_progress: bool,
}

/// Everything a finished session produced
#[derive(Debug)]
pub struct SessionReport {
    /// Audit session identifier
    pub session_id: String,
    /// Reviewed document as read
    pub document: Document,
    /// Pipeline output
    pub pipeline: PipelineResult,
    /// Number of approved suggestions
    pub approved: usize,
    /// Patch, when anything was approved
    pub patch: Option<PatchResult>,
    /// Final status
    pub status: SessionStatus,
    /// Document as saved, when written
    pub saved: Option<Document>,
}

/// Main application controller for review sessions
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Completion capability shared by pipeline and patcher
    provider: Arc<dyn CompletionProvider>,
    // @field: Document store
    store: Arc<dyn DocumentStore>,
    // @field: Audit trail
    audit: Arc<dyn AuditSink>,
    // @field: Session switches
    options: SessionOptions,
}

impl Controller {
    /// Create a controller from explicit parts, with auditing disabled
    pub fn new(
        config: Config,
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config,
            provider,
            store,
            audit: Arc::new(NullAuditSink),
            options: SessionOptions::default(),
        }
    }

    // @method: Create a controller wired from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = providers::build_provider(&config.completion)
            .context("Failed to create completion provider")?;
        let store = GhostClient::new(&config.store.url, &config.store.admin_api_key)
            .map_err(AppError::from)
            .context("Failed to create Ghost client")?;

        let audit: Arc<dyn AuditSink> = match (config.audit.enabled, config.audit_database_path()) {
            (true, Some(path)) => match SqliteAuditSink::open(&path) {
                Ok(sink) => Arc::new(sink),
                Err(e) => {
                    warn!("Audit trail disabled: {}", e);
                    Arc::new(NullAuditSink)
                }
            },
            (true, None) => {
                warn!("Audit trail disabled: no data directory");
                Arc::new(NullAuditSink)
            }
            (false, _) => Arc::new(NullAuditSink),
        };

        Ok(Self::new(config, provider, Arc::new(store)).with_audit(audit))
    }

    /// Record sessions in `audit`
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Set the session switches
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// List drafts, newest first
    pub async fn list_drafts(&self, limit: usize) -> Result<Vec<Document>> {
        let drafts = self
            .store
            .list_documents(Some(DocumentStatus::Draft), limit)
            .await
            .map_err(AppError::from)
            .context("Failed to list drafts")?;
        debug!("Store returned {} draft(s)", drafts.len());
        Ok(drafts)
    }

    /// Run a complete review session on one document
    pub async fn review(&self, document_id: &str, reviewer: &mut dyn Reviewer) -> Result<SessionReport> {
        let start_time = std::time::Instant::now();

        let document = self
            .store
            .get_document(document_id)
            .await
            .map_err(AppError::from)
            .with_context(|| format!("Failed to read document {}", document_id))?;

        let session_id = uuid::Uuid::new_v4().to_string();
        info!(
            "Session {} on '{}' ({} body, version {})",
            session_id,
            document.title,
            document.body.representation(),
            document.updated_at
        );
        self.audit
            .session_started(
                &session_id,
                &document,
                self.provider.name(),
                &self.config.completion.get_model(),
            )
            .await;

        let guard = ConflictGuard::capture(&document);

        let pipeline = self.run_pipeline(&document).await;
        self.audit
            .suggestions_recorded(&session_id, &pipeline.suggestions)
            .await;

        let approved = match self.collect_decisions(&session_id, &pipeline, reviewer).await {
            Ok(approved) => approved,
            Err(e) => {
                let outcome = SessionOutcome::new(SessionStatus::Cancelled, 0, 0).with_detail(e.to_string());
                self.audit.session_finished(&session_id, &outcome).await;
                return Err(e.context("Review aborted"));
            }
        };

        let mut report = SessionReport {
            session_id: session_id.clone(),
            document: document.clone(),
            pipeline,
            approved: approved.len(),
            patch: None,
            status: SessionStatus::Unchanged,
            saved: None,
        };

        if approved.is_empty() {
            info!("Nothing approved; document left untouched");
            let detail = report.pipeline.error.clone();
            return Ok(self.finish(report, detail).await);
        }

        let patcher = Patcher::new(self.config.review.tree_strategy, self.provider.clone());
        let patch = patcher.apply(&document, &approved).await;
        for degradation in &patch.degradations {
            warn!("{}", degradation);
        }
        for unmatched in &patch.unmatched {
            warn!("Could not locate '{}' in the document", unmatched.excerpt);
        }
        info!(
            "Patched with {}: {}/{} applied",
            patch.strategy,
            patch.applied,
            approved.len()
        );

        if !patch.has_changes() {
            report.patch = Some(patch);
            return Ok(self.finish(report, None).await);
        }

        let shrink_ratio = patch.shrink_ratio(&document.body);
        let exceeds_threshold = shrink_ratio > self.config.review.deletion_warning_threshold;
        if exceeds_threshold {
            warn!(
                "Patch removes {:.0}% of the visible text (threshold {:.0}%)",
                shrink_ratio * 100.0,
                self.config.review.deletion_warning_threshold * 100.0
            );
        }

        let preview = WritePreview {
            document: &document,
            patch: &patch,
            shrink_ratio,
            exceeds_threshold,
        };
        if let Err(e) = reviewer.show_preview(&preview) {
            warn!("Could not show preview: {}", e);
        }

        if self.options.dry_run {
            info!("Dry run: not writing {}", document.id);
            report.patch = Some(patch);
            report.status = SessionStatus::DryRun;
            return Ok(self.finish(report, None).await);
        }

        if !self.options.assume_yes || exceeds_threshold {
            let confirmed = match reviewer.confirm_write(&preview) {
                Ok(confirmed) => confirmed,
                Err(e) => {
                    warn!("Confirmation failed: {}", e);
                    false
                }
            };
            if !confirmed {
                info!("Write declined; document left untouched");
                report.patch = Some(patch);
                report.status = SessionStatus::Cancelled;
                return Ok(self.finish(report, None).await);
            }
        }

        let body = patch.body.clone();
        report.patch = Some(patch);

        match guard.apply(self.store.as_ref(), body).await {
            Ok(saved) => {
                info!(
                    "Session {} finished in {}",
                    session_id,
                    Self::format_duration(start_time.elapsed())
                );
                report.status = SessionStatus::Applied;
                report.saved = Some(saved);
                Ok(self.finish(report, None).await)
            }
            Err(e) => {
                let status = match &e {
                    ApplyError::Conflict(_) => SessionStatus::Conflict,
                    ApplyError::Transport(_) => SessionStatus::Failed,
                };
                error!("{}", e);
                report.status = status;
                self.finish(report, Some(e.to_string())).await;
                Err(AppError::from(e).into())
            }
        }
    }

    async fn run_pipeline(&self, document: &Document) -> PipelineResult {
        let pipeline = EditorialPipeline::new(PipelineConfig::from_config(&self.config), self.provider.clone())
            .with_store(self.store.clone());

        if !self.options.show_progress {
            return pipeline.run(document).await;
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(120));

        let callback = |progress: &PipelineProgress| spinner.set_message(progress.status());
        let result = pipeline.run_with_progress(document, Some(&callback)).await;

        spinner.finish_with_message(format!(
            "Analysis done: {} suggestion(s)",
            result.suggestions.len()
        ));
        result
    }

    async fn collect_decisions(
        &self,
        session_id: &str,
        pipeline: &PipelineResult,
        reviewer: &mut dyn Reviewer,
    ) -> Result<Vec<Suggestion>> {
        let mut state = ReviewState::start(pipeline.suggestions.clone());

        while let Some(item) = state.current() {
            let position = item.position;
            let decision = reviewer.decide(&item)?;
            debug!("Suggestion {} {}d", position, decision.as_str());
            self.audit.decision_recorded(session_id, position, decision).await;
            state = advance_review(state, decision);
        }

        Ok(state.into_approved().unwrap_or_default())
    }

    async fn finish(&self, report: SessionReport, detail: Option<String>) -> SessionReport {
        let applied = report.patch.as_ref().map(|p| p.applied).unwrap_or(0);
        let mut outcome = SessionOutcome::new(report.status, report.approved, applied);
        if let Some(detail) = detail {
            outcome = outcome.with_detail(detail);
        }
        self.audit.session_finished(&report.session_id, &outcome).await;
        report
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Word-level diff of `original` against `proposed`, with ANSI colours:
/// removed words red and struck through, inserted words green
pub fn word_diff(original: &str, proposed: &str) -> String {
    let diff = TextDiff::from_words(original, proposed);
    let mut rendered = String::new();

    for change in diff.iter_all_changes() {
        let value = change.value();
        match change.tag() {
            ChangeTag::Equal => rendered.push_str(value),
            ChangeTag::Delete => rendered.push_str(&format!("\x1B[31;9m{}\x1B[0m", value)),
            ChangeTag::Insert => rendered.push_str(&format!("\x1B[32m{}\x1B[0m", value)),
        }
    }

    rendered
}
