/*!
 * Common test utilities for the proofreader test suite
 */

use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use proofreader::app_config::Config;
use proofreader::app_controller::{Reviewer, WritePreview};
use proofreader::document::{Document, DocumentBody, DocumentStatus, VersionStamp};
use proofreader::editorial::review::{ReviewDecision, ReviewItem};

/// Version stamp used by fixture documents
pub const STAMP: &str = "2024-05-01T10:00:00.000Z";

/// Admin API key accepted by `GhostClient`
pub const ADMIN_KEY: &str =
    "6489c6d1a8b1c2d3e4f5a6b7:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Route library logs through the test harness; `RUST_LOG` selects the level
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Serialized Lexical document with one paragraph per entry
pub fn lexical_doc(paragraphs: &[&str]) -> String {
    let children: Vec<String> = paragraphs
        .iter()
        .map(|text| {
            format!(
                r#"{{"children":[{{"detail":0,"format":0,"mode":"normal","style":"","text":{},"type":"text","version":1}}],"direction":"ltr","format":"","indent":0,"type":"paragraph","version":1}}"#,
                serde_json::to_string(text).unwrap()
            )
        })
        .collect();

    format!(
        r#"{{"root":{{"children":[{}],"direction":"ltr","format":"","indent":0,"type":"root","version":1}}}}"#,
        children.join(",")
    )
}

/// Draft with a Lexical body and a matching HTML rendering
pub fn lexical_draft(id: &str, paragraphs: &[&str]) -> Document {
    let html = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", p))
        .collect::<String>();

    Document::new(
        id,
        "A draft",
        DocumentBody::Tree {
            lexical: lexical_doc(paragraphs),
            html: Some(html),
        },
        VersionStamp::new(STAMP),
    )
}

/// Published post used as style corpus
pub fn published_post(id: &str, html: &str) -> Document {
    Document::flat(id, format!("Post {}", id), html).with_status(DocumentStatus::Published)
}

/// Configuration suitable for running sessions in tests
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.completion.common.stage_delay_ms = 0;
    config.audit.enabled = false;
    config
}

/// Reviewer answering from a script
#[derive(Debug, Default)]
pub struct ScriptedReviewer {
    decisions: VecDeque<ReviewDecision>,
    confirm: bool,
    /// Positions presented, in order
    pub presented: Vec<usize>,
    /// Number of confirmation prompts shown
    pub confirmations: usize,
    /// Whether the last confirmation prompt exceeded the deletion threshold
    pub last_exceeded_threshold: Option<bool>,
    /// Patched bodies shown before writing
    pub previews: Vec<String>,
}

impl ScriptedReviewer {
    /// Reviewer making `decisions` in order and answering `confirm` to the write prompt
    pub fn new(decisions: Vec<ReviewDecision>, confirm: bool) -> Self {
        Self {
            decisions: decisions.into(),
            confirm,
            ..Default::default()
        }
    }

    /// Reviewer approving everything and confirming the write
    pub fn approving(count: usize) -> Self {
        Self::new(vec![ReviewDecision::Approve; count], true)
    }
}

impl Reviewer for ScriptedReviewer {
    fn decide(&mut self, item: &ReviewItem<'_>) -> Result<ReviewDecision> {
        self.presented.push(item.position);
        self.decisions
            .pop_front()
            .ok_or_else(|| anyhow!("reviewer quit at suggestion {}", item.position))
    }

    fn show_preview(&mut self, preview: &WritePreview<'_>) -> Result<()> {
        self.previews.push(preview.rendered_body());
        Ok(())
    }

    fn confirm_write(&mut self, preview: &WritePreview<'_>) -> Result<bool> {
        self.confirmations += 1;
        self.last_exceeded_threshold = Some(preview.exceeds_threshold);
        Ok(self.confirm)
    }
}
