/*!
 * Tests for applying approved suggestions to documents
 */

use serde_json::json;
use std::sync::Arc;

use proofreader::document::{Document, DocumentBody, LexicalTree, VersionStamp};
use proofreader::editorial::patcher::Degradation;
use proofreader::editorial::{apply_approved, PatchStrategy, PatchedBody, Patcher, Suggestion, SuggestionKind, TreeStrategy};
use proofreader::providers::{MockProvider, ResponseSchema};
use proofreader::store::BodyUpdate;

use crate::common;

fn typo(original: &str, proposed: &str) -> Suggestion {
    Suggestion::new(SuggestionKind::Typo, original, proposed)
}

fn leaves(body: &PatchedBody) -> Vec<String> {
    let PatchedBody::Tree(raw) = body else {
        panic!("expected a tree body, got {:?}", body);
    };
    LexicalTree::parse(raw)
        .unwrap()
        .text_leaves()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Test that edits are applied in order, each on the result of the previous one
#[test]
fn test_applyApproved_withChainedEdits_shouldApplySequentially() {
    let document = common::lexical_draft("p1", &["The colour is grey."]);
    let approved = vec![typo("colour", "color"), typo("color is grey", "color is gray")];

    let result = apply_approved(&document, &approved);

    assert_eq!(result.applied, 2);
    assert_eq!(leaves(&result.body), vec!["The color is gray."]);
    assert_eq!(result.strategy, PatchStrategy::Splice);
    assert!(!result.is_degraded());
}

/// Test that only the first occurrence in document order changes
#[test]
fn test_applyApproved_withRepeatedFragment_shouldEditFirstLeafOnly() {
    let document = common::lexical_draft("p1", &["teh start", "teh middle", "teh end"]);

    let result = apply_approved(&document, &[typo("teh", "the")]);

    assert_eq!(leaves(&result.body), vec!["the start", "teh middle", "teh end"]);
}

/// Test mixed matched and unmatched suggestions
#[test]
fn test_applyApproved_withSomeUnmatched_shouldReportThem() {
    let document = common::lexical_draft("p1", &["A short paragraph."]);
    let approved = vec![
        typo("short", "brief"),
        typo("missing words", "other words"),
        typo("paragraph", "section"),
    ];

    let result = apply_approved(&document, &approved);

    assert_eq!(result.applied, 2);
    assert_eq!(result.unmatched.len(), 1);
    assert_eq!(result.unmatched[0].excerpt, "missing words");
    assert_eq!(leaves(&result.body), vec!["A brief section."]);
}

/// Test that an entirely unmatched tree patch keeps the exact input bytes
#[test]
fn test_applyApproved_withNothingMatched_shouldKeepTreeBytes() {
    let document = common::lexical_draft("p1", &["Nothing to see."]);
    let DocumentBody::Tree { lexical, .. } = &document.body else {
        unreachable!()
    };

    let result = apply_approved(&document, &[typo("absent", "present")]);

    assert_eq!(result.body, PatchedBody::Tree(lexical.clone()));
    assert!(!result.has_changes());
}

/// Test that a legacy body is patched as flat HTML
#[test]
fn test_applyApproved_withLegacyBody_shouldPatchHtmlAndReportDegradation() {
    let document = Document::new(
        "p1",
        "Old post",
        DocumentBody::Legacy {
            mobiledoc: r#"{"version":"0.3.1"}"#.to_string(),
            html: Some("<p>Recieve this.</p>".to_string()),
        },
        VersionStamp::new(common::STAMP),
    );

    let result = apply_approved(&document, &[typo("Recieve", "Receive")]);

    assert_eq!(result.body, PatchedBody::Flat("<p>Receive this.</p>".to_string()));
    assert_eq!(result.degradations, vec![Degradation::NoTree { representation: "mobiledoc" }]);
    assert_eq!(BodyUpdate::from(result.body).representation(), "html");
}

/// Test the shrink ratio of a large deletion
#[test]
fn test_shrinkRatio_withLargeDeletion_shouldExceedDefaultThreshold() {
    let document = common::lexical_draft("p1", &["Keep. Drop all of this rambling text."]);

    let result = apply_approved(&document, &[typo(" Drop all of this rambling text.", "")]);

    let ratio = result.shrink_ratio(&document.body);
    assert!(ratio > 0.2, "ratio was {}", ratio);
    assert_eq!(leaves(&result.body), vec!["Keep."]);
}

/// Test that growing text has a zero shrink ratio
#[test]
fn test_shrinkRatio_withInsertion_shouldBeZero() {
    let document = Document::flat("p1", "Draft", "<p>Short.</p>");

    let result = apply_approved(&document, &[typo("Short.", "Much longer now.")]);

    assert_eq!(result.shrink_ratio(&document.body), 0.0);
}

/// Test the rewrite strategy end to end through the provider
#[tokio::test]
async fn test_patcher_withRewriteStrategy_shouldSendTreeAndChanges() {
    let document = common::lexical_draft("p1", &["The team recieve it."]);
    let rewritten = common::lexical_doc(&["The team receives it."]);
    let provider = Arc::new(MockProvider::scripted(vec![Ok(json!({ "body": rewritten }))]));
    let patcher = Patcher::new(TreeStrategy::Rewrite, provider.clone());

    let result = patcher.apply(&document, &[typo("recieve", "receives")]).await;

    assert_eq!(result.strategy, PatchStrategy::Rewrite);
    assert_eq!(result.body, PatchedBody::Tree(rewritten));
    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].schema, ResponseSchema::Rewrite);
    assert!(requests[0].user.contains("recieve"));
    assert!(requests[0].user.contains("receives"));
}

/// Test that a blank rewrite falls back to the flat HTML
#[tokio::test]
async fn test_patcher_withBlankRewrite_shouldFallBackToFlat() {
    let document = common::lexical_draft("p1", &["The team recieve it."]);
    let provider = Arc::new(MockProvider::scripted(vec![Ok(json!({ "body": "  " }))]));
    let patcher = Patcher::new(TreeStrategy::Rewrite, provider);

    let result = patcher.apply(&document, &[typo("recieve", "receive")]).await;

    assert_eq!(result.strategy, PatchStrategy::Flat);
    assert_eq!(result.body, PatchedBody::Flat("<p>The team receive it.</p>".to_string()));
    assert!(matches!(result.degradations.as_slice(), [Degradation::RewriteFailed(_)]));
}

/// Test the worked typo example on a flat body
#[test]
fn test_applyApproved_withFlatBody_shouldReplaceMatchingFragment() {
    let document = Document::flat("p1", "Draft", "The team recieve the results.");

    let result = apply_approved(&document, &[typo("recieve", "receives")]);

    assert_eq!(result.body, PatchedBody::Flat("The team receives the results.".to_string()));
    assert_eq!(result.body.as_str().as_bytes(), b"The team receives the results.");
    assert_eq!(result.applied, 1);
    assert!(result.unmatched.is_empty());
}

/// Test that a fragment absent from a flat body leaves it byte-identical
#[test]
fn test_applyApproved_withFlatBodyAndAbsentFragment_shouldReportUnmatched() {
    let document = Document::flat("p1", "Draft", "The team recieve the results.");

    let result = apply_approved(&document, &[typo("recieves", "receives")]);

    assert_eq!(result.body.as_str().as_bytes(), b"The team recieve the results.");
    assert_eq!(result.applied, 0);
    assert!(!result.has_changes());
    assert_eq!(result.unmatched.len(), 1);
    assert_eq!(result.unmatched[0].excerpt, "recieves");
}

/// Test that a truncated rewrite counts as removing the whole text
#[tokio::test]
async fn test_shrinkRatio_withTruncatedRewrite_shouldBeFull() {
    let document = common::lexical_draft("p1", &["The team recieve it."]);
    let truncated = r#"{"root":{"children":[{"children":[{"text":"The te"#;
    let provider = Arc::new(MockProvider::scripted(vec![Ok(json!({ "body": truncated }))]));
    let patcher = Patcher::new(TreeStrategy::Rewrite, provider);

    let result = patcher.apply(&document, &[typo("recieve", "receives")]).await;

    assert_eq!(result.body, PatchedBody::Tree(truncated.to_string()));
    assert_eq!(result.shrink_ratio(&document.body), 1.0);
}

/// Test that tree bodies are pretty-printed for display
#[test]
fn test_rendered_withTreeBody_shouldPrettyPrint() {
    let document = common::lexical_draft("p1", &["The team recieve it."]);

    let result = apply_approved(&document, &[typo("recieve", "receives")]);
    let rendered = result.body.rendered();

    assert!(rendered.contains("\n"));
    assert!(rendered.contains("\"text\": \"The team receives it.\""));
    assert_eq!(PatchedBody::Flat("<p>x</p>".to_string()).rendered(), "<p>x</p>");
}
