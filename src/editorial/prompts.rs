/*!
 * Prompt templates for the editorial stages.
 *
 * Analysis templates take a `{style_guidelines}` placeholder that is filled
 * with whatever the style stage produced (possibly nothing).
 */

use crate::editorial::suggestion::{Suggestion, SuggestionKind};

/// Separator between corpus documents in the style prompt
pub const CORPUS_SEPARATOR: &str = "\n\n---\n\n";

/// System prompt for deriving style guidelines
pub const STYLE_SYSTEM: &str = r#"You are an experienced editor. Describe the writing style of a blog so that other editors can keep new posts consistent with it.

Cover tone and register, sentence length, person and tense, formatting habits, recurring vocabulary and anything the author clearly avoids. Be concrete and brief; a list of rules is best."#;

const TYPO_SYSTEM: &str = r#"You are a meticulous proofreader. Find spelling, grammar and punctuation mistakes in the draft.

## Style guidelines
{style_guidelines}

## Rules
- `original_text` must be copied exactly from the draft, long enough to be unique
- `proposed_text` replaces `original_text` and nothing else
- Do not rewrite for style; only fix errors
- Ignore HTML markup and never propose changes to it"#;

const STRUCTURE_SYSTEM: &str = r#"You are a structural editor. Suggest changes that improve how the draft is organised: paragraph breaks, ordering of ideas, headings, transitions, length of sections.

## Style guidelines
{style_guidelines}

## Rules
- `original_text` must be copied exactly from the draft, long enough to be unique
- `proposed_text` replaces `original_text` and nothing else
- Respect the style guidelines; do not impose a different voice
- Ignore HTML markup and never propose changes to it"#;

const COHERENCE_SYSTEM: &str = r#"You are a line editor focused on coherence. Find contradictions, unclear references, logical gaps and sentences that do not follow from the previous ones.

## Style guidelines
{style_guidelines}

## Rules
- `original_text` must be copied exactly from the draft, long enough to be unique
- `proposed_text` replaces `original_text` and nothing else
- Keep the author's meaning; clarify rather than rewrite
- Ignore HTML markup and never propose changes to it"#;

/// System prompt for whole-tree rewrites
pub const REWRITE_SYSTEM: &str = r#"You update Lexical editor documents. You receive a Lexical JSON document and a list of approved text changes.

Apply every change to the text nodes of the document and return the complete updated Lexical JSON as a string in `body`. Keep every node, attribute and formatting flag that the changes do not touch exactly as it was."#;

/// System prompt of an analysis stage, with the guidelines filled in
pub fn analysis_system(kind: SuggestionKind, style_guidelines: &str) -> String {
    let template = match kind {
        SuggestionKind::Typo => TYPO_SYSTEM,
        SuggestionKind::Structure => STRUCTURE_SYSTEM,
        SuggestionKind::Coherence => COHERENCE_SYSTEM,
    };
    template.replace("{style_guidelines}", style_guidelines)
}

/// User prompt of an analysis stage
pub fn analysis_user(kind: SuggestionKind, content: &str) -> String {
    let task = match kind {
        SuggestionKind::Typo => "Check this content for typos",
        SuggestionKind::Structure => "Analyze the structure of this content",
        SuggestionKind::Coherence => "Check the coherence of this content",
    };
    format!("{}:\n\n{}", task, content)
}

/// User prompt for style derivation from a corpus of published posts
pub fn style_from_corpus(count: usize, corpus: &str) -> String {
    format!(
        "Here are the last {} published posts from the blog:\n\n{}\n\nAnalyze these posts to create a comprehensive style guide for this blog.",
        count, corpus
    )
}

/// User prompt for style derivation from the draft alone
pub fn style_from_draft(content: &str) -> String {
    format!("Analyze the style of this text:\n\n{}", content)
}

/// User prompt for a whole-tree rewrite
pub fn rewrite_user(lexical: &str, changes: &[Suggestion]) -> String {
    let mut prompt = format!("Current Lexical JSON:\n{}\n\nApproved changes:\n", lexical);
    for (index, change) in changes.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. Replace \"{}\" with \"{}\" (reason: {})\n",
            index + 1,
            change.original_text,
            change.proposed_text,
            change.reasoning
        ));
    }
    prompt
}
