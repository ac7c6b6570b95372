/*!
 * In-place splicing of approved edits into a Lexical tree.
 */

use log::debug;

use crate::document::LexicalTree;
use crate::editorial::suggestion::Suggestion;
use crate::errors::TreeError;

use super::{TextPatch, UnmatchedSuggestion};

/// Apply one suggestion to the tree: the exact fragment first, then the
/// trimmed fragment. Returns whether a substitution happened.
///
/// The trimmed path swaps the trimmed fragment for `proposed_text` verbatim,
/// so whitespace carried by `proposed_text` may end up doubled.
pub fn splice_one(tree: &mut LexicalTree, suggestion: &Suggestion) -> bool {
    let original = suggestion.original_text.as_str();
    if original.is_empty() {
        return false;
    }

    if tree.replace_first(original, &suggestion.proposed_text) {
        return true;
    }

    let trimmed = original.trim();
    if trimmed.is_empty() || trimmed == original {
        return false;
    }

    let applied = tree.replace_first(trimmed, &suggestion.proposed_text);
    if applied {
        debug!("Applied '{}' on its trimmed form", suggestion.excerpt());
    }
    applied
}

/// Splice every approved suggestion into the serialized tree, in order
///
/// When nothing applies the original serialization is returned as is.
pub fn splice(lexical: &str, approved: &[Suggestion]) -> Result<TextPatch, TreeError> {
    let mut tree = LexicalTree::parse(lexical)?;
    let mut applied = 0;
    let mut unmatched = Vec::new();

    for suggestion in approved {
        if splice_one(&mut tree, suggestion) {
            applied += 1;
        } else {
            debug!("No text node contains '{}'", suggestion.excerpt());
            unmatched.push(UnmatchedSuggestion::from(suggestion));
        }
    }

    let body = if applied == 0 {
        lexical.to_string()
    } else {
        tree.serialize()?
    };

    Ok(TextPatch {
        body,
        applied,
        unmatched,
    })
}
