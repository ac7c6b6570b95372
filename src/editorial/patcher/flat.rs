use log::debug;

use crate::editorial::suggestion::Suggestion;

use super::{TextPatch, UnmatchedSuggestion};

/// Apply approved suggestions to flat text, each replacing the first
/// literal occurrence of its fragment
pub fn patch_flat(text: &str, approved: &[Suggestion]) -> TextPatch {
    let mut body = text.to_string();
    let mut applied = 0;
    let mut unmatched = Vec::new();

    for suggestion in approved {
        let original = suggestion.original_text.as_str();
        match body.find(original).filter(|_| !original.is_empty()) {
            Some(start) => {
                body.replace_range(start..start + original.len(), &suggestion.proposed_text);
                applied += 1;
            }
            None => {
                debug!("Flat text does not contain '{}'", suggestion.excerpt());
                unmatched.push(UnmatchedSuggestion::from(suggestion));
            }
        }
    }

    TextPatch {
        body,
        applied,
        unmatched,
    }
}
