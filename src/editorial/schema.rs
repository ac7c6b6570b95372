/*!
 * Decoding and validation of completion results.
 *
 * Providers return loosely-typed JSON. Each stage turns it into typed data
 * here, and any shape or content violation becomes a `SchemaError` that the
 * pipeline treats exactly like a transport failure.
 */

use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::editorial::suggestion::Suggestion;
use crate::errors::SchemaError;

#[derive(Debug, Deserialize)]
struct SuggestionsPayload {
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct StylePayload {
    guidelines: String,
}

#[derive(Debug, Deserialize)]
struct RewritePayload {
    body: String,
}

fn decode<T: DeserializeOwned>(schema: &'static str, value: Value) -> Result<T, SchemaError> {
    if !value.is_object() {
        let preview: String = value.to_string().chars().take(200).collect();
        return Err(SchemaError::NoJson(preview));
    }

    serde_json::from_value(value).map_err(|e| SchemaError::Mismatch {
        schema,
        message: e.to_string(),
    })
}

/// Decode a suggestions result
///
/// Suggestions with an empty `original_text` cannot be located and are
/// dropped individually.
pub fn decode_suggestions(value: Value) -> Result<Vec<Suggestion>, SchemaError> {
    let payload: SuggestionsPayload = decode("suggestions", value)?;

    Ok(payload
        .suggestions
        .into_iter()
        .filter(|suggestion| {
            let keep = !suggestion.original_text.is_empty();
            if !keep {
                warn!(
                    "Dropping {} suggestion without original text ({})",
                    suggestion.kind, suggestion.location
                );
            }
            keep
        })
        .collect())
}

/// Decode a style result
pub fn decode_guidelines(value: Value) -> Result<String, SchemaError> {
    let payload: StylePayload = decode("style", value)?;
    Ok(payload.guidelines)
}

/// Decode a rewrite result; the body must not be blank
pub fn decode_rewrite(value: Value) -> Result<String, SchemaError> {
    let payload: RewritePayload = decode("rewrite", value)?;
    if payload.body.trim().is_empty() {
        return Err(SchemaError::Invalid {
            field: "body",
            message: "rewritten body is empty".to_string(),
        });
    }
    Ok(payload.body)
}
