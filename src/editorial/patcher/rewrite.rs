/*!
 * Whole-tree rewrite through the completion provider.
 *
 * The provider receives the current serialization and the approved changes
 * and returns a complete new serialization, which is taken verbatim.
 */

use log::info;

use crate::editorial::prompts;
use crate::editorial::schema;
use crate::editorial::suggestion::Suggestion;
use crate::errors::StageError;
use crate::providers::{CompletionProvider, ResponseSchema};

/// Ask the provider to apply `approved` to `lexical`
pub async fn rewrite_tree(
    provider: &dyn CompletionProvider,
    lexical: &str,
    approved: &[Suggestion],
) -> Result<String, StageError> {
    info!(
        "Rewriting tree body with {} change(s) via {}",
        approved.len(),
        provider.name()
    );

    let user = prompts::rewrite_user(lexical, approved);
    let value = provider
        .complete(prompts::REWRITE_SYSTEM, &user, ResponseSchema::Rewrite)
        .await?;
    Ok(schema::decode_rewrite(value)?)
}
