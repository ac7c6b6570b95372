/*!
 * Document model for drafts and their body representations.
 *
 * - `model`: documents, version stamps and the tagged body union
 * - `lexical`: typed view over a serialized Lexical tree
 */

pub mod lexical;
pub mod model;

pub use lexical::{LexicalTree, Node};
pub use model::{Document, DocumentBody, DocumentStatus, VersionStamp};
