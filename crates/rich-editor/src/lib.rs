//! Rich text editing surface
//!
//! Documents are stored as a versioned JSON block model. Plain text loads
//! as one paragraph per line, so templates and generated contracts open
//! without conversion. Editing happens through [`EditCommand`]s applied to an
//! [`EditorSession`], which keeps a bounded undo/redo history.

pub mod commands;
pub mod error;
pub mod history;
pub mod model;
pub mod session;

pub use commands::{BlockSpan, EditCommand, HeadingLevel, ListKind, Mark, Position, Selection};
pub use error::EditorError;
pub use history::{History, RevisionId, DEFAULT_HISTORY_LIMIT};
pub use model::{Block, BlockStyle, EditorDocument, RunStyle, TextRun};
pub use session::{ChangeCallback, EditorSession};

/// Flatten stored content (editor JSON or plain text) to plain text
pub fn content_to_plain_text(content: &str) -> String {
    match EditorDocument::from_json(content) {
        Ok(document) => document.to_plain_text(),
        Err(_) => content.to_string(),
    }
}
