//! Editing session over one piece of stored content
//!
//! A session loads serialized content (a JSON [`EditorDocument`] or plain
//! text), applies [`EditCommand`]s with undo/redo, and reports every change
//! through an optional callback with the new serialized content.

use tracing::{debug, warn};

use crate::commands::EditCommand;
use crate::error::EditorError;
use crate::history::{History, RevisionId, DEFAULT_HISTORY_LIMIT};
use crate::model::EditorDocument;

pub type ChangeCallback = Box<dyn FnMut(&str) + Send>;

pub struct EditorSession {
    /// Content exactly as loaded
    source: String,
    document: EditorDocument,
    history: History,
    on_change: Option<ChangeCallback>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.document)
            .field("undo_depth", &self.history.undo_depth())
            .field("has_on_change", &self.on_change.is_some())
            .finish()
    }
}

impl EditorSession {
    /// Load serialized content. Anything that is not an editor document is
    /// imported as plain text.
    pub fn load(content: &str) -> Self {
        Self::load_with_limit(content, DEFAULT_HISTORY_LIMIT)
    }

    pub fn load_with_limit(content: &str, history_limit: usize) -> Self {
        let document = match EditorDocument::from_json(content) {
            Ok(document) => document,
            Err(_) => {
                debug!(len = content.len(), "Importing content as plain text");
                EditorDocument::from_plain_text(content)
            }
        };
        Self {
            source: content.to_string(),
            document,
            history: History::with_limit(history_limit),
            on_change: None,
        }
    }

    /// Register the change listener, replacing any previous one
    pub fn on_change(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    /// Apply a command. Returns `Ok(None)` when the command changed nothing;
    /// such commands are not recorded in history.
    pub fn apply(&mut self, command: EditCommand) -> Result<Option<RevisionId>, EditorError> {
        let mut next = self.document.clone();
        command.apply(&mut next)?;
        next.normalize();
        if next == self.document {
            return Ok(None);
        }

        let before = std::mem::replace(&mut self.document, next);
        let id = self.history.record(before);
        debug!(revision = id, "Applied edit");
        self.notify();
        Ok(Some(id))
    }

    /// Returns false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        let current = self.document.clone();
        match self.history.undo(current) {
            Some(previous) => {
                self.document = previous;
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Returns false when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        let current = self.document.clone();
        match self.history.redo(current) {
            Some(next) => {
                self.document = next;
                self.notify();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether the content differs from what was loaded
    pub fn is_modified(&self) -> bool {
        !self.history.at_origin()
    }

    /// Serialized content. Unmodified sessions return the loaded string
    /// unchanged, so loading and saving never rewrites stored content.
    pub fn content(&self) -> Result<String, EditorError> {
        if self.history.at_origin() {
            return Ok(self.source.clone());
        }
        self.document.to_json()
    }

    pub fn plain_text(&self) -> String {
        self.document.to_plain_text()
    }

    fn notify(&mut self) {
        if self.on_change.is_none() {
            return;
        }
        match self.content() {
            Ok(content) => {
                if let Some(callback) = self.on_change.as_mut() {
                    callback(&content);
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize editor content"),
        }
    }
}
