//! Undo/redo history of document snapshots

use std::collections::VecDeque;

use crate::model::EditorDocument;

pub type RevisionId = u64;

/// Undo depth used by [`History::default`]
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Bounded undo and redo stacks
///
/// Each applied command pushes the document as it was before the command
/// and gets the next revision id.
/// Undo swaps the current document with that snapshot and parks the current
/// one on the redo stack. Recording a new command clears the redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<EditorDocument>,
    redo: Vec<EditorDocument>,
    next_id: RevisionId,
    limit: usize,
    /// Set once the oldest entry has been evicted
    truncated: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// A limit of zero is treated as one
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            next_id: 1,
            limit: limit.max(1),
            truncated: false,
        }
    }

    pub fn record(&mut self, before: EditorDocument) -> RevisionId {
        let id = self.next_id;
        self.next_id += 1;
        self.redo.clear();
        self.undo.push_back(before);
        if self.undo.len() > self.limit {
            self.undo.pop_front();
            self.truncated = true;
        }
        id
    }

    /// Returns the document to restore, or `None` when there is nothing to undo
    pub fn undo(&mut self, current: EditorDocument) -> Option<EditorDocument> {
        let restored = self.undo.pop_back()?;
        self.redo.push(current);
        Some(restored)
    }

    pub fn redo(&mut self, current: EditorDocument) -> Option<EditorDocument> {
        let restored = self.redo.pop()?;
        self.undo.push_back(current);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// True when every recorded command has been undone and none were evicted
    pub fn at_origin(&self) -> bool {
        self.undo.is_empty() && !self.truncated
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}
