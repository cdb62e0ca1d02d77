//! Bounded undo/redo history.

use super::Command;
use crate::document::{DocumentEvent, LabelDocument};

/// Maximum number of commands kept by default.
pub const DEFAULT_UNDO_LIMIT: usize = 50;

/// Linear command history with a cursor.
///
/// Commands before `index` are applied; commands from `index` on have been
/// undone and can be redone until the next push.
#[derive(Debug)]
pub struct UndoStack {
    commands: Vec<Box<dyn Command>>,
    index: usize,
    /// 0 means unbounded.
    limit: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            index: 0,
            limit,
        }
    }

    /// Execute `command` and record it, discarding anything redoable.
    ///
    /// A command that fails to apply is dropped and the history is left as
    /// it was.
    pub fn push(&mut self, doc: &mut LabelDocument, mut command: Box<dyn Command>) -> bool {
        if !command.execute(doc) {
            release(doc, command, "not applied");
            return false;
        }

        let discarded: Vec<_> = self.commands.drain(self.index..).collect();
        for old in discarded.into_iter().rev() {
            release(doc, old, "redo tail");
        }

        self.commands.push(command);
        self.index = self.commands.len();
        self.enforce_limit(doc);
        true
    }

    pub fn undo(&mut self, doc: &mut LabelDocument) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.commands[self.index].undo(doc);
        true
    }

    pub fn redo(&mut self, doc: &mut LabelDocument) -> bool {
        if self.index >= self.commands.len() {
            return false;
        }
        let command = &mut self.commands[self.index];
        if !command.execute(doc) {
            log::warn!("Redo of '{}' did not apply", command.description());
        }
        self.index += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    /// Description of the command `undo` would revert.
    pub fn undo_text(&self) -> Option<String> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(|c| c.description())
    }

    /// Description of the command `redo` would apply.
    pub fn redo_text(&self) -> Option<String> {
        self.commands.get(self.index).map(|c| c.description())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of applied commands.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, doc: &mut LabelDocument, limit: usize) {
        self.limit = limit;
        self.enforce_limit(doc);
    }

    /// Drop every command, releasing items they own.
    pub fn clear(&mut self, doc: &mut LabelDocument) {
        let discarded: Vec<_> = self.commands.drain(..).collect();
        self.index = 0;
        for old in discarded.into_iter().rev() {
            release(doc, old, "clear");
        }
    }

    /// Trim to the limit. Undone entries go first, newest first, since
    /// they depend on everything before them; then the oldest applied ones.
    fn enforce_limit(&mut self, doc: &mut LabelDocument) {
        if self.limit == 0 {
            return;
        }
        while self.commands.len() > self.limit && self.index < self.commands.len() {
            if let Some(newest) = self.commands.pop() {
                release(doc, newest, "redo eviction");
            }
        }
        if self.commands.len() > self.limit {
            let excess = self.commands.len() - self.limit;
            let evicted: Vec<_> = self.commands.drain(..excess).collect();
            self.index -= excess;
            for oldest in evicted {
                release(doc, oldest, "eviction");
            }
        }
    }
}

/// Drop a command, announcing the detached items that die with it.
fn release(doc: &mut LabelDocument, command: Box<dyn Command>, reason: &str) {
    let owned = command.owned_items();
    log::debug!(
        "Dropping '{}' from history ({}), releasing {} item(s)",
        command.description(),
        reason,
        owned.len()
    );
    drop(command);
    for id in owned {
        doc.publish(DocumentEvent::ItemReleased(id));
    }
}
