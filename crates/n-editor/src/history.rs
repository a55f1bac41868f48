//! Undo/redo history.
//!
//! Every buffer mutation is recorded as a reversible [`Edit`] at a char
//! index, grouped into transactions. A transaction is one undo step:
//! a paste, a Backspace, an Enter, or a run of typed characters.
//!
//! ```text
//! history.begin(cursor, EditKind::Typing);
//! history.record_insert(idx, "a");
//! history.commit(cursor_after);
//! ```
//!
//! Consecutive `Typing` transactions merge into the previous one until
//! something breaks the run: another kind of edit, a cursor move
//! ([`seal`](History::seal)), or an undo/redo. Empty transactions are
//! dropped.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    Insert { at: usize, text: String },
    Remove { at: usize, text: String },
}

impl Edit {
    fn apply(&self, buf: &mut Buffer) {
        match self {
            Self::Insert { at, text } => {
                buf.insert(*at, text);
            }
            Self::Remove { at, text } => {
                buf.remove(*at..*at + text.chars().count());
            }
        }
    }

    fn revert(&self, buf: &mut Buffer) {
        match self {
            Self::Insert { at, text } => {
                buf.remove(*at..*at + text.chars().count());
            }
            Self::Remove { at, text } => {
                buf.insert(*at, text);
            }
        }
    }
}

/// How an edit groups with its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Printable characters; runs merge into one step.
    Typing,
    /// Everything else; always its own step.
    Single,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Transaction {
    edits: Vec<Edit>,
    kind: EditKind,
    cursor_before: Position,
    cursor_after: Position,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Linear undo/redo stacks. A new edit after an undo drops the redo stack.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Transaction>,
    redo: Vec<Transaction>,
    pending: Option<Transaction>,
    /// The top of `undo` is a typing run that may still grow.
    open_run: bool,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            pending: None,
            open_run: false,
        }
    }

    /// Start a transaction; `cursor` is where undo will put the cursor back.
    pub fn begin(&mut self, cursor: Position, kind: EditKind) {
        if self.pending.is_some() {
            self.commit(cursor);
        }
        if kind == EditKind::Typing && self.open_run {
            if let Some(run) = self.undo.pop() {
                self.pending = Some(run);
                return;
            }
        }
        self.pending = Some(Transaction {
            edits: Vec::new(),
            kind,
            cursor_before: cursor,
            cursor_after: cursor,
        });
    }

    /// Record text that was just inserted at `at`.
    pub fn record_insert(&mut self, at: usize, text: &str) {
        if let Some(txn) = &mut self.pending {
            txn.edits.push(Edit::Insert {
                at,
                text: text.to_owned(),
            });
        }
    }

    /// Record text that was just removed from `at`.
    pub fn record_remove(&mut self, at: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(txn) = &mut self.pending {
            txn.edits.push(Edit::Remove {
                at,
                text: text.to_owned(),
            });
        }
    }

    /// Finish the pending transaction; `cursor` is where redo will leave it.
    pub fn commit(&mut self, cursor: Position) {
        let Some(mut txn) = self.pending.take() else {
            return;
        };
        if txn.edits.is_empty() {
            return;
        }
        txn.cursor_after = cursor;
        self.open_run = txn.kind == EditKind::Typing;
        self.redo.clear();
        self.undo.push(txn);
    }

    /// End the current typing run, so the next keystroke starts a new step.
    pub const fn seal(&mut self) {
        self.open_run = false;
    }

    /// Undo one step. Returns the cursor to restore.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Position> {
        if let Some(txn) = self.pending.take() {
            if !txn.edits.is_empty() {
                self.redo.clear();
                self.undo.push(txn);
            }
        }
        self.open_run = false;
        let txn = self.undo.pop()?;
        for edit in txn.edits.iter().rev() {
            edit.revert(buf);
        }
        let cursor = txn.cursor_before;
        self.redo.push(txn);
        Some(cursor)
    }

    /// Redo one step. Returns the cursor to restore.
    pub fn redo(&mut self, buf: &mut Buffer) -> Option<Position> {
        self.open_run = false;
        let txn = self.redo.pop()?;
        for edit in &txn.edits {
            edit.apply(buf);
        }
        let cursor = txn.cursor_after;
        self.undo.push(txn);
        Some(cursor)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Forget everything. Used when the whole text is replaced.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
