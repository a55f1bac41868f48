//! Cursor with sticky column and shift-selection.
//!
//! The cursor can always sit after the last character of a line, like any
//! non-modal editor. Horizontal moves wrap across line boundaries; vertical
//! moves remember the column they started from (the sticky column) so that
//! passing through a short line does not lose the horizontal position.
//!
//! Every movement takes `extend`. With `extend = true` the first move drops
//! an anchor at the old position and later moves stretch the selection from
//! it; with `extend = false` any selection is cleared. This is the
//! Shift+Arrow behavior of a text box.

use crate::buffer::Buffer;
use crate::position::{Position, Range};

/// Cursor position, sticky column and selection anchor.
///
/// Holds no reference to the buffer; movement methods take it as an argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    sticky_col: usize,
    anchor: Option<Position>,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
            anchor: None,
        }
    }

    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            sticky_col: pos.col,
            anchor: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// The selected range, if the anchor is set and differs from the cursor.
    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.anchor
            .map(|anchor| Range::ordered(anchor, self.pos))
            .filter(|r| !r.is_empty())
    }

    #[inline]
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    // -- Selection control --------------------------------------------------

    /// Select `anchor..head`, leaving the cursor at `head`.
    pub fn select(&mut self, anchor: Position, head: Position, buf: &Buffer) {
        self.anchor = Some(buf.clamp(anchor));
        self.pos = buf.clamp(head);
        self.sticky_col = self.pos.col;
    }

    /// Anchor and cursor to the two ends of the buffer.
    pub fn select_all(&mut self, buf: &Buffer) {
        let last = buf.line_count().saturating_sub(1);
        self.select(Position::ZERO, Position::new(last, buf.line_content_len(last)), buf);
    }

    fn begin(&mut self, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.pos);
            }
        } else {
            self.anchor = None;
        }
    }

    // -- Direct positioning -------------------------------------------------

    /// Jump to `pos` (clamped). Resets the sticky column.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer, extend: bool) {
        self.begin(extend);
        self.pos = buf.clamp(pos);
        self.sticky_col = self.pos.col;
    }

    /// Re-clamp after the buffer changed underneath.
    pub fn clamp(&mut self, buf: &Buffer) {
        self.pos = buf.clamp(self.pos);
        if let Some(anchor) = &mut self.anchor {
            *anchor = buf.clamp(*anchor);
        }
    }

    // -- Horizontal movement ------------------------------------------------

    /// One char left, wrapping to the end of the previous line.
    pub fn move_left(&mut self, buf: &Buffer, extend: bool) {
        self.begin(extend);
        if self.pos.col > 0 {
            self.pos.col -= 1;
        } else if self.pos.line > 0 {
            self.pos.line -= 1;
            self.pos.col = buf.line_content_len(self.pos.line);
        }
        self.sticky_col = self.pos.col;
    }

    /// One char right, wrapping to the start of the next line.
    pub fn move_right(&mut self, buf: &Buffer, extend: bool) {
        self.begin(extend);
        if self.pos.col < buf.line_content_len(self.pos.line) {
            self.pos.col += 1;
        } else if self.pos.line + 1 < buf.line_count() {
            self.pos = Position::new(self.pos.line + 1, 0);
        }
        self.sticky_col = self.pos.col;
    }

    pub fn move_home(&mut self, extend: bool) {
        self.begin(extend);
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    pub fn move_end(&mut self, buf: &Buffer, extend: bool) {
        self.begin(extend);
        self.pos.col = buf.line_content_len(self.pos.line);
        self.sticky_col = self.pos.col;
    }

    /// Ctrl+Left: to the start of the current or previous word.
    pub fn word_left(&mut self, buf: &Buffer, extend: bool) {
        self.begin(extend);
        let mut idx = buf.to_char(self.pos);
        let class_before = |i: usize| buf.char_at(i - 1).map_or(CharClass::Space, CharClass::of);
        while idx > 0 && class_before(idx) == CharClass::Space {
            idx -= 1;
        }
        if idx > 0 {
            let class = class_before(idx);
            while idx > 0 && class_before(idx) == class {
                idx -= 1;
            }
        }
        self.pos = buf.to_position(idx);
        self.sticky_col = self.pos.col;
    }

    /// Ctrl+Right: past the current word and the blanks after it.
    pub fn word_right(&mut self, buf: &Buffer, extend: bool) {
        self.begin(extend);
        let len = buf.len_chars();
        let mut idx = buf.to_char(self.pos);
        let class_at = |i: usize| buf.char_at(i).map_or(CharClass::Space, CharClass::of);
        if idx < len {
            let class = class_at(idx);
            if class != CharClass::Space {
                while idx < len && class_at(idx) == class {
                    idx += 1;
                }
            }
            while idx < len && class_at(idx) == CharClass::Space {
                idx += 1;
            }
        }
        self.pos = buf.to_position(idx);
        self.sticky_col = self.pos.col;
    }

    // -- Vertical movement --------------------------------------------------

    /// Up `count` lines, keeping the sticky column where possible.
    pub fn move_up(&mut self, count: usize, buf: &Buffer, extend: bool) {
        self.begin(extend);
        if self.pos.line == 0 {
            self.pos.col = 0;
            self.sticky_col = 0;
            return;
        }
        self.pos.line = self.pos.line.saturating_sub(count);
        self.pos.col = self.sticky_col.min(buf.line_content_len(self.pos.line));
    }

    /// Down `count` lines, keeping the sticky column where possible.
    pub fn move_down(&mut self, count: usize, buf: &Buffer, extend: bool) {
        self.begin(extend);
        let last = buf.line_count().saturating_sub(1);
        if self.pos.line == last {
            self.pos.col = buf.line_content_len(last);
            self.sticky_col = self.pos.col;
            return;
        }
        self.pos.line = (self.pos.line + count).min(last);
        self.pos.col = self.sticky_col.min(buf.line_content_len(self.pos.line));
    }

    /// Ctrl+Home.
    pub fn move_to_start(&mut self, extend: bool) {
        self.begin(extend);
        self.pos = Position::ZERO;
        self.sticky_col = 0;
    }

    /// Ctrl+End.
    pub fn move_to_end(&mut self, buf: &Buffer, extend: bool) {
        self.begin(extend);
        let last = buf.line_count().saturating_sub(1);
        self.pos = Position::new(last, buf.line_content_len(last));
        self.sticky_col = self.pos.col;
    }
}

// ---------------------------------------------------------------------------
// Word classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Punct,
    Space,
}

impl CharClass {
    fn of(ch: char) -> Self {
        if ch.is_alphanumeric() || ch == '_' {
            Self::Word
        } else if ch.is_whitespace() {
            Self::Space
        } else {
            Self::Punct
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
