//! Text buffer backed by a rope.
//!
//! `Buffer` holds the text and nothing else: where it came from and whether
//! it has been saved belong to [`DocumentState`](crate::document::DocumentState),
//! and how the bytes were decoded belongs to [`fileio`](crate::fileio).
//!
//! Text is stored exactly as loaded. Line endings are never rewritten; the
//! first one found decides what Enter inserts, so a CRLF file stays CRLF.
//!
//! Editing goes through char indices ([`insert`](Buffer::insert),
//! [`remove`](Buffer::remove)). Both clamp out-of-range input instead of
//! panicking, because stale cursors after an undo are a normal occurrence.

use std::fmt;
use std::ops::Range as CharRange;

use ropey::{Rope, RopeSlice};

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Line ending style, decided by the first break in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// The style of the first line break in `text`, or `Lf` if it has none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        match bytes.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') => Self::CrLf,
            Some(i) if bytes[i] == b'\r' => Self::Cr,
            _ => Self::Lf,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lf => "LF",
            Self::CrLf => "CRLF",
            Self::Cr => "CR",
        })
    }
}

/// Chars ropey treats as ending a line.
const fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// The editable text.
///
/// Positions are `(line, col)` with char columns. An empty buffer has one
/// empty line, and text ending in a newline has a trailing empty line, the
/// same way the text area shows it.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
    line_ending: LineEnding,
}

impl Buffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            line_ending: LineEnding::detect(text),
        }
    }

    /// Replace everything, re-detecting the line ending.
    pub fn set_text(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// A line including its line break, or `None` past the end.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        (line < self.rope.len_lines()).then(|| self.rope.line(line))
    }

    /// Chars on `line` excluding its line break. Zero for missing lines.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> usize {
        let Some(slice) = self.line(line) else {
            return 0;
        };
        let total = slice.len_chars();
        if total == 0 {
            return 0;
        }
        match slice.char(total - 1) {
            '\n' if total >= 2 && slice.char(total - 2) == '\r' => total - 2,
            ch if is_line_break(ch) => total - 1,
            _ => total,
        }
    }

    /// Visible text of `line` without its break.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.line(line)
            .map(|slice| slice.slice(..self.line_content_len(line)).to_string())
            .unwrap_or_default()
    }

    /// The whole text.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text between two char indices, clamped.
    #[must_use]
    pub fn slice_text(&self, range: CharRange<usize>) -> String {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Text covered by a position range.
    #[must_use]
    pub fn range_text(&self, range: Range) -> String {
        self.slice_text(self.to_char(range.start)..self.to_char(range.end))
    }

    #[must_use]
    pub fn char_at(&self, idx: usize) -> Option<char> {
        (idx < self.len_chars()).then(|| self.rope.char(idx))
    }

    // -- Coordinates --------------------------------------------------------

    /// Clamp to the last line and to that line's content length.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        Position::new(line, pos.col.min(self.line_content_len(line)))
    }

    /// Char index of a position, after clamping.
    #[must_use]
    pub fn to_char(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    /// Position of a char index, clamped to the end of the text.
    ///
    /// An index between `\r` and `\n` resolves to the end of that line's
    /// content.
    #[must_use]
    pub fn to_position(&self, idx: usize) -> Position {
        let idx = idx.min(self.len_chars());
        let line = self.rope.char_to_line(idx);
        let col = idx - self.rope.line_to_char(line);
        Position::new(line, col.min(self.line_content_len(line)))
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at a char index. Returns the index just past it.
    pub fn insert(&mut self, idx: usize, text: &str) -> usize {
        let idx = idx.min(self.len_chars());
        self.rope.insert(idx, text);
        if self.rope.len_chars() == text.chars().count() {
            // First text into an empty buffer decides the line ending.
            self.line_ending = LineEnding::detect(text);
        }
        idx + text.chars().count()
    }

    /// Remove a char range and return what was there.
    pub fn remove(&mut self, range: CharRange<usize>) -> String {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        removed
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("line_ending", &self.line_ending)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- LineEnding ---------------------------------------------------------

    #[test]
    fn detect_first_break_wins() {
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("none"), LineEnding::Lf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }

    #[test]
    fn line_ending_labels() {
        assert_eq!(LineEnding::CrLf.to_string(), "CRLF");
        assert_eq!(LineEnding::Cr.as_str(), "\r");
    }

    // -- Lines --------------------------------------------------------------

    #[test]
    fn empty_buffer_has_one_line() {
        let buf = Buffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_content_len(0), 0);
        assert_eq!(buf.line_text(0), "");
    }

    #[test]
    fn content_len_strips_each_break_style() {
        let buf = Buffer::from_text("ab\r\ncde\nf\rg");
        assert_eq!(buf.line_count(), 4);
        assert_eq!(buf.line_content_len(0), 2);
        assert_eq!(buf.line_content_len(1), 3);
        assert_eq!(buf.line_content_len(2), 1);
        assert_eq!(buf.line_content_len(3), 1);
        assert_eq!(buf.line_content_len(9), 0);
    }

    #[test]
    fn trailing_newline_adds_empty_line() {
        let buf = Buffer::from_text("one\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_text(0), "one");
        assert_eq!(buf.line_text(1), "");
    }

    #[test]
    fn line_out_of_range() {
        assert!(Buffer::from_text("x").line(1).is_none());
    }

    // -- Coordinates --------------------------------------------------------

    #[test]
    fn clamp_limits_line_and_col() {
        let buf = Buffer::from_text("hello\nhi");
        assert_eq!(buf.clamp(Position::new(0, 99)), Position::new(0, 5));
        assert_eq!(buf.clamp(Position::new(7, 7)), Position::new(1, 2));
    }

    #[test]
    fn char_position_conversion() {
        let buf = Buffer::from_text("ab\ncd");
        assert_eq!(buf.to_char(Position::new(1, 1)), 4);
        assert_eq!(buf.to_position(4), Position::new(1, 1));
        assert_eq!(buf.to_position(2), Position::new(0, 2));
        assert_eq!(buf.to_position(100), Position::new(1, 2));
    }

    #[test]
    fn index_inside_crlf_snaps_to_content_end() {
        let buf = Buffer::from_text("ab\r\ncd");
        assert_eq!(buf.to_position(3), Position::new(0, 2));
    }

    #[test]
    fn multibyte_columns_are_chars() {
        let buf = Buffer::from_text("café\n日本");
        assert_eq!(buf.line_content_len(0), 4);
        assert_eq!(buf.char_at(3), Some('é'));
        assert_eq!(buf.to_char(Position::new(1, 1)), 6);
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn insert_returns_end_index() {
        let mut buf = Buffer::from_text("held");
        let end = buf.insert(3, "lo wor");
        assert_eq!(end, 9);
        assert_eq!(buf.text(), "hello word");
    }

    #[test]
    fn insert_clamps_past_end() {
        let mut buf = Buffer::from_text("ab");
        buf.insert(50, "c");
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn remove_returns_removed_text() {
        let mut buf = Buffer::from_text("hello world");
        assert_eq!(buf.remove(5..11), " world");
        assert_eq!(buf.text(), "hello");
        assert_eq!(buf.remove(3..99), "lo");
        assert_eq!(buf.remove(9..2), "");
    }

    #[test]
    fn first_insert_into_empty_sets_line_ending() {
        let mut buf = Buffer::new();
        buf.insert(0, "a\r\nb");
        assert_eq!(buf.line_ending(), LineEnding::CrLf);
        buf.insert(0, "\n");
        assert_eq!(buf.line_ending(), LineEnding::CrLf);
    }

    #[test]
    fn set_text_redetects() {
        let mut buf = Buffer::from_text("a\r\n");
        buf.set_text("b\nc");
        assert_eq!(buf.line_ending(), LineEnding::Lf);
        assert_eq!(buf.text(), "b\nc");
    }

    #[test]
    fn range_text_uses_positions() {
        let buf = Buffer::from_text("one\ntwo");
        let r = Range::ordered(Position::new(0, 1), Position::new(1, 2));
        assert_eq!(buf.range_text(r), "ne\ntw");
        assert_eq!(buf.slice_text(4..100), "two");
    }
}
