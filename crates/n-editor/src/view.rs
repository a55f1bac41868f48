//! View: buffer text onto a rectangle of the frame.
//!
//! Holds only the scroll offsets and tab width. The buffer and cursor are
//! passed in on every call, so the text area can swap its whole text (New,
//! Open) without rebuilding the view.
//!
//! Buffer coordinates are chars; screen coordinates are display columns.
//! Tabs jump to the next stop and CJK characters take two columns, so the
//! two differ. [`display_col`] goes one way and [`char_col_at`] the other.

use unicode_width::UnicodeWidthChar;

use n_term::buffer::{FrameBuffer, Rect};
use n_term::cell::{Attr, Cell, Style};

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::position::{Position, Range};

/// Plain text.
pub const TEXT_STYLE: Style = Style::PLAIN;

/// Selected text.
pub const SELECTION_STYLE: Style = Style::PLAIN.with(Attr::INVERSE);

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

fn advance(display: usize, ch: char, tab_width: usize) -> usize {
    if ch == '\t' {
        (display / tab_width + 1) * tab_width
    } else {
        display + ch.width().unwrap_or(0)
    }
}

/// Display column of char column `col` within a line's chars.
#[must_use]
pub fn display_col(chars: impl Iterator<Item = char>, col: usize, tab_width: u8) -> usize {
    let tab = usize::from(tab_width.max(1));
    chars.take(col).fold(0, |d, ch| advance(d, ch, tab))
}

/// Char column whose cell covers display column `target`.
///
/// Clicking the right half of a wide char or inside a tab lands on the
/// char that owns the cell. Past the end of the text gives the text length.
#[must_use]
pub fn char_col_at(chars: impl Iterator<Item = char>, target: usize, tab_width: u8) -> usize {
    let tab = usize::from(tab_width.max(1));
    let mut display = 0;
    let mut col = 0;
    for ch in chars {
        let next = advance(display, ch, tab);
        if next > target {
            return col;
        }
        display = next;
        col += 1;
    }
    col
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Scroll state of the text area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    top_line: usize,
    left_col: usize,
    tab_width: u8,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    /// Top-left scroll, 8-column tabs.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            top_line: 0,
            left_col: 0,
            tab_width: 8,
        }
    }

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    #[inline]
    #[must_use]
    pub const fn left_col(&self) -> usize {
        self.left_col
    }

    #[inline]
    #[must_use]
    pub const fn tab_width(&self) -> u8 {
        self.tab_width
    }

    pub fn set_tab_width(&mut self, width: u8) {
        self.tab_width = width.max(1);
    }

    pub const fn reset(&mut self) {
        self.top_line = 0;
        self.left_col = 0;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll just enough that `pos` is inside a `width` x `height` window.
    pub fn ensure_visible(&mut self, pos: Position, buf: &Buffer, width: u16, height: u16) {
        let (width, height) = (usize::from(width), usize::from(height));
        if width == 0 || height == 0 {
            return;
        }
        if pos.line < self.top_line {
            self.top_line = pos.line;
        } else if pos.line >= self.top_line + height {
            self.top_line = pos.line + 1 - height;
        }

        let col = buf
            .line(pos.line)
            .map_or(0, |line| display_col(line.chars(), pos.col, self.tab_width));
        if col < self.left_col {
            self.left_col = col;
        } else if col >= self.left_col + width {
            self.left_col = col + 1 - width;
        }
    }

    /// Scroll vertically by `lines` without moving the cursor.
    pub fn scroll_by(&mut self, lines: isize, buf: &Buffer, height: u16) {
        let max_top = buf.line_count().saturating_sub(usize::from(height).max(1));
        self.top_line = self.top_line.saturating_add_signed(lines).min(max_top);
    }

    /// Buffer position under a cell of `area`, clamped to the text.
    #[must_use]
    pub fn position_at(&self, buf: &Buffer, area: Rect, x: u16, y: u16) -> Position {
        let line = self.top_line + usize::from(y.saturating_sub(area.y));
        let line = line.min(buf.line_count().saturating_sub(1));
        let target = self.left_col + usize::from(x.saturating_sub(area.x));
        let content = buf.line_content_len(line);
        let col = buf.line(line).map_or(0, |slice| {
            char_col_at(slice.chars().take(content), target, self.tab_width)
        });
        Position::new(line, col)
    }

    // -- Rendering ----------------------------------------------------------

    /// Paint the visible text into `area` and return the cursor's cell,
    /// if it is in view. Does not scroll; see [`ensure_visible`](Self::ensure_visible).
    pub fn render(
        &self,
        buf: &Buffer,
        cursor: &Cursor,
        frame: &mut FrameBuffer,
        area: Rect,
    ) -> Option<(u16, u16)> {
        if area.is_empty() {
            return None;
        }
        let pos = cursor.position();
        frame.fill(area, TEXT_STYLE);
        let selection = cursor.selection();
        for row in 0..area.height {
            let line = self.top_line + usize::from(row);
            if line >= buf.line_count() {
                break;
            }
            self.render_line(frame, buf, line, area.x, area.y + row, area.width, selection);
        }

        let line_chars = buf.line(pos.line)?.chars();
        let col = display_col(line_chars, pos.col, self.tab_width);
        let offset = col.checked_sub(self.left_col)?;
        let offset = u16::try_from(offset).ok().filter(|&o| o < area.width)?;
        let row = u16::try_from(pos.line.checked_sub(self.top_line)?).ok()?;
        (row < area.height).then_some((area.x + offset, area.y + row))
    }

    #[allow(clippy::too_many_arguments)]
    fn render_line(
        &self,
        frame: &mut FrameBuffer,
        buf: &Buffer,
        line: usize,
        x: u16,
        y: u16,
        width: u16,
        selection: Option<Range>,
    ) {
        let Some(slice) = buf.line(line) else {
            return;
        };
        let content = buf.line_content_len(line);
        let tab = usize::from(self.tab_width.max(1));
        let right = self.left_col + usize::from(width);
        let style_at = |col: usize| {
            if selection.is_some_and(|sel| sel.covers(line, col)) {
                SELECTION_STYLE
            } else {
                TEXT_STYLE
            }
        };
        // Screen x of a display column already known to be in view.
        let screen = |d: usize| x.saturating_add(u16::try_from(d - self.left_col).unwrap_or(u16::MAX));

        let mut display = 0;
        for (col, ch) in slice.chars().take(content).enumerate() {
            if display >= right {
                return;
            }
            let next = advance(display, ch, tab);
            let style = style_at(col);
            if ch == '\t' || (ch.width() == Some(2) && (display < self.left_col || next > right)) {
                // Tabs, and wide chars cut by either edge, show as blanks.
                for d in display.max(self.left_col)..next.min(right) {
                    frame.set(screen(d), y, Cell::new(' ', style));
                }
            } else if next > display && display >= self.left_col {
                frame.set(screen(display), y, Cell::new(ch, style));
                if next - display == 2 {
                    frame.set(screen(display + 1), y, Cell::continuation(style));
                }
            }
            display = next;
        }

        // A selected line break shows as one highlighted cell.
        if line + 1 < buf.line_count()
            && style_at(content) == SELECTION_STYLE
            && (self.left_col..right).contains(&display)
        {
            frame.set(screen(display), y, Cell::new(' ', SELECTION_STYLE));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame_text(frame: &FrameBuffer, y: u16) -> String {
        frame.row_text(y).trim_end().to_owned()
    }

    // ── column mapping ──────────────────────────────────────────────────

    #[test]
    fn display_col_expands_tabs_and_wide() {
        assert_eq!(display_col("ab\tcd".chars(), 3, 4), 4);
        assert_eq!(display_col("\thello".chars(), 1, 8), 8);
        assert_eq!(display_col("中文hi".chars(), 2, 4), 4);
        assert_eq!(display_col("hello".chars(), 99, 4), 5);
    }

    #[test]
    fn char_col_at_inverts_display_col() {
        assert_eq!(char_col_at("ab\tcd".chars(), 3, 4), 2);
        assert_eq!(char_col_at("ab\tcd".chars(), 4, 4), 3);
        assert_eq!(char_col_at("中文".chars(), 1, 4), 0);
        assert_eq!(char_col_at("中文".chars(), 2, 4), 1);
        assert_eq!(char_col_at("abc".chars(), 40, 4), 3);
    }

    // ── scrolling ───────────────────────────────────────────────────────

    #[test]
    fn ensure_visible_scrolls_down_and_back() {
        let buf = Buffer::from_text(&"x\n".repeat(50));
        let mut v = View::new();
        v.ensure_visible(Position::new(20, 0), &buf, 10, 5);
        assert_eq!(v.top_line(), 16);
        v.ensure_visible(Position::new(3, 0), &buf, 10, 5);
        assert_eq!(v.top_line(), 3);
    }

    #[test]
    fn ensure_visible_scrolls_horizontally() {
        let buf = Buffer::from_text(&"a".repeat(40));
        let mut v = View::new();
        v.ensure_visible(Position::new(0, 30), &buf, 10, 3);
        assert_eq!(v.left_col(), 21);
        v.ensure_visible(Position::new(0, 2), &buf, 10, 3);
        assert_eq!(v.left_col(), 2);
    }

    #[test]
    fn scroll_by_clamps() {
        let buf = Buffer::from_text(&"x\n".repeat(9));
        let mut v = View::new();
        v.scroll_by(100, &buf, 4);
        assert_eq!(v.top_line(), 6);
        v.scroll_by(-100, &buf, 4);
        assert_eq!(v.top_line(), 0);
    }

    #[test]
    fn position_at_maps_screen_to_buffer() {
        let buf = Buffer::from_text("a\tb\nsecond line");
        let mut v = View::new();
        v.set_tab_width(4);
        let area = Rect::new(0, 1, 20, 5);
        assert_eq!(v.position_at(&buf, area, 2, 1), Position::new(0, 1));
        assert_eq!(v.position_at(&buf, area, 4, 1), Position::new(0, 2));
        assert_eq!(v.position_at(&buf, area, 19, 2), Position::new(1, 11));
        assert_eq!(v.position_at(&buf, area, 0, 4), Position::new(1, 0));
    }

    // ── rendering ───────────────────────────────────────────────────────

    #[test]
    fn renders_lines_and_cursor() {
        let buf = Buffer::from_text("hello\nworld");
        let cursor = Cursor::at(Position::new(1, 3));
        let mut frame = FrameBuffer::new(10, 4);
        let at = View::new().render(&buf, &cursor, &mut frame, Rect::new(0, 1, 10, 3));
        assert_eq!(frame_text(&frame, 1), "hello");
        assert_eq!(frame_text(&frame, 2), "world");
        assert_eq!(at, Some((3, 2)));
    }

    #[test]
    fn tabs_render_as_spaces() {
        let buf = Buffer::from_text("a\tb");
        let mut frame = FrameBuffer::new(12, 1);
        let mut v = View::new();
        v.set_tab_width(4);
        v.render(&buf, &Cursor::new(), &mut frame, Rect::new(0, 0, 12, 1));
        assert_eq!(frame_text(&frame, 0), "a   b");
    }

    #[test]
    fn selection_is_inverse() {
        let buf = Buffer::from_text("abcd");
        let mut cursor = Cursor::new();
        cursor.select(Position::new(0, 1), Position::new(0, 3), &buf);
        let mut frame = FrameBuffer::new(6, 1);
        View::new().render(&buf, &cursor, &mut frame, Rect::new(0, 0, 6, 1));
        let styles: Vec<Style> = (0..4).map(|x| frame.get(x, 0).unwrap().style).collect();
        assert_eq!(styles, vec![TEXT_STYLE, SELECTION_STYLE, SELECTION_STYLE, TEXT_STYLE]);
    }

    #[test]
    fn selected_line_break_is_highlighted() {
        let buf = Buffer::from_text("ab\ncd");
        let mut cursor = Cursor::new();
        cursor.select_all(&buf);
        let mut frame = FrameBuffer::new(6, 2);
        View::new().render(&buf, &cursor, &mut frame, Rect::new(0, 0, 6, 2));
        assert_eq!(frame.get(2, 0).unwrap().style, SELECTION_STYLE);
        assert_eq!(frame.get(2, 1).unwrap().style, TEXT_STYLE);
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let buf = Buffer::from_text("中x");
        let mut frame = FrameBuffer::new(5, 1);
        View::new().render(&buf, &Cursor::at(Position::new(0, 1)), &mut frame, Rect::new(0, 0, 5, 1));
        assert_eq!(frame.get(0, 0).unwrap().ch, '中');
        assert!(frame.get(1, 0).unwrap().is_continuation());
        assert_eq!(frame.get(2, 0).unwrap().ch, 'x');
    }

    #[test]
    fn cursor_past_end_of_line_is_visible() {
        let buf = Buffer::from_text("abc");
        let mut frame = FrameBuffer::new(3, 1);
        let cursor = Cursor::at(Position::new(0, 3));
        let mut v = View::new();
        v.ensure_visible(cursor.position(), &buf, 3, 1);
        let at = v.render(&buf, &cursor, &mut frame, Rect::new(0, 0, 3, 1));
        assert_eq!(v.left_col(), 1);
        assert_eq!(at, Some((2, 0)));
        assert_eq!(frame_text(&frame, 0), "bc");
    }

    #[test]
    fn cursor_scrolled_out_of_view_is_hidden() {
        let buf = Buffer::from_text(&"x\n".repeat(20));
        let mut v = View::new();
        v.scroll_by(10, &buf, 3);
        let mut frame = FrameBuffer::new(3, 3);
        assert_eq!(v.render(&buf, &Cursor::new(), &mut frame, Rect::new(0, 0, 3, 3)), None);
        assert_eq!(frame_text(&frame, 0), "x");
    }

    #[test]
    fn empty_area_renders_nothing() {
        let buf = Buffer::from_text("abc");
        let mut frame = FrameBuffer::new(3, 1);
        assert_eq!(View::new().render(&buf, &Cursor::new(), &mut frame, Rect::new(0, 0, 0, 0)), None);
    }
}
