//! The text entry surface.
//!
//! `TextArea` bundles buffer, cursor, history, view and clipboard into the
//! widget the application talks to. Every input method returns a
//! [`Response`] saying whether the text changed; the controller turns
//! [`Response::Edited`] into a dirty mark and never has to compare buffers.
//!
//! [`set_text`](TextArea::set_text) is the one mutation that does not count
//! as an edit: it is how New and Open swap the document, and it clears the
//! undo history with it.

use n_term::buffer::{FrameBuffer, Rect};
use n_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseKind};

use crate::buffer::{Buffer, LineEnding};
use crate::clipboard::Clipboard;
use crate::cursor::Cursor;
use crate::history::{EditKind, History};
use crate::position::Position;
use crate::view::View;

/// Lines per mouse wheel notch.
const WHEEL_LINES: isize = 3;

/// What an input did to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Not for us.
    Ignored,
    /// Cursor, selection or scroll changed; text did not.
    Moved,
    /// The text changed.
    Edited,
}

impl Response {
    #[inline]
    #[must_use]
    pub const fn edited(self) -> bool {
        matches!(self, Self::Edited)
    }
}

/// Editable text with cursor, selection, undo and clipboard.
#[derive(Debug)]
pub struct TextArea {
    buffer: Buffer,
    cursor: Cursor,
    history: History,
    view: View,
    clipboard: Clipboard,
    /// Where the text was last drawn; mouse and paging use it.
    area: Rect,
    /// Keep the cursor in view on the next render. Cleared by wheel scrolling.
    follow: bool,
    dragging: bool,
}

impl TextArea {
    #[must_use]
    pub fn new(clipboard: Clipboard) -> Self {
        Self {
            buffer: Buffer::new(),
            cursor: Cursor::new(),
            history: History::new(),
            view: View::new(),
            clipboard,
            area: Rect::default(),
            follow: true,
            dragging: false,
        }
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.buffer.line_ending()
    }

    #[must_use]
    pub const fn tab_width(&self) -> u8 {
        self.view.tab_width()
    }

    pub fn set_tab_width(&mut self, width: u8) {
        self.view.set_tab_width(width);
    }

    /// Swap in a whole new text: cursor home, history cleared, not an edit.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.cursor = Cursor::new();
        self.history.clear();
        self.view.reset();
        self.follow = true;
    }

    // -- Selection and clipboard --------------------------------------------

    pub fn select_all(&mut self) -> Response {
        self.cursor.select_all(&self.buffer);
        self.history.seal();
        self.follow = true;
        Response::Moved
    }

    #[must_use]
    pub fn selected_text(&self) -> Option<String> {
        self.cursor.selection().map(|r| self.buffer.range_text(r))
    }

    /// Copy the selection. Returns false when nothing is selected.
    pub fn copy(&mut self) -> bool {
        let Some(text) = self.selected_text() else {
            return false;
        };
        self.clipboard.set_text(&text);
        true
    }

    /// Insert the clipboard text over the selection.
    pub fn paste(&mut self) -> Response {
        match self.clipboard.get_text() {
            Some(text) => self.insert_text(&text),
            None => Response::Ignored,
        }
    }

    // -- Editing ------------------------------------------------------------

    /// Insert text as one undo step, line breaks converted to the
    /// document's line ending.
    pub fn insert_text(&mut self, text: &str) -> Response {
        let text = normalize_breaks(text, self.buffer.line_ending());
        self.replace_selection(&text, EditKind::Single)
    }

    pub fn type_char(&mut self, ch: char) -> Response {
        let mut enc = [0u8; 4];
        self.replace_selection(ch.encode_utf8(&mut enc), EditKind::Typing)
    }

    pub fn newline(&mut self) -> Response {
        self.replace_selection(self.buffer.line_ending().as_str(), EditKind::Single)
    }

    pub fn backspace(&mut self) -> Response {
        if let Some(sel) = self.cursor.selection() {
            return self.remove(self.buffer.to_char(sel.start), self.buffer.to_char(sel.end));
        }
        let end = self.buffer.to_char(self.cursor.position());
        if end == 0 {
            return Response::Ignored;
        }
        let mut start = end - 1;
        if start > 0 && self.buffer.char_at(start) == Some('\n') && self.buffer.char_at(start - 1) == Some('\r') {
            start -= 1;
        }
        self.remove(start, end)
    }

    pub fn delete(&mut self) -> Response {
        if let Some(sel) = self.cursor.selection() {
            return self.remove(self.buffer.to_char(sel.start), self.buffer.to_char(sel.end));
        }
        let start = self.buffer.to_char(self.cursor.position());
        if start >= self.buffer.len_chars() {
            return Response::Ignored;
        }
        let mut end = start + 1;
        if self.buffer.char_at(start) == Some('\r') && self.buffer.char_at(end) == Some('\n') {
            end += 1;
        }
        self.remove(start, end)
    }

    pub fn undo(&mut self) -> Response {
        match self.history.undo(&mut self.buffer) {
            Some(pos) => self.restore_cursor(pos),
            None => Response::Ignored,
        }
    }

    pub fn redo(&mut self) -> Response {
        match self.history.redo(&mut self.buffer) {
            Some(pos) => self.restore_cursor(pos),
            None => Response::Ignored,
        }
    }

    fn restore_cursor(&mut self, pos: Position) -> Response {
        self.cursor = Cursor::at(self.buffer.clamp(pos));
        self.follow = true;
        Response::Edited
    }

    fn replace_selection(&mut self, text: &str, kind: EditKind) -> Response {
        let selection = self.cursor.selection();
        if text.is_empty() && selection.is_none() {
            return Response::Ignored;
        }
        let before = self.cursor.position();
        let kind = if selection.is_some() { EditKind::Single } else { kind };
        self.history.begin(before, kind);

        let mut at = self.buffer.to_char(before);
        if let Some(sel) = selection {
            let start = self.buffer.to_char(sel.start);
            let removed = self.buffer.remove(start..self.buffer.to_char(sel.end));
            self.history.record_remove(start, &removed);
            at = start;
        }
        let end = self.buffer.insert(at, text);
        if !text.is_empty() {
            self.history.record_insert(at, text);
        }

        self.cursor.set_position(self.buffer.to_position(end), &self.buffer, false);
        self.history.commit(self.cursor.position());
        self.follow = true;
        Response::Edited
    }

    fn remove(&mut self, start: usize, end: usize) -> Response {
        if start >= end {
            return Response::Ignored;
        }
        self.history.begin(self.cursor.position(), EditKind::Single);
        let removed = self.buffer.remove(start..end);
        self.history.record_remove(start, &removed);
        self.cursor.set_position(self.buffer.to_position(start), &self.buffer, false);
        self.history.commit(self.cursor.position());
        self.follow = true;
        Response::Edited
    }

    // -- Input --------------------------------------------------------------

    pub fn handle_event(&mut self, event: &Event) -> Response {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => self.insert_text(text),
        }
    }

    /// Editing and navigation keys. Ctrl+letter shortcuts are ignored here;
    /// they belong to the command layer.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Response {
        let shift = key.modifiers.contains(Modifiers::SHIFT);
        let ctrl = key.modifiers.contains(Modifiers::CTRL);
        let page = usize::from(self.area.height.max(2) - 1);
        let buf = &self.buffer;

        match key.code {
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(Modifiers::ALT) => {
                return self.type_char(ch);
            }
            KeyCode::Enter => return self.newline(),
            KeyCode::Tab => return self.type_char('\t'),
            KeyCode::Backspace => return self.backspace(),
            KeyCode::Delete => return self.delete(),

            KeyCode::Left if ctrl => self.cursor.word_left(buf, shift),
            KeyCode::Right if ctrl => self.cursor.word_right(buf, shift),
            KeyCode::Left => self.cursor.move_left(buf, shift),
            KeyCode::Right => self.cursor.move_right(buf, shift),
            KeyCode::Up => self.cursor.move_up(1, buf, shift),
            KeyCode::Down => self.cursor.move_down(1, buf, shift),
            KeyCode::Home if ctrl => self.cursor.move_to_start(shift),
            KeyCode::End if ctrl => self.cursor.move_to_end(buf, shift),
            KeyCode::Home => self.cursor.move_home(shift),
            KeyCode::End => self.cursor.move_end(buf, shift),
            KeyCode::PageUp => self.cursor.move_up(page, buf, shift),
            KeyCode::PageDown => self.cursor.move_down(page, buf, shift),
            _ => return Response::Ignored,
        }
        self.history.seal();
        self.follow = true;
        Response::Moved
    }

    /// Click to place, drag to select, wheel to scroll.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> Response {
        match mouse.kind {
            MouseKind::Press(MouseButton::Left) if self.area.contains(mouse.x, mouse.y) => {
                let pos = self.view.position_at(&self.buffer, self.area, mouse.x, mouse.y);
                let extend = mouse.modifiers.contains(Modifiers::SHIFT);
                self.cursor.set_position(pos, &self.buffer, extend);
                self.history.seal();
                self.dragging = true;
                self.follow = true;
                Response::Moved
            }
            MouseKind::Drag(MouseButton::Left) if self.dragging => {
                let pos = self.view.position_at(&self.buffer, self.area, mouse.x, mouse.y);
                self.cursor.set_position(pos, &self.buffer, true);
                self.follow = true;
                Response::Moved
            }
            MouseKind::Release(_) if self.dragging => {
                self.dragging = false;
                Response::Ignored
            }
            MouseKind::ScrollUp => self.scroll(-WHEEL_LINES),
            MouseKind::ScrollDown => self.scroll(WHEEL_LINES),
            _ => Response::Ignored,
        }
    }

    fn scroll(&mut self, lines: isize) -> Response {
        self.view.scroll_by(lines, &self.buffer, self.area.height);
        self.follow = false;
        Response::Moved
    }

    // -- Rendering ----------------------------------------------------------

    /// Draw into `area` and return the cursor's screen cell, if visible.
    pub fn render(&mut self, frame: &mut FrameBuffer, area: Rect) -> Option<(u16, u16)> {
        self.area = area;
        if self.follow {
            self.view
                .ensure_visible(self.cursor.position(), &self.buffer, area.width, area.height);
        }
        self.view.render(&self.buffer, &self.cursor, frame, area)
    }
}

/// Convert every `\r\n`, `\r` and `\n` in `text` to `ending`.
fn normalize_breaks(text: &str, ending: LineEnding) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str(ending.as_str());
            }
            '\n' => out.push_str(ending.as_str()),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
