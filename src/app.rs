// SPDX-License-Identifier: MIT
//
// The notepad controller.
//
// `Notepad` owns the document state, the text area and the font, and
// implements n-term's `App`. All behavior runs through two entry points
// that take a `Dialogs` implementation:
//
//   handle_event  keys, mouse and paste: shortcuts become commands, the
//                 rest goes to the text area
//   run_command   New, Open, Save, Exit, edit commands, Font Size, About
//
// The `App` impl wraps the host in `TermDialogs` and calls them; tests call
// them directly with scripted dialogs.
//
// Layout:
//
//   ┌──────────────────────────────────────┐
//   │ File  Edit  Help     *a.txt - Notepad│  ← menu bar + title
//   ├──────────────────────────────────────┤
//   │ text                                 │  ← h - 2 rows
//   ├──────────────────────────────────────┤
//   │      Ln 3, Col 7 | 12 pt | LF | UTF-8│  ← status bar
//   └──────────────────────────────────────┘

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use n_editor::command::{Command, Menu};
use n_editor::document::DocumentState;
use n_editor::fileio::{self, BYTE_ORDER_MARK, Loaded, OPEN_FILTERS, TextEncoding};
use n_editor::flow::{self, ExitDecision};
use n_editor::font::{FontSpec, SIZE_RANGE};
use n_editor::prompt::Dialogs;
use n_editor::textarea::{Response, TextArea};
use n_term::ansi::CursorShape;
use n_term::buffer::{FrameBuffer, Rect, text_width};
use n_term::event_loop::{Action, App, Host};
use n_term::input::{Event, MouseButton, MouseKind};
use tracing::{debug, error, info};

use crate::dialogs::TermDialogs;
use crate::menu::{self, MenuPopup};
use crate::ui::{self, clamp_u16};

// ─── Notepad ─────────────────────────────────────────────────────────────────

pub struct Notepad {
    doc: DocumentState,
    text: TextArea,
    font: FontSpec,
    encoding: TextEncoding,
    /// Write a byte-order mark back on save.
    bom: bool,
    /// Loaded by `start`, once the screen is up to show errors on.
    startup_file: Option<PathBuf>,
    cursor_screen: Option<(u16, u16)>,
}

impl Notepad {
    #[must_use]
    pub fn new(text: TextArea, font: FontSpec) -> Self {
        Self {
            doc: DocumentState::new(),
            text,
            font,
            encoding: TextEncoding::Utf8,
            bom: false,
            startup_file: None,
            cursor_screen: None,
        }
    }

    /// Open `path` when the application starts.
    #[must_use]
    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.startup_file = Some(path);
        self
    }

    #[must_use]
    pub const fn document(&self) -> &DocumentState {
        &self.doc
    }

    #[must_use]
    pub const fn text_area(&self) -> &TextArea {
        &self.text
    }

    #[must_use]
    pub const fn font(&self) -> &FontSpec {
        &self.font
    }

    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.doc.title()
    }

    /// Where file dialogs start: the document's folder, else the working
    /// directory.
    fn dialog_dir(&self) -> PathBuf {
        self.doc
            .path()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    // ── Startup ─────────────────────────────────────────────────────────

    /// Load the file given on the command line, if any. On failure the
    /// buffer stays empty and clean, and the path is kept as the save
    /// target.
    ///
    /// # Errors
    ///
    /// Terminal I/O failure while the error dialog is shown.
    pub fn start(&mut self, dialogs: &mut dyn Dialogs) -> io::Result<()> {
        let Some(path) = self.startup_file.take() else {
            return Ok(());
        };
        match fileio::load(&path) {
            Ok(loaded) => self.adopt(path, loaded),
            Err(err) => {
                error!(error = %err, "could not open startup file");
                self.doc = DocumentState::with_path(path);
                dialogs.show_error("Error", &format!("Could not open file:\n{err}"))?;
            }
        }
        Ok(())
    }

    fn adopt(&mut self, path: PathBuf, loaded: Loaded) {
        self.text.set_text(&loaded.text);
        self.encoding = loaded.encoding;
        self.bom = loaded.bom;
        self.doc.mark_clean(Some(path));
    }

    /// What Save writes: the text, behind the mark the file was opened with.
    fn contents(&self) -> String {
        let text = self.text.text();
        if self.bom {
            let mut out = String::with_capacity(text.len() + BYTE_ORDER_MARK.len_utf8());
            out.push(BYTE_ORDER_MARK);
            out.push_str(&text);
            out
        } else {
            text
        }
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Shortcuts run commands; everything else edits.
    ///
    /// # Errors
    ///
    /// Terminal I/O failure inside a dialog.
    pub fn handle_event(&mut self, event: &Event, dialogs: &mut dyn Dialogs) -> io::Result<Action> {
        if let Some(cmd) = event.as_key().and_then(Command::from_key) {
            return self.run_command(cmd, dialogs);
        }
        let response = self.text.handle_event(event);
        self.apply(response);
        Ok(Action::Continue)
    }

    fn apply(&mut self, response: Response) {
        if response.edited() {
            self.doc.mark_dirty();
        }
    }

    /// # Errors
    ///
    /// Terminal I/O failure inside a dialog.
    pub fn run_command(&mut self, cmd: Command, dialogs: &mut dyn Dialogs) -> io::Result<Action> {
        debug!(%cmd, "command");
        match cmd {
            Command::New => self.new_document(dialogs)?,
            Command::Open => self.open(dialogs)?,
            Command::Save => {
                let contents = self.contents();
                flow::save_file(&mut self.doc, &contents, dialogs)?;
            }
            Command::Exit => return self.exit(dialogs),
            Command::Undo => {
                let response = self.text.undo();
                self.apply(response);
            }
            Command::Redo => {
                let response = self.text.redo();
                self.apply(response);
            }
            Command::Copy => {
                self.text.copy();
            }
            Command::Paste => {
                let response = self.text.paste();
                self.apply(response);
            }
            Command::SelectAll => {
                self.text.select_all();
            }
            Command::FontSize => {
                let size = dialogs.ask_integer("Font Size", "Enter new font size:", self.font.size(), SIZE_RANGE)?;
                if let Some(size) = size {
                    self.font.set_size(size);
                }
            }
            Command::About => dialogs.show_info("About", &about_text())?,
        }
        Ok(Action::Continue)
    }

    fn new_document(&mut self, dialogs: &mut dyn Dialogs) -> io::Result<()> {
        let contents = self.contents();
        if !flow::confirm_discard(&mut self.doc, &contents, dialogs)? {
            return Ok(());
        }
        self.text.set_text("");
        self.doc = DocumentState::new();
        self.encoding = TextEncoding::Utf8;
        self.bom = false;
        info!("new document");
        Ok(())
    }

    fn open(&mut self, dialogs: &mut dyn Dialogs) -> io::Result<()> {
        let contents = self.contents();
        if !flow::confirm_discard(&mut self.doc, &contents, dialogs)? {
            return Ok(());
        }
        let Some(path) = dialogs.ask_open_path(OPEN_FILTERS)? else {
            return Ok(());
        };
        match fileio::load(&path) {
            Ok(loaded) => self.adopt(path, loaded),
            Err(err) => {
                error!(error = %err, "open failed");
                dialogs.show_error("Error", &format!("Could not open file:\n{err}"))?;
            }
        }
        Ok(())
    }

    fn exit(&mut self, dialogs: &mut dyn Dialogs) -> io::Result<Action> {
        let contents = self.contents();
        Ok(match flow::exit(&mut self.doc, &contents, dialogs)? {
            ExitDecision::Terminate => {
                info!("exit");
                Action::Quit
            }
            ExitDecision::Stay => Action::Continue,
        })
    }

    // ── Painting ────────────────────────────────────────────────────────

    fn status_line(&self) -> String {
        format!(
            "{}  |  {} pt  |  {}  |  {}",
            self.text.cursor().position(),
            self.font.size(),
            self.text.line_ending(),
            self.encoding,
        )
    }

    fn paint_status(&self, frame: &mut FrameBuffer, y: u16) {
        let width = frame.width();
        frame.fill(Rect::new(0, y, width, 1), ui::BAR);
        let status = self.status_line();
        let w = clamp_u16(text_width(&status));
        let x = width.saturating_sub(w + 1);
        frame.print(x, y, &status, ui::BAR);
    }

    /// The menu an event asks to open: F10, Alt+letter, or a click on a
    /// title.
    fn menu_request(event: &Event) -> Option<Menu> {
        match event {
            Event::Key(key) => Menu::from_key(key),
            Event::Mouse(m) if m.kind == MouseKind::Press(MouseButton::Left) && m.y == 0 => menu::menu_at(m.x),
            _ => None,
        }
    }

    fn open_menu(&mut self, menu: Menu, host: &mut Host) -> io::Result<Action> {
        let picked = host.run_modal(&mut MenuPopup::new(menu, &self.title()))?;
        let Some(cmd) = picked else {
            return Ok(Action::Continue);
        };
        let dir = self.dialog_dir();
        self.run_command(cmd, &mut TermDialogs::new(host, dir))
    }
}

fn about_text() -> String {
    format!(
        "{} {}\nA minimal terminal notepad.",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

// ─── App implementation ──────────────────────────────────────────────────────

impl App for Notepad {
    fn on_start(&mut self, host: &mut Host) -> io::Result<Action> {
        let dir = self.dialog_dir();
        self.start(&mut TermDialogs::new(host, dir))?;
        Ok(Action::Continue)
    }

    fn on_event(&mut self, event: &Event, host: &mut Host) -> io::Result<Action> {
        if let Some(menu) = Self::menu_request(event) {
            return self.open_menu(menu, host);
        }
        let dir = self.dialog_dir();
        self.handle_event(event, &mut TermDialogs::new(host, dir))
    }

    fn on_close(&mut self, host: &mut Host) -> io::Result<Action> {
        info!("close requested");
        let dir = self.dialog_dir();
        self.run_command(Command::Exit, &mut TermDialogs::new(host, dir))
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        let (w, h) = (frame.width(), frame.height());
        if h < 3 {
            self.cursor_screen = self.text.render(frame, Rect::new(0, 0, w, h));
            return;
        }
        menu::paint_bar(frame, &self.title(), None);
        self.cursor_screen = self.text.render(frame, Rect::new(0, 1, w, h - 2));
        self.paint_status(frame, h - 1);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        self.cursor_screen.map(|(x, y)| (x, y, CursorShape::SteadyBar))
    }

    fn title(&self) -> Option<String> {
        Some(self.doc.title())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use n_editor::clipboard::Clipboard;
    use n_editor::prompt::{SaveChoice, Scripted};
    use n_term::input::{KeyCode, KeyEvent};
    use n_term::terminal::Size;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::mpsc;

    fn pad() -> Notepad {
        Notepad::new(TextArea::new(Clipboard::local()), FontSpec::default())
    }

    fn type_str(pad: &mut Notepad, s: &str, d: &mut Scripted) {
        for c in s.chars() {
            pad.handle_event(&Event::Key(KeyEvent::plain(KeyCode::Char(c))), d)
                .unwrap();
        }
    }

    fn ctrl(pad: &mut Notepad, c: char, d: &mut Scripted) -> Action {
        pad.handle_event(&Event::Key(KeyEvent::ctrl(c)), d).unwrap()
    }

    // ── Title and dirty tracking ──

    #[test]
    fn title_marker_appears_on_first_edit() {
        let mut p = pad();
        let mut d = Scripted::new();
        assert_eq!(p.title(), "Untitled - Notepad");
        p.handle_event(&Event::Key(KeyEvent::plain(KeyCode::Right)), &mut d)
            .unwrap();
        assert_eq!(p.title(), "Untitled - Notepad");
        type_str(&mut p, "h", &mut d);
        assert_eq!(p.title(), "*Untitled - Notepad");
        type_str(&mut p, "ello", &mut d);
        assert_eq!(p.title(), "*Untitled - Notepad");
    }

    #[test]
    fn new_type_save_as() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pad();
        let mut d = Scripted::new().path(Some(dir.path().join("a.txt")));

        ctrl(&mut p, 'n', &mut d);
        type_str(&mut p, "hello", &mut d);
        assert_eq!(p.title(), "*Untitled - Notepad");

        ctrl(&mut p, 's', &mut d);
        assert_eq!(p.title(), "a.txt - Notepad");
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello");
        assert_eq!(p.document().path(), Some(dir.path().join("a.txt").as_path()));
        assert!(d.log.iter().all(|entry| !entry.starts_with("save-changes")));
    }

    #[test]
    fn save_to_known_path_does_not_ask() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.txt");
        fs::write(&path, "old").unwrap();
        let mut p = pad().with_file(path.clone());
        let mut d = Scripted::new();
        p.start(&mut d).unwrap();

        type_str(&mut p, "new ", &mut d);
        ctrl(&mut p, 's', &mut d);
        assert!(!p.document().is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new old");
        assert!(d.log.is_empty());
    }

    #[test]
    fn byte_order_mark_is_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.txt");
        fs::write(&path, b"\xEF\xBB\xBFhi").unwrap();
        let mut p = pad().with_file(path.clone());
        let mut d = Scripted::new();
        p.start(&mut d).unwrap();
        assert_eq!(p.text_area().text(), "hi");

        type_str(&mut p, "!", &mut d);
        p.handle_event(&Event::Key(KeyEvent::plain(KeyCode::Backspace)), &mut d)
            .unwrap();
        ctrl(&mut p, 's', &mut d);
        assert_eq!(fs::read(&path).unwrap(), b"\xEF\xBB\xBFhi");
    }

    #[test]
    fn new_document_drops_byte_order_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.txt");
        fs::write(&path, b"\xEF\xBB\xBFhi").unwrap();
        let out = dir.path().join("plain.txt");
        let mut p = pad().with_file(path);
        let mut d = Scripted::new().path(Some(out.clone()));
        p.start(&mut d).unwrap();

        ctrl(&mut p, 'n', &mut d);
        type_str(&mut p, "x", &mut d);
        ctrl(&mut p, 's', &mut d);
        assert_eq!(fs::read(&out).unwrap(), b"x");
    }

    #[test]
    fn undo_after_save_is_dirty_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pad();
        let mut d = Scripted::new().path(Some(dir.path().join("u.txt")));
        type_str(&mut p, "abc", &mut d);
        ctrl(&mut p, 's', &mut d);
        assert!(!p.document().is_dirty());
        ctrl(&mut p, 'z', &mut d);
        assert!(p.document().is_dirty());
        assert_eq!(p.text_area().text(), "");
    }

    #[test]
    fn select_all_and_copy_do_not_dirty() {
        let mut p = pad();
        let mut d = Scripted::new();
        ctrl(&mut p, 'a', &mut d);
        ctrl(&mut p, 'c', &mut d);
        assert!(!p.document().is_dirty());
    }

    #[test]
    fn copy_paste_dirties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.txt");
        fs::write(&path, "xy").unwrap();
        let mut p = pad().with_file(path);
        let mut d = Scripted::new();
        p.start(&mut d).unwrap();

        ctrl(&mut p, 'a', &mut d);
        ctrl(&mut p, 'c', &mut d);
        p.handle_event(&Event::Key(KeyEvent::plain(KeyCode::End)), &mut d)
            .unwrap();
        ctrl(&mut p, 'v', &mut d);
        assert_eq!(p.text_area().text(), "xyxy");
        assert_eq!(p.title(), "*c.txt - Notepad");
    }

    // ── Open ──

    #[test]
    fn open_loads_and_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "line one\nline two\n").unwrap();
        let mut p = pad();
        let mut d = Scripted::new().path(Some(path.clone()));

        ctrl(&mut p, 'o', &mut d);
        assert_eq!(p.text_area().text(), "line one\nline two\n");
        assert!(!p.document().is_dirty());
        assert_eq!(p.document().path(), Some(path.as_path()));
        assert_eq!(p.title(), "notes.txt - Notepad");
    }

    #[test]
    fn open_invalid_utf8_uses_fallback_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.txt");
        fs::write(&path, b"caf\xE9").unwrap();
        let mut p = pad();
        let mut d = Scripted::new().path(Some(path));

        ctrl(&mut p, 'o', &mut d);
        assert_eq!(p.text_area().text(), "café");
        assert_eq!(p.encoding(), TextEncoding::Windows1252);
        assert_eq!(d.asked("error"), 0);
    }

    #[test]
    fn open_failure_shows_error_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pad();
        let mut d = Scripted::new().path(Some(dir.path().join("gone.txt")));
        type_str(&mut p, "keep", &mut d);
        d.choices.push(SaveChoice::Discard);

        ctrl(&mut p, 'o', &mut d);
        assert_eq!(p.text_area().text(), "keep");
        assert!(p.document().is_dirty());
        assert_eq!(d.asked("error: Error: Could not open file:\n"), 1);
    }

    #[test]
    fn open_cancelled_at_prompt_never_asks_for_file() {
        let mut p = pad();
        let mut d = Scripted::new().choice(SaveChoice::Cancel);
        type_str(&mut p, "x", &mut d);
        ctrl(&mut p, 'o', &mut d);
        assert_eq!(d.asked("open-path"), 0);
        assert_eq!(p.text_area().text(), "x");
    }

    // ── New ──

    #[test]
    fn new_after_discard_resets() {
        let mut p = pad();
        let mut d = Scripted::new().choice(SaveChoice::Discard);
        type_str(&mut p, "scratch", &mut d);
        ctrl(&mut p, 'n', &mut d);
        assert_eq!(p.text_area().text(), "");
        assert_eq!(p.title(), "Untitled - Notepad");
    }

    #[test]
    fn new_on_clean_document_does_not_prompt() {
        let mut p = pad();
        let mut d = Scripted::new();
        ctrl(&mut p, 'n', &mut d);
        assert!(d.log.is_empty());
    }

    // ── Startup ──

    #[test]
    fn startup_with_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let mut p = pad().with_file(path.clone());
        let mut d = Scripted::new();
        p.start(&mut d).unwrap();

        assert_eq!(d.asked("error"), 1);
        assert_eq!(d.log.len(), 1);
        assert_eq!(p.text_area().text(), "");
        assert!(!p.document().is_dirty());
        assert_eq!(p.document().path(), Some(path.as_path()));
        assert_eq!(p.title(), "missing.txt - Notepad");
    }

    #[test]
    fn startup_with_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.txt");
        fs::write(&path, "start").unwrap();
        let mut p = pad().with_file(path);
        let mut d = Scripted::new();
        p.start(&mut d).unwrap();
        assert_eq!(p.text_area().text(), "start");
        assert_eq!(p.title(), "s.txt - Notepad");
        assert!(d.log.is_empty());
    }

    // ── Exit ──

    #[test]
    fn exit_clean_quits() {
        let mut p = pad();
        let mut d = Scripted::new();
        assert_eq!(ctrl(&mut p, 'q', &mut d), Action::Quit);
    }

    #[test]
    fn exit_cancel_keeps_running() {
        let mut p = pad();
        let mut d = Scripted::new().choice(SaveChoice::Cancel);
        type_str(&mut p, "x", &mut d);
        assert_eq!(ctrl(&mut p, 'q', &mut d), Action::Continue);
        assert!(p.document().is_dirty());
    }

    #[test]
    fn exit_save_with_cancelled_picker_keeps_running() {
        let mut p = pad();
        let mut d = Scripted::new().choice(SaveChoice::Save).path(None);
        type_str(&mut p, "x", &mut d);
        assert_eq!(ctrl(&mut p, 'q', &mut d), Action::Continue);
    }

    // ── Font and About ──

    #[test]
    fn font_size_command() {
        let mut p = pad();
        let mut d = Scripted::new().integer(Some(20)).integer(None);
        p.run_command(Command::FontSize, &mut d).unwrap();
        assert_eq!(p.font().size(), 20);
        p.run_command(Command::FontSize, &mut d).unwrap();
        assert_eq!(p.font().size(), 20);
        assert!(!p.document().is_dirty());
    }

    #[test]
    fn about_shows_name_and_version() {
        let mut p = pad();
        let mut d = Scripted::new();
        p.handle_event(&Event::Key(KeyEvent::plain(KeyCode::F(1))), &mut d)
            .unwrap();
        assert_eq!(d.log.len(), 1);
        assert!(d.log[0].contains(env!("CARGO_PKG_VERSION")));
    }

    // ── Painting ──

    #[test]
    fn paint_shows_title_text_and_status() {
        let mut p = pad();
        let mut d = Scripted::new();
        type_str(&mut p, "hello", &mut d);
        let mut frame = FrameBuffer::new(60, 5);
        p.paint(&mut frame);

        assert!(frame.row_text(0).contains("*Untitled - Notepad"));
        assert!(frame.row_text(1).starts_with("hello"));
        let status = frame.row_text(4);
        assert!(status.contains("Ln 1, Col 6"));
        assert!(status.contains("12 pt"));
        assert!(status.contains("UTF-8"));
        assert_eq!(App::cursor(&p), Some((5, 1, CursorShape::SteadyBar)));
    }

    #[test]
    fn tiny_screen_is_all_text() {
        let mut p = pad();
        let mut frame = FrameBuffer::new(10, 2);
        p.paint(&mut frame);
        assert_eq!(App::cursor(&p), Some((0, 0, CursorShape::SteadyBar)));
    }

    // ── Through the event loop ──

    #[test]
    fn runs_in_headless_host_until_exit() {
        let (tx, rx) = mpsc::channel();
        tx.send(b"hi".to_vec()).unwrap();
        // Ctrl+Q, then "No" to the save prompt.
        tx.send(b"\x11n".to_vec()).unwrap();
        let mut host = Host::headless(Size { cols: 40, rows: 6 }, rx);
        let mut p = pad();

        host.run_app(&mut p).unwrap();
        assert_eq!(host.title(), Some("*Untitled - Notepad"));
        assert_eq!(p.text_area().text(), "hi");
    }

    #[test]
    fn close_request_goes_through_exit_prompt() {
        let (tx, rx) = mpsc::channel();
        tx.send(b"c".to_vec()).unwrap();
        let mut host = Host::headless(Size { cols: 40, rows: 6 }, rx);
        let mut p = pad();
        let mut d = Scripted::new();
        type_str(&mut p, "x", &mut d);

        assert_eq!(p.on_close(&mut host).unwrap(), Action::Continue);
        assert!(p.document().is_dirty());
    }

    #[test]
    fn f10_opens_file_menu() {
        let (tx, rx) = mpsc::channel();
        // Pick Exit with its mnemonic.
        tx.send(b"x".to_vec()).unwrap();
        let mut host = Host::headless(Size { cols: 40, rows: 10 }, rx);
        let mut p = pad();
        let action = p
            .on_event(&Event::Key(KeyEvent::plain(KeyCode::F(10))), &mut host)
            .unwrap();
        assert_eq!(action, Action::Quit);
    }
}
