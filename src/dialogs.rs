// SPDX-License-Identifier: MIT
//
// Modal dialogs drawn in the terminal.
//
// Each dialog is an n-term `Modal`: it paints itself over the last editor
// frame and consumes events until it has an answer. `TermDialogs` runs them
// through `Host::run_modal` and implements the editor core's `Dialogs`
// trait, so the save/discard flow never knows it is talking to a terminal.
//
//   MessageDialog  message + a row of buttons (OK, Yes/No, Yes/No/Cancel)
//   IntegerDialog  prompt + one-line field, validated against a range
//   FileDialog     directory browser with a name field and type filters

use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use n_editor::fileio::{FileFilter, apply_default_extension};
use n_editor::prompt::{Dialogs, SaveChoice};
use n_term::buffer::{FrameBuffer, Rect, text_width};
use n_term::cell::Style;
use n_term::event_loop::{Host, Modal};
use n_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseKind};
use tracing::{debug, warn};

use crate::ui::{self, clamp_u16};

// ─── Buttons ─────────────────────────────────────────────────────────────────

/// A dialog button and the letter that presses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub key: char,
}

pub const OK: &[Button] = &[Button { label: "OK", key: 'o' }];

pub const YES_NO: &[Button] = &[Button { label: "Yes", key: 'y' }, Button { label: "No", key: 'n' }];

pub const YES_NO_CANCEL: &[Button] = &[
    Button { label: "Yes", key: 'y' },
    Button { label: "No", key: 'n' },
    Button { label: "Cancel", key: 'c' },
];

fn labels(buttons: &[Button]) -> Vec<&'static str> {
    buttons.iter().map(|b| b.label).collect()
}

/// A plain, unmodified key.
fn plain(event: &Event) -> Option<KeyCode> {
    let key = event.as_key()?;
    (key.modifiers.is_empty() || key.modifiers == Modifiers::SHIFT).then_some(key.code)
}

fn left_click(event: &Event) -> Option<(u16, u16)> {
    match event {
        Event::Mouse(m) if m.kind == MouseKind::Press(MouseButton::Left) => Some((m.x, m.y)),
        _ => None,
    }
}

// ─── Line edit ───────────────────────────────────────────────────────────────

/// A single-line text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEdit {
    chars: Vec<char>,
    cursor: usize,
}

impl LineEdit {
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn set_text(&mut self, text: &str) {
        *self = Self::with_text(text);
    }

    /// Apply an editing key. Returns true if the key was used.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.chars.len() => {
                self.chars.remove(self.cursor);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.chars.len(),
            KeyCode::Backspace | KeyCode::Delete => {}
            _ => return false,
        }
        true
    }

    /// Insert pasted text, dropping line breaks.
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.chars.insert(self.cursor, c);
            self.cursor += 1;
        }
    }

    /// Draw into `width` columns, scrolled so the cursor shows. Returns the
    /// cursor's screen column.
    pub fn render(&self, frame: &mut FrameBuffer, x: u16, y: u16, width: u16, style: Style) -> u16 {
        frame.fill(Rect::new(x, y, width, 1), style);
        let width = usize::from(width.max(1));
        let w = |c: &char| text_width(c.encode_utf8(&mut [0u8; 4]));
        let mut start = 0;
        while start < self.cursor && self.chars[start..self.cursor].iter().map(w).sum::<usize>() >= width {
            start += 1;
        }
        let visible: String = self.chars[start..].iter().collect();
        frame.print_clipped(x, y, &visible, style, clamp_u16(width));
        let before: usize = self.chars[start..self.cursor].iter().map(w).sum();
        x.saturating_add(clamp_u16(before))
    }
}

// ─── Message dialog ──────────────────────────────────────────────────────────

/// A message with buttons. Yields the index of the pressed button; Esc
/// presses the last one.
#[derive(Debug)]
pub struct MessageDialog {
    title: String,
    message: String,
    buttons: &'static [Button],
    focus: usize,
    hits: Vec<Rect>,
}

impl MessageDialog {
    #[must_use]
    pub fn new(title: &str, message: &str, buttons: &'static [Button]) -> Self {
        Self {
            title: title.to_owned(),
            message: message.to_owned(),
            buttons,
            focus: 0,
            hits: Vec::new(),
        }
    }
}

impl Modal for MessageDialog {
    type Output = usize;

    fn on_event(&mut self, event: &Event) -> Option<usize> {
        let n = self.buttons.len().max(1);
        if let Some((x, y)) = left_click(event) {
            return self.hits.iter().position(|r| r.contains(x, y));
        }
        match plain(event)? {
            KeyCode::Enter | KeyCode::Char(' ') => Some(self.focus),
            KeyCode::Escape => Some(n - 1),
            KeyCode::Left | KeyCode::BackTab => {
                self.focus = (self.focus + n - 1) % n;
                None
            }
            KeyCode::Right | KeyCode::Tab => {
                self.focus = (self.focus + 1) % n;
                None
            }
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                self.buttons.iter().position(|b| b.key == c)
            }
            _ => None,
        }
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        let area = frame.area();
        let max_text = usize::from(area.width.saturating_sub(8).clamp(10, 60));
        let lines = ui::wrap(&self.message, max_text);
        let names = labels(self.buttons);

        let text_w = lines.iter().map(|l| text_width(l)).max().unwrap_or(0);
        let title_w = text_width(&self.title) + 4;
        let inner = clamp_u16(text_w.max(title_w)).max(ui::buttons_width(&names));
        let rect = area.centered(inner.saturating_add(4), clamp_u16(lines.len() + 5));

        ui::draw_box(frame, rect, Some(&self.title), ui::DIALOG);
        for (i, line) in lines.iter().enumerate() {
            let y = rect.y.saturating_add(2).saturating_add(clamp_u16(i));
            if y + 2 >= rect.bottom() {
                break;
            }
            frame.print_clipped(rect.x + 2, y, line, ui::DIALOG, rect.width.saturating_sub(4));
        }
        let buttons_y = rect.bottom().saturating_sub(2);
        self.hits = ui::draw_buttons(frame, rect, buttons_y, &names, self.focus);
    }
}

// ─── Integer dialog ──────────────────────────────────────────────────────────

/// Check `input` against `range`, with the message shown on failure.
///
/// # Errors
///
/// A user-facing explanation when the input is not an integer or is out
/// of range.
pub fn parse_in_range(input: &str, range: &RangeInclusive<u16>) -> Result<u16, String> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| "Not an integer. Please try again.".to_owned())?;
    let (min, max) = (i64::from(*range.start()), i64::from(*range.end()));
    if value < min {
        return Err(format!("The allowed minimum value is {min}. Please try again."));
    }
    if value > max {
        return Err(format!("The allowed maximum value is {max}. Please try again."));
    }
    u16::try_from(value).map_err(|e| e.to_string())
}

/// Asks for an integer. Invalid input keeps the dialog open with a message.
#[derive(Debug)]
pub struct IntegerDialog {
    title: String,
    prompt: String,
    field: LineEdit,
    range: RangeInclusive<u16>,
    error: Option<String>,
    hits: Vec<Rect>,
    cursor: Option<(u16, u16)>,
}

const OK_CANCEL: &[&str] = &["OK", "Cancel"];

impl IntegerDialog {
    #[must_use]
    pub fn new(title: &str, prompt: &str, initial: u16, range: RangeInclusive<u16>) -> Self {
        Self {
            title: title.to_owned(),
            prompt: prompt.to_owned(),
            field: LineEdit::with_text(&initial.to_string()),
            range,
            error: None,
            hits: Vec::new(),
            cursor: None,
        }
    }

    fn submit(&mut self) -> Option<Option<u16>> {
        match parse_in_range(&self.field.text(), &self.range) {
            Ok(value) => Some(Some(value)),
            Err(message) => {
                debug!(input = %self.field.text(), "rejected integer input");
                self.error = Some(message);
                None
            }
        }
    }
}

impl Modal for IntegerDialog {
    type Output = Option<u16>;

    fn on_event(&mut self, event: &Event) -> Option<Option<u16>> {
        if let Some((x, y)) = left_click(event) {
            return match self.hits.iter().position(|r| r.contains(x, y)) {
                Some(0) => self.submit(),
                Some(_) => Some(None),
                None => None,
            };
        }
        if let Event::Paste(text) = event {
            self.field.paste(text);
            return None;
        }
        let key = event.as_key()?;
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Escape => Some(None),
            _ => {
                if self.field.handle_key(key) {
                    self.error = None;
                }
                None
            }
        }
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        let area = frame.area();
        let inner = area.width.saturating_sub(8).clamp(10, 44);
        let prompt = ui::wrap(&self.prompt, usize::from(inner));
        let error = self.error.as_deref().map(|e| ui::wrap(e, usize::from(inner))).unwrap_or_default();
        let height = prompt.len() + error.len() + 7;
        let rect = area.centered(inner + 4, clamp_u16(height));
        let x = rect.x + 2;

        ui::draw_box(frame, rect, Some(&self.title), ui::DIALOG);
        let mut y = rect.y + 2;
        for line in &prompt {
            frame.print_clipped(x, y, line, ui::DIALOG, inner);
            y += 1;
        }
        let cx = self.field.render(frame, x, y, inner, ui::FIELD);
        self.cursor = Some((cx, y));
        y += 1;
        for line in &error {
            frame.print_clipped(x, y, line, ui::DIALOG_ERROR, inner);
            y += 1;
        }
        let buttons_y = rect.bottom().saturating_sub(2);
        self.hits = ui::draw_buttons(frame, rect, buttons_y, OK_CANCEL, usize::MAX);
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }
}

// ─── File dialog ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Open,
    Save,
}

/// A row in the file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

impl Entry {
    fn label(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// The entries of `dir` the dialog shows: `..` when there is a parent,
/// then directories, then files passing `filter`. Hidden names are left
/// out. Each group is sorted case-insensitively.
///
/// # Errors
///
/// Returns the error from reading the directory.
pub fn list_dir(dir: &Path, filter: &FileFilter) -> io::Result<Vec<Entry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        // Follows symlinks, so a link to a directory is browsable.
        let is_dir = entry.path().is_dir();
        if is_dir {
            dirs.push(Entry { name, is_dir });
        } else if filter.matches(Path::new(&name)) {
            files.push(Entry { name, is_dir });
        }
    }
    let key = |e: &Entry| e.name.to_lowercase();
    dirs.sort_by_key(key);
    files.sort_by_key(key);

    let mut entries = Vec::with_capacity(dirs.len() + files.len() + 1);
    if dir.parent().is_some() {
        entries.push(Entry {
            name: "..".into(),
            is_dir: true,
        });
    }
    entries.extend(dirs);
    entries.extend(files);
    Ok(entries)
}

/// Browse for a file to open or a place to save.
///
/// Up/Down walk the list, typing edits the name field, Enter opens a
/// directory or picks a file, Tab cycles the type filter, Esc cancels.
#[derive(Debug)]
pub struct FileDialog {
    mode: FileMode,
    dir: PathBuf,
    filters: Vec<FileFilter>,
    filter: usize,
    default_ext: String,
    entries: Vec<Entry>,
    selected: usize,
    scroll: usize,
    name: LineEdit,
    error: Option<String>,
    list_area: Rect,
    hits: Vec<Rect>,
    cursor: Option<(u16, u16)>,
}

impl FileDialog {
    #[must_use]
    pub fn open(dir: PathBuf, filters: &[FileFilter]) -> Self {
        Self::new(FileMode::Open, dir, filters, "")
    }

    #[must_use]
    pub fn save(dir: PathBuf, filters: &[FileFilter], default_ext: &str) -> Self {
        Self::new(FileMode::Save, dir, filters, default_ext)
    }

    fn new(mode: FileMode, dir: PathBuf, filters: &[FileFilter], default_ext: &str) -> Self {
        let filters = if filters.is_empty() {
            vec![FileFilter::ALL]
        } else {
            filters.to_vec()
        };
        let mut dialog = Self {
            mode,
            dir,
            filters,
            filter: 0,
            default_ext: default_ext.to_owned(),
            entries: Vec::new(),
            selected: 0,
            scroll: 0,
            name: LineEdit::default(),
            error: None,
            list_area: Rect::default(),
            hits: Vec::new(),
            cursor: None,
        };
        dialog.refresh();
        dialog
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn filter(&self) -> &FileFilter {
        &self.filters[self.filter]
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn title(&self) -> &'static str {
        match self.mode {
            FileMode::Open => "Open",
            FileMode::Save => "Save As",
        }
    }

    fn refresh(&mut self) {
        match list_dir(&self.dir, &self.filters[self.filter]) {
            Ok(entries) => self.entries = entries,
            Err(err) => {
                warn!(dir = %self.dir.display(), error = %err, "cannot list directory");
                self.error = Some(format!("{}: {err}", self.dir.display()));
                self.entries = if self.dir.parent().is_some() {
                    vec![Entry {
                        name: "..".into(),
                        is_dir: true,
                    }]
                } else {
                    Vec::new()
                };
            }
        }
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        self.scroll = self.scroll.min(self.selected);
    }

    fn enter_dir(&mut self, dir: PathBuf) {
        self.dir = if dir.ends_with("..") {
            dir.parent().and_then(Path::parent).map_or(dir.clone(), Path::to_path_buf)
        } else {
            dir
        };
        self.selected = 0;
        self.scroll = 0;
        self.error = None;
        self.name = LineEdit::default();
        self.refresh();
    }

    fn cycle_filter(&mut self, forward: bool) {
        let n = self.filters.len();
        self.filter = if forward {
            (self.filter + 1) % n
        } else {
            (self.filter + n - 1) % n
        };
        self.selected = 0;
        self.scroll = 0;
        self.refresh();
    }

    fn select(&mut self, index: usize) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = index.min(self.entries.len() - 1);
        if let Some(entry) = self.entries.get(self.selected).filter(|e| !e.is_dir) {
            self.name.set_text(&entry.name);
        }
    }

    /// Enter: the typed name wins over the list selection.
    fn activate(&mut self) -> Option<Option<PathBuf>> {
        let typed = self.name.text();
        let target = if typed.trim().is_empty() {
            let entry = self.entries.get(self.selected)?;
            self.dir.join(&entry.name)
        } else {
            self.dir.join(typed.trim())
        };

        if target.is_dir() {
            self.enter_dir(target);
            return None;
        }
        match self.mode {
            FileMode::Open if target.is_file() => Some(Some(target)),
            FileMode::Open => {
                self.error = Some(format!("{}: file not found.", target.display()));
                None
            }
            FileMode::Save => Some(Some(apply_default_extension(target, &self.default_ext))),
        }
    }

    fn list_height(&self) -> usize {
        usize::from(self.list_area.height.max(1))
    }
}

impl Modal for FileDialog {
    type Output = Option<PathBuf>;

    fn on_event(&mut self, event: &Event) -> Option<Option<PathBuf>> {
        match event {
            Event::Mouse(m) => {
                match m.kind {
                    MouseKind::Press(MouseButton::Left) => {
                        if let Some(i) = self.hits.iter().position(|r| r.contains(m.x, m.y)) {
                            return if i == 0 { self.activate() } else { Some(None) };
                        }
                        if self.list_area.contains(m.x, m.y) {
                            let index = self.scroll + usize::from(m.y - self.list_area.y);
                            if index < self.entries.len() {
                                if index == self.selected {
                                    self.name = LineEdit::default();
                                    return self.activate();
                                }
                                self.select(index);
                            }
                        }
                    }
                    MouseKind::ScrollUp => self.scroll = self.scroll.saturating_sub(3),
                    MouseKind::ScrollDown => {
                        let max = self.entries.len().saturating_sub(self.list_height());
                        self.scroll = (self.scroll + 3).min(max);
                    }
                    _ => {}
                }
                return None;
            }
            Event::Paste(text) => {
                self.name.paste(text);
                return None;
            }
            Event::Key(_) => {}
        }

        let key = event.as_key()?;
        let page = self.list_height().saturating_sub(1).max(1);
        match key.code {
            KeyCode::Escape => return Some(None),
            KeyCode::Enter => return self.activate(),
            KeyCode::Tab => self.cycle_filter(true),
            KeyCode::BackTab => self.cycle_filter(false),
            KeyCode::Up => self.select(self.selected.saturating_sub(1)),
            KeyCode::Down => self.select(self.selected + 1),
            KeyCode::PageUp => self.select(self.selected.saturating_sub(page)),
            KeyCode::PageDown => self.select(self.selected + page),
            _ => {
                if self.name.handle_key(key) {
                    self.error = None;
                }
            }
        }
        None
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        let area = frame.area();
        let rect = area.centered(area.width.saturating_sub(4).min(72), area.height.saturating_sub(2).min(22));
        ui::draw_box(frame, rect, Some(self.title()), ui::DIALOG);
        if rect.height < 8 || rect.width < 12 {
            return;
        }
        let x = rect.x + 2;
        let inner = rect.width - 4;

        let look_in = format!("Look in: {}", self.dir.display());
        frame.print_clipped(x, rect.y + 1, &look_in, ui::DIALOG, inner);

        // List.
        self.list_area = Rect::new(x, rect.y + 2, inner, rect.height - 7);
        let height = self.list_height();
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + height {
            self.scroll = self.selected + 1 - height;
        }
        frame.fill(self.list_area, ui::LIST);
        for (row, entry) in self.entries.iter().enumerate().skip(self.scroll).take(height) {
            let y = self.list_area.y + clamp_u16(row - self.scroll);
            let style = if row == self.selected {
                ui::LIST_SELECTED
            } else {
                ui::LIST
            };
            frame.fill(Rect::new(x, y, inner, 1), style);
            frame.print_clipped(x + 1, y, &entry.label(), style, inner.saturating_sub(1));
        }

        // Name field.
        let name_y = self.list_area.bottom();
        let label = "File name: ";
        let lw = clamp_u16(text_width(label));
        frame.print_clipped(x, name_y, label, ui::DIALOG, inner);
        let cx = self
            .name
            .render(frame, x + lw, name_y, inner.saturating_sub(lw), ui::FIELD);
        self.cursor = Some((cx, name_y));

        // Type filter.
        let kind = format!("Files of type: < {} >  (Tab)", self.filters[self.filter].label());
        frame.print_clipped(x, name_y + 1, &kind, ui::DIALOG, inner);

        if let Some(err) = &self.error {
            frame.print_clipped(x, name_y + 2, err, ui::DIALOG_ERROR, inner);
        }

        let action = match self.mode {
            FileMode::Open => "Open",
            FileMode::Save => "Save",
        };
        self.hits = ui::draw_buttons(frame, rect, rect.bottom() - 2, &[action, "Cancel"], usize::MAX);
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }
}

// ─── Dialogs over a host ─────────────────────────────────────────────────────

/// The editor's prompts, shown as modal dialogs on `host`.
pub struct TermDialogs<'h> {
    host: &'h mut Host,
    dir: PathBuf,
}

impl<'h> TermDialogs<'h> {
    /// File dialogs start browsing in `dir`.
    pub fn new(host: &'h mut Host, dir: PathBuf) -> Self {
        Self { host, dir }
    }

    fn message(&mut self, title: &str, message: &str, buttons: &'static [Button]) -> io::Result<usize> {
        self.host.run_modal(&mut MessageDialog::new(title, message, buttons))
    }
}

impl Dialogs for TermDialogs<'_> {
    fn ask_save_changes(&mut self, name: &str) -> io::Result<SaveChoice> {
        let question = format!("Do you want to save changes to {name}?");
        Ok(match self.message("Notepad", &question, YES_NO_CANCEL)? {
            0 => SaveChoice::Save,
            1 => SaveChoice::Discard,
            _ => SaveChoice::Cancel,
        })
    }

    fn ask_open_path(&mut self, filters: &[FileFilter]) -> io::Result<Option<PathBuf>> {
        let mut dialog = FileDialog::open(self.dir.clone(), filters);
        self.host.run_modal(&mut dialog)
    }

    fn ask_save_path(&mut self, filters: &[FileFilter], default_ext: &str) -> io::Result<Option<PathBuf>> {
        let mut dialog = FileDialog::save(self.dir.clone(), filters, default_ext);
        loop {
            let Some(path) = self.host.run_modal(&mut dialog)? else {
                return Ok(None);
            };
            if !path.exists() {
                return Ok(Some(path));
            }
            let name = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            let question = format!("{name} already exists. Do you want to replace it?");
            if self.message("Confirm Save As", &question, YES_NO)? == 0 {
                return Ok(Some(path));
            }
        }
    }

    fn ask_integer(
        &mut self,
        title: &str,
        prompt: &str,
        initial: u16,
        range: RangeInclusive<u16>,
    ) -> io::Result<Option<u16>> {
        self.host
            .run_modal(&mut IntegerDialog::new(title, prompt, initial, range))
    }

    fn show_error(&mut self, title: &str, message: &str) -> io::Result<()> {
        self.message(title, message, OK).map(drop)
    }

    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()> {
        self.message(title, message, OK).map(drop)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
