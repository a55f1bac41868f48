// SPDX-License-Identifier: MIT
//
// Menu bar and drop-down menus.
//
// The bar is painted by the application on row 0 every frame. Opening a
// menu runs a `MenuPopup` modal on top of it; the popup yields the chosen
// command, or `None` when dismissed. Menu layout (which items, in which
// order) lives in n-editor's `command` module; this file only draws it and
// routes keys and clicks.

use n_editor::command::{Command, Menu, MenuEntry};
use n_term::buffer::{FrameBuffer, Rect, text_width};
use n_term::cell::{Attr, Style};
use n_term::event_loop::Modal;
use n_term::input::{Event, KeyCode, Modifiers, MouseButton, MouseKind};

use crate::ui::{self, clamp_u16};

/// Left margin of the first title.
const BAR_START: u16 = 1;

// ─── Bar ─────────────────────────────────────────────────────────────────────

/// Column and width of each title, including one space of padding on both
/// sides.
#[must_use]
pub fn title_spans() -> [(Menu, u16, u16); 3] {
    let mut x = BAR_START;
    Menu::ALL.map(|menu| {
        let w = clamp_u16(menu.title().len() + 2);
        let span = (menu, x, w);
        x += w;
        span
    })
}

/// The menu whose title covers column `x`.
#[must_use]
pub fn menu_at(x: u16) -> Option<Menu> {
    title_spans()
        .into_iter()
        .find(|&(_, start, w)| x >= start && x < start + w)
        .map(|(menu, _, _)| menu)
}

/// Print `label` with the first occurrence of `mnemonic` underlined.
fn print_with_mnemonic(frame: &mut FrameBuffer, x: u16, y: u16, label: &str, mnemonic: char, style: Style, mark: Style) {
    let mut marked = false;
    let mut col = x;
    for ch in label.chars() {
        let is_mark = !marked && ch.to_ascii_lowercase() == mnemonic;
        marked |= is_mark;
        let s = if is_mark { mark } else { style };
        col += frame.print(col, y, ch.encode_utf8(&mut [0u8; 4]), s);
    }
}

/// Draw the menu bar on row 0 with `title` in the space after the menu
/// titles, highlighting `open` if a menu is showing.
pub fn paint_bar(frame: &mut FrameBuffer, title: &str, open: Option<Menu>) {
    let width = frame.width();
    frame.fill(Rect::new(0, 0, width, 1), ui::BAR);
    let mut end = BAR_START;
    for (menu, x, w) in title_spans() {
        let (style, mark) = if open == Some(menu) {
            (ui::BAR_OPEN, ui::BAR_OPEN.with(Attr::UNDERLINE))
        } else {
            (ui::BAR, ui::BAR_MNEMONIC)
        };
        frame.fill(Rect::new(x, 0, w, 1), style);
        print_with_mnemonic(frame, x + 1, 0, menu.title(), menu.mnemonic(), style, mark);
        end = x + w;
    }
    let title_w = clamp_u16(text_width(title));
    let room = width.saturating_sub(end + 2);
    if room > 0 {
        let shown = title_w.min(room);
        let x = if title_w <= room {
            // Centered in the space right of the titles.
            end + 1 + (room - title_w) / 2
        } else {
            end + 1
        };
        frame.print_clipped(x, 0, title, ui::BAR, shown);
    }
}

// ─── Popup ───────────────────────────────────────────────────────────────────

/// An open drop-down menu.
#[derive(Debug)]
pub struct MenuPopup {
    menu: Menu,
    highlight: usize,
    /// Where the popup was last drawn, for mouse hits.
    rect: Rect,
    bar_title: String,
}

impl MenuPopup {
    #[must_use]
    pub fn new(menu: Menu, bar_title: &str) -> Self {
        let mut popup = Self {
            menu,
            highlight: 0,
            rect: Rect::default(),
            bar_title: bar_title.to_owned(),
        };
        popup.switch(menu);
        popup
    }

    #[must_use]
    pub const fn menu(&self) -> Menu {
        self.menu
    }

    /// The highlighted command.
    #[must_use]
    pub fn current(&self) -> Option<Command> {
        self.menu.entries().get(self.highlight).and_then(|e| e.command())
    }

    fn switch(&mut self, menu: Menu) {
        self.menu = menu;
        self.highlight = menu
            .entries()
            .iter()
            .position(|e| e.command().is_some())
            .unwrap_or(0);
    }

    /// Move the highlight, skipping separators and wrapping around.
    fn step(&mut self, forward: bool) {
        let entries = self.menu.entries();
        let n = entries.len();
        for _ in 0..n {
            self.highlight = if forward {
                (self.highlight + 1) % n
            } else {
                (self.highlight + n - 1) % n
            };
            if entries[self.highlight].command().is_some() {
                return;
            }
        }
    }

    /// Inner width: label, a gap, accelerator.
    fn inner_width(&self) -> u16 {
        let items = self.menu.entries().iter().filter_map(|e| e.command());
        let widest = items
            .map(|cmd| {
                let accel = cmd.accelerator();
                let gap = if accel.is_empty() { 0 } else { 4 };
                text_width(cmd.label()) + gap + text_width(accel)
            })
            .max()
            .unwrap_or(0);
        clamp_u16(widest + 2)
    }

    fn layout(&self, area: Rect) -> Rect {
        let (_, x, _) = title_spans()[self.menu.index()];
        let width = self.inner_width() + 2;
        let height = clamp_u16(self.menu.entries().len() + 2);
        let x = x.min(area.width.saturating_sub(width));
        Rect::new(x, 1, width.min(area.width), height.min(area.height.saturating_sub(1)))
    }

    fn entry_at(&self, x: u16, y: u16) -> Option<usize> {
        let inner = self.rect.inset(1);
        inner.contains(x, y).then(|| usize::from(y - inner.y))
    }
}

impl Modal for MenuPopup {
    type Output = Option<Command>;

    fn on_event(&mut self, event: &Event) -> Option<Option<Command>> {
        match event {
            Event::Key(key) => {
                if let Some(cmd) = Command::from_key(key) {
                    return Some(Some(cmd));
                }
                if let Some(menu) = Menu::from_key(key).filter(|_| key.modifiers == Modifiers::ALT) {
                    self.switch(menu);
                    return None;
                }
                if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
                    return None;
                }
                match key.code {
                    KeyCode::Escape | KeyCode::F(10) => Some(None),
                    KeyCode::Left => {
                        self.switch(self.menu.step(false));
                        None
                    }
                    KeyCode::Right => {
                        self.switch(self.menu.step(true));
                        None
                    }
                    KeyCode::Up => {
                        self.step(false);
                        None
                    }
                    KeyCode::Down => {
                        self.step(true);
                        None
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => Some(self.current()),
                    KeyCode::Char(c) => {
                        let c = c.to_ascii_lowercase();
                        self.menu
                            .entries()
                            .iter()
                            .filter_map(|e| e.command())
                            .find(|cmd| cmd.mnemonic() == c)
                            .map(Some)
                    }
                    _ => None,
                }
            }
            Event::Mouse(m) => match m.kind {
                MouseKind::Press(MouseButton::Left) => {
                    if m.y == 0 {
                        return match menu_at(m.x) {
                            Some(menu) if menu != self.menu => {
                                self.switch(menu);
                                None
                            }
                            _ => Some(None),
                        };
                    }
                    match self.entry_at(m.x, m.y) {
                        Some(i) => match self.menu.entries().get(i) {
                            Some(MenuEntry::Item(cmd)) => Some(Some(*cmd)),
                            _ => None,
                        },
                        None => Some(None),
                    }
                }
                MouseKind::Drag(_) => {
                    if let Some(i) = self.entry_at(m.x, m.y) {
                        if self.menu.entries().get(i).is_some_and(|e| e.command().is_some()) {
                            self.highlight = i;
                        }
                    }
                    None
                }
                _ => None,
            },
            Event::Paste(_) => None,
        }
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        paint_bar(frame, &self.bar_title, Some(self.menu));
        self.rect = self.layout(frame.area());
        let rect = self.rect;
        ui::draw_box(frame, rect, None, ui::POPUP);

        let inner = rect.inset(1);
        for (i, entry) in self.menu.entries().iter().enumerate() {
            let y = inner.y + clamp_u16(i);
            if y >= inner.bottom() {
                break;
            }
            let Some(cmd) = entry.command() else {
                ui::draw_divider(frame, rect, y, ui::POPUP);
                continue;
            };
            let (style, mark) = if i == self.highlight {
                (ui::POPUP_SELECTED, ui::POPUP_SELECTED_MNEMONIC)
            } else {
                (ui::POPUP, ui::POPUP_MNEMONIC)
            };
            frame.fill(Rect::new(inner.x, y, inner.width, 1), style);
            print_with_mnemonic(frame, inner.x + 1, y, cmd.label(), cmd.mnemonic(), style, mark);
            let accel = cmd.accelerator();
            let aw = clamp_u16(text_width(accel));
            let ax = inner.right().saturating_sub(aw + 1);
            frame.print_clipped(ax, y, accel, style, aw);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use n_term::input::{KeyEvent, MouseEvent};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn click(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseKind::Press(MouseButton::Left),
            x,
            y,
            modifiers: Modifiers::empty(),
        })
    }

    fn painted(popup: &mut MenuPopup) -> FrameBuffer {
        let mut frame = FrameBuffer::new(60, 14);
        popup.paint(&mut frame);
        frame
    }

    // ── bar ──

    #[test]
    fn title_positions() {
        assert_eq!(
            title_spans(),
            [(Menu::File, 1, 6), (Menu::Edit, 7, 6), (Menu::Help, 13, 6)]
        );
        assert_eq!(menu_at(0), None);
        assert_eq!(menu_at(1), Some(Menu::File));
        assert_eq!(menu_at(9), Some(Menu::Edit));
        assert_eq!(menu_at(18), Some(Menu::Help));
        assert_eq!(menu_at(19), None);
    }

    #[test]
    fn bar_shows_menus_and_title() {
        let mut frame = FrameBuffer::new(50, 2);
        paint_bar(&mut frame, "*Untitled - Notepad", None);
        let row = frame.row_text(0);
        assert!(row.starts_with("  File  Edit  Help "));
        assert!(row.contains("*Untitled - Notepad"));
    }

    #[test]
    fn bar_title_truncates_on_narrow_screens() {
        let mut frame = FrameBuffer::new(26, 1);
        paint_bar(&mut frame, "a-very-long-name.txt - Notepad", None);
        assert_eq!(frame.row_text(0).chars().count(), 26);
    }

    // ── keyboard ──

    #[test]
    fn opens_on_first_item() {
        let popup = MenuPopup::new(Menu::File, "");
        assert_eq!(popup.current(), Some(Command::New));
    }

    #[test]
    fn down_skips_separators_and_wraps() {
        let mut popup = MenuPopup::new(Menu::File, "");
        for _ in 0..3 {
            popup.on_event(&key(KeyCode::Down));
        }
        assert_eq!(popup.current(), Some(Command::Exit));
        popup.on_event(&key(KeyCode::Down));
        assert_eq!(popup.current(), Some(Command::New));
        popup.on_event(&key(KeyCode::Up));
        assert_eq!(popup.current(), Some(Command::Exit));
    }

    #[test]
    fn enter_activates_highlight() {
        let mut popup = MenuPopup::new(Menu::Edit, "");
        popup.on_event(&key(KeyCode::Down));
        assert_eq!(popup.on_event(&key(KeyCode::Enter)), Some(Some(Command::Redo)));
    }

    #[test]
    fn mnemonic_activates_item() {
        let mut popup = MenuPopup::new(Menu::Edit, "");
        assert_eq!(popup.on_event(&key(KeyCode::Char('f'))), Some(Some(Command::FontSize)));
        let mut popup = MenuPopup::new(Menu::File, "");
        assert_eq!(popup.on_event(&key(KeyCode::Char('x'))), Some(Some(Command::Exit)));
    }

    #[test]
    fn left_right_switch_menus() {
        let mut popup = MenuPopup::new(Menu::File, "");
        popup.on_event(&key(KeyCode::Right));
        assert_eq!(popup.menu(), Menu::Edit);
        assert_eq!(popup.current(), Some(Command::Undo));
        popup.on_event(&key(KeyCode::Left));
        popup.on_event(&key(KeyCode::Left));
        assert_eq!(popup.menu(), Menu::Help);
    }

    #[test]
    fn escape_closes_and_shortcuts_still_work() {
        let mut popup = MenuPopup::new(Menu::Help, "");
        assert_eq!(popup.on_event(&Event::Key(KeyEvent::ctrl('s'))), Some(Some(Command::Save)));
        assert_eq!(popup.on_event(&key(KeyCode::Escape)), Some(None));
    }

    #[test]
    fn alt_letter_switches_menu() {
        let mut popup = MenuPopup::new(Menu::File, "");
        assert_eq!(popup.on_event(&Event::Key(KeyEvent::alt('h'))), None);
        assert_eq!(popup.menu(), Menu::Help);
    }

    // ── painting and mouse ──

    #[test]
    fn popup_lists_items_with_accelerators() {
        let mut popup = MenuPopup::new(Menu::File, "x");
        let frame = painted(&mut popup);
        let rows: Vec<String> = (0..8).map(|y| frame.row_text(y)).collect();
        assert!(rows[2].contains("New") && rows[2].contains("Ctrl+N"));
        assert!(rows[3].contains("Open…") && rows[3].contains("Ctrl+O"));
        assert!(rows[5].contains("├"));
        assert!(rows[6].contains("Exit") && rows[6].contains("Ctrl+Q"));
    }

    #[test]
    fn click_item_and_outside() {
        let mut popup = MenuPopup::new(Menu::File, "");
        painted(&mut popup);
        // Row 2 is the first item, row 4 the third.
        assert_eq!(popup.on_event(&click(3, 4)), Some(Some(Command::Save)));
        assert_eq!(popup.on_event(&click(3, 5)), None);
        assert_eq!(popup.on_event(&click(50, 10)), Some(None));
    }

    #[test]
    fn click_other_title_switches() {
        let mut popup = MenuPopup::new(Menu::File, "");
        painted(&mut popup);
        assert_eq!(popup.on_event(&click(8, 0)), None);
        assert_eq!(popup.menu(), Menu::Edit);
        assert_eq!(popup.on_event(&click(8, 0)), Some(None));
    }
}
