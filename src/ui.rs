// SPDX-License-Identifier: MIT
//
// Shared drawing pieces: the palette, bordered boxes, buttons, and word
// wrapping for dialog messages.

use n_term::buffer::{FrameBuffer, Rect, text_width};
use n_term::cell::{Attr, Cell, Style};
use n_term::color::Color;

// ─── Palette ─────────────────────────────────────────────────────────────────

/// Menu bar and status bar.
pub const BAR: Style = Style::PLAIN.with(Attr::INVERSE);
pub const BAR_MNEMONIC: Style = BAR.with(Attr::UNDERLINE);
pub const BAR_OPEN: Style = Style::new(Color::BRIGHT_WHITE, Color::BLUE);

pub const POPUP: Style = Style::new(Color::BLACK, Color::WHITE);
pub const POPUP_MNEMONIC: Style = POPUP.with(Attr::UNDERLINE);
pub const POPUP_SELECTED: Style = Style::new(Color::BRIGHT_WHITE, Color::BLUE);
pub const POPUP_SELECTED_MNEMONIC: Style = POPUP_SELECTED.with(Attr::UNDERLINE);

pub const DIALOG: Style = Style::new(Color::BLACK, Color::WHITE);
pub const DIALOG_ERROR: Style = Style::new(Color::RED, Color::WHITE);

pub const BUTTON: Style = Style::new(Color::BLACK, Color::WHITE);
pub const BUTTON_FOCUSED: Style = Style::new(Color::BRIGHT_WHITE, Color::BLUE);

pub const FIELD: Style = Style::new(Color::BRIGHT_WHITE, Color::BLACK);
pub const LIST: Style = Style::new(Color::BLACK, Color::WHITE);
pub const LIST_SELECTED: Style = Style::new(Color::BRIGHT_WHITE, Color::BLUE);

// ─── Boxes ───────────────────────────────────────────────────────────────────

/// Fill `rect` and draw a single-line border, with `title` centered in the
/// top edge when given.
pub fn draw_box(frame: &mut FrameBuffer, rect: Rect, title: Option<&str>, style: Style) {
    if rect.width < 2 || rect.height < 2 {
        frame.fill(rect, style);
        return;
    }
    frame.fill(rect, style);
    let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
    for x in rect.x + 1..right {
        frame.set(x, rect.y, Cell::new('─', style));
        frame.set(x, bottom, Cell::new('─', style));
    }
    for y in rect.y + 1..bottom {
        frame.set(rect.x, y, Cell::new('│', style));
        frame.set(right, y, Cell::new('│', style));
    }
    frame.set(rect.x, rect.y, Cell::new('┌', style));
    frame.set(right, rect.y, Cell::new('┐', style));
    frame.set(rect.x, bottom, Cell::new('└', style));
    frame.set(right, bottom, Cell::new('┘', style));

    if let Some(title) = title {
        let room = rect.width.saturating_sub(4);
        let label = format!(" {title} ");
        let w = clamp_u16(text_width(&label)).min(room);
        let x = rect.x + (rect.width - w) / 2;
        frame.print_clipped(x, rect.y, &label, style.with(Attr::BOLD), w);
    }
}

/// A horizontal divider across a box, joined to its side borders.
pub fn draw_divider(frame: &mut FrameBuffer, rect: Rect, y: u16, style: Style) {
    if rect.width < 2 {
        return;
    }
    let right = rect.right() - 1;
    frame.set(rect.x, y, Cell::new('├', style));
    for x in rect.x + 1..right {
        frame.set(x, y, Cell::new('─', style));
    }
    frame.set(right, y, Cell::new('┤', style));
}

// ─── Buttons ─────────────────────────────────────────────────────────────────

/// `"[ Yes ]"`.
#[must_use]
pub fn button_label(label: &str) -> String {
    format!("[ {label} ]")
}

/// Width of a row of buttons separated by two spaces.
#[must_use]
pub fn buttons_width(labels: &[&str]) -> u16 {
    let total: usize = labels.iter().map(|l| text_width(&button_label(l))).sum();
    clamp_u16(total + 2 * labels.len().saturating_sub(1))
}

/// Draw buttons centered in `rect` on row `y`. Returns the hit box of each.
pub fn draw_buttons(frame: &mut FrameBuffer, rect: Rect, y: u16, labels: &[&str], focus: usize) -> Vec<Rect> {
    let total = buttons_width(labels);
    let mut x = rect.x + rect.width.saturating_sub(total) / 2;
    let mut hits = Vec::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        let style = if i == focus { BUTTON_FOCUSED } else { BUTTON };
        let w = frame.print(x, y, &button_label(label), style);
        hits.push(Rect::new(x, y, w, 1));
        x = x.saturating_add(w + 2);
    }
    hits
}

// ─── Text ────────────────────────────────────────────────────────────────────

/// Word-wrap `text` to `width` columns. Explicit newlines are kept, and
/// words longer than a line are broken.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for para in text.split('\n') {
        let mut line = String::new();
        let mut line_w = 0;
        for word in para.split(' ') {
            let word_w = text_width(word);
            if line_w > 0 && line_w + 1 + word_w > width {
                lines.push(std::mem::take(&mut line));
                line_w = 0;
            }
            if line_w > 0 {
                line.push(' ');
                line_w += 1;
            }
            for ch in word.chars() {
                let mut enc = [0u8; 4];
                let ch_w = text_width(ch.encode_utf8(&mut enc));
                if line_w + ch_w > width && line_w > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_w = 0;
                }
                line.push(ch);
                line_w += ch_w;
            }
        }
        lines.push(line);
    }
    lines
}

/// Saturating `usize` to `u16`.
#[must_use]
pub fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
