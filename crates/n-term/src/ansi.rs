// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Stateless writers for every terminal command the engine sends. Deciding
// when to send them belongs to the renderer and the terminal handle; this
// module only knows the bytes.
//
// Coordinates are 0-indexed here and converted to the 1-indexed form the
// terminal expects.

use std::io::{self, Write};

use crate::cell::{Attr, Style};
use crate::color::Color;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// CUP: move the cursor to `(x, y)`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// DECSCUSR cursor shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Whatever the user configured.
    #[default]
    Default,
    SteadyBlock,
    BlinkBar,
    SteadyBar,
    SteadyUnderline,
}

#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    let n = match shape {
        CursorShape::Default => 0,
        CursorShape::SteadyBlock => 2,
        CursorShape::SteadyUnderline => 4,
        CursorShape::BlinkBar => 5,
        CursorShape::SteadyBar => 6,
    };
    write!(w, "\x1b[{n} q")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// SGR 0. Anything tracking terminal style must forget it afterwards.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground color. Palette entries below 16 use the short 30-37/90-97 forms.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Indexed(i @ 0..=7) => write!(w, "\x1b[{}m", 30 + u16::from(i)),
        Color::Indexed(i @ 8..=15) => write!(w, "\x1b[{}m", 82 + u16::from(i)),
        Color::Indexed(i) => write!(w, "\x1b[38;5;{i}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
    }
}

/// Background color, same encoding strategy as [`fg`].
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[49m"),
        Color::Indexed(i @ 0..=7) => write!(w, "\x1b[{}m", 40 + u16::from(i)),
        Color::Indexed(i @ 8..=15) => write!(w, "\x1b[{}m", 92 + u16::from(i)),
        Color::Indexed(i) => write!(w, "\x1b[48;5;{i}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{r};{g};{b}m"),
    }
}

/// All set attributes in one CSI sequence. Writes nothing for an empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    const CODES: [(Attr, &str); 5] = [
        (Attr::BOLD, "1"),
        (Attr::DIM, "2"),
        (Attr::ITALIC, "3"),
        (Attr::UNDERLINE, "4"),
        (Attr::INVERSE, "7"),
    ];

    if attr.is_empty() {
        return Ok(());
    }
    let codes: Vec<&str> = CODES
        .iter()
        .filter(|(flag, _)| attr.contains(*flag))
        .map(|(_, code)| *code)
        .collect();
    write!(w, "\x1b[{}m", codes.join(";"))
}

/// Reset, then emit a complete style. Used after a forced reset.
pub fn style(w: &mut impl Write, s: Style) -> io::Result<()> {
    reset(w)?;
    attrs(w, s.attrs)?;
    fg(w, s.fg)?;
    bg(w, s.bg)
}

// ─── Window title ────────────────────────────────────────────────────────────

/// OSC 2: set the window caption.
///
/// Control characters are dropped so a hostile file name cannot end the
/// sequence early and inject its own.
pub fn set_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    w.write_all(b"\x1b]2;")?;
    for ch in title.chars().filter(|c| !c.is_control()) {
        let mut enc = [0u8; 4];
        w.write_all(ch.encode_utf8(&mut enc).as_bytes())?;
    }
    w.write_all(b"\x07")
}

/// XTWINOPS 22: save the current title on the terminal's stack.
#[inline]
pub fn push_title(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[22;0t")
}

/// XTWINOPS 23: restore the title saved by [`push_title`].
#[inline]
pub fn pop_title(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[23;0t")
}

// ─── Modes ───────────────────────────────────────────────────────────────────

/// DEC 2026: hold rendering until [`end_sync`] so frames never tear.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

/// Click + drag reporting in SGR format (DEC 1000, 1002, 1006).
#[inline]
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1002h\x1b[?1006h")
}

#[inline]
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l\x1b[?1002l\x1b[?1000l")
}

/// DEC 2004: pasted text arrives wrapped in `CSI 200~` / `CSI 201~`.
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004h")
}

#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
