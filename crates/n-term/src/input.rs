// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key, mouse and paste events. Covers what
// `terminal.rs` turns on plus what every terminal sends anyway:
//
// - C0 control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences for arrows, editing keys and function keys, with the
//   xterm `1;mod` modifier parameter
// - SS3 sequences (F1-F4 and application-mode arrows)
// - SGR mouse reports (press, release, drag, wheel)
// - Bracketed paste, delivered as one `Paste` event
// - ESC-prefixed Alt+key
// - UTF-8 multi-byte characters
//
// Sequences may be split across reads, so unconsumed bytes stay buffered
// until the next `advance`. A lone ESC is ambiguous (Escape key or the
// start of a sequence); the event loop calls `flush` after a quiet tick
// to settle it as an Escape press.

use bitflags::bitflags;

// ─── Events ──────────────────────────────────────────────────────────────────

/// A parsed input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Text delivered through bracketed paste.
    Paste(String),
}

impl Event {
    /// The key event, if this is one.
    #[inline]
    #[must_use]
    pub const fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(k) => Some(k),
            _ => None,
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// An unmodified key.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Ctrl + a letter.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// Alt + a character.
    #[inline]
    #[must_use]
    pub const fn alt(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::ALT)
    }

    /// Whether this is `ch` with exactly `Ctrl` held.
    #[inline]
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.modifiers == Modifiers::CTRL && self.code == KeyCode::Char(ch)
    }

    /// Whether Shift is held.
    #[inline]
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Modifier keys. Bit layout matches xterm's `1 + mask` parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

/// A mouse report. Coordinates are 0-indexed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Press(MouseButton),
    Release(MouseButton),
    Drag(MouseButton),
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ──────────────────────────────────────────────────────────────────

const PASTE_OPEN: &[u8] = b"\x1b[200~";
const PASTE_CLOSE: &[u8] = b"\x1b[201~";

/// Outcome of looking at the front of the pending bytes.
enum Step {
    /// An event and the number of bytes it used.
    Emit(Event, usize),
    /// Recognized but meaningless here (focus reports, unknown CSI).
    Skip(usize),
    /// Need more bytes.
    Wait,
}

/// Incremental parser over stdin bytes.
#[derive(Debug, Default)]
pub struct Parser {
    pending: Vec<u8>,
    /// Inside a bracketed paste: bytes are text until `PASTE_CLOSE`.
    pasting: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, get every event they complete.
    pub fn advance(&mut self, bytes: &[u8]) -> Vec<Event> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut at = 0;

        while at < self.pending.len() {
            let rest = &self.pending[at..];

            if self.pasting {
                let Some(end) = find(rest, PASTE_CLOSE) else {
                    break;
                };
                events.push(Event::Paste(String::from_utf8_lossy(&rest[..end]).into_owned()));
                at += end + PASTE_CLOSE.len();
                self.pasting = false;
                continue;
            }

            if rest.starts_with(PASTE_OPEN) {
                self.pasting = true;
                at += PASTE_OPEN.len();
                continue;
            }
            if rest.len() < PASTE_OPEN.len() && rest.len() > 2 && PASTE_OPEN.starts_with(rest) {
                break;
            }

            match step(rest) {
                Step::Emit(event, n) => {
                    events.push(event);
                    at += n;
                }
                Step::Skip(n) => at += n,
                Step::Wait => break,
            }
        }

        self.pending.drain(..at);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() && !self.pasting
    }

    /// Settle leftover bytes after a quiet period.
    ///
    /// A lone ESC becomes an Escape press; ESC followed by a partial
    /// sequence is reported as Escape and the remainder re-parsed.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.pasting || self.pending.is_empty() {
            return Vec::new();
        }
        let leftover = std::mem::take(&mut self.pending);
        let mut events = Vec::new();
        if leftover[0] == 0x1b {
            events.push(Event::Key(KeyEvent::plain(KeyCode::Escape)));
            events.extend(self.advance(&leftover[1..]));
        } else {
            events.extend(self.advance(&leftover));
        }
        // Anything still incomplete after one retry is dropped.
        self.pending.clear();
        events
    }
}

// ─── Sequence decoding ───────────────────────────────────────────────────────

fn key(code: KeyCode, modifiers: Modifiers, len: usize) -> Step {
    Step::Emit(Event::Key(KeyEvent::new(code, modifiers)), len)
}

fn step(bytes: &[u8]) -> Step {
    match bytes[0] {
        0x1b => escape(bytes),
        b'\r' | b'\n' => key(KeyCode::Enter, Modifiers::empty(), 1),
        b'\t' => key(KeyCode::Tab, Modifiers::empty(), 1),
        0x08 | 0x7f => key(KeyCode::Backspace, Modifiers::empty(), 1),
        0x00 => key(KeyCode::Char(' '), Modifiers::CTRL, 1),
        b @ 0x01..=0x1a => key(KeyCode::Char(char::from(b - 1 + b'a')), Modifiers::CTRL, 1),
        0x1c..=0x1f => Step::Skip(1),
        b @ 0x20..=0x7e => key(KeyCode::Char(char::from(b)), Modifiers::empty(), 1),
        _ => utf8(bytes),
    }
}

fn escape(bytes: &[u8]) -> Step {
    let Some(&second) = bytes.get(1) else {
        return Step::Wait;
    };
    match second {
        b'[' => csi(bytes),
        b'O' => ss3(bytes),
        0x1b => key(KeyCode::Escape, Modifiers::ALT, 2),
        b @ 0x20..=0x7e => key(KeyCode::Char(char::from(b)), Modifiers::ALT, 2),
        b @ 0x01..=0x1a => key(
            KeyCode::Char(char::from(b - 1 + b'a')),
            Modifiers::ALT | Modifiers::CTRL,
            2,
        ),
        _ => key(KeyCode::Escape, Modifiers::empty(), 1),
    }
}

fn csi(bytes: &[u8]) -> Step {
    if bytes.get(2) == Some(&b'<') {
        return sgr_mouse(bytes);
    }

    // Parameters and intermediates run until a final byte in 0x40..=0x7e.
    let mut end = 2;
    loop {
        match bytes.get(end) {
            None => return Step::Wait,
            Some(0x40..=0x7e) => break,
            Some(0x20..=0x3f) => end += 1,
            Some(_) => return Step::Skip(end),
        }
    }
    let len = end + 1;
    let params = numbers(&bytes[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&m| modifier_param(m));

    let code = match bytes[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => KeyCode::BackTab,
        b'~' => match tilde_key(params.first().copied().unwrap_or(0)) {
            Some(code) => code,
            None => return Step::Skip(len),
        },
        // Focus reports, cursor position replies and the like.
        _ => return Step::Skip(len),
    };
    key(code, modifiers, len)
}

fn tilde_key(n: u16) -> Option<KeyCode> {
    Some(match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11 => KeyCode::F(1),
        12 => KeyCode::F(2),
        13 => KeyCode::F(3),
        14 => KeyCode::F(4),
        15 => KeyCode::F(5),
        17 => KeyCode::F(6),
        18 => KeyCode::F(7),
        19 => KeyCode::F(8),
        20 => KeyCode::F(9),
        21 => KeyCode::F(10),
        23 => KeyCode::F(11),
        24 => KeyCode::F(12),
        _ => return None,
    })
}

fn ss3(bytes: &[u8]) -> Step {
    let Some(&last) = bytes.get(2) else {
        return Step::Wait;
    };
    let code = match last {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Step::Skip(3),
    };
    key(code, Modifiers::empty(), 3)
}

/// `ESC [ < button ; x ; y (M|m)`
fn sgr_mouse(bytes: &[u8]) -> Step {
    let mut end = 3;
    loop {
        match bytes.get(end) {
            None => return Step::Wait,
            Some(b'M' | b'm') => break,
            Some(b) if b.is_ascii_digit() || *b == b';' => end += 1,
            Some(_) => return Step::Skip(end + 1),
        }
    }
    let len = end + 1;
    let released = bytes[end] == b'm';
    let params = numbers(&bytes[3..end]);
    let [button, x, y] = [0, 1, 2].map(|i| params.get(i).copied().unwrap_or(0));

    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, button & 4 != 0);
    modifiers.set(Modifiers::ALT, button & 8 != 0);
    modifiers.set(Modifiers::CTRL, button & 16 != 0);

    let which = match button & 3 {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        _ => MouseButton::Right,
    };
    let kind = if button & 64 != 0 {
        match button & 3 {
            0 => MouseKind::ScrollUp,
            1 => MouseKind::ScrollDown,
            // Horizontal wheel: nothing in a notepad scrolls sideways.
            _ => return Step::Skip(len),
        }
    } else if button & 32 != 0 {
        if button & 3 == 3 {
            return Step::Skip(len);
        }
        MouseKind::Drag(which)
    } else if released {
        MouseKind::Release(which)
    } else {
        MouseKind::Press(which)
    };

    Step::Emit(
        Event::Mouse(MouseEvent {
            kind,
            x: x.saturating_sub(1),
            y: y.saturating_sub(1),
            modifiers,
        }),
        len,
    )
}

fn utf8(bytes: &[u8]) -> Step {
    let need = match bytes[0] {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return Step::Skip(1),
    };
    if bytes.len() < need {
        return Step::Wait;
    }
    match std::str::from_utf8(&bytes[..need]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => key(KeyCode::Char(ch), Modifiers::empty(), need),
        None => Step::Skip(1),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Semicolon-separated decimal parameters. Colon sub-parameters are ignored.
fn numbers(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |n, &d| n.saturating_mul(10).saturating_add(u16::from(d - b'0')))
        })
        .collect()
}

/// xterm encodes modifiers as `1 + mask`.
#[allow(clippy::cast_possible_truncation)]
const fn modifier_param(p: u16) -> Modifiers {
    Modifiers::from_bits_truncate(p.saturating_sub(1) as u8)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
