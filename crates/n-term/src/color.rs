// SPDX-License-Identifier: MIT
//
// Terminal colors.
//
// A notepad does not need a color science pipeline. Cells carry one of
// three things: the terminal's own default, an index into the 256-color
// palette, or a 24-bit RGB triple. The first sixteen palette entries
// follow the user's terminal theme, which is what keeps dialogs and the
// menu bar readable on both light and dark setups.

use std::fmt;

// ─── Color ───────────────────────────────────────────────────────────────────

/// A resolved cell color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Whatever the terminal uses when no color is set.
    #[default]
    Default,
    /// Palette index (0-15 themed, 16-255 fixed cube and grays).
    Indexed(u8),
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Indexed(0);
    pub const RED: Self = Self::Indexed(1);
    pub const GREEN: Self = Self::Indexed(2);
    pub const YELLOW: Self = Self::Indexed(3);
    pub const BLUE: Self = Self::Indexed(4);
    pub const MAGENTA: Self = Self::Indexed(5);
    pub const CYAN: Self = Self::Indexed(6);
    pub const WHITE: Self = Self::Indexed(7);
    pub const GRAY: Self = Self::Indexed(8);
    pub const BRIGHT_WHITE: Self = Self::Indexed(15);

    /// Whether this is the terminal default.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse `#rrggbb` (leading `#` optional).
    ///
    /// ```
    /// use n_term::color::Color;
    ///
    /// assert_eq!(Color::hex("#1e90ff"), Some(Color::Rgb(0x1e, 0x90, 0xff)));
    /// assert_eq!(Color::hex("nope"), None);
    /// ```
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Indexed(i) => write!(f, "idx({i})"),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
