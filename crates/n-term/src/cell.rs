// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell is a character plus its style. Wide characters (CJK, most
// emoji) take two columns: the first cell holds the char, the second is
// a continuation cell whose char is NUL. The renderer skips output for
// continuation cells but still honors their background.

use crate::color::Color;

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR text attributes.
    ///
    /// ```
    /// use n_term::cell::Attr;
    ///
    /// let title = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(title.contains(Attr::UNDERLINE));
    /// assert!(!title.contains(Attr::INVERSE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 3.
        const ITALIC    = 1 << 2;
        /// SGR 4. Menu mnemonics use this.
        const UNDERLINE = 1 << 3;
        /// SGR 7. Selections use this so they follow the terminal theme.
        const INVERSE   = 1 << 4;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground, background and attributes, painted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    /// Add attributes on top of the existing ones.
    #[inline]
    #[must_use]
    pub const fn with(self, attrs: Attr) -> Self {
        Self {
            attrs: self.attrs.union(attrs),
            ..self
        }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// Marker char for the second column of a wide character.
const CONTINUATION: char = '\0';

/// A styled character at one screen position.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A blank cell with default colors.
    pub const EMPTY: Self = Self {
        ch: ' ',
        style: Style::PLAIN,
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// The trailing half of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            ch: CONTINUATION,
            style,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The printable character, `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.is_continuation() {
            None
        } else {
            Some(self.ch)
        }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return f.write_str("Cell(cont)");
        }
        write!(f, "Cell({:?}", self.ch)?;
        if self.style != Style::PLAIN {
            write!(f, ", {:?}/{:?}", self.style.fg, self.style.bg)?;
            if !self.style.attrs.is_empty() {
                write!(f, ", {:?}", self.style.attrs)?;
            }
        }
        f.write_str(")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_is_plain_space() {
        let c = Cell::default();
        assert_eq!(c.ch, ' ');
        assert_eq!(c.style, Style::PLAIN);
        assert_eq!(c.character(), Some(' '));
    }

    #[test]
    fn continuation_has_no_character() {
        let c = Cell::continuation(Style::PLAIN.bg(Color::BLUE));
        assert!(c.is_continuation());
        assert_eq!(c.character(), None);
        assert_eq!(c.style.bg, Color::BLUE);
    }

    #[test]
    fn style_builders_compose() {
        let s = Style::new(Color::BLACK, Color::WHITE)
            .with(Attr::BOLD)
            .with(Attr::UNDERLINE);
        assert_eq!(s.fg, Color::BLACK);
        assert_eq!(s.bg, Color::WHITE);
        assert_eq!(s.attrs, Attr::BOLD | Attr::UNDERLINE);
    }

    #[test]
    fn debug_shows_style_only_when_set() {
        assert_eq!(format!("{:?}", Cell::new('a', Style::PLAIN)), "Cell('a')");
        let styled = Cell::new('b', Style::PLAIN.fg(Color::RED));
        assert!(format!("{styled:?}").contains("idx(1)"));
        assert_eq!(format!("{:?}", Cell::continuation(Style::PLAIN)), "Cell(cont)");
    }
}
