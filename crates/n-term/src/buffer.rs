// SPDX-License-Identifier: MIT
//
// FrameBuffer — the cell grid every widget paints into.
//
// Flat row-major `Vec<Cell>`: a row is contiguous, which is the order
// the diff renderer scans. Paint helpers clip to the buffer and keep
// wide characters consistent (never half a CJK glyph on screen).
//
// Modal dialogs rely on `copy_from`: the event loop keeps the last
// application frame and repaints it underneath each dialog frame.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};

// ─── Rect ────────────────────────────────────────────────────────────────────

/// A screen rectangle in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge.
    #[inline]
    #[must_use]
    pub const fn right(self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// A `width`×`height` rectangle centered inside `self`, shrunk to fit.
    ///
    /// ```
    /// use n_term::buffer::Rect;
    ///
    /// let screen = Rect::new(0, 0, 80, 24);
    /// assert_eq!(screen.centered(40, 10), Rect::new(20, 7, 40, 10));
    /// assert_eq!(screen.centered(100, 30), screen);
    /// ```
    #[must_use]
    pub const fn centered(self, width: u16, height: u16) -> Self {
        let w = if width < self.width { width } else { self.width };
        let h = if height < self.height { height } else { self.height };
        Self {
            x: self.x + (self.width - w) / 2,
            y: self.y + (self.height - h) / 2,
            width: w,
            height: h,
        }
    }

    /// Shrink by `n` cells on every side.
    #[must_use]
    pub const fn inset(self, n: u16) -> Self {
        let dw = n.saturating_mul(2);
        Self {
            x: self.x.saturating_add(n),
            y: self.y.saturating_add(n),
            width: self.width.saturating_sub(dw),
            height: self.height.saturating_sub(dw),
        }
    }
}

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A grid of cells the size of the terminal.
///
/// ```
/// use n_term::buffer::FrameBuffer;
/// use n_term::cell::Style;
///
/// let mut buf = FrameBuffer::new(20, 2);
/// let used = buf.print(1, 0, "hi", Style::PLAIN);
/// assert_eq!(used, 2);
/// assert_eq!(buf.row_text(0), " hi                 ");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole buffer as a rectangle.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// One row as a slice, for the renderer's row-skip check.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        (y < self.height).then(|| {
            let start = self.index(0, y);
            &self.cells[start..start + usize::from(self.width)]
        })
    }

    /// The characters of a row as a string, continuation cells omitted.
    /// Mostly for tests.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| cells.iter().filter_map(|c| c.character()).collect())
            .unwrap_or_default()
    }

    // ─── Whole-buffer operations ─────────────────────────────────────────

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy another buffer's content. Resizes first if dimensions differ.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width != other.width || self.height != other.height {
            self.width = other.width;
            self.height = other.height;
        }
        self.cells.clone_from(&other.cells);
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Write one cell. Out-of-bounds writes are ignored.
    ///
    /// Overwriting either half of a wide character blanks the other half.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.split_wide_at(x, y);
        let i = self.index(x, y);
        self.cells[i] = cell;
    }

    /// Fill a rectangle with blanks in `style`.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y..bottom {
            for x in rect.x..right {
                self.set(x, y, Cell::new(' ', style));
            }
        }
    }

    /// Change the style of every cell in `rect`, keeping characters.
    pub fn restyle(&mut self, rect: Rect, style: Style) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y..bottom {
            for x in rect.x..right {
                let i = self.index(x, y);
                self.cells[i].style = style;
            }
        }
    }

    /// Paint text starting at `(x, y)`, stopping at the right edge.
    ///
    /// Returns the number of columns consumed.
    pub fn print(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        self.print_clipped(x, y, text, style, self.width.saturating_sub(x))
    }

    /// Paint text into at most `max_width` columns.
    ///
    /// Control and zero-width characters are skipped. A wide character
    /// that would straddle the limit is replaced by a space.
    pub fn print_clipped(&mut self, x: u16, y: u16, text: &str, style: Style, max_width: u16) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = x.saturating_add(max_width).min(self.width);
        let mut col = x;
        for ch in text.chars() {
            if col >= limit {
                break;
            }
            let w = if ch.is_control() { 0 } else { ch.width().unwrap_or(0) };
            if w == 0 {
                continue;
            }
            if w == 2 {
                if col + 1 >= limit {
                    self.set(col, y, Cell::new(' ', style));
                    col += 1;
                    break;
                }
                self.set(col, y, Cell::new(ch, style));
                self.set(col + 1, y, Cell::continuation(style));
                col += 2;
            } else {
                self.set(col, y, Cell::new(ch, style));
                col += 1;
            }
        }
        col - x
    }

    /// If `(x, y)` is half of a wide character, blank the other half.
    fn split_wide_at(&mut self, x: u16, y: u16) {
        let i = self.index(x, y);
        if self.cells[i].is_continuation() && x > 0 {
            self.cells[i - 1].ch = ' ';
        }
        if x + 1 < self.width && self.cells[i + 1].is_continuation() {
            self.cells[i + 1].ch = ' ';
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text width ──────────────────────────────────────────────────────────────

/// Display width of a string in columns.
///
/// ```
/// use n_term::buffer::text_width;
///
/// assert_eq!(text_width("abc"), 3);
/// assert_eq!(text_width("中文"), 4);
/// ```
#[must_use]
pub fn text_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
