// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Each frame is compared against the previous one and only changed cells
// are sent. A keystroke in a notepad usually touches one row of text and
// one row of status bar, so most frames are a few dozen bytes.
//
// Pipeline:
//
//   1. The application paints a FrameBuffer.
//   2. `DiffRenderer::render` walks it against the stored previous frame,
//      skipping identical rows with a single slice compare.
//   3. Changed cells go through `StyleTracker`, which drops cursor moves
//      and SGR sequences the terminal state already satisfies.
//   4. Everything lands in one byte buffer wrapped in synchronized output
//      and is written with a single `write_all` by `flush_to`.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::cell::{Cell, Style};

// ─── StyleTracker ────────────────────────────────────────────────────────────

/// What the terminal currently has: cursor position and active style.
///
/// `None` means unknown, so the next cell must emit everything.
#[derive(Debug, Default)]
struct StyleTracker {
    at: Option<(u16, u16)>,
    style: Option<Style>,
}

impl StyleTracker {
    fn forget(&mut self) {
        *self = Self::default();
    }

    /// Append the bytes for one cell to `out`.
    fn emit(&mut self, out: &mut Vec<u8>, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if cell.is_continuation() && self.at == Some((x.wrapping_sub(1), y)) && x > 0 {
            // The wide char before us already covered this column.
            self.at = Some((x, y));
            return Ok(());
        }

        let adjacent = x > 0 && self.at == Some((x - 1, y));
        if !adjacent {
            ansi::cursor_to(out, x, y)?;
        }

        self.apply(out, cell.style)?;

        let ch = cell.character().unwrap_or(' ');
        let mut enc = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
        self.at = Some((x, y));
        Ok(())
    }

    fn apply(&mut self, out: &mut Vec<u8>, style: Style) -> io::Result<()> {
        match self.style {
            Some(current) if current == style => {}
            Some(current) if current.attrs == style.attrs => {
                if current.fg != style.fg {
                    ansi::fg(out, style.fg)?;
                }
                if current.bg != style.bg {
                    ansi::bg(out, style.bg)?;
                }
            }
            // Attribute removal needs SGR 0, which also drops the colors.
            _ => ansi::style(out, style)?,
        }
        self.style = Some(style);
        Ok(())
    }
}

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_rendered: usize,
    pub cells_skipped: usize,
    pub bytes: usize,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits ANSI for the cells that changed since the last frame.
///
/// ```
/// use n_term::buffer::FrameBuffer;
/// use n_term::cell::Style;
/// use n_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let mut frame = FrameBuffer::new(10, 2);
/// renderer.render(&frame);
///
/// frame.print(0, 1, "x", Style::PLAIN);
/// let stats = renderer.render(&frame);
/// assert_eq!(stats.cells_rendered, 1);
///
/// let mut sink = Vec::new();
/// renderer.flush_to(&mut sink).unwrap();
/// assert!(!sink.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct DiffRenderer {
    out: Vec<u8>,
    tracker: StyleTracker,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `frame` against the previous frame and buffer the output.
    pub fn render(&mut self, frame: &FrameBuffer) -> RenderStats {
        self.out.clear();
        self.tracker.forget();
        let mut stats = RenderStats::default();

        if frame.width() == 0 || frame.height() == 0 {
            self.previous = Some(frame.clone());
            return stats;
        }

        // Writing into a Vec cannot fail, so the io results below are moot.
        let _ = ansi::begin_sync(&mut self.out);

        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == frame.width() && p.height() == frame.height());
        if previous.is_none() {
            let _ = ansi::reset(&mut self.out);
            let _ = ansi::clear_screen(&mut self.out);
        }

        for y in 0..frame.height() {
            let row = frame.row(y).unwrap_or_default();
            let old_row = previous.as_ref().and_then(|p| p.row(y));
            if old_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..frame.width()).zip(row) {
                let unchanged = old_row.is_some_and(|old| old[usize::from(x)] == *cell);
                if unchanged {
                    stats.cells_skipped += 1;
                } else {
                    let _ = self.tracker.emit(&mut self.out, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        let _ = ansi::reset(&mut self.out);
        let _ = ansi::end_sync(&mut self.out);
        stats.bytes = self.out.len();

        let mut stored = previous.unwrap_or_else(|| FrameBuffer::new(0, 0));
        stored.copy_from(frame);
        self.previous = Some(stored);
        stats
    }

    /// The bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.out
    }

    /// Write the buffered output and clear it.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn flush_to(&mut self, w: &mut (impl Write + ?Sized)) -> io::Result<()> {
        if !self.out.is_empty() {
            w.write_all(&self.out)?;
            w.flush()?;
            self.out.clear();
        }
        Ok(())
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attr;
    use crate::color::Color;

    fn text(r: &DiffRenderer) -> String {
        String::from_utf8_lossy(r.output()).into_owned()
    }

    #[test]
    fn first_frame_clears_and_draws_everything() {
        let mut r = DiffRenderer::new();
        let stats = r.render(&FrameBuffer::new(4, 3));
        assert_eq!(stats.cells_rendered, 12);
        assert_eq!(stats.cells_skipped, 0);
        let out = text(&r);
        assert!(out.starts_with("\x1b[?2026h"));
        assert!(out.contains("\x1b[2J"));
        assert!(out.ends_with("\x1b[?2026l"));
    }

    #[test]
    fn identical_frame_renders_nothing() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(5, 2);
        r.render(&frame);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 10);
    }

    #[test]
    fn single_change_moves_cursor_once() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(10, 3);
        r.render(&frame);
        frame.print(3, 2, "ab", Style::PLAIN);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 2);
        let out = text(&r);
        assert_eq!(out.matches("\x1b[3;4H").count(), 1);
        assert!(out.contains("ab"));
        assert!(!out.contains("\x1b[3;5H"));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(4, 2));
        let stats = r.render(&FrameBuffer::new(5, 2));
        assert_eq!(stats.cells_rendered, 10);
        assert!(text(&r).contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_repaints() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(3, 1);
        r.render(&frame);
        r.force_redraw();
        assert_eq!(r.render(&frame).cells_rendered, 3);
    }

    #[test]
    fn same_style_run_emits_sgr_once() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(6, 1);
        r.render(&frame);
        frame.print(0, 0, "xyz", Style::PLAIN.fg(Color::RED));
        r.render(&frame);
        assert_eq!(text(&r).matches("\x1b[31m").count(), 1);
    }

    #[test]
    fn dropping_an_attribute_resets() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(2, 1);
        r.render(&frame);
        frame.print(0, 0, "a", Style::PLAIN.with(Attr::BOLD));
        frame.print(1, 0, "b", Style::PLAIN);
        r.render(&frame);
        let out = text(&r);
        let bold = out.find("\x1b[1m").unwrap();
        let b = out.find('b').unwrap();
        assert!(out[bold..b].contains("\x1b[0m"));
    }

    #[test]
    fn wide_char_continuation_is_not_printed() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        r.render(&frame);
        frame.print(0, 0, "中", Style::PLAIN);
        let stats = r.render(&frame);
        assert_eq!(stats.cells_rendered, 2);
        assert_eq!(text(&r).matches('中').count(), 1);
    }

    #[test]
    fn flush_writes_and_empties() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(2, 1));
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output().is_empty());
    }

    #[test]
    fn zero_size_frame_is_silent() {
        let mut r = DiffRenderer::new();
        let stats = r.render(&FrameBuffer::new(0, 0));
        assert_eq!(stats, RenderStats::default());
        assert!(r.output().is_empty());
    }
}
