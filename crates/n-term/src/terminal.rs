// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, and guaranteed cleanup.
//
// termios, ioctl and isatty have no safe wrappers in std, so this module
// talks to libc directly. Each unsafe block is a single FFI call.
#![allow(unsafe_code)]
//
// Entering TUI mode saves the original termios, switches to raw input,
// moves to the alternate screen, saves the window title on the terminal's
// title stack, and turns on mouse reporting and bracketed paste. Leaving
// undoes all of it in reverse. Drop leaves automatically, and a panic hook
// writes a prebuilt restore sequence straight to fd 1 so a crash never
// strands the user in raw mode.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the size cannot be queried (pipes, tests).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Ask the kernel for the window size of stdout.
#[cfg(unix)]
#[must_use]
pub fn query_size() -> Option<Size> {
    // SAFETY: winsize is plain data; TIOCGWINSZ fills it or fails.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn query_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    // SAFETY: isatty only inspects the descriptor.
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-safe restore ──────────────────────────────────────────────────────

/// Copy of the original termios for the panic hook, which cannot reach
/// the `Terminal` value.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Everything `leave` does, as one write. Alternate screen exit comes last
/// so the shell reappears clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1006l\x1b[?1002l\x1b[?1000l\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[23;0t\
    \x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            previous(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    {
        // SAFETY: writing a static byte slice to fd 1. The stdout lock is
        // bypassed on purpose: the panic may have happened while holding it.
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                EMERGENCY_RESTORE.as_ptr().cast(),
                EMERGENCY_RESTORE.len(),
            );
        }
        if let Ok(saved) = SAVED_TERMIOS.lock() {
            if let Some(original) = saved.as_ref() {
                // SAFETY: restoring a termios previously read by tcgetattr.
                unsafe {
                    let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(EMERGENCY_RESTORE);
        let _ = out.flush();
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// Handle to the controlling terminal.
///
/// ```no_run
/// use n_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... draw ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Terminal {
    #[cfg(unix)]
    original: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// Create a handle. Does not touch terminal modes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original: None,
            size: query_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = query_size() {
            self.size = size;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Switch to raw mode and the alternate screen. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or writing to stdout fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.raw_mode_on()?;

        let mut out = io::stdout().lock();
        ansi::push_title(&mut out)?;
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::enable_mouse(&mut out)?;
        ansi::enable_bracketed_paste(&mut out)?;
        out.flush()?;

        self.active = true;
        Ok(())
    }

    /// Undo everything [`enter`](Self::enter) did. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout or restoring termios fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        {
            let mut out = io::stdout().lock();
            ansi::end_sync(&mut out)?;
            ansi::disable_bracketed_paste(&mut out)?;
            ansi::disable_mouse(&mut out)?;
            ansi::reset(&mut out)?;
            ansi::set_cursor_shape(&mut out, ansi::CursorShape::Default)?;
            ansi::cursor_show(&mut out)?;
            ansi::exit_alt_screen(&mut out)?;
            ansi::pop_title(&mut out)?;
            out.flush()?;
        }
        self.raw_mode_off()?;
        self.active = false;
        Ok(())
    }

    // ── termios ─────────────────────────────────────────────────────────

    #[cfg(unix)]
    fn raw_mode_on(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }
        // SAFETY: termios is plain data filled by tcgetattr.
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut t) } != 0 {
            return Err(io::Error::last_os_error());
        }
        self.original = Some(t);
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = Some(t);
        }

        // cfmakeraw, spelled out. IXON off lets Ctrl+S and Ctrl+Q through.
        t.c_iflag &= !(libc::IGNBRK
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        t.c_oflag &= !libc::OPOST;
        t.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
        t.c_cflag &= !(libc::CSIZE | libc::PARENB);
        t.c_cflag |= libc::CS8;
        t.c_cc[libc::VMIN] = 1;
        t.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const t) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(unix)]
    fn raw_mode_off(&mut self) -> io::Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) } != 0
        {
            return Err(io::Error::last_os_error());
        }
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn raw_mode_on(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn raw_mode_off(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
