// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — stdin bytes in, frames out.
//
// Bytes arrive from the background reader, the parser turns them into
// events, the application handles them and paints a frame, and the diff
// renderer sends what changed. The loop blocks on the channel with a short
// timeout: input is handled the moment it arrives, an idle editor costs no
// CPU, and the timeout doubles as the lone-ESC disambiguation window.
//
// # Modal sub-loops
//
// Desktop dialogs block the caller until the user answers. `Host::run_modal`
// gives the same contract in a terminal: it runs a nested loop that feeds
// events to a `Modal` and paints it over the last application frame until
// the modal produces a value. Application code can therefore write
//
//     let choice = host.run_modal(&mut question)?;
//
// in the middle of an event handler, exactly where the decision is needed.
// Events that arrive in the same read as the dismissing key stay queued for
// whoever reads next.
//
// # Signals
//
// SIGWINCH sets a flag the loop checks every iteration. SIGTERM and SIGHUP
// set a close-request flag; the loop hands it to `App::on_close` instead of
// dying, so the application can ask about unsaved work first.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi::{self, CursorShape};
use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{self, Size, Terminal};

// ─── Signals ─────────────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);
static CLOSE_REQUESTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigwinch(_: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn on_close_signal(_: libc::c_int) {
    CLOSE_REQUESTED.store(true, Ordering::Relaxed);
}

/// Route SIGWINCH to the resize flag and SIGTERM/SIGHUP to the close flag.
/// The handlers only store to atomics, which is async-signal-safe.
#[cfg(unix)]
fn install_signal_handlers() {
    let table: [(libc::c_int, extern "C" fn(libc::c_int)); 3] = [
        (libc::SIGWINCH, on_sigwinch),
        (libc::SIGTERM, on_close_signal),
        (libc::SIGHUP, on_close_signal),
    ];
    for (signal, handler) in table {
        // SAFETY: sigaction is zero-initialisable; the handler is a plain
        // extern "C" fn that never unwinds.
        unsafe {
            let mut sa: libc::sigaction = std::mem::zeroed();
            sa.sa_sigaction = handler as usize;
            sa.sa_flags = libc::SA_RESTART;
            libc::sigemptyset(&raw mut sa.sa_mask);
            libc::sigaction(signal, &raw const sa, std::ptr::null_mut());
        }
    }
}

#[cfg(not(unix))]
fn install_signal_handlers() {}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// What to do after handling something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A blocking overlay: dialogs, menus, prompts.
///
/// The host repaints the last application frame, then calls
/// [`paint`](Modal::paint) on top of it. Returning `Some` from
/// [`on_event`](Modal::on_event) ends the sub-loop with that value.
pub trait Modal {
    type Output;

    fn on_event(&mut self, event: &Event) -> Option<Self::Output>;

    fn paint(&mut self, buf: &mut FrameBuffer);

    /// Where to show the text cursor, if anywhere.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

/// A full-screen application.
///
/// Handlers receive the [`Host`] so they can open modals in place.
pub trait App {
    /// Called once after the first frame is on screen.
    ///
    /// # Errors
    ///
    /// Terminal I/O errors from any modal opened here.
    fn on_start(&mut self, _host: &mut Host) -> io::Result<Action> {
        Ok(Action::Continue)
    }

    /// Handle one input event.
    ///
    /// # Errors
    ///
    /// Terminal I/O errors from any modal opened here.
    fn on_event(&mut self, event: &Event, host: &mut Host) -> io::Result<Action>;

    /// The window was asked to close (SIGTERM, SIGHUP).
    ///
    /// # Errors
    ///
    /// Terminal I/O errors from any modal opened here.
    fn on_close(&mut self, _host: &mut Host) -> io::Result<Action> {
        Ok(Action::Quit)
    }

    fn on_resize(&mut self, _size: Size) {}

    /// Paint the whole application. The buffer is cleared beforehand.
    fn paint(&mut self, buf: &mut FrameBuffer);

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }

    /// Window caption. Sent to the terminal whenever it changes.
    fn title(&self) -> Option<String> {
        None
    }
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Channel wait per iteration; also the ESC timeout.
    pub tick: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_micros(8333),
        }
    }
}

// ─── Host ────────────────────────────────────────────────────────────────────

enum Input {
    Event(Event),
    Idle,
    Closed,
}

/// Everything a running application can reach: input, screen, title.
///
/// Usually built by [`EventLoop::run`]. Tests build one directly with a
/// channel they feed and a sink for output.
pub struct Host {
    out: Box<dyn Write + Send>,
    input: Receiver<Vec<u8>>,
    parser: Parser,
    queue: VecDeque<Event>,
    renderer: DiffRenderer,
    frame: FrameBuffer,
    /// The last application frame, repainted under every modal frame.
    backdrop: FrameBuffer,
    size: Size,
    tick: Duration,
    title: Option<String>,
}

impl Host {
    #[must_use]
    pub fn new(size: Size, out: Box<dyn Write + Send>, input: Receiver<Vec<u8>>, config: LoopConfig) -> Self {
        Self {
            out,
            input,
            parser: Parser::new(),
            queue: VecDeque::new(),
            renderer: DiffRenderer::new(),
            frame: FrameBuffer::new(size.cols, size.rows),
            backdrop: FrameBuffer::new(size.cols, size.rows),
            size,
            tick: config.tick,
            title: None,
        }
    }

    /// A host that discards output. For tests and scripted runs.
    #[must_use]
    pub fn headless(size: Size, input: Receiver<Vec<u8>>) -> Self {
        Self::new(
            size,
            Box::new(io::sink()),
            input,
            LoopConfig {
                tick: Duration::from_millis(1),
            },
        )
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// The most recent application frame.
    #[must_use]
    pub const fn last_frame(&self) -> &FrameBuffer {
        &self.backdrop
    }

    /// The last title sent to the terminal.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the window caption if it differs from the current one.
    ///
    /// # Errors
    ///
    /// Returns any error from the output writer.
    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        if self.title.as_deref() == Some(title) {
            return Ok(());
        }
        ansi::set_title(&mut self.out, title)?;
        self.out.flush()?;
        self.title = Some(title.to_owned());
        Ok(())
    }

    /// Run `modal` until it yields a value.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` if input closes while the modal is open, or any
    /// error from writing frames.
    pub fn run_modal<M: Modal + ?Sized>(&mut self, modal: &mut M) -> io::Result<M::Output> {
        let mut dirty = true;
        loop {
            if dirty && self.queue.is_empty() {
                self.frame.copy_from(&self.backdrop);
                modal.paint(&mut self.frame);
                let cursor = modal.cursor().map(|(x, y)| (x, y, CursorShape::BlinkBar));
                self.present(cursor)?;
                dirty = false;
            }
            match self.next_input() {
                Input::Event(event) => {
                    if let Some(output) = modal.on_event(&event) {
                        return Ok(output);
                    }
                    dirty = true;
                }
                Input::Idle => {}
                Input::Closed => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "input closed while a dialog was open",
                    ));
                }
            }
            if self.check_resize() {
                dirty = true;
            }
        }
    }

    /// Drive `app` until it quits or input closes.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from the app or from rendering.
    pub fn run_app(&mut self, app: &mut impl App) -> io::Result<()> {
        self.paint_app(app)?;
        if app.on_start(self)? == Action::Quit {
            return Ok(());
        }
        let mut dirty = true;

        loop {
            match self.next_input() {
                Input::Event(event) => {
                    if app.on_event(&event, self)? == Action::Quit {
                        return Ok(());
                    }
                    dirty = true;
                }
                Input::Idle => {}
                Input::Closed => return Ok(()),
            }

            if self.check_resize() {
                app.on_resize(self.size);
                dirty = true;
            }

            if CLOSE_REQUESTED.swap(false, Ordering::Relaxed) {
                if app.on_close(self)? == Action::Quit {
                    return Ok(());
                }
                dirty = true;
            }

            // Drain a burst (a paste, a held key) before painting.
            if dirty && self.queue.is_empty() {
                self.paint_app(app)?;
                dirty = false;
            }
        }
    }

    // ── internals ───────────────────────────────────────────────────────

    fn next_input(&mut self) -> Input {
        if let Some(event) = self.queue.pop_front() {
            return Input::Event(event);
        }
        match self.input.recv_timeout(self.tick) {
            Ok(bytes) => self.queue.extend(self.parser.advance(&bytes)),
            Err(RecvTimeoutError::Timeout) => {
                if self.parser.has_pending() {
                    self.queue.extend(self.parser.flush());
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.queue.extend(self.parser.flush());
                if self.queue.is_empty() {
                    return Input::Closed;
                }
            }
        }
        self.queue.pop_front().map_or(Input::Idle, Input::Event)
    }

    fn check_resize(&mut self) -> bool {
        if !RESIZED.swap(false, Ordering::Relaxed) {
            return false;
        }
        if let Some(size) = terminal::query_size() {
            self.size = size;
            self.frame.resize(size.cols, size.rows);
            self.backdrop.resize(size.cols, size.rows);
        }
        self.renderer.force_redraw();
        true
    }

    fn paint_app(&mut self, app: &mut impl App) -> io::Result<()> {
        self.frame.clear();
        app.paint(&mut self.frame);
        self.backdrop.copy_from(&self.frame);
        if let Some(title) = app.title() {
            self.set_title(&title)?;
        }
        self.present(app.cursor())
    }

    fn present(&mut self, cursor: Option<(u16, u16, CursorShape)>) -> io::Result<()> {
        self.renderer.render(&self.frame);
        self.renderer.flush_to(&mut *self.out)?;
        match cursor {
            Some((x, y, shape)) => {
                ansi::cursor_to(&mut self.out, x, y)?;
                ansi::set_cursor_shape(&mut self.out, shape)?;
                ansi::cursor_show(&mut self.out)?;
            }
            None => ansi::cursor_hide(&mut self.out)?,
        }
        self.out.flush()
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal for the lifetime of an application run.
///
/// ```no_run
/// use std::io;
/// use n_term::buffer::FrameBuffer;
/// use n_term::event_loop::{Action, App, EventLoop, Host};
/// use n_term::input::{Event, KeyEvent};
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_event(&mut self, event: &Event, _host: &mut Host) -> io::Result<Action> {
///         Ok(if event.as_key() == Some(&KeyEvent::ctrl('q')) {
///             Action::Quit
///         } else {
///             Action::Continue
///         })
///     }
///
///     fn paint(&mut self, buf: &mut FrameBuffer) {
///         buf.print(0, 0, "Ctrl+Q quits", Default::default());
///     }
/// }
///
/// EventLoop::new().run(&mut Hello)?;
/// # Ok::<(), io::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct EventLoop {
    terminal: Terminal,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            config,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal, run `app`, and restore the terminal.
    ///
    /// # Errors
    ///
    /// Returns terminal setup/teardown errors or the app's first error.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_signal_handlers();

        let (mut reader, rx) = match StdinReader::spawn() {
            Ok(pair) => pair,
            Err(e) => {
                self.terminal.leave()?;
                return Err(e);
            }
        };

        let mut host = Host::new(self.terminal.size(), Box::new(io::stdout()), rx, self.config);
        let result = host.run_app(app);

        reader.stop();
        drop(host);
        self.terminal.leave()?;
        result
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Style;
    use crate::input::{KeyCode, KeyEvent};
    use std::sync::mpsc::{self, Sender};
    use std::sync::{Arc, Mutex};

    /// Output sink the test can inspect after the host is done.
    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn host() -> (Host, Sender<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        (Host::headless(Size { cols: 30, rows: 6 }, rx), tx)
    }

    /// Collects typed characters until Enter; Escape cancels.
    #[derive(Default)]
    struct LineInput(String);

    impl Modal for LineInput {
        type Output = Option<String>;

        fn on_event(&mut self, event: &Event) -> Option<Self::Output> {
            match event.as_key()?.code {
                KeyCode::Enter => Some(Some(std::mem::take(&mut self.0))),
                KeyCode::Escape => Some(None),
                KeyCode::Char(c) => {
                    self.0.push(c);
                    None
                }
                _ => None,
            }
        }

        fn paint(&mut self, buf: &mut FrameBuffer) {
            buf.print(0, 1, &self.0, Style::PLAIN);
        }

        fn cursor(&self) -> Option<(u16, u16)> {
            Some((0, 1))
        }
    }

    // ── Config / Action ─────────────────────────────────────────────────

    #[test]
    fn default_tick_is_120hz() {
        assert_eq!(LoopConfig::default().tick, Duration::from_micros(8333));
    }

    #[test]
    fn action_variants_differ() {
        assert_ne!(Action::Continue, Action::Quit);
    }

    // ── Modal sub-loop ──────────────────────────────────────────────────

    #[test]
    fn modal_returns_value() {
        let (mut host, tx) = host();
        tx.send(b"ok\r".to_vec()).unwrap();
        assert_eq!(host.run_modal(&mut LineInput::default()).unwrap(), Some("ok".into()));
    }

    #[test]
    fn modal_leaves_following_events_queued() {
        let (mut host, tx) = host();
        tx.send(b"a\rbc\r".to_vec()).unwrap();
        assert_eq!(host.run_modal(&mut LineInput::default()).unwrap(), Some("a".into()));
        assert_eq!(host.run_modal(&mut LineInput::default()).unwrap(), Some("bc".into()));
    }

    #[test]
    fn modal_escape_after_quiet_tick() {
        let (mut host, tx) = host();
        tx.send(b"x\x1b".to_vec()).unwrap();
        assert_eq!(host.run_modal(&mut LineInput::default()).unwrap(), None);
    }

    #[test]
    fn modal_errors_when_input_closes() {
        let (mut host, tx) = host();
        tx.send(b"partial".to_vec()).unwrap();
        drop(tx);
        let err = host.run_modal(&mut LineInput::default()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn modal_paints_over_backdrop() {
        let (tx, rx) = mpsc::channel();
        let sink = Shared::default();
        let mut host = Host::new(
            Size { cols: 20, rows: 3 },
            Box::new(sink.clone()),
            rx,
            LoopConfig {
                tick: Duration::from_millis(1),
            },
        );
        host.backdrop.print(0, 0, "behind", Style::PLAIN);
        tx.send(b"zz\r".to_vec()).unwrap();
        host.run_modal(&mut LineInput::default()).unwrap();
        let out = sink.text();
        assert!(out.contains("behind"));
        assert!(out.contains("zz"));
    }

    // ── Application loop ────────────────────────────────────────────────

    struct Counter {
        keys: usize,
        answers: Vec<Option<String>>,
        started: bool,
    }

    impl App for Counter {
        fn on_start(&mut self, _host: &mut Host) -> io::Result<Action> {
            self.started = true;
            Ok(Action::Continue)
        }

        fn on_event(&mut self, event: &Event, host: &mut Host) -> io::Result<Action> {
            let Some(key) = event.as_key() else {
                return Ok(Action::Continue);
            };
            if key.is_ctrl('q') {
                return Ok(Action::Quit);
            }
            if key.is_ctrl('o') {
                let answer = host.run_modal(&mut LineInput::default())?;
                self.answers.push(answer);
                return Ok(Action::Continue);
            }
            self.keys += 1;
            Ok(Action::Continue)
        }

        fn paint(&mut self, buf: &mut FrameBuffer) {
            buf.print(0, 0, &format!("keys={}", self.keys), Style::PLAIN);
        }

        fn title(&self) -> Option<String> {
            Some(format!("{} keys", self.keys))
        }
    }

    fn counter() -> Counter {
        Counter {
            keys: 0,
            answers: Vec::new(),
            started: false,
        }
    }

    #[test]
    fn app_runs_until_quit() {
        let (mut host, tx) = host();
        tx.send(b"abc\x11ignored".to_vec()).unwrap();
        let mut app = counter();
        host.run_app(&mut app).unwrap();
        assert!(app.started);
        assert_eq!(app.keys, 3);
    }

    #[test]
    fn app_stops_when_input_closes() {
        let (mut host, tx) = host();
        tx.send(b"ab".to_vec()).unwrap();
        drop(tx);
        let mut app = counter();
        host.run_app(&mut app).unwrap();
        assert_eq!(app.keys, 2);
        assert_eq!(host.last_frame().row_text(0).trim_end(), "keys=2");
    }

    #[test]
    fn app_opens_modal_mid_handler() {
        let (mut host, tx) = host();
        tx.send(b"\x0fname\rx\x0f\x1b".to_vec()).unwrap();
        drop(tx);
        let mut app = counter();
        host.run_app(&mut app).unwrap();
        assert_eq!(app.answers, vec![Some("name".into()), None]);
        assert_eq!(app.keys, 1);
    }

    #[test]
    fn title_follows_app_state() {
        let (tx, rx) = mpsc::channel();
        let sink = Shared::default();
        let mut host = Host::new(
            Size { cols: 20, rows: 3 },
            Box::new(sink.clone()),
            rx,
            LoopConfig {
                tick: Duration::from_millis(1),
            },
        );
        tx.send(b"a".to_vec()).unwrap();
        drop(tx);
        host.run_app(&mut counter()).unwrap();
        assert_eq!(host.title(), Some("1 keys"));
        let out = sink.text();
        assert_eq!(out.matches("\x1b]2;0 keys\x07").count(), 1);
        assert_eq!(out.matches("\x1b]2;1 keys\x07").count(), 1);
    }

    #[test]
    fn set_title_skips_repeats() {
        let (mut host, _tx) = host();
        host.set_title("a").unwrap();
        host.set_title("a").unwrap();
        assert_eq!(host.title(), Some("a"));
    }

    #[test]
    fn key_helpers_used_by_apps() {
        let q = Event::Key(KeyEvent::ctrl('q'));
        assert!(q.as_key().is_some_and(|k| k.is_ctrl('q')));
    }
}
