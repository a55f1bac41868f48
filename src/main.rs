// SPDX-License-Identifier: MIT
//
// n-pad — a minimal terminal notepad.
//
// This is the main binary that wires together the two crates:
//
//   n-term   → terminal control, rendering, input parsing, event loop
//   n-editor → text area, document state, file I/O, save/discard flow
//
// `Notepad` (app.rs) implements n-term's App trait. Each keypress flows
// through:
//
//   stdin → parser → on_event → command or text area → dirty mark
//   paint → menu bar + text + status → framebuffer → diff renderer
//
// Dialogs are modal sub-loops (dialogs.rs, menu.rs) run on the same
// thread, so a handler can ask "save changes?" and wait for the answer.

mod app;
mod dialogs;
mod menu;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use n_editor::clipboard::Clipboard;
use n_editor::font::FontSpec;
use n_editor::textarea::TextArea;
use n_term::event_loop::EventLoop;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::Notepad;

/// Env var holding the log filter, e.g. `NPAD_LOG=debug`.
const LOG_FILTER_ENV: &str = "NPAD_LOG";

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "n-pad", version, about = "A minimal terminal notepad")]
struct Args {
    /// File to open at startup. Created on first save if it does not exist.
    file: Option<String>,

    /// Initial font size in points, shown in the status bar.
    #[arg(long, default_value_t = FontSpec::DEFAULT_SIZE, value_parser = clap::value_parser!(u16).range(8..=72))]
    font_size: u16,

    /// Columns per tab stop.
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(1..=16))]
    tab_width: u8,

    /// Write logs to this file. The UI owns the terminal, so there is no
    /// other log output.
    #[arg(long, env = "NPAD_LOG_FILE")]
    log_file: Option<PathBuf>,
}

/// The startup path: surrounding double quotes dropped, made absolute.
fn startup_path(raw: &str) -> PathBuf {
    let trimmed = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let path = PathBuf::from(trimmed);
    std::path::absolute(&path).unwrap_or(path)
}

// ─── Logging ─────────────────────────────────────────────────────────────────

/// Install a file subscriber when `path` is given. The returned guard
/// flushes the writer on drop and must live until exit.
fn init_logging(path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("log file path {} has no file name", path.display()))?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;
    Ok(Some(guard))
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut text = TextArea::new(Clipboard::new());
    text.set_tab_width(args.tab_width);
    let font = FontSpec::new(FontSpec::DEFAULT_FAMILY, args.font_size);
    let mut notepad = Notepad::new(text, font);
    if let Some(raw) = args.file.as_deref() {
        notepad = notepad.with_file(startup_path(raw));
    }

    EventLoop::new()
        .run(&mut notepad)
        .context("terminal session failed")?;
    info!("exited");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
