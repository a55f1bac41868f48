// SPDX-License-Identifier: MIT
//
// n-term — Terminal engine for n-pad.
//
// Owns everything between the application and the terminal device:
// raw mode and the alternate screen, a cell grid the UI paints into,
// a differential renderer that only emits changed cells, an input
// parser that turns stdin bytes into key/mouse/paste events, and an
// event loop that can nest modal sub-loops for blocking dialogs.
//
// No TUI framework underneath. Escape sequences are written directly
// and termios is driven through libc, so every byte sent to the
// terminal is one we chose to send.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod reader;
pub mod terminal;
