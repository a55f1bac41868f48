//! # n-editor — Editor core for n-pad
//!
//! Everything a plain-text notepad needs below the user interface:
//!
//! - **[`position`]** — `Position` (line, col) and `Range` types, 0-indexed
//! - **[`buffer`]** — `Buffer` wrapping a rope, with line-ending detection
//! - **[`cursor`]** — Cursor with movement, sticky column, and selection
//! - **[`history`]** — Undo/redo with typing coalescing
//! - **[`clipboard`]** — System clipboard with an in-process fallback
//! - **[`view`]** — Scrolling and rendering a buffer into an n-term frame
//! - **[`textarea`]** — The editing widget tying the above together
//! - **[`document`]** — Open file path, dirty flag, window title
//! - **[`fileio`]** — Loading with encoding fallback, saving, file filters
//! - **[`prompt`]** — The `Dialogs` trait the core asks questions through
//! - **[`flow`]** — Save / Discard / Cancel guard for New, Open and Exit
//! - **[`command`]** — Commands, shortcuts, and menu layout
//! - **[`font`]** — Font family and size

pub mod buffer;
pub mod clipboard;
pub mod command;
pub mod cursor;
pub mod document;
pub mod fileio;
pub mod flow;
pub mod font;
pub mod history;
pub mod position;
pub mod prompt;
pub mod textarea;
pub mod view;
