//! Document state: which file is open and whether it has unsaved edits.
//!
//! This is the only state that outlives a single command. It starts as an
//! untitled, clean document; New replaces it wholesale, Open and Save
//! update it, and the window title is derived from it.
//!
//! Dirtiness is edge-triggered. The text area reports that an edit
//! happened and [`mark_dirty`](DocumentState::mark_dirty) records it; only
//! the clean-to-dirty transition changes the title.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Shown in place of a file name before the first save.
pub const UNTITLED: &str = "Untitled";

/// Application name, the suffix of every title.
pub const APP_NAME: &str = "Notepad";

/// Path and dirty flag of the open document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    path: Option<PathBuf>,
    dirty: bool,
}

impl DocumentState {
    /// A fresh untitled, clean document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            path: None,
            dirty: false,
        }
    }

    /// A clean document backed by `path`.
    #[must_use]
    pub const fn with_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            dirty: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Base name of the path, or [`UNTITLED`].
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| UNTITLED.to_owned(), |name| name.to_string_lossy().into_owned())
    }

    /// `"{*}{name} - Notepad"`, with the star only while dirty.
    #[must_use]
    pub fn title(&self) -> String {
        let marker = if self.dirty { "*" } else { "" };
        format!("{marker}{} - {APP_NAME}", self.display_name())
    }

    /// Record an edit. Returns true on the clean-to-dirty transition, the
    /// only time the title changes.
    pub fn mark_dirty(&mut self) -> bool {
        if self.dirty {
            return false;
        }
        self.dirty = true;
        debug!(name = %self.display_name(), "document dirty");
        true
    }

    /// Record a successful load or save, adopting `path` when given.
    pub fn mark_clean(&mut self, path: Option<PathBuf>) {
        if let Some(path) = path {
            self.path = Some(path);
        }
        self.dirty = false;
        debug!(name = %self.display_name(), "document clean");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
