//! Questions the editor core asks the user.
//!
//! The save/discard flow needs answers (save changes? where to?) but must
//! not know how they are asked. [`Dialogs`] is that seam: the application
//! implements it with modal terminal dialogs, tests implement it with a
//! script of canned answers.
//!
//! Every method returns `io::Result` because a terminal dialog can fail
//! to draw or lose its input. Dismissing a dialog is not an error: it
//! comes back as `Cancel` or `None`.

use std::io;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::fileio::FileFilter;

/// Answer to "Do you want to save changes to {name}?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Save,
    Discard,
    Cancel,
}

/// Blocking user prompts.
pub trait Dialogs {
    /// Three-way unsaved-changes question about `name`.
    ///
    /// # Errors
    ///
    /// Terminal I/O failure while the dialog is shown.
    fn ask_save_changes(&mut self, name: &str) -> io::Result<SaveChoice>;

    /// Pick an existing file. `None` when dismissed.
    ///
    /// # Errors
    ///
    /// Terminal I/O failure while the dialog is shown.
    fn ask_open_path(&mut self, filters: &[FileFilter]) -> io::Result<Option<PathBuf>>;

    /// Pick a destination. Names without an extension get `default_ext`.
    /// `None` when dismissed.
    ///
    /// # Errors
    ///
    /// Terminal I/O failure while the dialog is shown.
    fn ask_save_path(&mut self, filters: &[FileFilter], default_ext: &str) -> io::Result<Option<PathBuf>>;

    /// An integer within `range`, starting from `initial`. `None` when
    /// dismissed.
    ///
    /// # Errors
    ///
    /// Terminal I/O failure while the dialog is shown.
    fn ask_integer(
        &mut self,
        title: &str,
        prompt: &str,
        initial: u16,
        range: RangeInclusive<u16>,
    ) -> io::Result<Option<u16>>;

    /// # Errors
    ///
    /// Terminal I/O failure while the dialog is shown.
    fn show_error(&mut self, title: &str, message: &str) -> io::Result<()>;

    /// # Errors
    ///
    /// Terminal I/O failure while the dialog is shown.
    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// Scripted dialogs
// ---------------------------------------------------------------------------

/// Canned answers, consumed in order, with a log of what was asked.
///
/// Runs out gracefully: an unexpected question is answered with Cancel or
/// `None` and still logged, so tests can assert on the log.
#[derive(Debug, Default)]
pub struct Scripted {
    pub choices: Vec<SaveChoice>,
    pub paths: Vec<Option<PathBuf>>,
    pub integers: Vec<Option<u16>>,
    /// Every question and message, in order, e.g. `"save-changes: a.txt"`.
    pub log: Vec<String>,
}

impl Scripted {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn choice(mut self, choice: SaveChoice) -> Self {
        self.choices.push(choice);
        self
    }

    #[must_use]
    pub fn path(mut self, path: Option<PathBuf>) -> Self {
        self.paths.push(path);
        self
    }

    #[must_use]
    pub fn integer(mut self, value: Option<u16>) -> Self {
        self.integers.push(value);
        self
    }

    /// Log entries starting with `kind`.
    #[must_use]
    pub fn asked(&self, kind: &str) -> usize {
        self.log.iter().filter(|entry| entry.starts_with(kind)).count()
    }

    fn next_path(&mut self) -> Option<PathBuf> {
        if self.paths.is_empty() {
            None
        } else {
            self.paths.remove(0)
        }
    }
}

impl Dialogs for Scripted {
    fn ask_save_changes(&mut self, name: &str) -> io::Result<SaveChoice> {
        self.log.push(format!("save-changes: {name}"));
        Ok(if self.choices.is_empty() {
            SaveChoice::Cancel
        } else {
            self.choices.remove(0)
        })
    }

    fn ask_open_path(&mut self, _filters: &[FileFilter]) -> io::Result<Option<PathBuf>> {
        self.log.push("open-path".into());
        Ok(self.next_path())
    }

    fn ask_save_path(&mut self, _filters: &[FileFilter], default_ext: &str) -> io::Result<Option<PathBuf>> {
        self.log.push("save-path".into());
        Ok(self
            .next_path()
            .map(|path| crate::fileio::apply_default_extension(path, default_ext)))
    }

    fn ask_integer(
        &mut self,
        title: &str,
        _prompt: &str,
        _initial: u16,
        range: RangeInclusive<u16>,
    ) -> io::Result<Option<u16>> {
        self.log.push(format!("integer: {title}"));
        let value = if self.integers.is_empty() {
            None
        } else {
            self.integers.remove(0)
        };
        Ok(value.filter(|v| range.contains(v)))
    }

    fn show_error(&mut self, title: &str, message: &str) -> io::Result<()> {
        self.log.push(format!("error: {title}: {message}"));
        Ok(())
    }

    fn show_info(&mut self, title: &str, message: &str) -> io::Result<()> {
        self.log.push(format!("info: {title}: {message}"));
        Ok(())
    }
}
