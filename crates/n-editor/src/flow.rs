//! Save/discard flow.
//!
//! Guards the actions that would throw the current text away (New, Open,
//! Exit). A clean document passes straight through; a dirty one prompts
//! Save / Discard / Cancel first. Choosing Save and then dismissing the
//! save picker, or hitting a write error, counts as Cancel.
//!
//! These are free functions over a borrowed [`DocumentState`] and the
//! buffer text, so they can be driven by [`Scripted`](crate::prompt::Scripted)
//! dialogs in tests without any terminal.

use std::io;
use std::path::PathBuf;

use tracing::{debug, error};

use crate::document::DocumentState;
use crate::fileio::{self, DEFAULT_EXTENSION, SAVE_FILTERS};
use crate::prompt::{Dialogs, SaveChoice};

/// Title of every dialog the flow raises.
const DIALOG_TITLE: &str = "Notepad";

/// Result of [`save_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The save picker was dismissed. Nothing changed.
    Cancelled,
    /// The write failed and an error dialog was shown. Still dirty.
    Failed,
}

impl SaveOutcome {
    #[inline]
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// What the application should do after [`exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Terminate,
    Stay,
}

/// The document's own path, or one picked through the save dialog.
///
/// # Errors
///
/// Terminal I/O failure while the dialog is shown.
pub fn resolve_save_path<D: Dialogs + ?Sized>(doc: &DocumentState, dialogs: &mut D) -> io::Result<Option<PathBuf>> {
    if let Some(path) = doc.path() {
        return Ok(Some(path.to_path_buf()));
    }
    dialogs.ask_save_path(SAVE_FILTERS, DEFAULT_EXTENSION)
}

/// Write `text` to the document's destination and mark it clean.
///
/// # Errors
///
/// Terminal I/O failure while a dialog is shown. A failed write is not an
/// error here: it is reported to the user and returned as
/// [`SaveOutcome::Failed`].
pub fn save_file<D: Dialogs + ?Sized>(doc: &mut DocumentState, text: &str, dialogs: &mut D) -> io::Result<SaveOutcome> {
    let Some(path) = resolve_save_path(doc, dialogs)? else {
        debug!("save cancelled");
        return Ok(SaveOutcome::Cancelled);
    };
    match fileio::save(&path, text) {
        Ok(()) => {
            doc.mark_clean(Some(path.clone()));
            Ok(SaveOutcome::Saved(path))
        }
        Err(err) => {
            error!(error = %err, "save failed");
            dialogs.show_error(DIALOG_TITLE, &format!("Could not save file:\n{err}"))?;
            Ok(SaveOutcome::Failed)
        }
    }
}

fn ask<D: Dialogs + ?Sized>(doc: &DocumentState, dialogs: &mut D) -> io::Result<SaveChoice> {
    let choice = dialogs.ask_save_changes(&doc.display_name())?;
    debug!(?choice, "unsaved changes prompt");
    Ok(choice)
}

/// Whether the pending New or Open may go ahead.
///
/// # Errors
///
/// Terminal I/O failure while a dialog is shown.
pub fn confirm_discard<D: Dialogs + ?Sized>(doc: &mut DocumentState, text: &str, dialogs: &mut D) -> io::Result<bool> {
    if !doc.is_dirty() {
        return Ok(true);
    }
    match ask(doc, dialogs)? {
        SaveChoice::Save => Ok(save_file(doc, text, dialogs)?.is_saved()),
        SaveChoice::Discard => Ok(true),
        SaveChoice::Cancel => Ok(false),
    }
}

/// Decide whether a close request ends the program.
///
/// # Errors
///
/// Terminal I/O failure while a dialog is shown.
pub fn exit<D: Dialogs + ?Sized>(doc: &mut DocumentState, text: &str, dialogs: &mut D) -> io::Result<ExitDecision> {
    if !doc.is_dirty() {
        return Ok(ExitDecision::Terminate);
    }
    let proceed = match ask(doc, dialogs)? {
        SaveChoice::Save => save_file(doc, text, dialogs)?.is_saved(),
        SaveChoice::Discard => true,
        SaveChoice::Cancel => false,
    };
    Ok(if proceed {
        ExitDecision::Terminate
    } else {
        ExitDecision::Stay
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Scripted;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn dirty_at(path: Option<PathBuf>) -> DocumentState {
        let mut doc = path.map_or_else(DocumentState::new, DocumentState::with_path);
        doc.mark_dirty();
        doc
    }

    // -- resolve_save_path ---------------------------------------------------

    #[test]
    fn existing_path_is_used_without_asking() {
        let doc = DocumentState::with_path(PathBuf::from("/x/a.txt"));
        let mut d = Scripted::new();
        assert_eq!(
            resolve_save_path(&doc, &mut d).unwrap(),
            Some(PathBuf::from("/x/a.txt"))
        );
        assert!(d.log.is_empty());
    }

    #[test]
    fn untitled_asks_for_path() {
        let doc = DocumentState::new();
        let mut d = Scripted::new().path(None);
        assert_eq!(resolve_save_path(&doc, &mut d).unwrap(), None);
        assert_eq!(d.asked("save-path"), 1);
    }

    // -- save_file -----------------------------------------------------------

    #[test]
    fn save_as_writes_and_adopts_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a");
        let mut doc = dirty_at(None);
        let mut d = Scripted::new().path(Some(target));

        let outcome = save_file(&mut doc, "hello", &mut d).unwrap();

        let written = dir.path().join("a.txt");
        assert_eq!(outcome, SaveOutcome::Saved(written.clone()));
        assert_eq!(fs::read_to_string(&written).unwrap(), "hello");
        assert!(!doc.is_dirty());
        assert_eq!(doc.path(), Some(written.as_path()));
        assert_eq!(doc.title(), "a.txt - Notepad");
    }

    #[test]
    fn cancelled_picker_changes_nothing() {
        let mut doc = dirty_at(None);
        let mut d = Scripted::new().path(None);
        assert_eq!(save_file(&mut doc, "x", &mut d).unwrap(), SaveOutcome::Cancelled);
        assert!(doc.is_dirty());
        assert_eq!(doc.path(), None);
    }

    #[test]
    fn write_failure_shows_error_and_stays_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("missing/dir/a.txt");
        let mut doc = dirty_at(Some(bad.clone()));
        let mut d = Scripted::new();

        assert_eq!(save_file(&mut doc, "x", &mut d).unwrap(), SaveOutcome::Failed);
        assert!(doc.is_dirty());
        assert_eq!(doc.path(), Some(bad.as_path()));
        assert_eq!(d.asked("error: Notepad: Could not save file:\n"), 1);
    }

    // -- confirm_discard -----------------------------------------------------

    #[test]
    fn clean_document_proceeds_without_prompt() {
        let mut doc = DocumentState::new();
        let mut d = Scripted::new();
        assert!(confirm_discard(&mut doc, "", &mut d).unwrap());
        assert!(d.log.is_empty());
    }

    #[test]
    fn discard_proceeds_and_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.txt");
        fs::write(&path, "original").unwrap();
        let mut doc = dirty_at(Some(path.clone()));
        let mut d = Scripted::new().choice(SaveChoice::Discard);

        assert!(confirm_discard(&mut doc, "edited", &mut d).unwrap());
        assert!(doc.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(d.log, vec!["save-changes: keep.txt".to_owned()]);
    }

    #[test]
    fn cancel_does_not_proceed_and_does_no_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.txt");
        fs::write(&path, "original").unwrap();
        let mut doc = dirty_at(Some(path.clone()));
        let mut d = Scripted::new().choice(SaveChoice::Cancel);

        assert!(!confirm_discard(&mut doc, "edited", &mut d).unwrap());
        assert!(doc.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(d.log.len(), 1);
    }

    #[test]
    fn save_choice_saves_then_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let mut doc = dirty_at(Some(path.clone()));
        let mut d = Scripted::new().choice(SaveChoice::Save);

        assert!(confirm_discard(&mut doc, "new text", &mut d).unwrap());
        assert!(!doc.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new text");
    }

    #[test]
    fn save_choice_with_cancelled_picker_does_not_proceed() {
        let mut doc = dirty_at(None);
        let mut d = Scripted::new().choice(SaveChoice::Save).path(None);
        assert!(!confirm_discard(&mut doc, "x", &mut d).unwrap());
        assert!(doc.is_dirty());
        assert_eq!(d.log, vec!["save-changes: Untitled".to_owned(), "save-path".to_owned()]);
    }

    #[test]
    fn save_choice_with_failed_write_does_not_proceed() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = dirty_at(Some(dir.path().join("nope/a.txt")));
        let mut d = Scripted::new().choice(SaveChoice::Save);
        assert!(!confirm_discard(&mut doc, "x", &mut d).unwrap());
        assert_eq!(d.asked("error:"), 1);
    }

    // -- exit ----------------------------------------------------------------

    #[test]
    fn exit_clean_terminates() {
        let mut doc = DocumentState::new();
        let mut d = Scripted::new();
        assert_eq!(exit(&mut doc, "", &mut d).unwrap(), ExitDecision::Terminate);
        assert!(d.log.is_empty());
    }

    #[test]
    fn exit_cancel_stays() {
        let mut doc = dirty_at(None);
        let mut d = Scripted::new().choice(SaveChoice::Cancel);
        assert_eq!(exit(&mut doc, "x", &mut d).unwrap(), ExitDecision::Stay);
        assert!(doc.is_dirty());
    }

    #[test]
    fn exit_discard_terminates_without_saving() {
        let mut doc = dirty_at(None);
        let mut d = Scripted::new().choice(SaveChoice::Discard);
        assert_eq!(exit(&mut doc, "x", &mut d).unwrap(), ExitDecision::Terminate);
        assert_eq!(d.asked("save-path"), 0);
    }

    #[test]
    fn exit_save_terminates_after_writing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let mut doc = dirty_at(None);
        let mut d = Scripted::new().choice(SaveChoice::Save).path(Some(target.clone()));
        assert_eq!(exit(&mut doc, "bye", &mut d).unwrap(), ExitDecision::Terminate);
        assert_eq!(fs::read_to_string(&target).unwrap(), "bye");
    }

    #[test]
    fn exit_save_with_cancelled_picker_stays() {
        let mut doc = dirty_at(None);
        let mut d = Scripted::new().choice(SaveChoice::Save).path(None);
        assert_eq!(exit(&mut doc, "x", &mut d).unwrap(), ExitDecision::Stay);
    }
}
