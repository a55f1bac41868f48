//! Clipboard access.
//!
//! The system clipboard is reached through `arboard`, which fails on
//! headless machines, over SSH and in some terminals. Failures are logged
//! once and the clipboard falls back to a process-local string, so Copy
//! then Paste always works inside the editor.

use tracing::{debug, warn};

/// System clipboard with an in-process fallback.
pub struct Clipboard {
    system: Option<arboard::Clipboard>,
    local: String,
}

impl Clipboard {
    /// Try the system clipboard, falling back to a local one.
    #[must_use]
    pub fn new() -> Self {
        let system = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                warn!(error = %e, "system clipboard unavailable, using local clipboard");
                None
            }
        };
        Self {
            system,
            local: String::new(),
        }
    }

    /// A clipboard that never touches the system. For tests.
    #[must_use]
    pub const fn local() -> Self {
        Self {
            system: None,
            local: String::new(),
        }
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.system.is_some()
    }

    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.local);
        if let Some(cb) = &mut self.system {
            if let Err(e) = cb.set_text(text.to_owned()) {
                debug!(error = %e, "clipboard write failed");
            }
        }
    }

    /// Current text, preferring the system clipboard.
    pub fn get_text(&mut self) -> Option<String> {
        if let Some(cb) = &mut self.system {
            match cb.get_text() {
                Ok(text) => return Some(text),
                Err(e) => debug!(error = %e, "clipboard read failed"),
            }
        }
        (!self.local.is_empty()).then(|| self.local.clone())
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Clipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clipboard")
            .field("system", &self.system.is_some())
            .field("local_len", &self.local.len())
            .finish()
    }
}
