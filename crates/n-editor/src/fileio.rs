//! Reading and writing documents.
//!
//! Files are read whole and decoded as UTF-8. A leading BOM is split off
//! and reported in [`Loaded::bom`] so the caller can write it back.
//! Bytes that are not valid UTF-8 are decoded again as Windows-1252, which
//! maps every byte to a char, so any readable file opens. This is the WHATWG
//! table, not ISO-8859-1: bytes 0x80..=0x9F become printable characters
//! such as `€` rather than C1 controls. Saving always writes UTF-8 and
//! overwrites the target.
//!
//! The file dialog filters live here too, since they describe which files
//! the editor expects to handle.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use encoding_rs::{UTF_8, WINDOWS_1252};
use thiserror::Error;
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The byte-order mark as a char, for callers writing it back.
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failed read or write, with the path involved.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl FileError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// How the bytes on disk were decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// Fallback for files that are not valid UTF-8.
    Windows1252,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Utf8 => "UTF-8",
            Self::Windows1252 => "Windows-1252",
        })
    }
}

/// Decoded file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub text: String,
    pub encoding: TextEncoding,
    /// The file started with a UTF-8 byte-order mark, not included in `text`.
    pub bom: bool,
}

/// Decode bytes: UTF-8 first, Windows-1252 if that fails.
#[must_use]
pub fn decode(bytes: &[u8]) -> Loaded {
    let body = bytes.strip_prefix(UTF8_BOM);
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body.unwrap_or(bytes)) {
        return Loaded {
            text: text.into_owned(),
            encoding: TextEncoding::Utf8,
            bom: body.is_some(),
        };
    }
    debug!(len = bytes.len(), "not valid UTF-8, decoding as Windows-1252");
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    Loaded {
        text: text.into_owned(),
        encoding: TextEncoding::Windows1252,
        bom: false,
    }
}

/// Read and decode a whole file.
///
/// # Errors
///
/// [`FileError::Read`] if the file cannot be read. Decoding never fails.
pub fn load(path: &Path) -> Result<Loaded, FileError> {
    let bytes = fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = decode(&bytes);
    info!(path = %path.display(), bytes = bytes.len(), encoding = %loaded.encoding, "opened file");
    Ok(loaded)
}

/// Write `text` as UTF-8, replacing whatever is at `path`.
///
/// # Errors
///
/// [`FileError::Write`] if the file cannot be created or written.
pub fn save(path: &Path, text: &str) -> Result<(), FileError> {
    fs::write(path, text.as_bytes()).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "saved file");
    Ok(())
}

// ---------------------------------------------------------------------------
// File dialog filters
// ---------------------------------------------------------------------------

/// A named set of glob patterns, e.g. `Text Files (*.txt)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

impl FileFilter {
    pub const ALL: Self = Self::new("All Files", &["*.*"]);

    #[must_use]
    pub const fn new(name: &'static str, patterns: &'static [&'static str]) -> Self {
        Self { name, patterns }
    }

    /// `"Text Files (*.txt)"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.patterns.join(";"))
    }

    /// Whether a file name passes. `*.*` and `*` take everything;
    /// `*.ext` compares the extension case-insensitively.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| match *pattern {
            "*" | "*.*" => true,
            pattern => pattern.strip_prefix("*.").is_some_and(|want| {
                path.extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(want))
            }),
        })
    }
}

/// Filters offered by the Open dialog, first one selected.
pub const OPEN_FILTERS: &[FileFilter] = &[
    FileFilter::new("Text Files", &["*.txt"]),
    FileFilter::new("Python Files", &["*.py"]),
    FileFilter::new("C Files", &["*.c"]),
    FileFilter::new("HTML Files", &["*.html"]),
    FileFilter::new("Batch Files", &["*.bat"]),
    FileFilter::new("Log Files", &["*.log"]),
    FileFilter::ALL,
];

/// Filters offered by the Save dialog.
pub const SAVE_FILTERS: &[FileFilter] = &[FileFilter::new("Text Files", &["*.txt"]), FileFilter::ALL];

/// Appended by the Save dialog to names typed without an extension.
pub const DEFAULT_EXTENSION: &str = ".txt";

/// `path` with `ext` appended when its file name has no extension.
#[must_use]
pub fn apply_default_extension(path: PathBuf, ext: &str) -> PathBuf {
    if path.extension().is_some() || path.file_name().is_none() {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(ext);
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
