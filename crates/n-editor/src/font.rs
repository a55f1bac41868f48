//! Font setting.
//!
//! The terminal draws the glyphs, so the family is informational and the
//! size is state the user can change and see in the status bar.

use std::fmt;
use std::ops::RangeInclusive;

use tracing::debug;

/// Sizes accepted by the Font Size dialog and `--font-size`.
pub const SIZE_RANGE: RangeInclusive<u16> = 8..=72;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    family: String,
    size: u16,
}

impl FontSpec {
    pub const DEFAULT_FAMILY: &'static str = "Consolas";
    pub const DEFAULT_SIZE: u16 = 12;

    #[must_use]
    pub fn new(family: impl Into<String>, size: u16) -> Self {
        Self {
            family: family.into(),
            size: clamp_size(size),
        }
    }

    #[inline]
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> u16 {
        self.size
    }

    /// Change the size. Returns false, leaving the size alone, when `size`
    /// is out of range.
    pub fn set_size(&mut self, size: u16) -> bool {
        if !SIZE_RANGE.contains(&size) {
            return false;
        }
        debug!(from = self.size, to = size, "font size changed");
        self.size = size;
        true
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FAMILY, Self::DEFAULT_SIZE)
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} pt", self.family, self.size)
    }
}

fn clamp_size(size: u16) -> u16 {
    size.clamp(*SIZE_RANGE.start(), *SIZE_RANGE.end())
}
