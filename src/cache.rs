//! Single-entry memo of the last sniffed file
//!
//! File managers ask for several fields of the same file in a row. The
//! cache keeps the answer for the most recent path only; asking about any
//! other path drops it.

use std::path::{Path, PathBuf};

use crate::Encoding;
use crate::line_ending::LineEnding;

/// A value the sniffer can report for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The detected encoding
    Encoding,
    /// The detected line terminator
    LineEndings,
}

impl Field {
    /// All fields, in presentation order
    pub const ALL: [Field; 2] = [Field::Encoding, Field::LineEndings];

    /// Name shown to the user
    pub fn name(self) -> &'static str {
        match self {
            Field::Encoding => "Encoding",
            Field::LineEndings => "Line Endings",
        }
    }

    /// Every value this field can take, in order
    pub fn choices(self) -> Vec<&'static str> {
        match self {
            Field::Encoding => Encoding::CATALOG.iter().map(|e| e.name()).collect(),
            Field::LineEndings => LineEnding::ALL.iter().map(|l| l.name()).collect(),
        }
    }

    /// Only the encoding can be changed, by recoding the file
    pub fn is_editable(self) -> bool {
        self == Field::Encoding
    }
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    encoding: &'static str,
    line_ending: &'static str,
}

/// Holds the field values of at most one file
#[derive(Debug, Default)]
pub struct ResultCache {
    entry: Option<Entry>,
}

impl ResultCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Does the cache hold `path`? Paths compare without regard to case.
    pub fn contains(&self, path: &Path) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| same_path(&entry.path, path))
    }

    /// Replace whatever is cached with the values for `path`
    pub fn put(&mut self, path: &Path, encoding: Encoding, line_ending: LineEnding) {
        self.clear();
        self.entry = Some(Entry {
            path: path.to_path_buf(),
            encoding: encoding.name(),
            line_ending: line_ending.name(),
        });
    }

    /// Cached value of `field`, if anything is cached
    pub fn get(&self, field: Field) -> Option<&'static str> {
        let entry = self.entry.as_ref()?;
        Some(match field {
            Field::Encoding => entry.encoding,
            Field::LineEndings => entry.line_ending,
        })
    }

    /// Path of the cached entry
    pub fn path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|entry| entry.path.as_path())
    }

    /// Drop the cached entry. Idempotent.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Nothing cached
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    let a = a.as_os_str().to_string_lossy();
    let b = b.as_os_str().to_string_lossy();
    a.to_lowercase() == b.to_lowercase()
}
