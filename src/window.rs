//! Read-only memory-mapped view of a file prefix

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use crate::{Error, Result};

/// Read-only view of a file's bytes, either capped or whole.
///
/// The mapping is released when the window is dropped.
#[derive(Debug)]
pub struct ByteWindow {
    map: Mmap,
}

impl ByteWindow {
    /// Map up to `limit` bytes of `path`, or the whole file when `limit` is
    /// `None`. An empty file is an error: there is nothing to map.
    pub fn open(path: &Path, limit: Option<usize>) -> Result<ByteWindow> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        if file_len == 0 {
            return Err(Error::EmptyFile(path.to_path_buf()));
        }

        let file_len = usize::try_from(file_len).unwrap_or(usize::MAX);
        let len = limit.map_or(file_len, |limit| file_len.min(limit));

        // SAFETY: the map is read-only and lives no longer than this window.
        // A concurrent writer truncating the file is outside what callers
        // are allowed to do while a query for it is running.
        let map = unsafe { MmapOptions::new().len(len).map(&file)? };
        log::debug!("mapped {} of {} bytes of {}", len, file_len, path.display());

        Ok(ByteWindow { map })
    }

    /// Map at most `limit` bytes of `path`
    pub fn capped(path: &Path, limit: usize) -> Result<ByteWindow> {
        Self::open(path, Some(limit))
    }

    /// Map all of `path`
    pub fn full(path: &Path) -> Result<ByteWindow> {
        Self::open(path, None)
    }

    /// Returns the mapped bytes as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.map
    }
}

impl Deref for ByteWindow {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for ByteWindow {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_capped_window() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.flush().unwrap();

        let window = ByteWindow::capped(file.path(), 4).unwrap();
        assert_eq!(window.as_slice(), b"0123");

        let window = ByteWindow::capped(file.path(), 100).unwrap();
        assert_eq!(window.len(), 10);

        let window = ByteWindow::full(file.path()).unwrap();
        assert_eq!(&window[..], b"0123456789");
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let err = ByteWindow::full(file.path()).unwrap_err();
        assert!(matches!(err, Error::EmptyFile(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ByteWindow::full(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
