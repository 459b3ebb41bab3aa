//! Per-file queries for a file manager column provider
//!
//! An [`Inspector`] answers "what is the encoding / line ending of this
//! file" and "recode this file to catalog entry N". It remembers the answer
//! for the last file it looked at, so asking for both fields of one file
//! costs a single scan.

use std::path::Path;

use crate::abort::AbortSignal;
use crate::cache::{Field, ResultCache};
use crate::config::Config;
use crate::detection::{EncodingDetector, Sniff};
use crate::line_ending::LineEnding;
use crate::recode::{RecodeReport, Recoder};
use crate::window::ByteWindow;
use crate::{Encoding, Error, Result};

/// Query engine over files, with a one-file memo and a cancel flag
#[derive(Debug)]
pub struct Inspector {
    config: Config,
    cache: ResultCache,
    abort: AbortSignal,
    detector: EncodingDetector,
    recoder: Recoder,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Inspector {
    /// Create an inspector with the given settings
    pub fn new(config: Config) -> Self {
        Self {
            detector: EncodingDetector::with_sample_size(config.max_window),
            recoder: Recoder::from_config(&config),
            cache: ResultCache::new(),
            abort: AbortSignal::new(),
            config,
        }
    }

    /// Settings in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A handle that cancels the running query from another thread
    pub fn abort_handle(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Ask the running query to stop. The next query lowers the flag again.
    pub fn request_cancel(&self) {
        self.abort.request();
    }

    /// The memo of the last sniffed file
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Display names of the encoding catalog, by index
    pub fn encoding_names(&self) -> Vec<&'static str> {
        Field::Encoding.choices()
    }

    /// Display names of the line endings
    pub fn line_ending_names(&self) -> Vec<&'static str> {
        Field::LineEndings.choices()
    }

    /// Encoding and line ending of `path`.
    ///
    /// Answers from the memo when `path` is the file looked at last.
    /// Returns `Ok(None)` if the query was cancelled; nothing is memoized
    /// then.
    pub fn query_sniff(&mut self, path: &Path) -> Result<Option<Sniff>> {
        self.abort.clear();

        if let Some(sniff) = self.cached(path) {
            log::trace!("memo hit for {}", path.display());
            return Ok(Some(sniff));
        }

        self.cache.clear();
        let window = ByteWindow::capped(path, self.config.max_window)?;
        let Some(sniff) = self.detector.sniff(&window, &self.abort) else {
            log::debug!("query for {} cancelled", path.display());
            return Ok(None);
        };

        log::debug!(
            "{}: {} / {}",
            path.display(),
            sniff.encoding,
            sniff.line_ending
        );
        self.cache.put(path, sniff.encoding, sniff.line_ending);
        Ok(Some(sniff))
    }

    /// Display value of one field of `path`
    pub fn query_field(&mut self, path: &Path, field: Field) -> Result<Option<&'static str>> {
        let sniff = self.query_sniff(path)?;
        Ok(sniff.map(|sniff| match field {
            Field::Encoding => sniff.encoding.name(),
            Field::LineEndings => sniff.line_ending.name(),
        }))
    }

    /// Rewrite `path` in the catalog encoding at `target`.
    ///
    /// The current encoding is detected afresh; the memo is not trusted
    /// for a write. The memo is dropped afterwards whatever the outcome.
    /// Returns `Ok(None)` if detection was cancelled; the file is not
    /// touched then.
    pub fn query_recode(&mut self, path: &Path, target: usize) -> Result<Option<RecodeReport>> {
        let to = Encoding::from_index(target).ok_or(Error::NoSuchEncoding(target))?;
        self.abort.clear();

        let result = self.recode_to(path, to);
        self.cache.clear();
        result
    }

    /// Set `field` of `path` to choice `index`. Only the encoding can be
    /// set, which recodes the file.
    pub fn query_set(
        &mut self,
        path: &Path,
        field: Field,
        index: usize,
    ) -> Result<Option<RecodeReport>> {
        if !field.is_editable() {
            return Err(Error::ReadOnlyField(field.name()));
        }
        self.query_recode(path, index)
    }

    fn recode_to(&self, path: &Path, to: Encoding) -> Result<Option<RecodeReport>> {
        let from = {
            let window = ByteWindow::capped(path, self.config.max_window)?;
            self.detector.detect(&window, &self.abort)
        };
        if self.abort.is_requested() {
            log::debug!("recode of {} cancelled during detection", path.display());
            return Ok(None);
        }
        self.recoder.recode(path, from, to).map(Some)
    }

    fn cached(&self, path: &Path) -> Option<Sniff> {
        if !self.cache.contains(path) {
            return None;
        }
        let encoding = Encoding::from_name(self.cache.get(Field::Encoding)?)?;
        let line_ending = LineEnding::from_name(self.cache.get(Field::LineEndings)?)?;
        Some(Sniff {
            encoding,
            line_ending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sniff_fills_memo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"one\r\ntwo\r\n").unwrap();

        let mut inspector = Inspector::default();
        let sniff = inspector.query_sniff(&path).unwrap().unwrap();
        assert_eq!(sniff.encoding, Encoding::Ascii);
        assert_eq!(sniff.line_ending, LineEnding::CrLf);
        assert!(inspector.cache().contains(&path));
    }

    #[test]
    fn test_line_endings_are_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"x\n").unwrap();

        let mut inspector = Inspector::default();
        let err = inspector
            .query_set(&path, Field::LineEndings, 1)
            .unwrap_err();
        assert!(matches!(err, Error::ReadOnlyField("Line Endings")));
        assert_eq!(fs::read(&path).unwrap(), b"x\n");
    }

    #[test]
    fn test_recode_index_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"x\n").unwrap();

        let mut inspector = Inspector::default();
        let err = inspector.query_recode(&path, 8).unwrap_err();
        assert!(matches!(err, Error::NoSuchEncoding(8)));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, b"").unwrap();

        let mut inspector = Inspector::default();
        assert!(matches!(
            inspector.query_sniff(&path),
            Err(Error::EmptyFile(_))
        ));
        assert!(inspector.cache().is_empty());
    }
}
