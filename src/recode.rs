//! Rewrite a file in another encoding
//!
//! The whole file is converted into a temp file first. The original is only
//! replaced, by renaming a complete copy over it, once conversion has
//! succeeded end to end, so a failed recode leaves it exactly as it was.

use std::fs;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::{Builder, NamedTempFile};

use crate::config::Config;
use crate::translator::{Convert, Translator};
use crate::window::ByteWindow;
use crate::{Encoding, Error, Result};

/// Default output buffer size
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Byte counts of a finished recode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecodeReport {
    /// Bytes of the original file, BOM included
    pub bytes_read: u64,
    /// Bytes of the rewritten file, BOM included
    pub bytes_written: u64,
}

/// Rewrites files through a temp file
#[derive(Debug, Clone)]
pub struct Recoder {
    chunk_size: usize,
    temp_dir: Option<PathBuf>,
}

impl Default for Recoder {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: None,
        }
    }
}

impl Recoder {
    /// Create a recoder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recoder using the chunk size and temp dir of `config`
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.chunk_size,
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Set the output buffer size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Put temp files in `dir` instead of the system temp dir
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Convert `path` from `from` to `to` in place.
    ///
    /// The source BOM is dropped and the target BOM written, so recoding
    /// between UTF-8 with and without BOM only adds or removes the mark.
    pub fn recode(&self, path: &Path, from: Encoding, to: Encoding) -> Result<RecodeReport> {
        let translator = Translator::new(from, to)?;
        log::info!("recoding {} from {} to {}", path.display(), from, to);
        self.recode_with(path, from.bom(), to.bom(), translator)
    }

    /// Convert `path` in place with any converter
    pub fn recode_with<C: Convert>(
        &self,
        path: &Path,
        from_bom: &[u8],
        to_bom: &[u8],
        converter: C,
    ) -> Result<RecodeReport> {
        let converted = self.convert_to_temp(path, from_bom, to_bom, converter);
        let (temp, report) = match converted {
            Ok(done) => done,
            Err(err) => {
                log::warn!("recode of {} abandoned: {}", path.display(), err);
                return Err(err);
            }
        };

        replace_contents(path, temp)?;
        log::debug!(
            "recoded {}: {} bytes in, {} bytes out",
            path.display(),
            report.bytes_read,
            report.bytes_written
        );
        Ok(report)
    }

    fn create_temp(&self) -> Result<NamedTempFile> {
        let dir = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        let temp = Builder::new().prefix(".encsniff-").suffix(".tmp").tempfile_in(dir)?;
        Ok(temp)
    }

    /// Write the converted file to a new temp file. The window over the
    /// source is released before this returns.
    fn convert_to_temp<C: Convert>(
        &self,
        path: &Path,
        from_bom: &[u8],
        to_bom: &[u8],
        mut converter: C,
    ) -> Result<(NamedTempFile, RecodeReport)> {
        let window = ByteWindow::full(path)?;
        let mut temp = self.create_temp()?;
        let mut buffer = vec![0u8; self.chunk_size];

        temp.write_all(to_bom)?;
        let mut report = RecodeReport {
            bytes_read: window.len() as u64,
            bytes_written: to_bom.len() as u64,
        };

        let mut input = window.strip_prefix(from_bom).unwrap_or(window.as_slice());
        let mut position = (window.len() - input.len()) as u64;

        while !input.is_empty() {
            let progress = converter.convert(input, &mut buffer)?;
            if progress.consumed == 0 && progress.produced == 0 {
                return Err(Error::Stalled { position });
            }
            temp.write_all(&buffer[..progress.produced])?;
            report.bytes_written += progress.produced as u64;
            input = &input[progress.consumed..];
            position += progress.consumed as u64;
        }

        let tail = converter.flush(&mut buffer)?;
        temp.write_all(&buffer[..tail])?;
        report.bytes_written += tail as u64;

        temp.as_file().sync_all()?;
        Ok((temp, report))
    }
}

/// Replace `path` with the contents of `staged`.
///
/// The contents are copied into a sibling of `path` that takes over its
/// permissions, and the sibling is renamed over `path`. Until that rename
/// the original is untouched; any earlier failure deletes the sibling and
/// the staged file.
fn replace_contents(path: &Path, mut staged: NamedTempFile) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut sibling = Builder::new()
        .prefix(".encsniff-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    staged.as_file_mut().seek(SeekFrom::Start(0))?;
    io::copy(staged.as_file_mut(), sibling.as_file_mut())?;
    fs::set_permissions(sibling.path(), fs::metadata(path)?.permissions())?;
    sibling.as_file().sync_all()?;

    if let Err(err) = sibling.persist(path) {
        log::error!("could not replace {}: {}", path.display(), err.error);
        return Err(err.error.into());
    }

    staged.close()?;
    Ok(())
}
