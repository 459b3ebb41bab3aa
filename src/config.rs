//! Tunables for sniffing and recoding

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detection::DEFAULT_SAMPLE_SIZE;
use crate::recode::DEFAULT_CHUNK_SIZE;
use crate::{Error, Result};

/// Settings shared by an [`Inspector`](crate::Inspector)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum bytes inspected when sniffing a file
    pub max_window: usize,
    /// Output buffer size for recoding
    pub chunk_size: usize,
    /// Directory for recode temp files; the system temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_window: DEFAULT_SAMPLE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: None,
        }
    }
}

impl Config {
    /// Parse a JSON document. Missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Config> {
        let config: Config =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_json_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_window == 0 {
            return Err(Error::Config("max_window must be at least 1".to_string()));
        }
        // A single character encodes to at most four bytes.
        if self.chunk_size < 4 {
            return Err(Error::Config("chunk_size must be at least 4".to_string()));
        }
        Ok(())
    }
}
