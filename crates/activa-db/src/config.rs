//! Store configuration
//!
//! Loaded from RON, for example:
//!
//! ```ron
//! (
//!     path: Some("/var/lib/activa/directory.db"),
//!     write_attempts: 5,
//!     backfill: true,
//! )
//! ```
//!
//! Every field is optional; omitted fields take their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_WRITE_ATTEMPTS: usize = 3;

/// Configuration for a [`Store`](crate::Store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` keeps everything in memory.
    pub path: Option<PathBuf>,

    /// How many times a unit of work runs when it loses a uniqueness race.
    ///
    /// Clamped to at least 1.
    write_attempts: usize,

    /// Link orphaned activation keys after a dimension row is created.
    pub backfill: bool,
}

impl StoreConfig {
    /// In-memory store with default settings
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed store with default settings
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parse RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn with_write_attempts(mut self, attempts: usize) -> Self {
        self.write_attempts = attempts.max(1);
        self
    }

    pub fn with_backfill(mut self, enabled: bool) -> Self {
        self.backfill = enabled;
        self
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.max(1)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
            backfill: true,
        }
    }
}
