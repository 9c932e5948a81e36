//! Durable key/value storage.
//!
//! Each entry is a standalone JSON file under the store directory, so
//! entries live and die independently - there is no transaction across
//! them. Session restore relies on exactly that: a crash between the
//! token write and the identity write leaves a pair the restore path
//! detects and discards.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Application name used for the default data directory path
const APP_NAME: &str = "passkeep";

/// Durable storage rooted at a directory, one JSON file per entry.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open a store at an explicit directory, creating it if needed.
    pub fn open(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open the store at the platform data directory.
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Self::open(data_dir.join(APP_NAME))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Read an entry. `Ok(None)` means absent; a read or parse failure is
    /// an error so callers can choose their own corruption policy.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read entry: {}", key))?;
        let value: T = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse entry: {}", key))?;
        Ok(Some(value))
    }

    /// Write an entry, replacing any previous value.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(self.entry_path(key), contents)
            .with_context(|| format!("Failed to write entry: {}", key))?;
        Ok(())
    }

    /// Remove an entry. Removing an absent entry is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove entry: {}", key))?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }
}
