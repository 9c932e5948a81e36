//! Local-only history of generated passwords.
//!
//! Distinct from saved items: entries here were generated on this
//! device, authenticated or not, and are never reconciled with the
//! server. Append on generate, clear on explicit user action. A corrupt
//! persisted list is treated as absent, not as an error.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::Store;

/// Durable entry holding the generated-password history.
pub const HISTORY_ENTRY: &str = "history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct HistoryEntry {
    pub value: String,
    pub generated_at: DateTime<Utc>,
}

/// Append-only record of generated passwords.
pub struct HistoryCache {
    store: Arc<Store>,
}

impl HistoryCache {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The persisted list, or empty when absent or unreadable.
    pub fn load(&self) -> Vec<HistoryEntry> {
        match self.store.get::<Vec<HistoryEntry>>(HISTORY_ENTRY) {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "History unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Append a timestamped entry and return the updated list.
    pub fn record(&self, value: &str) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.load();
        entries.push(HistoryEntry {
            value: value.to_string(),
            generated_at: Utc::now(),
        });
        self.store.put(HISTORY_ENTRY, &entries)?;
        Ok(entries)
    }

    /// Empty the history.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_ENTRY)
    }
}
