//! Auto-save: an idle timer plus a pluggable sink.
//!
//! The editor itself never does I/O. Whenever the document changes the
//! [`AutoSave`] timer is restarted; once it has been quiet for the configured
//! delay the session hands a [`SavedState`] to whatever [`SaveSink`] the
//! embedder provides (a file, local storage, a network call).

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_types::{Block, Document};

/// What gets handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub title: String,
    pub blocks: Vec<Block>,
    /// Unix milliseconds.
    pub saved_at: u64,
}

impl SavedState {
    pub fn capture(doc: &Document, saved_at: u64) -> Self {
        Self {
            title: doc.title.clone(),
            blocks: doc.blocks.clone(),
            saved_at,
        }
    }

    pub fn into_document(self) -> Document {
        Document::new(self.title, self.blocks)
    }
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for saved documents.
pub trait SaveSink {
    fn save(&mut self, state: &SavedState) -> Result<(), SaveError>;
}

/// Writes pretty JSON to a file, replacing it each time.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back a file written by this sink.
    pub fn load(path: impl AsRef<Path>) -> Result<SavedState, SaveError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl SaveSink for JsonFileSink {
    fn save(&mut self, state: &SavedState) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), blocks = state.blocks.len(), "saved document");
        Ok(())
    }
}

/// Keeps every saved state in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub saves: Vec<SavedState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&SavedState> {
        self.saves.last()
    }
}

impl SaveSink for MemorySink {
    fn save(&mut self, state: &SavedState) -> Result<(), SaveError> {
        self.saves.push(state.clone());
        Ok(())
    }
}

/// Idle timer deciding when an auto-save is due.
#[derive(Debug, Clone)]
pub struct AutoSave {
    delay: Duration,
    dirty: bool,
    /// Start of the quiet period. `None` while dirty means the change has
    /// not been stamped yet; the next [`observe`](Self::observe) stamps it.
    dirty_since: Option<Instant>,
    last_saved: Option<u64>,
}

impl AutoSave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            dirty: false,
            dirty_since: None,
            last_saved: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Note a change at `now`; restarts the delay.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty = true;
        self.dirty_since = Some(now);
    }

    /// Note a change whose time is not known yet.
    pub fn mark_changed(&mut self) {
        self.dirty = true;
        self.dirty_since = None;
    }

    /// Stamp an unstamped change with the caller's clock.
    pub fn observe(&mut self, now: Instant) {
        if self.dirty && self.dirty_since.is_none() {
            self.dirty_since = Some(now);
        }
    }

    /// True once the document has been unchanged for the full delay.
    pub fn is_due(&self, now: Instant) -> bool {
        self.dirty_since
            .is_some_and(|since| now.saturating_duration_since(since) >= self.delay)
    }

    /// When the pending save fires, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.dirty_since.map(|since| since + self.delay)
    }

    pub fn mark_saved(&mut self, at: u64) {
        self.dirty = false;
        self.dirty_since = None;
        self.last_saved = Some(at);
    }

    /// Unix millis of the last successful save.
    pub fn last_saved(&self) -> Option<u64> {
        self.last_saved
    }
}
