//! Pending-edit buffer: coalesces rapid typing into one committed update.
//!
//! Timer-free. The caller passes the current [`Instant`] to every call, so the
//! buffer works the same under a UI event loop, an async runtime, or a test
//! with a fake clock. Each block has at most one pending edit; recording
//! again replaces its content and restarts its idle clock.

use std::time::{Duration, Instant};

use folio_types::BlockId;

#[derive(Debug, Clone)]
struct PendingEdit {
    block: BlockId,
    content: String,
    last_edit: Instant,
}

#[derive(Debug, Clone)]
pub struct EditBuffer {
    pending: Vec<PendingEdit>,
    interval: Duration,
}

impl EditBuffer {
    pub fn new(interval: Duration) -> Self {
        Self {
            pending: Vec::new(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, block: &BlockId) -> bool {
        self.pending.iter().any(|p| &p.block == block)
    }

    /// Latest uncommitted content for a block.
    pub fn pending_content(&self, block: &BlockId) -> Option<&str> {
        self.pending
            .iter()
            .find(|p| &p.block == block)
            .map(|p| p.content.as_str())
    }

    /// Buffer `content` for `block`, restarting its idle clock.
    pub fn record(&mut self, block: BlockId, content: impl Into<String>, now: Instant) {
        let content = content.into();
        match self.pending.iter_mut().find(|p| p.block == block) {
            Some(edit) => {
                edit.content = content;
                edit.last_edit = now;
            }
            None => self.pending.push(PendingEdit {
                block,
                content,
                last_edit: now,
            }),
        }
    }

    /// Drain edits that have been idle for at least the interval.
    pub fn take_due(&mut self, now: Instant) -> Vec<(BlockId, String)> {
        let interval = self.interval;
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|p| now.saturating_duration_since(p.last_edit) >= interval);
        self.pending = waiting;
        due.into_iter().map(|p| (p.block, p.content)).collect()
    }

    /// Drain every pending edit regardless of age.
    pub fn flush_all(&mut self) -> Vec<(BlockId, String)> {
        self.pending.drain(..).map(|p| (p.block, p.content)).collect()
    }

    /// Drop a block's pending edit without committing it.
    pub fn discard(&mut self, block: &BlockId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| &p.block != block);
        self.pending.len() != before
    }

    /// When the earliest pending edit becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.last_edit + self.interval).min()
    }
}
