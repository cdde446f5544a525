//! Block-list editing model for folio documents.
//!
//! Rendering is someone else's job. This crate owns what a block editor
//! needs underneath: an ordered block list with invariant-preserving
//! mutations, bounded undo/redo, debounced typing, and auto-save.
//!
//! # Layers
//!
//! - [`BlockStore`]: the document and its invariants (never empty, unique
//!   ids, at most one editing block).
//! - [`History`]: whole-document snapshots for linear undo/redo.
//! - [`EditBuffer`]: coalesces keystrokes until input goes idle.
//! - [`AutoSave`] + [`SaveSink`]: saves after a quiet period.
//! - [`EditorSession`]: ties the above together and decides which
//!   operations are recorded in history.
//!
//! Timing is always passed in as an [`Instant`](std::time::Instant).
//! Mutations that take no time reuse the latest one the caller supplied, so
//! every layer is deterministic under test.

mod autosave;
mod block_store;
mod config;
mod debounce;
mod error;
mod history;
mod paste;
mod session;

pub use autosave::{AutoSave, JsonFileSink, MemorySink, SaveError, SaveSink, SavedState};
pub use block_store::BlockStore;
pub use config::{ConfigError, EditorConfig};
pub use debounce::EditBuffer;
pub use error::EditorError;
pub use history::History;
pub use paste::suggest_kind;
pub use session::{EditorSession, SharedSession, TickReport};

pub use folio_types::{Block, BlockId, BlockKind, Checklist, ChecklistError, Direction, Document, Todo};

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
