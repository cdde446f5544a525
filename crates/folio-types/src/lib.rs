//! Shared block and document types for folio.
//!
//! This crate is the data foundation: typed block ids, block kinds, the
//! document shape and the checklist content model. It has **no internal
//! folio dependencies**; the editing rules live in `folio-editor`.
//!
//! |-------------------|----------------------------------------------|
//! | Type              | Purpose                                      |
//! |-------------------|----------------------------------------------|
//! | [`BlockId`]       | Unique, immutable block address (UUIDv7)     |
//! | [`BlockKind`]     | Content type (text, heading, checklist, ...) |
//! | [`Block`]         | One content unit                             |
//! | [`Document`]      | Title + ordered blocks                       |
//! | [`Checklist`]     | Typed view of checklist block content        |
//! |-------------------|----------------------------------------------|

pub mod block;
pub mod checklist;
pub mod ids;

pub use block::{Block, BlockKind, Document};
pub use checklist::{Checklist, ChecklistError, Direction, Todo};
pub use ids::BlockId;

/// Current time as Unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
