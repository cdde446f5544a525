//! Error types for editor operations.

use thiserror::Error;

use folio_types::{BlockId, ChecklistError};

/// Errors that can occur during editor operations.
///
/// Every mutation that returns one of these has left the document untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Block not found in document.
    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),

    /// Duplicate block ID in a loaded document.
    #[error("block already exists: {0:?}")]
    DuplicateBlock(BlockId),

    /// Checklist item operation failed.
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
}
