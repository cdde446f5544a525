//! Block store: the ordered block list and title of one document.
//!
//! All mutations go through [`BlockStore`], which keeps the document
//! invariants:
//!
//! - the block list is never empty,
//! - block ids are unique and never reused,
//! - at most one block has `is_editing` set.
//!
//! Unknown ids are reported as [`EditorError::BlockNotFound`] and leave the
//! document untouched. Boundary cases that have nothing to do (moving the
//! first block up, deleting the only block) succeed without changes.

use std::collections::HashSet;

use folio_types::{Block, BlockId, BlockKind, Direction, Document};

use crate::{EditorError, Result};

/// Ordered blocks plus title, with invariant-preserving mutations.
#[derive(Debug, Clone)]
pub struct BlockStore {
    doc: Document,

    /// Store version (bumped on any mutation).
    version: u64,
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new("")
    }
}

impl BlockStore {
    /// Create a store holding a single empty text block.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            doc: Document::new(title, vec![Block::empty(BlockKind::Text)]),
            version: 0,
        }
    }

    /// Adopt a loaded document, repairing what can be repaired.
    ///
    /// An empty block list gets one empty text block and extra editing
    /// flags are dropped (the first one wins). Duplicate ids cannot be
    /// repaired without changing identities, so they are rejected.
    pub fn from_document(mut doc: Document) -> Result<Self> {
        let mut seen = HashSet::with_capacity(doc.blocks.len());
        for block in &doc.blocks {
            if !seen.insert(block.id) {
                return Err(EditorError::DuplicateBlock(block.id));
            }
        }

        if doc.blocks.is_empty() {
            tracing::debug!("loaded document has no blocks, seeding an empty one");
            doc.blocks.push(Block::empty(BlockKind::Text));
        }

        let mut editing_seen = false;
        for block in &mut doc.blocks {
            if block.is_editing {
                if editing_seen {
                    tracing::warn!(block = %block.id, "dropping extra editing flag");
                    block.is_editing = false;
                }
                editing_seen = true;
            }
        }

        Ok(Self { doc, version: 0 })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The whole document (read-only).
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.doc.blocks
    }

    pub fn title(&self) -> &str {
        &self.doc.title
    }

    /// Get the current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of blocks (always at least one).
    pub fn len(&self) -> usize {
        self.doc.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.doc.blocks.is_empty()
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.doc.block(id)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.doc.index_of(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index_of(id).is_some()
    }

    /// The block currently being edited, if any.
    pub fn editing_id(&self) -> Option<BlockId> {
        self.doc.editing().map(|b| b.id)
    }

    fn require_index(&self, id: &BlockId) -> Result<usize> {
        self.index_of(id).ok_or(EditorError::BlockNotFound(*id))
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.doc.title = title.into();
        self.bump();
    }

    /// Insert a new empty block and make it the editing block.
    ///
    /// Placed immediately after `after`, or appended when `after` is `None`
    /// or not in the document.
    pub fn add_block(&mut self, after: Option<&BlockId>, kind: BlockKind) -> BlockId {
        let mut block = Block::empty(kind);
        block.is_editing = true;
        let id = block.id;

        let index = match after.and_then(|a| self.index_of(a)) {
            Some(idx) => idx + 1,
            None => {
                if let Some(after) = after {
                    tracing::debug!(after = %after, "reference block missing, appending");
                }
                self.doc.blocks.len()
            }
        };

        for b in &mut self.doc.blocks {
            b.is_editing = false;
        }
        self.doc.blocks.insert(index, block);
        self.bump();

        tracing::debug!(block = %id, %kind, index, "added block");
        id
    }

    /// Replace a block's content.
    pub fn update_content(&mut self, id: &BlockId, content: impl Into<String>) -> Result<()> {
        let idx = self.require_index(id)?;
        self.doc.blocks[idx].content = content.into();
        self.bump();
        Ok(())
    }

    /// Remove a block. Does nothing when it is the only block left.
    pub fn delete_block(&mut self, id: &BlockId) -> Result<()> {
        let idx = self.require_index(id)?;
        if self.doc.blocks.len() <= 1 {
            tracing::debug!(block = %id, "refusing to delete the last block");
            return Ok(());
        }
        self.doc.blocks.remove(idx);
        self.bump();
        tracing::debug!(block = %id, index = idx, "deleted block");
        Ok(())
    }

    /// Swap a block with its neighbour. No-op at either end.
    pub fn move_block(&mut self, id: &BlockId, direction: Direction) -> Result<()> {
        let idx = self.require_index(id)?;
        let target = match direction {
            Direction::Up if idx > 0 => idx - 1,
            Direction::Down if idx + 1 < self.doc.blocks.len() => idx + 1,
            _ => return Ok(()),
        };
        self.doc.blocks.swap(idx, target);
        self.bump();
        Ok(())
    }

    /// Move a block so it ends up at `target` (clamped to the last index).
    ///
    /// List-splice semantics: remove, then insert at the clamped index.
    pub fn move_block_to_position(&mut self, id: &BlockId, target: usize) -> Result<()> {
        let current = self.require_index(id)?;
        let target = target.min(self.doc.blocks.len() - 1);
        if current == target {
            return Ok(());
        }

        let block = self.doc.blocks.remove(current);
        self.doc.blocks.insert(target, block);
        self.bump();
        tracing::debug!(block = %id, from = current, to = target, "moved block");
        Ok(())
    }

    /// Drag-and-drop placement: put the block before visual slot `slot`.
    ///
    /// Slots are the gaps between blocks, `0..=len`. A block dragged
    /// downwards vacates its own slot first, so the target index is one less
    /// than the slot.
    pub fn drop_block_at_slot(&mut self, id: &BlockId, slot: usize) -> Result<()> {
        let current = self.require_index(id)?;
        let target = if current < slot { slot - 1 } else { slot };
        self.move_block_to_position(id, target)
    }

    /// Change a block's kind in place. Content is kept as-is.
    pub fn convert_kind(&mut self, id: &BlockId, kind: BlockKind) -> Result<()> {
        let idx = self.require_index(id)?;
        let block = &mut self.doc.blocks[idx];
        let old = block.kind;
        block.kind = kind;
        self.bump();
        tracing::debug!(block = %id, from = %old, to = %kind, "converted block");
        Ok(())
    }

    /// Insert a copy of a block (fresh id, not editing) right after it.
    pub fn duplicate_block(&mut self, id: &BlockId) -> Result<BlockId> {
        let idx = self.require_index(id)?;
        let source = &self.doc.blocks[idx];
        let copy = Block::new(source.kind, source.content.clone());
        let new_id = copy.id;
        self.doc.blocks.insert(idx + 1, copy);
        self.bump();
        tracing::debug!(source = %id, block = %new_id, "duplicated block");
        Ok(new_id)
    }

    /// Make `id` the only editing block, or clear editing with `None`.
    ///
    /// An id that is not in the document clears every editing flag.
    pub fn set_editing(&mut self, id: Option<&BlockId>) {
        if let Some(id) = id
            && !self.contains(id)
        {
            tracing::debug!(block = %id, "editing target missing, clearing editing state");
        }
        for block in &mut self.doc.blocks {
            block.is_editing = Some(&block.id) == id;
        }
        self.bump();
    }

    /// Replace the whole document with a snapshot taken from this store.
    pub(crate) fn restore(&mut self, doc: Document) {
        debug_assert!(!doc.blocks.is_empty(), "snapshots are never empty");
        self.doc = doc;
        self.bump();
    }
}
