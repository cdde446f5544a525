//! Editor session: one open document and everything that edits it.
//!
//! [`EditorSession`] is the object a rendering layer talks to. It owns the
//! [`BlockStore`], the undo [`History`], the typing [`EditBuffer`] and the
//! [`AutoSave`] timer, and applies the history policy:
//!
//! - structural changes (add, delete, convert, duplicate, converting paste)
//!   take a snapshot first;
//! - content edits, title edits, moves and editing-state changes do not, so
//!   typing never floods the undo stack;
//! - pending typed text is flushed before any snapshot, undo or redo.
//!
//! Time comes only from the caller. Operations without an `Instant` are
//! stamped with the latest time seen by [`EditorSession::tick`] or
//! [`EditorSession::edit_content`], or by the next tick if none has been
//! seen yet.
//!
//! There is no ambient editor state: callers own their sessions. For use
//! across threads wrap one in a [`SharedSession`], a single lock per
//! document.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use folio_types::{Block, BlockId, BlockKind, Checklist, ChecklistError, Direction, Document};

use crate::autosave::{AutoSave, SaveError, SaveSink, SavedState};
use crate::block_store::BlockStore;
use crate::config::EditorConfig;
use crate::debounce::EditBuffer;
use crate::history::History;
use crate::paste::suggest_kind;
use crate::{EditorError, Result};

/// A session guarded by one mutual-exclusion boundary.
pub type SharedSession = Arc<Mutex<EditorSession>>;

/// What a [`EditorSession::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Buffered edits committed to the store.
    pub committed: usize,
    /// Whether an auto-save was written.
    pub saved: bool,
}

#[derive(Debug)]
pub struct EditorSession {
    store: BlockStore,
    history: History,
    edits: EditBuffer,
    autosave: AutoSave,
    config: EditorConfig,
    /// Latest caller-supplied time.
    clock: Option<Instant>,
}

impl EditorSession {
    /// Open `doc` for editing. Fails only on duplicate block ids.
    pub fn new(doc: Document, config: EditorConfig) -> Result<Self> {
        Ok(Self {
            store: BlockStore::from_document(doc)?,
            history: History::new(config.history_limit),
            edits: EditBuffer::new(config.edit_debounce()),
            autosave: AutoSave::new(config.autosave_delay()),
            config,
            clock: None,
        })
    }

    /// A blank document with a single empty text block.
    pub fn blank(title: impl Into<String>, config: EditorConfig) -> Self {
        Self {
            store: BlockStore::new(title),
            history: History::new(config.history_limit),
            edits: EditBuffer::new(config.edit_debounce()),
            autosave: AutoSave::new(config.autosave_delay()),
            config,
            clock: None,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn blocks(&self) -> &[Block] {
        self.store.blocks()
    }

    pub fn title(&self) -> &str {
        self.store.title()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn edits(&self) -> &EditBuffer {
        &self.edits
    }

    pub fn autosave(&self) -> &AutoSave {
        &self.autosave
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.edits.next_deadline(), self.autosave.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn require(&self, id: &BlockId) -> Result<()> {
        if self.store.contains(id) {
            Ok(())
        } else {
            Err(EditorError::BlockNotFound(*id))
        }
    }

    fn advance_clock(&mut self, now: Instant) {
        self.clock = Some(self.clock.map_or(now, |seen| seen.max(now)));
    }

    fn touch(&mut self) {
        match self.clock {
            Some(now) => self.autosave.mark_dirty(now),
            None => self.autosave.mark_changed(),
        }
    }

    fn commit(&mut self, edits: Vec<(BlockId, String)>) -> usize {
        let mut committed = 0;
        for (id, content) in edits {
            match self.store.update_content(&id, content) {
                Ok(()) => committed += 1,
                Err(e) => tracing::debug!("dropping buffered edit: {e}"),
            }
        }
        committed
    }

    /// Commit all buffered typing now.
    pub fn flush_edits(&mut self) -> usize {
        let pending = self.edits.flush_all();
        let committed = self.commit(pending);
        if committed > 0 {
            self.touch();
        }
        committed
    }

    /// Flush typing, then record the pre-change state.
    fn checkpoint(&mut self) {
        self.flush_edits();
        self.history.snapshot(self.store.document());
    }

    // =========================================================================
    // Structural operations (snapshotted)
    // =========================================================================

    /// Add an empty block after `after` (or at the end) and start editing it.
    pub fn add_block(&mut self, after: Option<&BlockId>, kind: BlockKind) -> BlockId {
        self.checkpoint();
        let id = self.store.add_block(after, kind);
        self.touch();
        id
    }

    /// Delete a block. Deleting the last remaining block changes nothing and
    /// records no history.
    pub fn delete_block(&mut self, id: &BlockId) -> Result<()> {
        self.require(id)?;
        if self.store.len() <= 1 {
            tracing::debug!(block = %id, "refusing to delete the last block");
            return Ok(());
        }
        self.checkpoint();
        self.store.delete_block(id)?;
        self.touch();
        Ok(())
    }

    /// Change a block's kind, keeping its content.
    ///
    /// Callers that want a fresh block after converting follow up with
    /// [`update_content`](Self::update_content).
    pub fn convert_kind(&mut self, id: &BlockId, kind: BlockKind) -> Result<()> {
        self.require(id)?;
        self.checkpoint();
        self.store.convert_kind(id, kind)?;
        self.touch();
        Ok(())
    }

    pub fn duplicate_block(&mut self, id: &BlockId) -> Result<BlockId> {
        self.require(id)?;
        self.checkpoint();
        let new_id = self.store.duplicate_block(id)?;
        self.touch();
        Ok(new_id)
    }

    /// Put pasted text into a block, converting it first when the text
    /// looks like another kind. Returns the block's resulting kind.
    pub fn paste(&mut self, id: &BlockId, text: impl Into<String>) -> Result<BlockKind> {
        self.require(id)?;
        let text = text.into();
        let suggested = suggest_kind(&text);
        if suggested != BlockKind::Text {
            self.convert_kind(id, suggested)?;
        }
        self.update_content(id, text)?;
        Ok(self.store.block(id).map(|b| b.kind).unwrap_or(suggested))
    }

    // =========================================================================
    // Unsnapshotted operations
    // =========================================================================

    /// Commit content immediately, superseding any buffered typing.
    pub fn update_content(&mut self, id: &BlockId, content: impl Into<String>) -> Result<()> {
        self.store.update_content(id, content)?;
        self.edits.discard(id);
        self.touch();
        Ok(())
    }

    /// Buffer typed content; it is committed by [`tick`](Self::tick) once
    /// input pauses for the debounce interval.
    pub fn edit_content(&mut self, id: &BlockId, content: impl Into<String>, now: Instant) -> Result<()> {
        self.require(id)?;
        self.advance_clock(now);
        self.edits.record(*id, content, now);
        Ok(())
    }

    /// Content a renderer should show: buffered text if any, else committed.
    pub fn visible_content(&self, id: &BlockId) -> Option<&str> {
        self.edits
            .pending_content(id)
            .or_else(|| self.store.block(id).map(|b| b.content.as_str()))
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.store.set_title(title);
        self.touch();
    }

    pub fn move_block(&mut self, id: &BlockId, direction: Direction) -> Result<()> {
        self.store.move_block(id, direction)?;
        self.touch();
        Ok(())
    }

    pub fn move_block_to_position(&mut self, id: &BlockId, target: usize) -> Result<()> {
        self.store.move_block_to_position(id, target)?;
        self.touch();
        Ok(())
    }

    pub fn drop_block_at_slot(&mut self, id: &BlockId, slot: usize) -> Result<()> {
        self.store.drop_block_at_slot(id, slot)?;
        self.touch();
        Ok(())
    }

    /// Switch the editing block. Leaving a block commits its typing.
    pub fn set_editing(&mut self, id: Option<&BlockId>) {
        if let Some(current) = self.store.editing_id()
            && Some(&current) != id
            && let Some(content) = self.edits.pending_content(&current).map(str::to_string)
        {
            self.edits.discard(&current);
            self.commit(vec![(current, content)]);
            self.touch();
        }
        self.store.set_editing(id);
    }

    // =========================================================================
    // Checklists
    // =========================================================================

    /// Read a block's content as a checklist (malformed content reads empty).
    pub fn checklist(&self, id: &BlockId) -> Result<Checklist> {
        let content = self.visible_content(id).ok_or(EditorError::BlockNotFound(*id))?;
        Ok(Checklist::parse(content))
    }

    /// Edit a checklist block through its typed view and write it back.
    pub fn update_checklist<R>(
        &mut self,
        id: &BlockId,
        f: impl FnOnce(&mut Checklist) -> std::result::Result<R, ChecklistError>,
    ) -> Result<R> {
        let mut list = self.checklist(id)?;
        let out = f(&mut list)?;
        self.update_content(id, list.to_content())?;
        Ok(out)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Restore the previous snapshot. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        self.flush_edits();
        let Some(previous) = self.history.undo(self.store.document()) else {
            return false;
        };
        self.store.restore(previous);
        self.touch();
        tracing::debug!(undo = self.history.undo_depth(), redo = self.history.redo_depth(), "undo");
        true
    }

    /// Re-apply the most recently undone state. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        self.flush_edits();
        let Some(next) = self.history.redo(self.store.document()) else {
            return false;
        };
        self.store.restore(next);
        self.touch();
        tracing::debug!(undo = self.history.undo_depth(), redo = self.history.redo_depth(), "redo");
        true
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Advance timers: commit idle typing, then auto-save if due.
    ///
    /// A failing sink is logged and retried on a later tick.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn SaveSink) -> TickReport {
        self.advance_clock(now);
        self.autosave.observe(now);

        let due = self.edits.take_due(now);
        let committed = self.commit(due);
        if committed > 0 {
            self.autosave.mark_dirty(now);
        }

        let mut saved = false;
        if self.autosave.is_due(now) {
            match self.save_now(sink) {
                Ok(()) => saved = true,
                Err(e) => tracing::warn!("auto-save failed: {e}"),
            }
        }

        TickReport { committed, saved }
    }

    /// Flush typing and save immediately.
    pub fn save_now(&mut self, sink: &mut dyn SaveSink) -> std::result::Result<(), SaveError> {
        self.flush_edits();
        let state = SavedState::capture(self.store.document(), folio_types::now_millis());
        sink.save(&state)?;
        self.autosave.mark_saved(state.saved_at);
        tracing::debug!(saved_at = state.saved_at, "document saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::autosave::MemorySink;

    fn session_abc() -> (EditorSession, BlockId, BlockId, BlockId) {
        let a = Block::new(BlockKind::Heading, "A");
        let b = Block::new(BlockKind::Text, "B");
        let c = Block::new(BlockKind::Text, "C");
        let (ia, ib, ic) = (a.id, b.id, c.id);
        let session =
            EditorSession::new(Document::new("Doc", vec![a, b, c]), EditorConfig::default()).unwrap();
        (session, ia, ib, ic)
    }

    fn ids(session: &EditorSession) -> Vec<BlockId> {
        session.blocks().iter().map(|b| b.id).collect()
    }

    struct FailingSink;

    impl SaveSink for FailingSink {
        fn save(&mut self, _state: &SavedState) -> std::result::Result<(), SaveError> {
            Err(SaveError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_structural_ops_are_undoable() {
        let (mut session, a, b, c) = session_abc();
        let before = session.document().clone();

        let new = session.add_block(Some(&a), BlockKind::Text);
        assert_eq!(ids(&session), vec![a, new, b, c]);
        let after = session.document().clone();

        assert!(session.undo());
        assert_eq!(session.document(), &before);
        assert!(session.redo());
        assert_eq!(session.document(), &after);
    }

    #[test]
    fn test_content_edits_do_not_snapshot() {
        let (mut session, _, b, _) = session_abc();
        session.update_content(&b, "typed").unwrap();
        session.set_title("Renamed");
        session.move_block(&b, Direction::Up).unwrap();
        assert!(!session.can_undo());
    }

    #[test]
    fn test_delete_last_block_records_nothing() {
        let mut session = EditorSession::blank("", EditorConfig::default());
        let only = session.blocks()[0].id;
        session.delete_block(&only).unwrap();
        assert_eq!(session.blocks().len(), 1);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_missing_ids_leave_history_alone() {
        let (mut session, _, _, _) = session_abc();
        let ghost = BlockId::new();
        assert!(session.convert_kind(&ghost, BlockKind::Code).is_err());
        assert!(session.delete_block(&ghost).is_err());
        assert!(session.duplicate_block(&ghost).is_err());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_convert_then_clear_is_two_steps() {
        let (mut session, _, b, _) = session_abc();
        session.convert_kind(&b, BlockKind::Checklist).unwrap();
        assert_eq!(session.store().block(&b).unwrap().content, "B");

        session.update_content(&b, "").unwrap();
        assert!(session.checklist(&b).unwrap().is_empty());

        assert!(session.undo());
        let restored = session.store().block(&b).unwrap();
        assert_eq!(restored.kind, BlockKind::Text);
        assert_eq!(restored.content, "B");
    }

    #[test]
    fn test_paste_converts_and_fills() {
        let (mut session, _, b, c) = session_abc();
        assert_eq!(session.paste(&b, "# Big").unwrap(), BlockKind::Heading);
        assert_eq!(session.store().block(&b).unwrap().content, "# Big");
        assert!(session.can_undo());

        assert_eq!(session.paste(&c, "plain").unwrap(), BlockKind::Text);
        assert_eq!(session.history().undo_depth(), 1);
    }

    #[test]
    fn test_debounced_typing_commits_after_idle() {
        let (mut session, _, b, _) = session_abc();
        let t0 = Instant::now();
        let mut sink = MemorySink::new();

        session.edit_content(&b, "H", t0).unwrap();
        session.edit_content(&b, "Hello", t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(session.store().block(&b).unwrap().content, "B");
        assert_eq!(session.visible_content(&b), Some("Hello"));

        let report = session.tick(t0 + Duration::from_millis(200), &mut sink);
        assert_eq!(report.committed, 0);

        let report = session.tick(t0 + Duration::from_millis(400), &mut sink);
        assert_eq!(report.committed, 1);
        assert_eq!(session.store().block(&b).unwrap().content, "Hello");
        assert!(!session.can_undo());
    }

    #[test]
    fn test_snapshot_includes_pending_typing() {
        let (mut session, a, b, _) = session_abc();
        session.edit_content(&b, "typed", Instant::now()).unwrap();
        session.add_block(Some(&a), BlockKind::Text);

        assert!(session.undo());
        assert_eq!(session.store().block(&b).unwrap().content, "typed");
        assert!(session.edits().is_empty());
    }

    #[test]
    fn test_leaving_block_commits_typing() {
        let (mut session, a, b, _) = session_abc();
        session.set_editing(Some(&b));
        session.edit_content(&b, "draft", Instant::now()).unwrap();

        session.set_editing(Some(&a));
        assert_eq!(session.store().block(&b).unwrap().content, "draft");
        assert_eq!(session.store().editing_id(), Some(a));
    }

    #[test]
    fn test_undo_delete_restores_typing() {
        let (mut session, _, b, _) = session_abc();
        session.edit_content(&b, "typed before delete", Instant::now()).unwrap();
        session.delete_block(&b).unwrap();
        assert!(session.edits().is_empty());
        assert!(!session.store().contains(&b));

        assert!(session.undo());
        assert_eq!(session.store().block(&b).unwrap().content, "typed before delete");
    }

    #[test]
    fn test_autosave_fires_after_delay() {
        let (mut session, _, b, _) = session_abc();
        let mut sink = MemorySink::new();
        let t0 = Instant::now();
        assert!(!session.tick(t0, &mut sink).saved);
        session.update_content(&b, "changed").unwrap();

        assert!(!session.tick(t0 + Duration::from_secs(1), &mut sink).saved);

        let later = t0 + Duration::from_secs(2);
        assert!(session.tick(later, &mut sink).saved);
        let saved = sink.last().unwrap();
        assert_eq!(saved.title, "Doc");
        assert_eq!(saved.blocks[1].content, "changed");
        assert!(session.autosave().last_saved().is_some());

        // Nothing changed since, so no second save.
        assert!(!session.tick(later + Duration::from_secs(10), &mut sink).saved);
        assert_eq!(sink.saves.len(), 1);
    }

    #[test]
    fn test_untimed_change_is_stamped_by_next_tick() {
        let (mut session, _, b, _) = session_abc();
        let mut sink = MemorySink::new();
        let t0 = Instant::now();
        let delay = session.config().autosave_delay();

        session.convert_kind(&b, BlockKind::Quote).unwrap();
        assert!(session.autosave().is_dirty());
        assert!(session.next_deadline().is_none());

        assert!(!session.tick(t0, &mut sink).saved);
        assert_eq!(session.next_deadline(), Some(t0 + delay));
        assert!(!session.tick(t0 + delay - Duration::from_millis(1), &mut sink).saved);
        assert!(session.tick(t0 + delay, &mut sink).saved);
    }

    #[test]
    fn test_autosave_follows_caller_clock() {
        let (mut session, a, b, _) = session_abc();
        let mut sink = MemorySink::new();
        let t0 = Instant::now();
        let delay = session.config().autosave_delay();

        // Caller time runs far ahead of the wall clock.
        let t1 = t0 + Duration::from_secs(3600);
        session.edit_content(&b, "draft", t1).unwrap();
        session.set_title("Ahead");
        session.move_block(&a, Direction::Down).unwrap();
        assert_eq!(session.autosave().deadline(), Some(t1 + delay));

        // Committing the typing restarts the quiet period.
        let t2 = t1 + session.config().edit_debounce();
        let report = session.tick(t2, &mut sink);
        assert_eq!(report.committed, 1);
        assert!(!report.saved);

        assert!(!session.tick(t2 + delay - Duration::from_millis(1), &mut sink).saved);
        assert!(session.tick(t2 + delay, &mut sink).saved);
        let saved = sink.last().unwrap();
        assert_eq!(saved.title, "Ahead");
        assert_eq!(saved.blocks[0].content, "draft");
    }

    #[test]
    fn test_failed_autosave_stays_dirty() {
        let (mut session, _, b, _) = session_abc();
        let t0 = Instant::now();
        session.tick(t0, &mut MemorySink::new());
        session.update_content(&b, "changed").unwrap();

        let later = t0 + Duration::from_secs(3);
        assert!(!session.tick(later, &mut FailingSink).saved);
        assert!(session.autosave().is_dirty());

        let mut sink = MemorySink::new();
        assert!(session.tick(later, &mut sink).saved);
    }

    #[test]
    fn test_save_now_flushes_typing() {
        let (mut session, _, b, _) = session_abc();
        let mut sink = MemorySink::new();
        session.edit_content(&b, "unsaved", Instant::now()).unwrap();
        session.save_now(&mut sink).unwrap();
        assert_eq!(sink.last().unwrap().blocks[1].content, "unsaved");
    }

    #[test]
    fn test_checklist_editing() {
        let (mut session, _, b, _) = session_abc();
        session.convert_kind(&b, BlockKind::Checklist).unwrap();
        session.update_content(&b, "garbage").unwrap();
        assert!(session.checklist(&b).unwrap().is_empty());

        let todo = session.update_checklist(&b, |list| Ok(list.add_todo("write docs"))).unwrap();
        session.update_checklist(&b, |list| list.toggle(&todo)).unwrap();

        let list = session.checklist(&b).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.completed_count(), 1);

        let err = session.update_checklist(&b, |list| list.toggle("todo_nope")).unwrap_err();
        assert!(matches!(err, EditorError::Checklist(ChecklistError::TodoNotFound(_))));
    }

    #[test]
    fn test_undo_restores_title() {
        let (mut session, a, _, _) = session_abc();
        session.set_title("Before");
        session.duplicate_block(&a).unwrap();
        session.set_title("After");
        assert!(session.undo());
        assert_eq!(session.title(), "Before");
    }

    #[test]
    fn test_next_deadline_tracks_earliest_timer() {
        let (mut session, _, b, _) = session_abc();
        assert!(session.next_deadline().is_none());

        let t0 = Instant::now();
        session.edit_content(&b, "x", t0).unwrap();
        assert_eq!(session.next_deadline(), Some(t0 + session.config().edit_debounce()));
    }

    #[test]
    fn test_shared_session_across_threads() {
        let shared = EditorSession::blank("shared", EditorConfig::default()).into_shared();
        let first = shared.lock().blocks()[0].id;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        shared.lock().add_block(Some(&first), BlockKind::Text);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let session = shared.lock();
        assert_eq!(session.blocks().len(), 21);
        assert_eq!(session.blocks().iter().filter(|b| b.is_editing).count(), 1);
    }
}
