//! Block and document types.
//!
//! A [`Document`] is a title plus an ordered list of [`Block`]s. Order is
//! significant and ids are unique. These are plain data: the invariants that
//! span blocks (at most one editing block, never empty) are maintained by the
//! store in `folio-editor`, not here.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::BlockId;

/// What a block *is* (content type).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Plain paragraph.
    #[default]
    #[strum(serialize = "text", serialize = "paragraph")]
    Text,
    /// Top-level heading.
    #[strum(serialize = "heading", serialize = "h1", serialize = "heading1")]
    Heading,
    #[strum(serialize = "heading2", serialize = "h2")]
    Heading2,
    #[strum(serialize = "heading3", serialize = "h3")]
    Heading3,
    /// Bulleted list, one item per line.
    #[strum(serialize = "list", serialize = "bullet")]
    List,
    Code,
    Quote,
    /// Todo list; content is a serialized [`Checklist`](crate::Checklist).
    #[strum(serialize = "checklist", serialize = "todo")]
    Checklist,
    /// Image; content is the image URL.
    Image,
}

impl BlockKind {
    /// Every kind, in menu order.
    pub const ALL: [BlockKind; 9] = [
        BlockKind::Text,
        BlockKind::Heading,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::List,
        BlockKind::Quote,
        BlockKind::Code,
        BlockKind::Checklist,
        BlockKind::Image,
    ];

    /// Parse from string (case-insensitive, accepts aliases like `h1`).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Heading => "heading",
            BlockKind::Heading2 => "heading2",
            BlockKind::Heading3 => "heading3",
            BlockKind::List => "list",
            BlockKind::Code => "code",
            BlockKind::Quote => "quote",
            BlockKind::Checklist => "checklist",
            BlockKind::Image => "image",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Text => "Text",
            BlockKind::Heading => "Heading 1",
            BlockKind::Heading2 => "Heading 2",
            BlockKind::Heading3 => "Heading 3",
            BlockKind::List => "Bulleted List",
            BlockKind::Code => "Code",
            BlockKind::Quote => "Quote",
            BlockKind::Checklist => "Checklist",
            BlockKind::Image => "Image",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single content unit of a document.
///
/// `id` is assigned at creation and immutable. `content` is free-form text;
/// checklist blocks hold a serialized checklist that is read back through
/// [`Checklist::parse`](crate::Checklist::parse).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_editing: bool,
}

/// Helper for `#[serde(skip_serializing_if)]` on bool fields.
fn is_false(v: &bool) -> bool {
    !v
}

impl Block {
    /// Create a block with a fresh id, not editing.
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            content: content.into(),
            is_editing: false,
        }
    }

    /// Create an empty block of `kind` with a fresh id.
    pub fn empty(kind: BlockKind) -> Self {
        Self::new(kind, String::new())
    }
}

/// Title plus ordered blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            blocks,
        }
    }

    /// The starter document a fresh editor opens with.
    pub fn welcome() -> Self {
        Self::new(
            "Untitled Notes",
            vec![
                Block::new(BlockKind::Heading, "Welcome to folio"),
                Block::new(
                    BlockKind::Text,
                    "Documents are built from blocks. Add, reorder, convert and \
                     delete them; structural changes can be undone.",
                ),
                Block::new(
                    BlockKind::Quote,
                    "Great design is not just what it looks like and feels like. \
                     Design is how it works.",
                ),
                Block::new(
                    BlockKind::List,
                    "• Undo and redo for structural edits\n\
                     • Debounced typing\n\
                     • Auto-save after a pause",
                ),
                Block::new(
                    BlockKind::Code,
                    "let mut session = EditorSession::new(Document::welcome(), config);\n\
                     session.add_block(None, BlockKind::Text);",
                ),
            ],
        )
    }

    /// Index of the block with `id`, if present.
    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    /// Block with `id`, if present.
    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// The block currently in editing mode, if any.
    pub fn editing(&self) -> Option<&Block> {
        self.blocks.iter().find(|b| b.is_editing)
    }
}
