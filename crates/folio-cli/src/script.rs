//! Edit scripts: one command per line, replayed against an editor session.
//!
//! ```text
//! # comments and blank lines are skipped
//! title Meeting notes
//! add 0 heading2
//! edit 1 Agenda
//! move 3 0
//! undo
//! ```
//!
//! Blocks are addressed by their 0-based position at the time the line runs.

use std::time::Instant;

use thiserror::Error;

use folio_editor::{BlockId, BlockKind, Direction, EditorError, EditorSession, SaveSink};

/// Where `add` puts the new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    After(usize),
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { anchor: Anchor, kind: BlockKind },
    Edit { index: usize, text: String },
    Paste { index: usize, text: String },
    Delete { index: usize },
    Move { index: usize, direction: Direction },
    MoveTo { index: usize, target: usize },
    Convert { index: usize, kind: BlockKind },
    Duplicate { index: usize },
    Focus { index: Option<usize> },
    Title { text: String },
    Undo,
    Redo,
    TodoAdd { index: usize, text: String },
    TodoToggle { index: usize, item: usize },
    Save,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: missing {what}")]
    Missing { line: usize, what: &'static str },
    #[error("line {line}: '{value}' is not a valid {what}")]
    Invalid {
        line: usize,
        value: String,
        what: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("line {line}: no block at index {index}")]
    NoSuchBlock { line: usize, index: usize },
    #[error("line {line}: no todo at index {item}")]
    NoSuchTodo { line: usize, item: usize },
    #[error("line {line}: {source}")]
    Editor { line: usize, source: EditorError },
    #[error("line {line}: save failed: {source}")]
    Save {
        line: usize,
        source: folio_editor::SaveError,
    },
}

/// A parsed command plus the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub command: Command,
}

struct Args<'a> {
    line: usize,
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn word(&mut self, what: &'static str) -> Result<&'a str, ParseError> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            return Err(ParseError::Missing { line: self.line, what });
        }
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (word, rest) = trimmed.split_at(end);
        self.rest = rest;
        Ok(word)
    }

    fn index(&mut self, what: &'static str) -> Result<usize, ParseError> {
        let word = self.word(what)?;
        word.parse().map_err(|_| ParseError::Invalid {
            line: self.line,
            value: word.to_string(),
            what,
        })
    }

    fn kind(&mut self) -> Result<BlockKind, ParseError> {
        let word = self.word("block kind")?;
        parse_kind(word, self.line)
    }

    /// Everything left on the line; `\n` escapes become newlines.
    fn text(&mut self) -> String {
        let text = self.rest.trim_start().replace("\\n", "\n");
        self.rest = "";
        text
    }
}

fn parse_kind(word: &str, line: usize) -> Result<BlockKind, ParseError> {
    BlockKind::from_str(word).ok_or_else(|| ParseError::Invalid {
        line,
        value: word.to_string(),
        what: "block kind",
    })
}

/// Parse a whole script.
pub fn parse(source: &str) -> Result<Vec<Step>, ParseError> {
    let mut steps = Vec::new();
    for (n, raw) in source.lines().enumerate() {
        let line = n + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (name, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
        let mut args = Args { line, rest };

        let command = match name {
            "add" => {
                let anchor = if args.rest.trim().is_empty() {
                    Anchor::End
                } else {
                    match args.word("anchor")? {
                        "end" => Anchor::End,
                        word => Anchor::After(word.parse().map_err(|_| ParseError::Invalid {
                            line,
                            value: word.to_string(),
                            what: "anchor",
                        })?),
                    }
                };
                let kind = if args.rest.trim().is_empty() {
                    BlockKind::Text
                } else {
                    args.kind()?
                };
                Command::Add { anchor, kind }
            }
            "edit" => Command::Edit { index: args.index("block index")?, text: args.text() },
            "paste" => Command::Paste { index: args.index("block index")?, text: args.text() },
            "delete" => Command::Delete { index: args.index("block index")? },
            "up" => Command::Move { index: args.index("block index")?, direction: Direction::Up },
            "down" => Command::Move { index: args.index("block index")?, direction: Direction::Down },
            "move" => Command::MoveTo {
                index: args.index("block index")?,
                target: args.index("target index")?,
            },
            "convert" => Command::Convert { index: args.index("block index")?, kind: args.kind()? },
            "duplicate" => Command::Duplicate { index: args.index("block index")? },
            "focus" => match args.word("block index")? {
                "none" => Command::Focus { index: None },
                word => Command::Focus {
                    index: Some(word.parse().map_err(|_| ParseError::Invalid {
                        line,
                        value: word.to_string(),
                        what: "block index",
                    })?),
                },
            },
            "title" => Command::Title { text: args.text() },
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "todo-add" => Command::TodoAdd { index: args.index("block index")?, text: args.text() },
            "todo-toggle" => Command::TodoToggle {
                index: args.index("block index")?,
                item: args.index("todo index")?,
            },
            "save" => Command::Save,
            other => {
                return Err(ParseError::UnknownCommand {
                    line,
                    command: other.to_string(),
                });
            }
        };
        steps.push(Step { line, command });
    }
    Ok(steps)
}

fn block_at(session: &EditorSession, line: usize, index: usize) -> Result<BlockId, RunError> {
    session
        .blocks()
        .get(index)
        .map(|b| b.id)
        .ok_or(RunError::NoSuchBlock { line, index })
}

/// Replay steps in order, stopping at the first failure.
pub fn run(steps: &[Step], session: &mut EditorSession, sink: &mut dyn SaveSink) -> Result<(), RunError> {
    for step in steps {
        let line = step.line;
        let editor = |source| RunError::Editor { line, source };
        tracing::debug!(line, command = ?step.command, "running");

        match &step.command {
            Command::Add { anchor, kind } => {
                let after = match anchor {
                    Anchor::After(index) => Some(block_at(session, line, *index)?),
                    Anchor::End => None,
                };
                session.add_block(after.as_ref(), *kind);
            }
            Command::Edit { index, text } => {
                let id = block_at(session, line, *index)?;
                session.edit_content(&id, text.clone(), Instant::now()).map_err(editor)?;
            }
            Command::Paste { index, text } => {
                let id = block_at(session, line, *index)?;
                session.paste(&id, text.clone()).map_err(editor)?;
            }
            Command::Delete { index } => {
                let id = block_at(session, line, *index)?;
                session.delete_block(&id).map_err(editor)?;
            }
            Command::Move { index, direction } => {
                let id = block_at(session, line, *index)?;
                session.move_block(&id, *direction).map_err(editor)?;
            }
            Command::MoveTo { index, target } => {
                let id = block_at(session, line, *index)?;
                session.move_block_to_position(&id, *target).map_err(editor)?;
            }
            Command::Convert { index, kind } => {
                let id = block_at(session, line, *index)?;
                session.convert_kind(&id, *kind).map_err(editor)?;
            }
            Command::Duplicate { index } => {
                let id = block_at(session, line, *index)?;
                session.duplicate_block(&id).map_err(editor)?;
            }
            Command::Focus { index } => {
                let id = index.map(|i| block_at(session, line, i)).transpose()?;
                session.set_editing(id.as_ref());
            }
            Command::Title { text } => session.set_title(text.clone()),
            Command::Undo => {
                if !session.undo() {
                    tracing::info!(line, "nothing to undo");
                }
            }
            Command::Redo => {
                if !session.redo() {
                    tracing::info!(line, "nothing to redo");
                }
            }
            Command::TodoAdd { index, text } => {
                let id = block_at(session, line, *index)?;
                let text = text.clone();
                session.update_checklist(&id, |list| Ok(list.add_todo(text))).map_err(editor)?;
            }
            Command::TodoToggle { index, item } => {
                let id = block_at(session, line, *index)?;
                let list = session.checklist(&id).map_err(editor)?;
                let todo = list
                    .todos
                    .get(*item)
                    .map(|t| t.id.clone())
                    .ok_or(RunError::NoSuchTodo { line, item: *item })?;
                session.update_checklist(&id, |list| list.toggle(&todo)).map_err(editor)?;
            }
            Command::Save => session
                .save_now(sink)
                .map_err(|source| RunError::Save { line, source })?,
        }
    }
    session.flush_edits();
    Ok(())
}
