//! Checklist blocks: typed view over serialized todo content.
//!
//! Checklist block content is JSON of the form
//! `{"todos":[{"id":"…","text":"…","completed":false}]}`. Reading never fails:
//! malformed content degrades to an empty list (or, for the older one-line-
//! per-item format, to a migrated list) so a damaged block stays editable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from checklist item operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("todo not found: {0}")]
    TodoNotFound(String),
}

/// Direction for single-step reordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// One checklist item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Ordered todo items of a checklist block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub todos: Vec<Todo>,
}

const UNCHECKED: char = '☐';
const CHECKED: char = '☑';

impl Checklist {
    /// Parse block content, degrading to an empty list on malformed input.
    pub fn parse(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<Checklist>(content) {
            Ok(list) => return list,
            Err(e) => {
                if let Some(list) = Self::parse_legacy(content) {
                    tracing::debug!(items = list.todos.len(), "migrated line-based checklist");
                    return list;
                }
                tracing::warn!("unreadable checklist content, starting empty: {e}");
            }
        }

        Self::default()
    }

    /// Older format: one item per line, each prefixed with a checkbox marker.
    ///
    /// Only accepted when every non-blank line carries a marker.
    fn parse_legacy(content: &str) -> Option<Self> {
        let mut todos = Vec::new();
        for (index, line) in content.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let line = line.trim();
            let (completed, rest) = if let Some(rest) = line.strip_prefix(CHECKED) {
                (true, rest)
            } else if let Some(rest) = line.strip_prefix(UNCHECKED) {
                (false, rest)
            } else if let Some(rest) = line.strip_prefix("[x]").or_else(|| line.strip_prefix("[X]")) {
                (true, rest)
            } else if let Some(rest) = line.strip_prefix("[ ]") {
                (false, rest)
            } else {
                return None;
            };
            todos.push(Todo {
                id: format!("migrated_{index}"),
                text: rest.trim().to_string(),
                completed,
            });
        }
        Some(Self { todos })
    }

    /// Serialize back into block content.
    pub fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    fn position(&self, id: &str) -> Result<usize, ChecklistError> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ChecklistError::TodoNotFound(id.to_string()))
    }

    /// Append a new unchecked item and return its id.
    pub fn add_todo(&mut self, text: impl Into<String>) -> String {
        let id = format!("todo_{}", uuid::Uuid::new_v4().simple());
        self.todos.push(Todo {
            id: id.clone(),
            text: text.into().trim().to_string(),
            completed: false,
        });
        id
    }

    /// Flip an item's completion; returns the new state.
    pub fn toggle(&mut self, id: &str) -> Result<bool, ChecklistError> {
        let idx = self.position(id)?;
        let todo = &mut self.todos[idx];
        todo.completed = !todo.completed;
        Ok(todo.completed)
    }

    /// Replace an item's text. Blank text removes the item.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), ChecklistError> {
        let idx = self.position(id)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.todos.remove(idx);
        } else {
            self.todos[idx].text = trimmed.to_string();
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Todo, ChecklistError> {
        let idx = self.position(id)?;
        Ok(self.todos.remove(idx))
    }

    /// Swap an item with its neighbour. No-op at either end.
    pub fn move_todo(&mut self, id: &str, direction: Direction) -> Result<(), ChecklistError> {
        let idx = self.position(id)?;
        let target = match direction {
            Direction::Up if idx > 0 => idx - 1,
            Direction::Down if idx + 1 < self.todos.len() => idx + 1,
            _ => return Ok(()),
        };
        self.todos.swap(idx, target);
        Ok(())
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Completion as a rounded percentage; 0 for an empty list.
    pub fn progress_percent(&self) -> u8 {
        if self.todos.is_empty() {
            return 0;
        }
        let pct = (self.completed_count() as f64 / self.todos.len() as f64) * 100.0;
        pct.round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Checklist {
        let mut list = Checklist::default();
        list.add_todo("write tests");
        list.add_todo("ship");
        list.add_todo("celebrate");
        list
    }

    #[test]
    fn test_garbage_parses_to_empty() {
        let list = Checklist::parse("garbage");
        assert!(list.is_empty());
    }

    #[test]
    fn test_empty_and_whitespace_parse_to_empty() {
        assert!(Checklist::parse("").is_empty());
        assert!(Checklist::parse("  \n ").is_empty());
    }

    #[test]
    fn test_json_missing_todos_is_empty() {
        assert!(Checklist::parse(r#"{"items": []}"#).is_empty());
        assert!(Checklist::parse(r#"{"todos": "nope"}"#).is_empty());
    }

    #[test]
    fn test_content_roundtrip() {
        let mut list = sample();
        let first = list.todos[0].id.clone();
        list.toggle(&first).unwrap();

        let parsed = Checklist::parse(&list.to_content());
        assert_eq!(parsed, list);
    }

    #[test]
    fn test_content_wire_format() {
        let list = Checklist {
            todos: vec![Todo {
                id: "todo_1".into(),
                text: "pack".into(),
                completed: true,
            }],
        };
        assert_eq!(
            list.to_content(),
            r#"{"todos":[{"id":"todo_1","text":"pack","completed":true}]}"#
        );
        assert_eq!(Checklist::default().to_content(), r#"{"todos":[]}"#);
    }

    #[test]
    fn test_legacy_lines_migrate() {
        let list = Checklist::parse("☐ buy milk\n☑ pay rent\n\n[x] call mom\n[ ] nap");
        let texts: Vec<_> = list.todos.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["buy milk", "pay rent", "call mom", "nap"]);
        let done: Vec<_> = list.todos.iter().map(|t| t.completed).collect();
        assert_eq!(done, [false, true, true, false]);
        assert_eq!(list.todos[2].id, "migrated_2");
    }

    #[test]
    fn test_legacy_requires_markers_on_every_line() {
        assert!(Checklist::parse("☐ buy milk\njust a note").is_empty());
    }

    #[test]
    fn test_toggle_and_progress() {
        let mut list = sample();
        assert_eq!(list.progress_percent(), 0);

        let id = list.todos[1].id.clone();
        assert_eq!(list.toggle(&id), Ok(true));
        assert_eq!(list.completed_count(), 1);
        assert_eq!(list.progress_percent(), 33);

        assert_eq!(list.toggle(&id), Ok(false));
        assert_eq!(Checklist::default().progress_percent(), 0);
    }

    #[test]
    fn test_set_text_trims_and_blank_removes() {
        let mut list = sample();
        let id = list.todos[0].id.clone();

        list.set_text(&id, "  rewrite tests  ").unwrap();
        assert_eq!(list.get(&id).map(|t| t.text.as_str()), Some("rewrite tests"));

        list.set_text(&id, "   ").unwrap();
        assert!(list.get(&id).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_unknown_todo_errors() {
        let mut list = sample();
        assert_eq!(
            list.toggle("todo_missing"),
            Err(ChecklistError::TodoNotFound("todo_missing".into()))
        );
        assert!(list.remove("todo_missing").is_err());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_move_todo_boundaries() {
        let mut list = sample();
        let ids: Vec<String> = list.todos.iter().map(|t| t.id.clone()).collect();

        list.move_todo(&ids[0], Direction::Up).unwrap();
        assert_eq!(list.todos[0].id, ids[0]);

        list.move_todo(&ids[0], Direction::Down).unwrap();
        assert_eq!(list.todos[1].id, ids[0]);

        list.move_todo(&ids[2], Direction::Down).unwrap();
        assert_eq!(list.todos[2].id, ids[2]);
    }

    #[test]
    fn test_added_ids_are_unique() {
        let mut list = Checklist::default();
        let a = list.add_todo("a");
        let b = list.add_todo("b");
        assert_ne!(a, b);
        assert!(a.starts_with("todo_"));
    }
}
