//! Editor configuration.
//!
//! Loaded from RON; every field has a default so a partial file is fine:
//!
//! ```ron
//! (
//!     history_limit: 50,
//!     edit_debounce_ms: 250,
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Undo depth kept by the source editor.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
/// Idle time before buffered typing is committed.
pub const DEFAULT_EDIT_DEBOUNCE_MS: u64 = 300;
/// Idle time before an auto-save fires.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_edit_debounce_ms")]
    pub edit_debounce_ms: u64,
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_edit_debounce_ms() -> u64 {
    DEFAULT_EDIT_DEBOUNCE_MS
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            edit_debounce_ms: DEFAULT_EDIT_DEBOUNCE_MS,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

impl EditorConfig {
    /// Parse from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Load from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron(&text)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "loaded editor config");
        Ok(config)
    }

    pub fn edit_debounce(&self) -> Duration {
        Duration::from_millis(self.edit_debounce_ms)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

/// Error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
