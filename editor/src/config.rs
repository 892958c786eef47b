//! Editor configuration loaded from `sliceworks.toml`.
//!
//! ```toml
//! [editing]
//! write_lock_timeout_ms = 500
//! max_undo = 100
//!
//! [status]
//! tip_duration_ms = 1000
//! show_tips = true
//! ```
//!
//! Every section and field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub editing: EditingConfig,
    pub status: StatusConfig,
}

/// How edits reach the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Longest wait for write access before an edit is skipped.
    pub write_lock_timeout_ms: u64,
    /// Number of undo steps kept per document.
    pub max_undo: usize,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            write_lock_timeout_ms: 500,
            max_undo: 100,
        }
    }
}

impl EditingConfig {
    pub fn write_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.write_lock_timeout_ms)
    }
}

/// Status bar tips shown after edits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub tip_duration_ms: u64,
    pub show_tips: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            tip_duration_ms: 1000,
            show_tips: true,
        }
    }
}

impl StatusConfig {
    pub fn tip_duration(&self) -> Duration {
        Duration::from_millis(self.tip_duration_ms)
    }
}

/// Error type for [`load_config`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl EditorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Load an editor config from a TOML file.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    EditorConfig::from_toml_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the editor config, falling back to defaults if it can't be loaded.
pub fn load_or_default(path: &Path) -> EditorConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded config from {} (write timeout {}ms, {} undo steps)",
                path.display(),
                config.editing.write_lock_timeout_ms,
                config.editing.max_undo
            );
            config
        }
        Err(e) => {
            log::warn!("No editor config ({e}), using defaults");
            EditorConfig::default()
        }
    }
}
