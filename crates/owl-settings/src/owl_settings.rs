//! Owl Settings - workbench configuration
//!
//! Settings live in a JSON file under the platform config directory.
//! Every field has a default, so a partial or missing file is fine.

pub mod settings_file;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchSettings {
    pub editor: EditorSettings,
    pub logging: LoggingSettings,
}

/// Editor and query execution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Rows requested for the first page of a result
    pub page_size: u64,
    /// Ask the server for the total row count along with the first page
    pub with_total_count: bool,
    /// Pause after the last edit before a saved file is persisted
    pub autosave_delay_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            page_size: 25,
            with_total_count: true,
            autosave_delay_ms: 200,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
    /// Pretty console output
    pub console: bool,
    /// Daily-rolling JSON log file
    pub json_file: bool,
    /// Override for the log directory
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            default_filter: "info,owl_core=debug,owl_workbench=debug,owl_templates=debug"
                .to_string(),
            console: true,
            json_file: false,
            log_dir: None,
        }
    }
}

impl LoggingSettings {
    /// Directory log files are written to
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(settings_file::log_dir)
    }
}

impl WorkbenchSettings {
    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        let settings = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))?;

        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load settings from the default location
    pub fn load_default() -> Result<Self> {
        Self::load(&settings_file::settings_file()?)
    }

    /// Write settings to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write settings file: {:?}", path))?;
        tracing::info!(path = %path.display(), "settings saved");
        Ok(())
    }
}
