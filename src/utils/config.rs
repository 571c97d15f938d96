//! Application configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::utils::paths;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Base download directory; subfolders are resolved under this
    pub base_dir: PathBuf,

    /// Format tokens applied when a selection is left empty (menu numbers)
    pub default_formats: String,

    /// Browser cookie stores probed in order when no cookie file exists
    pub browser_priority: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_dir: paths::default_base_dir(),
            default_formats: "1".to_string(),
            browser_priority: [
                "firefox", "chromium", "chrome", "brave", "edge", "opera", "vivaldi",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl AppSettings {
    /// Load settings from the given file, falling back to defaults when the
    /// file is missing or unreadable. Never aborts the run.
    pub async fn load(path: &Path) -> Self {
        match fs::read_to_string(path).await {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Persist settings as pretty JSON, creating parent directories as needed.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create settings directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, json)
            .await
            .context("Failed to write settings file")?;

        Ok(())
    }

    /// Default on-disk location: `<config dir>/ripbox/settings.json`.
    pub fn default_path() -> PathBuf {
        paths::config_dir().join("settings.json")
    }
}
