//! Filesystem locations for ripbox
//!
//! This module provides:
//! - Application directories (config, default download base)
//! - Output-folder resolution under the download base
//! - Tilde expansion for user-supplied paths

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::utils::error::RipboxError;

/// Returns the default download base directory
/// - All platforms: the user Downloads dir, falling back to ~/Downloads
pub fn default_base_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/ripbox
/// - Windows: %APPDATA%\ripbox
/// - Linux: ~/.config/ripbox
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ripbox")
}

/// Expands a leading `~` to the user home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Expands `~` and anchors a relative path to the current directory, so the
/// download base is always absolute.
pub fn absolute_base(raw: &str) -> Result<PathBuf> {
    let expanded = expand_tilde(raw);
    if expanded.is_absolute() {
        return Ok(expanded);
    }

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(cwd.join(expanded))
}

/// Resolves a user-entered subfolder hint against the download base.
///
/// The hint must stay inside the base: absolute paths, `..` segments and
/// root/prefix components are rejected. An empty hint resolves to the base
/// itself. Purely lexical; nothing touches the filesystem here.
pub fn resolve_output_dir(base: &Path, hint: &str) -> Result<PathBuf, RipboxError> {
    let hint = hint.trim();
    if hint.is_empty() {
        return Ok(base.to_path_buf());
    }

    let relative = Path::new(hint);
    if relative.is_absolute() {
        return Err(RipboxError::InvalidOutputDir(format!(
            "'{}' is absolute; give a folder relative to {}",
            hint,
            base.display()
        )));
    }

    let mut resolved = base.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => {
                return Err(RipboxError::InvalidOutputDir(format!(
                    "'{}' escapes the download folder",
                    hint
                )));
            }
        }
    }

    Ok(resolved)
}

/// Resolves the hint and creates the directory (with parents). Idempotent.
pub async fn ensure_output_dir(base: &Path, hint: &str) -> Result<PathBuf> {
    let dir = resolve_output_dir(base, hint)?;

    fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create output folder {}", dir.display()))?;

    Ok(dir)
}
