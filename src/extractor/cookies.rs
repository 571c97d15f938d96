//! Cookie source resolution
//!
//! Some sources only work with session cookies. The source is resolved once
//! per run: an explicit cookies file wins, then a cookies.txt in the config
//! directory, then the first browser from the priority list whose profile
//! directory exists on this system.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where yt-dlp should take cookies from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    /// A Netscape-format cookies file passed via `--cookies`
    File(PathBuf),
    /// A browser profile passed via `--cookies-from-browser`
    Browser(String),
    /// Proceed without cookies
    None,
}

impl fmt::Display for CookieSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieSource::File(path) => write!(f, "cookies file {}", path.display()),
            CookieSource::Browser(name) => write!(f, "{} browser profile", name),
            CookieSource::None => f.write_str("no cookies"),
        }
    }
}

/// Resolves the cookie source for this run.
///
/// `explicit` is the `--cookies` flag, `fallback_file` the well-known
/// cookies.txt location. Probe failures are treated as absence.
pub fn resolve(
    explicit: Option<&Path>,
    fallback_file: &Path,
    browser_priority: &[String],
) -> CookieSource {
    if let Some(path) = explicit {
        if path.is_file() {
            return CookieSource::File(path.to_path_buf());
        }
        warn!(
            "Cookies file {} does not exist, trying other sources",
            path.display()
        );
    }

    if fallback_file.is_file() {
        return CookieSource::File(fallback_file.to_path_buf());
    }

    for browser in browser_priority {
        for dir in profile_dirs(browser) {
            if dir.is_dir() {
                debug!("Found {} profile at {}", browser, dir.display());
                return CookieSource::Browser(browser.clone());
            }
        }
    }

    CookieSource::None
}

/// Candidate profile directories per browser, across platforms.
fn profile_dirs(browser: &str) -> Vec<PathBuf> {
    let home = dirs::home_dir();
    let config = dirs::config_dir();
    let local = dirs::data_local_dir();

    let mut candidates = Vec::new();
    let mut push = |candidate: Option<PathBuf>| {
        if let Some(dir) = candidate {
            candidates.push(dir);
        }
    };

    match browser {
        "firefox" => {
            push(home.as_ref().map(|h| h.join(".mozilla/firefox")));
            push(config.as_ref().map(|c| c.join("Firefox")));
            push(local.as_ref().map(|l| l.join("Mozilla/Firefox")));
        }
        "chromium" => {
            push(config.as_ref().map(|c| c.join("chromium")));
            push(config.as_ref().map(|c| c.join("Chromium")));
            push(local.as_ref().map(|l| l.join("Chromium")));
        }
        "chrome" => {
            push(config.as_ref().map(|c| c.join("google-chrome")));
            push(config.as_ref().map(|c| c.join("Google/Chrome")));
            push(local.as_ref().map(|l| l.join("Google/Chrome")));
        }
        "brave" => {
            push(config.as_ref().map(|c| c.join("BraveSoftware/Brave-Browser")));
            push(local.as_ref().map(|l| l.join("BraveSoftware/Brave-Browser")));
        }
        "edge" => {
            push(config.as_ref().map(|c| c.join("microsoft-edge")));
            push(config.as_ref().map(|c| c.join("Microsoft Edge")));
            push(local.as_ref().map(|l| l.join("Microsoft/Edge")));
        }
        "opera" => {
            push(config.as_ref().map(|c| c.join("opera")));
            push(config.as_ref().map(|c| c.join("com.operasoftware.Opera")));
            push(config.as_ref().map(|c| c.join("Opera Software/Opera Stable")));
        }
        "vivaldi" => {
            push(config.as_ref().map(|c| c.join("vivaldi")));
            push(config.as_ref().map(|c| c.join("Vivaldi")));
            push(local.as_ref().map(|l| l.join("Vivaldi")));
        }
        other => {
            debug!("Unknown browser '{}' in priority list", other);
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_file_wins() {
        let temp_dir = TempDir::new().unwrap();
        let explicit = temp_dir.path().join("my_cookies.txt");
        std::fs::write(&explicit, "# Netscape HTTP Cookie File\n").unwrap();

        let fallback = temp_dir.path().join("cookies.txt");
        std::fs::write(&fallback, "# Netscape HTTP Cookie File\n").unwrap();

        let source = resolve(Some(&explicit), &fallback, &[]);
        assert_eq!(source, CookieSource::File(explicit));
    }

    #[test]
    fn test_fallback_file_beats_browsers() {
        let temp_dir = TempDir::new().unwrap();
        let fallback = temp_dir.path().join("cookies.txt");
        std::fs::write(&fallback, "# Netscape HTTP Cookie File\n").unwrap();

        let source = resolve(None, &fallback, &["firefox".to_string()]);
        assert_eq!(source, CookieSource::File(fallback));
    }

    #[test]
    fn test_missing_explicit_file_falls_through() {
        let temp_dir = TempDir::new().unwrap();
        let explicit = temp_dir.path().join("missing.txt");
        let fallback = temp_dir.path().join("also_missing.txt");

        let source = resolve(Some(&explicit), &fallback, &[]);
        assert_eq!(source, CookieSource::None);
    }

    #[test]
    fn test_no_sources_resolves_to_none() {
        let temp_dir = TempDir::new().unwrap();
        let fallback = temp_dir.path().join("cookies.txt");

        // Unknown browser names probe nothing
        let source = resolve(None, &fallback, &["netscape-navigator".to_string()]);
        assert_eq!(source, CookieSource::None);
    }

    #[test]
    fn test_known_browsers_have_candidates() {
        for browser in ["firefox", "chromium", "chrome", "brave", "edge", "opera", "vivaldi"] {
            assert!(
                !profile_dirs(browser).is_empty() || dirs::home_dir().is_none(),
                "no candidate dirs for {}",
                browser
            );
        }
    }
}
