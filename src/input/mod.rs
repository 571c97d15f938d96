//! Input-line classification and URL validation

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use url::Url;

/// Where an input line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Interactive,
    File,
}

/// A raw line of user input, before classification
#[derive(Debug, Clone)]
pub struct InputLine {
    pub text: String,
    pub source: InputSource,
    pub line_no: usize,
}

impl InputLine {
    pub fn interactive(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: InputSource::Interactive,
            line_no: 1,
        }
    }
}

/// Source platform inferred from the URL host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Twitter,
    Instagram,
    TikTok,
    Facebook,
    SoundCloud,
    Vimeo,
    Twitch,
    Other,
}

/// True when `host` is `domain` or a subdomain of it.
fn matches_domain(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

impl Platform {
    /// Best-effort platform tag from a hostname.
    pub fn from_host(host: &str) -> Self {
        let host = host.strip_prefix("www.").unwrap_or(host);

        if host == "youtu.be" || matches_domain(host, "youtube.com") {
            Platform::YouTube
        } else if host == "x.com" || matches_domain(host, "twitter.com") {
            Platform::Twitter
        } else if matches_domain(host, "instagram.com") {
            Platform::Instagram
        } else if matches_domain(host, "tiktok.com") {
            Platform::TikTok
        } else if host == "fb.watch" || matches_domain(host, "facebook.com") {
            Platform::Facebook
        } else if matches_domain(host, "soundcloud.com") {
            Platform::SoundCloud
        } else if matches_domain(host, "vimeo.com") {
            Platform::Vimeo
        } else if matches_domain(host, "twitch.tv") {
            Platform::Twitch
        } else {
            Platform::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Twitter => "Twitter",
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::Facebook => "Facebook",
            Platform::SoundCloud => "SoundCloud",
            Platform::Vimeo => "Vimeo",
            Platform::Twitch => "Twitch",
            Platform::Other => "Web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line that survived classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl {
    /// Normalized URL text, as accepted by the parser
    pub url: String,
    pub platform: Platform,
}

/// Why a line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Blank,
    NotAUrl,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Blank => f.write_str("empty line"),
            RejectReason::NotAUrl => f.write_str("not a valid URL"),
        }
    }
}

/// Outcome of classifying one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Url(ValidatedUrl),
    Rejected { line_no: usize, reason: RejectReason },
}

/// Classifies a single line: trims it, requires an http/https URL with a
/// host, and tags the platform. Never touches the network.
pub fn classify_line(line: &InputLine) -> Classified {
    let text = line.text.trim();

    if text.is_empty() {
        return Classified::Rejected {
            line_no: line.line_no,
            reason: RejectReason::Blank,
        };
    }

    let parsed = match Url::parse(text) {
        Ok(parsed) => parsed,
        Err(_) => {
            return Classified::Rejected {
                line_no: line.line_no,
                reason: RejectReason::NotAUrl,
            }
        }
    };

    let scheme_ok = parsed.scheme() == "http" || parsed.scheme() == "https";
    let host = parsed.host_str().unwrap_or("");

    if !scheme_ok || host.is_empty() {
        return Classified::Rejected {
            line_no: line.line_no,
            reason: RejectReason::NotAUrl,
        };
    }

    Classified::Url(ValidatedUrl {
        url: parsed.to_string(),
        platform: Platform::from_host(host),
    })
}

/// Classifies every line, in order. Deterministic and re-runnable.
pub fn classify(lines: impl IntoIterator<Item = InputLine>) -> impl Iterator<Item = Classified> {
    lines.into_iter().map(|line| classify_line(&line))
}

/// Reads one URL per line from a batch file. Lines starting with `#` are
/// comments; original line numbers are preserved for reporting.
pub async fn read_batch_file(path: &Path) -> Result<Vec<InputLine>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;

    let lines = contents
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim_start().starts_with('#'))
        .map(|(idx, text)| InputLine {
            text: text.to_string(),
            source: InputSource::File,
            line_no: idx + 1,
        })
        .collect();

    Ok(lines)
}
