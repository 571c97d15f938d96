//! yt-dlp wrapper for running download jobs
//!
//! This module handles yt-dlp binary discovery and per-job invocation.
//! Progress is streamed from stdout and redrawn as a single line; stderr is
//! captured so the last ERROR line can be reported as the failure reason.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

use crate::extractor::options::DownloadOptions;
use crate::formats::ExportFormat;
use crate::utils::error::RipboxError;
use crate::utils::paths;

/// Runs yt-dlp download jobs
pub struct YtdlpRunner {
    ytdlp_path: PathBuf,
    progress_re: Regex,
}

impl YtdlpRunner {
    /// Initialize the runner and verify yt-dlp availability
    ///
    /// Search order:
    /// 1. System PATH
    /// 2. Common installation paths (Homebrew, pip user installs, etc.)
    pub fn new() -> Result<Self> {
        let ytdlp_path = match find_ytdlp() {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                path
            }
            None => {
                error!("yt-dlp not found anywhere!");
                return Err(RipboxError::YtDlpNotFound.into());
            }
        };

        Self::with_path(ytdlp_path)
    }

    /// Use an explicit yt-dlp binary instead of discovery
    pub fn with_path(ytdlp_path: PathBuf) -> Result<Self> {
        if !ytdlp_path.is_file() {
            return Err(RipboxError::OperationFailed(format!(
                "{} is not a yt-dlp binary",
                ytdlp_path.display()
            ))
            .into());
        }

        let progress_re = Regex::new(
            r"^\[download\]\s+([\d.]+%)\s+of\s+~?\s*(\S+)\s+at\s+(\S+)\s+ETA\s+(\S+)(?:\s+\(frag\s+(\d+)/(\d+)\))?",
        )
        .context("Invalid progress pattern")?;

        Ok(Self {
            ytdlp_path,
            progress_re,
        })
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    /// Ask the binary for its version string
    pub async fn version(&self) -> Result<String> {
        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("--version")
            .output()
            .await
            .context("Failed to run yt-dlp --version")?;

        if !output.status.success() {
            return Err(RipboxError::OperationFailed("yt-dlp --version failed".to_string()).into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run one (URL, format) job to completion.
    ///
    /// The child is never preempted from here; on ctrl-c the terminal
    /// delivers the signal to the whole process group and yt-dlp shuts
    /// itself down.
    pub async fn run(
        &self,
        url: &str,
        format: ExportFormat,
        options: &DownloadOptions,
    ) -> Result<DownloadReport> {
        let args = options.build_args(url, format);
        debug!("Launching yt-dlp with {} args for {}", args.len(), url);

        let mut child = AsyncCommand::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to launch yt-dlp for {}", url))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RipboxError::OperationFailed("yt-dlp stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RipboxError::OperationFailed("yt-dlp stderr unavailable".to_string()))?;

        // stderr is drained concurrently; the last ERROR line becomes the
        // failure reason.
        let stderr_task = tokio::spawn(async move {
            let mut last_error: Option<String> = None;
            let mut lines = BufReader::new(stderr).lines();

            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(rest) = line.strip_prefix("ERROR:") {
                    let rest = rest.trim().to_string();
                    warn!("yt-dlp: {}", rest);
                    last_error = Some(rest);
                } else if let Some(rest) = line.strip_prefix("WARNING:") {
                    debug!("yt-dlp warning: {}", rest.trim());
                } else {
                    debug!("yt-dlp stderr: {}", line);
                }
            }

            last_error
        });

        let mut candidates: Vec<PathBuf> = Vec::new();
        let mut progress_active = false;
        let mut lines = BufReader::new(stdout).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(progress) = self.parse_progress(&line) {
                print!("\r{}          ", progress.render());
                std::io::stdout().flush().ok();
                progress_active = true;
                continue;
            }

            if let Some(dest) = extract_destination(&line) {
                debug!("Output candidate: {}", dest.display());
                if !candidates.contains(&dest) {
                    candidates.push(dest);
                }
            }

            // Post-processing lines are worth showing as-is
            if line.starts_with("[Merger]")
                || line.starts_with("[ffmpeg]")
                || line.starts_with("[ExtractAudio]")
                || line.starts_with("[Fixup")
            {
                if progress_active {
                    println!();
                    progress_active = false;
                }
                println!("{}", line);
            } else {
                debug!("yt-dlp: {}", line);
            }
        }

        let last_error = stderr_task.await.unwrap_or(None);

        let status = child
            .wait()
            .await
            .context("Failed to wait for yt-dlp to exit")?;

        let outputs: Vec<PathBuf> = candidates.into_iter().filter(|p| p.exists()).collect();

        if progress_active {
            if !outputs.is_empty() {
                println!("\r[download] Finished downloading.                          ");
            } else {
                println!();
            }
        }

        if !status.success() && !outputs.is_empty() {
            warn!(
                "yt-dlp exited with {} but produced {} file(s); treating as success",
                status,
                outputs.len()
            );
        }

        Ok(DownloadReport {
            exit_ok: status.success(),
            last_error,
            outputs,
        })
    }

    fn parse_progress(&self, line: &str) -> Option<Progress> {
        let caps = self.progress_re.captures(line)?;

        let frag = match (caps.get(5), caps.get(6)) {
            (Some(idx), Some(total)) => Some((
                idx.as_str().parse().ok()?,
                total.as_str().parse().ok()?,
            )),
            _ => None,
        };

        Some(Progress {
            percent: caps[1].to_string(),
            size: caps[2].to_string(),
            speed: caps[3].to_string(),
            eta: caps[4].to_string(),
            frag,
        })
    }
}

/// One parsed progress update from yt-dlp's `--newline` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub percent: String,
    pub size: String,
    pub speed: String,
    pub eta: String,
    pub frag: Option<(u64, u64)>,
}

impl Progress {
    /// Single-line rendering, overwritten in place with `\r`.
    pub fn render(&self) -> String {
        match self.frag {
            Some((idx, total)) => format!(
                "[download] {} of {} at {} ETA {} (frag {}/{})",
                self.percent, self.size, self.speed, self.eta, idx, total
            ),
            None => format!(
                "[download] {} of {} at {} ETA {}",
                self.percent, self.size, self.speed, self.eta
            ),
        }
    }
}

/// What one yt-dlp invocation produced
#[derive(Debug)]
pub struct DownloadReport {
    /// Whether the process exited with status 0
    pub exit_ok: bool,
    /// Last ERROR line seen on stderr, if any
    pub last_error: Option<String>,
    /// Output files reported by yt-dlp that exist on disk afterwards
    pub outputs: Vec<PathBuf>,
}

impl DownloadReport {
    /// Exit status alone is not trusted: the job succeeded only if at least
    /// one reported output file actually exists.
    pub fn succeeded(&self) -> bool {
        !self.outputs.is_empty()
    }

    pub fn failure_reason(&self) -> String {
        match &self.last_error {
            Some(reason) => reason.clone(),
            None if self.exit_ok => "no output file was created".to_string(),
            None => "yt-dlp exited with an error".to_string(),
        }
    }
}

/// How a failed invocation should be treated by the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The source itself is gone or gated; the item is skipped
    SourceUnavailable,
    /// Anything else: network, formats, merge, filesystem
    Tool,
}

/// Error messages that mean the source cannot be fetched by anyone, as
/// opposed to something going wrong on our side.
const SOURCE_UNAVAILABLE_PATTERNS: [&str; 7] = [
    "private video",
    "video unavailable",
    "has been removed",
    "this video is not available",
    "members-only",
    "blocked it in your country",
    "has been terminated",
];

pub fn classify_failure(reason: &str) -> FailureKind {
    let lowered = reason.to_lowercase();

    if SOURCE_UNAVAILABLE_PATTERNS
        .iter()
        .any(|p| lowered.contains(p))
    {
        FailureKind::SourceUnavailable
    } else {
        FailureKind::Tool
    }
}

/// Pulls an output path out of the stdout lines that name one.
pub fn extract_destination(line: &str) -> Option<PathBuf> {
    if let Some(rest) = line.strip_prefix("[download] Destination: ") {
        return Some(PathBuf::from(rest.trim()));
    }

    if let Some(rest) = line.strip_prefix("[ExtractAudio] Destination: ") {
        return Some(PathBuf::from(rest.trim()));
    }

    if let Some(rest) = line.strip_prefix("[Merger] Merging formats into \"") {
        if let Some(path) = rest.strip_suffix('"') {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(rest) = line.strip_prefix("[download] ") {
        if let Some(path) = rest.strip_suffix(" has already been downloaded") {
            return Some(PathBuf::from(path.trim()));
        }
    }

    None
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. System PATH
/// 2. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(system) = find_in_pathenv() {
        debug!("Using system yt-dlp: {}", system.display());
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Using yt-dlp from common path: {}", common.display());
        return Some(common);
    }

    warn!("yt-dlp not found anywhere!");
    None
}

/// Find yt-dlp in system PATH using `which`
fn find_in_pathenv() -> Option<PathBuf> {
    if let Ok(path) = which::which("yt-dlp") {
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Find yt-dlp in common installation paths
fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel) and manual installs
        "/usr/local/bin/yt-dlp",
        // System
        "/usr/bin/yt-dlp",
        // pip user install
        "~/.local/bin/yt-dlp",
    ];

    for path_str in common_paths {
        let expanded = paths::expand_tilde(path_str);
        if expanded.exists() && is_executable(&expanded) {
            return Some(expanded);
        }
    }

    None
}

/// Find a node runtime for the JS challenge solver, same search order as
/// yt-dlp: PATH first, then common install locations. Absence is fine.
pub fn find_node() -> Option<PathBuf> {
    if let Ok(path) = which::which("node") {
        if path.exists() {
            return Some(path);
        }
    }

    let common_paths = [
        "/opt/homebrew/bin/node",
        "/usr/local/bin/node",
        "/usr/bin/node",
    ];

    for path_str in common_paths {
        let candidate = PathBuf::from(path_str);
        if candidate.exists() && is_executable(&candidate) {
            return Some(candidate);
        }
    }

    None
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(metadata) = std::fs::metadata(path) {
            let permissions = metadata.permissions();
            // Check if any executable bit is set
            return permissions.mode() & 0o111 != 0;
        }
        false
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}

// ============================================================
// Tests
// ============================================================
