//! Command-line argument surface

use clap::Parser;
use std::path::PathBuf;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "ripbox")]
#[command(author, version, about = "Interactive yt-dlp front-end for quick media grabs")]
pub struct Cli {
    /// Read URLs from a file, one per line (# starts a comment).
    #[arg(long, value_name = "FILE")]
    pub batch_file: Option<PathBuf>,

    /// Output subfolder under the download base (batch mode).
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<String>,

    /// Format menu tokens, e.g. "1 4" for MP4 plus MP3 (batch mode).
    #[arg(short, long, value_name = "TOKENS")]
    pub formats: Option<String>,

    /// Download base directory (defaults to the platform Downloads dir).
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<String>,

    /// Netscape-format cookies file handed to yt-dlp.
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<String>,

    /// Path to the yt-dlp binary (skips discovery).
    #[arg(long, value_name = "BIN")]
    pub ytdlp_path: Option<PathBuf>,
}
