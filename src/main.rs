//! Ripbox - Interactive Media Downloader
//!
//! A batch-friendly command-line front-end that drives yt-dlp for extraction
//! and ffmpeg (through yt-dlp post-processing) for transcoding.

use anyhow::Result;
use clap::Parser;
use ripbox::cli::session;
use ripbox::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let code = session::run(cli).await?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
