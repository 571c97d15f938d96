//! Error handling for ripbox

use thiserror::Error;

/// Main error type for ripbox
#[derive(Debug, Error)]
pub enum RipboxError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Invalid output folder: {0}")]
    InvalidOutputDir(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}
