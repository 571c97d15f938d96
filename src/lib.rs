//! Ripbox library

pub mod batch;
pub mod cli;
pub mod extractor;
pub mod formats;
pub mod input;
pub mod utils;

// Re-export main types for easier use
pub use batch::{BatchDriver, Job, JobStatus, RunSummary};
pub use extractor::{CookieSource, DownloadOptions, DownloadReport, YtdlpRunner};
pub use formats::{ExportFormat, FormatSelection};
pub use input::{Classified, InputLine, Platform, ValidatedUrl};
pub use utils::{AppSettings, RipboxError};
