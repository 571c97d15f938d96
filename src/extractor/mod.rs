pub mod cookies;
pub mod options;
pub mod ytdlp;

pub use cookies::CookieSource;
pub use options::DownloadOptions;
pub use ytdlp::{DownloadReport, FailureKind, YtdlpRunner};
