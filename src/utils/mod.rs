//! Utility modules for error handling, configuration and filesystem locations

pub mod config;
pub mod error;
pub mod paths;

// Re-export for convenience
pub use config::AppSettings;
pub use error::RipboxError;
