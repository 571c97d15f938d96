//! Command-line surface: argument parsing, prompting and session flow

pub mod args;
pub mod prompt;
pub mod session;

// Re-export for convenience
pub use args::Cli;
pub use prompt::Prompter;
pub use session::Session;
