//! Juke CLI Library
//!
//! Remote control for a provider playback session from the terminal.
//!
//! This library exposes the command runners and config loading for testing purposes.

pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use commands::{run_once, watch, Action, StatusReport};
pub use config::CliConfig;
pub use error::{CliError, Result};
