/// CLI error types
use juke_client::ClientError;
use juke_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend client error: {0}")]
    Client(#[from] ClientError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}
