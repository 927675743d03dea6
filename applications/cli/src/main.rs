/// Juke - remote playback control from the terminal
use clap::{Parser, Subcommand};
use juke_cli::{commands, Action, CliConfig};
use juke_client::JukeClient;
use juke_core::ProviderName;
use juke_playback::{PlaybackEngine, SessionStore};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "juke")]
#[command(about = "Control playback on your streaming provider", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./juke.toml when present)
    #[arg(short, long, env = "JUKE_CONFIG")]
    config: Option<PathBuf>,

    /// Backend auth token, overrides the config file
    #[arg(long, env = "JUKE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current playback session
    Status,
    /// Play a track
    Play {
        /// Track URI or provider id
        track: String,
        /// Album, artist or playlist to play the track within
        #[arg(long)]
        context: Option<String>,
        /// Provider override
        #[arg(long)]
        provider: Option<String>,
    },
    /// Play an album, artist or playlist from the start
    PlayContext {
        /// Context URI
        context: String,
        /// Provider override
        #[arg(long)]
        provider: Option<String>,
    },
    /// Pause playback
    Pause,
    /// Resume playback
    Resume,
    /// Skip to the next track
    Next,
    /// Go back to the previous track
    Previous,
    /// Seek within the current track
    Seek {
        /// Position in milliseconds
        position_ms: f64,
    },
    /// Follow the session and log changes until Ctrl+C
    Watch,
}

impl Commands {
    fn into_action(self) -> Option<Action> {
        let action = match self {
            Commands::Status => Action::Status,
            Commands::Play {
                track,
                context,
                provider,
            } => Action::Play {
                track,
                context_uri: context,
                provider: provider.map(ProviderName::new),
            },
            Commands::PlayContext { context, provider } => Action::PlayContext {
                context_uri: context,
                provider: provider.map(ProviderName::new),
            },
            Commands::Pause => Action::Pause,
            Commands::Resume => Action::Resume,
            Commands::Next => Action::Next,
            Commands::Previous => Action::Previous,
            Commands::Seek { position_ms } => Action::Seek { position_ms },
            Commands::Watch => return None,
        };
        Some(action)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "juke_cli=info,juke_playback=info,juke_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(token) = cli.token {
        config.api.token = Some(token);
    }
    config.validate()?;

    let client = JukeClient::new(config.client_config())?;
    let session = Arc::new(match config.token() {
        Some(token) => SessionStore::with_token(token),
        None => {
            tracing::warn!("No auth token configured; playback controls are disabled");
            SessionStore::new()
        }
    });
    let engine = PlaybackEngine::new(Arc::new(client), session.clone(), config.sync.clone());

    match cli.command.into_action() {
        Some(action) => {
            let report = commands::run_once(&engine, action).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => {
            engine.follow_session(&session);
            commands::watch(&engine, async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", err);
                    std::future::pending::<()>().await;
                }
            })
            .await?;
        }
    }

    Ok(())
}
