//! Vocabulary drill tracker server
//!
//! Serves the JSON API and the embedded browser UI on one port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_common::config::{
    default_config_path, RootFolderInitializer, RootFolderResolver, TomlConfig, DEFAULT_PORT,
};
use vocab_common::db::init_database;
use vocab_server::speech::{GoogleTts, SpeechError, SpeechSynth};
use vocab_server::translation::{MeaningChain, MeaningStyle};
use vocab_server::{build_router, AppState};

/// Command-line arguments for vocab-server
#[derive(Parser, Debug)]
#[command(name = "vocab-server")]
#[command(about = "Vocabulary drill tracker")]
#[command(version)]
struct Args {
    /// Port to listen on (default 5730)
    #[arg(short, long, env = "VOCAB_PORT")]
    port: Option<u16>,

    /// Folder holding vocab.db
    #[arg(short, long, env = "VOCAB_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so its log level applies; problems are reported after init
    let config_path = args.config.clone().or_else(default_config_path);
    let (mut config, config_problem) = match config_path.as_deref().map(TomlConfig::load) {
        Some(Ok(config)) => (config, None),
        Some(Err(e)) => (TomlConfig::default(), Some(e)),
        None => (TomlConfig::default(), None),
    };
    config.apply_env_overrides();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vocab_server={0},vocab_common={0},tower_http=info", config.logging.level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database work
    info!(
        "Starting vocab-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match (&config_path, config_problem) {
        (_, Some(e)) => warn!("{} (using compiled defaults)", e),
        (Some(path), None) => info!("Config file: {}", path.display()),
        (None, None) => info!("No config file found, using compiled defaults"),
    }

    let root_folder = RootFolderResolver::new("vocab-server")
        .with_cli_arg(args.root_folder)
        .with_toml_root(config.root_folder.clone())
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Database ready");

    let meanings = MeaningChain::from_config(&config.translation, MeaningStyle::Short)
        .context("Failed to build translation providers")?;
    info!("Translation providers: {}", meanings.provider_names().join(" → "));

    let speech: Option<Arc<dyn SpeechSynth>> = match GoogleTts::from_config(&config.tts) {
        Ok(tts) => Some(Arc::new(tts)),
        Err(SpeechError::NotConfigured) => {
            warn!("Text-to-speech API key not configured, /tts will answer 500");
            None
        }
        Err(e) => return Err(e).context("Failed to build text-to-speech client"),
    };

    let app = build_router(AppState::new(pool, meanings, speech));

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vocab-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
