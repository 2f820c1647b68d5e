//! Batch maintenance of cached word meanings
//!
//! ```text
//! vocab-meanings populate [--level one] [--delay-ms 1000]
//! vocab-meanings clear [--yes]
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tracing::{info, warn};
use vocab_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use vocab_common::db::{init_database, Level};
use vocab_common::time;
use vocab_server::db::words;
use vocab_server::translation::{MeaningChain, MeaningStyle};

#[derive(Parser, Debug)]
#[command(name = "vocab-meanings")]
#[command(about = "Populate or clear cached word meanings")]
#[command(version)]
struct Args {
    /// Folder holding vocab.db
    #[arg(short, long, env = "VOCAB_ROOT_FOLDER", global = true)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a meaning, nickname and definition for words still missing one
    Populate {
        /// Only words of this level
        #[arg(long, default_value = "one")]
        level: Level,

        /// Pause between lookups
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
    /// Clear every cached meaning
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = TomlConfig::load_or_default(args.config.as_deref());
    config.apply_env_overrides();

    let root_folder = RootFolderResolver::new("vocab-meanings")
        .with_cli_arg(args.root_folder)
        .with_toml_root(config.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);

    // Confirm before touching the database
    if let Command::Clear { yes: false } = args.command {
        if !confirm_clear()? {
            println!("Aborted. No changes made.");
            return Ok(());
        }
    }

    initializer.ensure_directory_exists()?;
    let db_path = initializer.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match args.command {
        Command::Populate { level, delay_ms } => {
            let chain = MeaningChain::from_config(&config.translation, MeaningStyle::Definition)
                .context("Failed to build translation providers")?;
            populate(&pool, &chain, level, Duration::from_millis(delay_ms)).await?;
        }
        Command::Clear { .. } => {
            let cleared = words::clear_meanings(&pool, &time::now_rfc3339()).await?;
            println!("Cleared {} meanings.", cleared);
        }
    }

    pool.close().await;
    Ok(())
}

fn confirm_clear() -> Result<bool> {
    print!("This will clear the meaning of every word. Type YES to proceed: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']) == "YES")
}

async fn populate(pool: &SqlitePool, chain: &MeaningChain, level: Level, delay: Duration) -> Result<()> {
    let pending = words::words_missing_meaning(pool, level).await?;
    info!("Found {} {} words without meaning", pending.len(), level);

    let mut updated = 0usize;
    for word in &pending {
        match chain.lookup(&word.text).await {
            Some(found) => {
                words::set_meaning(
                    pool,
                    &word.id,
                    &found.meaning,
                    found.nickname.as_deref(),
                    found.definition.as_deref(),
                    &time::now_rfc3339(),
                )
                .await?;
                info!("Updated {}: {}", word.text, found.meaning);
                updated += 1;
            }
            None => warn!("Failed to get meaning for {}", word.text),
        }

        tokio::time::sleep(delay).await;
    }

    info!("Done: {} of {} words updated", updated, pending.len());
    Ok(())
}
