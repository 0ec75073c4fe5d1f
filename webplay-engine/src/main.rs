//! Playback resolver (webplay-resolve) - Main entry point
//!
//! Resolves a JSON playlist against the configured transcode policy and a
//! catalog database, then prints the player directives (or the resolved
//! types, supplied types or playlist classification).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sqlx::SqlitePool;
use tracing::{info, warn};
use webplay_common::config::load_config;
use webplay_common::db::{apply_policy_overrides, connect_readonly, load_catalog};
use webplay_common::CatalogSnapshot;

use webplay_engine::capability::TranscodeTable;
use webplay_engine::item::load_playlist;
use webplay_engine::lookup::MemoryStore;
use webplay_engine::{
    build_script, classify, resolve_types, supplied_types, DirectiveMode, PlaybackContext,
};

/// Command-line arguments for webplay-resolve
#[derive(Parser, Debug)]
#[command(name = "webplay-resolve")]
#[command(about = "Resolve playback formats and player directives for a playlist")]
#[command(version)]
struct Args {
    /// Playlist JSON file (array of items)
    playlist: PathBuf,

    /// Config file (overrides WEBPLAY_CONFIG and discovery)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog database, opened read-only
    #[arg(long, env = "WEBPLAY_DB")]
    db: Option<PathBuf>,

    /// How non-broadcast items are queued
    #[arg(long, value_enum, default_value_t = Mode::Add)]
    mode: Mode,

    /// Prefix prepended to every callback name
    #[arg(long, default_value = "")]
    callback_prefix: String,

    /// Client-requested transcode target for `--output types`
    #[arg(long, default_value = "")]
    force_format: String,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = Output::Directives)]
    output: Output,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Add,
    PlayNext,
}

impl From<Mode> for DirectiveMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Add => DirectiveMode::Add,
            Mode::PlayNext => DirectiveMode::PlayNext,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    /// Rendered callback script
    Directives,
    /// Resolved (real, player) pair per item, as JSON
    Types,
    /// Distinct player tokens the playlist needs
    Supplied,
    /// radio, video or other
    Classify,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("Starting webplay-resolve v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let mut policy = config.policy.clone();

    let snapshot = match &args.db {
        Some(db_path) => {
            info!("Catalog database: {}", db_path.display());
            let pool: SqlitePool = connect_readonly(db_path)
                .await
                .context("Failed to open catalog database")?;
            policy = apply_policy_overrides(&pool, policy).await?;
            let snapshot = load_catalog(&pool).await?;
            pool.close().await;
            snapshot
        }
        None => {
            warn!("No catalog database given, every item resolves from its URL");
            CatalogSnapshot::default()
        }
    };

    info!(
        "Transcode mode: {}, flash player: {}, player customize: {}",
        policy.transcode_mode, policy.webplayer_flash_enabled, policy.transcode_player_customize
    );

    let store = MemoryStore::from_snapshot(snapshot);
    let table = TranscodeTable::new(config.transcode);
    let ctx = PlaybackContext::new(&policy, &store, &table);

    let playlist = load_playlist(&args.playlist)
        .with_context(|| format!("Failed to read playlist {}", args.playlist.display()))?;
    info!("Loaded {} playlist item(s)", playlist.len());

    match args.output {
        Output::Directives => {
            let script = build_script(&ctx, &playlist, args.mode.into(), &args.callback_prefix)?;
            println!("{}", script);
        }
        Output::Types => {
            let types: Vec<_> = playlist
                .iter()
                .map(|item| resolve_types(&ctx, item, &args.force_format))
                .collect();
            println!("{}", serde_json::to_string_pretty(&types)?);
        }
        Output::Supplied => {
            println!("{}", supplied_types(&ctx, &playlist).join(","));
        }
        Output::Classify => {
            println!("{}", classify(&playlist, &policy));
        }
    }

    Ok(())
}
