// Voice Bot Backend - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use voice_bot::{api, init_tracing, Config, KnowledgeStore, QueryProcessor, SqliteStore};

#[derive(Parser)]
#[command(name = "voice-bot-server", version, about = "Voice bot HTTP API")]
struct Args {
    /// Path to a TOML config file (defaults to ./voice-bot.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    // Schema setup happens once, before any request is served
    let store = SqliteStore::open(&config.database.path)?;
    store.setup()?;
    if config.database.seed_demo_data {
        store.seed_demo_data()?;
    }

    let stats = store.stats()?;
    info!(
        path = %config.database.path.display(),
        faqs = stats.total_faqs,
        users = stats.total_users,
        "database opened"
    );

    let processor = QueryProcessor::new(Arc::new(store))
        .with_default_username(config.bot.default_username.clone());
    let app = api::create_router(Arc::new(processor), &config.server);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Voice Bot API listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
