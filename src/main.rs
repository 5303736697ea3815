// src/main.rs

use std::sync::Arc;

use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use attune::api::{self, AppState};
use attune::chat::ChatService;
use attune::config::CONFIG;
use attune::emotion::FusionEngine;
use attune::llm::GeminiClient;
use attune::store::SqliteStore;

#[derive(Parser, Debug)]
#[command(name = "attune", about = "Multimodal emotion analysis and CBT conversation engine")]
struct Args {
    /// Bind host (overrides ATTUNE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides ATTUNE_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level: Level = CONFIG.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting attune backend");
    info!(
        "Gemini: {}",
        if CONFIG.gemini_configured() { "configured" } else { "mock mode" }
    );

    // Invalid fusion weights are a configuration error; abort before serving.
    let fusion = FusionEngine::from_config(&CONFIG)?;

    // Create database pool and schema
    let database_url = args.database_url.unwrap_or_else(|| CONFIG.database_url.clone());
    let pool = SqlitePoolOptions::new()
        .max_connections(CONFIG.sqlite_max_connections)
        .connect(&database_url)
        .await?;

    let store = SqliteStore::new(pool);
    store.init_schema().await?;

    let generator: Arc<dyn attune::llm::TextGenerator> =
        Arc::new(GeminiClient::from_config(&CONFIG));
    let chat = ChatService::new(store.clone(), generator.clone());

    let state = Arc::new(AppState {
        store,
        fusion,
        generator,
        chat,
    });

    let app = api::router(state);

    let host = args.host.unwrap_or_else(|| CONFIG.host.clone());
    let port = args.port.unwrap_or(CONFIG.port);
    let bind_address = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("attune listening on http://{bind_address}");
    axum::serve(listener, app).await?;

    Ok(())
}
