use anyhow::{Context, Result};
use clap::Parser;
use media_ingest::{create_router, AppState, Config, JsonRecordStore, MediaPipeline, SessionRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "media-ingest", about = "Browser media stream ingest service")]
struct Args {
    /// Config file path (without extension), merged over built-in defaults
    #[arg(long, default_value = "config/media-ingest")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);
    info!("Storage root: {}", cfg.storage.base_path);
    info!(
        "Idle timeout: {}s (sweep every {}s)",
        cfg.session.idle_timeout_secs, cfg.session.sweep_interval_secs
    );

    let registry = Arc::new(SessionRegistry::new(&cfg.storage.base_path));
    let record_store = Arc::new(JsonRecordStore::new(&cfg.storage.base_path));
    let pipeline = Arc::new(MediaPipeline::new(
        Arc::clone(&registry),
        record_store,
        cfg.session.max_payload_bytes,
        cfg.session.max_commit_attempts,
    ));

    let _sweeper = registry.spawn_sweeper(
        Duration::from_secs(cfg.session.sweep_interval_secs),
        chrono::Duration::seconds(cfg.session.idle_timeout_secs as i64),
    );

    let app = create_router(AppState::new(pipeline));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .await
        .context("HTTP server exited")?;

    Ok(())
}
