use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Root directory for per-session media storage.
    pub base_path: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Seconds without activity before an active session is abandoned.
    pub idle_timeout_secs: u64,
    /// How often the idle sweeper runs.
    pub sweep_interval_secs: u64,
    /// Largest accepted blob payload, in bytes.
    pub max_payload_bytes: usize,
    /// Commit attempts per unit before it is dropped.
    pub max_commit_attempts: u32,
}

impl Config {
    /// Load configuration, with defaults for every key so the service runs
    /// without a config file present.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "media-ingest")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8080)?
            .set_default("storage.base_path", "./media_storage")?
            .set_default("session.idle_timeout_secs", 300)?
            .set_default("session.sweep_interval_secs", 30)?
            .set_default("session.max_payload_bytes", 16 * 1024 * 1024)?
            .set_default("session.max_commit_attempts", 3)?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
