//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Which persistence backend serves the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One pretty-printed JSON document per collection under `DATA_DIR`.
    File,
    /// REST interface of the hosted table service.
    Rest,
    /// Direct PostgreSQL connection to the hosted tables.
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::File => "file",
            StoreBackend::Rest => "rest",
            StoreBackend::Postgres => "postgres",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(StoreBackend::File),
            "rest" | "supabase" => Ok(StoreBackend::Rest),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(anyhow!(
                "unknown STORE_BACKEND '{}' (expected file, rest or postgres)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub remote_url: Option<String>,
    pub remote_api_key: Option<String>,
    pub database_url: Option<String>,
    /// Upper bound for a single remote store call.
    pub store_timeout: Duration,
    pub bind_addr: String,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Backend-specific settings are checked here so a misconfigured server fails at
    /// startup instead of on the first request.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("STORE_BACKEND") {
            Some(v) => v.parse::<StoreBackend>()?,
            None => StoreBackend::File,
        };

        let store_timeout_secs = match get("STORE_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("STORE_TIMEOUT_SECS must be a valid u64, got '{}'", v))?
                .max(1),
            None => DEFAULT_STORE_TIMEOUT_SECS,
        };

        let config = Self {
            backend,
            data_dir: get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            remote_url: get("REMOTE_URL").map(|u| u.trim_end_matches('/').to_string()),
            remote_api_key: get("REMOTE_API_KEY"),
            database_url: get("DATABASE_URL"),
            store_timeout: Duration::from_secs(store_timeout_secs),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        };

        match config.backend {
            StoreBackend::File => {}
            StoreBackend::Rest => {
                if config.remote_url.is_none() {
                    return Err(anyhow!("REMOTE_URL must be set when STORE_BACKEND=rest"));
                }
                if config.remote_api_key.is_none() {
                    return Err(anyhow!("REMOTE_API_KEY must be set when STORE_BACKEND=rest"));
                }
            }
            StoreBackend::Postgres => {
                if config.database_url.is_none() {
                    return Err(anyhow!("DATABASE_URL must be set when STORE_BACKEND=postgres"));
                }
            }
        }

        Ok(config)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.data_dir.join("categories.json")
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join("products.json")
    }
}
