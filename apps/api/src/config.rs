use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Json,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => bail!("STORAGE_BACKEND must be 'json' or 'postgres', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    /// Only set (and only required) for the postgres backend.
    pub database_url: Option<String>,
    pub uploads_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub max_cv_bytes: usize,
    pub recommendation_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage_backend: StorageBackend = env_or("STORAGE_BACKEND", "json").parse()?;
        let database_url = match storage_backend {
            StorageBackend::Postgres => Some(require_env("DATABASE_URL")?),
            StorageBackend::Json => None,
        };

        Ok(Config {
            storage_backend,
            data_dir: PathBuf::from(env_or("DATA_DIR", "./data")),
            database_url,
            uploads_dir: PathBuf::from(env_or("UPLOADS_DIR", "./data/uploads")),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            max_cv_bytes: env_or("MAX_CV_BYTES", "5242880")
                .parse::<usize>()
                .context("MAX_CV_BYTES must be a byte count")?,
            recommendation_limit: env_or("RECOMMENDATION_LIMIT", "3")
                .parse::<usize>()
                .context("RECOMMENDATION_LIMIT must be a positive integer")?,
        })
    }

    /// JSON-backed configuration rooted at `dir`, used by tests.
    #[cfg(test)]
    pub fn for_data_dir(dir: &std::path::Path) -> Self {
        Config {
            storage_backend: StorageBackend::Json,
            data_dir: dir.to_path_buf(),
            database_url: None,
            uploads_dir: dir.join("uploads"),
            port: 0,
            rust_log: "debug".to_string(),
            max_cv_bytes: 5 * 1024 * 1024,
            recommendation_limit: 3,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("json".parse::<StorageBackend>().unwrap(), StorageBackend::Json);
        assert_eq!(
            " Postgres ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Postgres
        );
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
