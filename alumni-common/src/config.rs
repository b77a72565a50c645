//! Service configuration
//!
//! One explicit `Config` is constructed at process start and passed to
//! the components that need it. Resolution priority per field:
//! environment variable, then TOML file, then built-in default.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Raw TOML file contents (all fields optional)
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub token_secret: Option<String>,
    pub google_client_id: Option<String>,
    pub frontend_url: Option<String>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
}

impl TomlConfig {
    /// Load TOML config from a file, tolerating absence
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, e.g. "127.0.0.1:8000"
    pub bind_addr: String,
    /// SQLite database file path
    pub database_path: PathBuf,
    /// Secret used to sign bearer tokens
    pub token_secret: String,
    /// Google OAuth client id; sign-in is disabled when absent
    pub google_client_id: Option<String>,
    /// Base URL used to build password-reset links
    pub frontend_url: String,
    /// Directory for temporary upload files
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

/// Default multipart upload cap (matches the 100 MB import limit)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

impl Config {
    /// Resolve configuration from environment, TOML file, and defaults
    pub fn resolve(toml_path: Option<&Path>) -> Result<Self> {
        let file = match toml_path {
            Some(path) => {
                let cfg = TomlConfig::load(path)?;
                info!("Loaded configuration from {}", path.display());
                cfg
            }
            None => TomlConfig::default(),
        };

        let bind_addr = env_or("ALUMNI_BIND_ADDR", file.bind_addr)
            .unwrap_or_else(|| "127.0.0.1:8000".to_string());

        let database_path = env_or("ALUMNI_DATABASE_PATH", None)
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or_else(|| PathBuf::from("alumni.db"));

        let token_secret = match env_or("ALUMNI_TOKEN_SECRET", file.token_secret) {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                // Tokens from previous runs will not verify against a
                // per-process secret.
                warn!(
                    "No token secret configured (ALUMNI_TOKEN_SECRET); \
                     generated an ephemeral secret for this process"
                );
                crate::auth::generate_secret()
            }
        };

        let google_client_id =
            env_or("ALUMNI_GOOGLE_CLIENT_ID", file.google_client_id).filter(|v| !v.is_empty());
        if google_client_id.is_none() {
            info!("Google sign-in disabled (no client id configured)");
        }

        let frontend_url = env_or("ALUMNI_FRONTEND_URL", file.frontend_url)
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        let upload_dir = env_or("ALUMNI_UPLOAD_DIR", None)
            .map(PathBuf::from)
            .or(file.upload_dir)
            .unwrap_or_else(std::env::temp_dir);

        let max_upload_bytes = match env_or("ALUMNI_MAX_UPLOAD_BYTES", None) {
            Some(v) => v
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("ALUMNI_MAX_UPLOAD_BYTES: {}", e)))?,
            None => file.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        Ok(Self {
            bind_addr,
            database_path,
            token_secret,
            google_client_id,
            frontend_url,
            upload_dir,
            max_upload_bytes,
        })
    }
}

fn env_or(key: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(key).ok().or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_env() {
        let config = Config::resolve(None).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.database_path, PathBuf::from("alumni.db"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!config.token_secret.is_empty());
    }

    #[test]
    fn toml_values_override_defaults() {
        let dir = std::env::temp_dir().join("alumni-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "bind_addr = \"0.0.0.0:9001\"\nmax_upload_bytes = 1024\n",
        )
        .unwrap();

        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9001");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn missing_file_is_tolerated() {
        let path = PathBuf::from("/nonexistent/alumni/config.toml");
        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
    }
}
