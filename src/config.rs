//! Configuration management
//!
//! All settings come from the environment (a `.env` file is honored).
//! Required keys without a sane default abort startup with a clear message.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Custom endpoint for MinIO-style deployments; AWS when unset
    pub endpoint: Option<String>,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub put_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Prefix prepended to public names in upload responses
    pub url_prefix: String,

    /// Request body cap in bytes
    pub max_upload_size: usize,

    /// Random stem length for public names
    pub public_name_length: usize,

    /// Allocator attempt budget
    pub name_retries: u32,

    /// Compound suffixes preserved whole, e.g. "tar.gz"
    pub compound_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Directory the existence markers are written to
    pub marker_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {message}")]
    InvalidVar { var: &'static str, message: String },

    #[error("marker directory {0} does not exist or is not a directory")]
    MarkerDirMissing(PathBuf),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./stash.db".to_string(),
            },
            storage: StorageConfig {
                endpoint: None,
                bucket: "stash".to_string(),
                region: "us-east-1".to_string(),
                access_key: String::new(),
                secret_key: String::new(),
                put_timeout_secs: 30,
            },
            ingest: IngestConfig {
                url_prefix: "https://files.example.com/".to_string(),
                max_upload_size: 100 * 1024 * 1024,
                public_name_length: 8,
                name_retries: 10,
                compound_extensions: default_compound_extensions(),
            },
            paths: PathsConfig {
                marker_dir: PathBuf::from("./markers"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("SERVER_PORT", 3000)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./stash.db".to_string()),
            },
            storage: StorageConfig {
                endpoint: env::var("S3_ENDPOINT").ok(),
                bucket: required("S3_BUCKET")?,
                region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                put_timeout_secs: parsed("STORE_TIMEOUT_SECS", 30)?,
            },
            ingest: IngestConfig {
                url_prefix: required("URL_PREFIX")?,
                max_upload_size: parsed("MAX_UPLOAD_SIZE", 100 * 1024 * 1024)?,
                public_name_length: parsed("PUBLIC_NAME_LENGTH", 8)?,
                name_retries: parsed("NAME_RETRIES", 10)?,
                compound_extensions: match env::var("COMPOUND_EXTENSIONS") {
                    Ok(raw) => parse_extension_list(&raw),
                    Err(_) => default_compound_extensions(),
                },
            },
            paths: PathsConfig {
                marker_dir: PathBuf::from(required("MARKER_DIR")?),
            },
        })
    }

    /// Check filesystem preconditions that from_env cannot see.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.paths.marker_dir.is_dir() {
            return Err(ConfigError::MarkerDirMissing(self.paths.marker_dir.clone()));
        }
        Ok(())
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

fn parsed<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            var,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn default_compound_extensions() -> Vec<String> {
    parse_extension_list("tar.gz,tar.bz2,tar.xz,tar.zst")
}

/// Parse a comma-separated suffix list, normalizing away whitespace, empty
/// entries, and leading dots.
fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
