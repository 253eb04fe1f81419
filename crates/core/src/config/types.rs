use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

pub use crate::catalog::CatalogConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Config with defaults everywhere except the catalog key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            catalog: CatalogConfig::new(api_key),
            search: SearchConfig::default(),
            storage: StorageConfig::default(),
            app: AppConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Search pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) never reach the catalog.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
        }
    }
}

fn default_min_query_len() -> usize {
    3
}

/// Durable storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Slot holding the watched list.
    #[serde(default = "default_watched_key")]
    pub watched_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            watched_key: default_watched_key(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("popcorn.db")
}

fn default_watched_key() -> String {
    "watched".to_string()
}

/// Controller configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Page title when no movie detail is showing.
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Prefix for the page title while a movie detail is showing.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// Capacity of the controller command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            title_prefix: default_title_prefix(),
            command_buffer: default_command_buffer(),
        }
    }
}

fn default_title() -> String {
    "usePopcorn".to_string()
}

fn default_title_prefix() -> String {
    "Movie | ".to_string()
}

fn default_command_buffer() -> usize {
    64
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: SanitizedCatalogConfig,
    pub search: SearchConfig,
    pub storage: StorageConfig,
    pub app: AppConfig,
    pub server: ServerConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.base_url.clone(),
                api_key_configured: !config.catalog.api_key.is_empty(),
                timeout_secs: config.catalog.timeout_secs,
            },
            search: config.search.clone(),
            storage: config.storage.clone(),
            app: config.app.clone(),
            server: config.server.clone(),
        }
    }
}
