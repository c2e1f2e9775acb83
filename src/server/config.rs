//! Configuration loading for playd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.playbadge/config.toml` (user)
//! 3. `/etc/playbadge/config.toml` (system)
//!
//! Without any file the built-in defaults apply. The `PORT` environment
//! variable, when set, replaces the port of the bind address.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::extract::DEFAULT_STORE_URL;
use crate::service::BadgeServiceBuilder;
use crate::{BadgeError, BadgeService, CacheConfig, Result};

/// Environment variable overriding the bind port.
pub const PORT_ENV: &str = "PORT";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8080).
    #[serde(default = "default_address")]
    pub address: String,
    /// `Cache-Control: max-age` sent with badges (default: 10000).
    #[serde(default = "default_max_age")]
    pub cache_control_max_age: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            cache_control_max_age: default_max_age(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_age() -> u32 {
    10_000
}

/// Cache tier capacities; 0 means unbounded.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_pages")]
    pub pages: usize,
    #[serde(default = "default_documents")]
    pub documents: usize,
    #[serde(default = "default_badges")]
    pub badges: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            pages: defaults.pages,
            documents: defaults.documents,
            badges: defaults.badges,
        }
    }
}

fn default_pages() -> usize {
    CacheConfig::default().pages
}

fn default_documents() -> usize {
    CacheConfig::default().documents
}

fn default_badges() -> usize {
    CacheConfig::default().badges
}

impl From<&CacheSection> for CacheConfig {
    fn from(section: &CacheSection) -> Self {
        CacheConfig::new()
            .pages(section.pages)
            .documents(section.documents)
            .badges(section.badges)
    }
}

/// Store page source.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// URL prefix the url-encoded app id is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_STORE_URL.to_string()
}

fn default_timeout() -> u64 {
    crate::service::DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Load configuration from the standard locations, then apply `PORT`.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided, must exist)
    /// 2. `~/.playbadge/config.toml`
    /// 3. `/etc/playbadge/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        if let Ok(port) = std::env::var(PORT_ENV) {
            config.override_port(&port)?;
        }
        Ok(config)
    }

    /// Parse a single config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BadgeError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            BadgeError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Replace the port of the bind address.
    pub fn override_port(&mut self, port: &str) -> Result<()> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| BadgeError::Configuration(format!("Invalid {PORT_ENV} {port:?}: {e}")))?;
        let host = match self.server.address.rsplit_once(':') {
            Some((host, _)) => host,
            None => self.server.address.as_str(),
        };
        self.server.address = format!("{host}:{port}");
        Ok(())
    }

    /// A service builder configured from this file.
    pub fn service_builder(&self) -> BadgeServiceBuilder {
        BadgeService::builder()
            .cache_config(CacheConfig::from(&self.cache))
            .store_url(&self.upstream.base_url)
            .timeout_secs(self.upstream.timeout_secs)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(BadgeError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".playbadge").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/playbadge/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
