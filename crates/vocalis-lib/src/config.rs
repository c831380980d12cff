//! Webhook configuration.
//!
//! The CLI fills this from flags and environment variables; the library only
//! holds defaults and validation.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use vocalis_core::types::OutputFormat;

use crate::provider::DEFAULT_MODEL;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PATH: &str = "/alexa";
pub const HEALTH_PATH: &str = "/health";
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);
/// Just under the 15 minute idle cutoff common on free hosting tiers.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(14 * 60);

/// Everything `serve` needs.
#[derive(Debug, Clone)]
pub struct SkillConfig {
    pub api_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub model: String,
    pub format: OutputFormat,
    /// Route the skill requests are POSTed to.
    pub path: String,
    pub provider_timeout: Duration,
    pub keepalive: KeepaliveConfig,
}

/// Periodic self-ping settings.
#[derive(Debug, Clone)]
pub struct KeepaliveConfig {
    /// URL to GET on every tick. `None` disables the task.
    pub url: Option<String>,
    pub interval: Duration,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            format: OutputFormat::default(),
            path: DEFAULT_PATH.to_string(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            keepalive: KeepaliveConfig::default(),
        }
    }
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            url: None,
            interval: DEFAULT_KEEPALIVE_INTERVAL,
        }
    }
}

/// Errors that make a configuration unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing provider API key (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error(
        "invalid skill path '{0}': must start with '/', differ from /health and contain no ':', '*', '{{' or '}}'"
    )]
    InvalidPath(String),

    #[error("provider timeout must be greater than zero")]
    ZeroTimeout,

    #[error("model name must not be empty")]
    EmptyModel,

    #[error("invalid keep-alive URL '{0}': must be http:// or https://")]
    InvalidKeepaliveUrl(String),
}

impl SkillConfig {
    /// Check the configuration before anything is bound or spawned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if !valid_path(&self.path) {
            return Err(ConfigError::InvalidPath(self.path.clone()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if self.provider_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if let Some(url) = &self.keepalive.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidKeepaliveUrl(url.clone()));
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// A literal route: rooted, not the health route, and free of the characters
/// the router reads as captures or wildcards.
fn valid_path(path: &str) -> bool {
    path.starts_with('/')
        && path != HEALTH_PATH
        && !path.contains([':', '*', '{', '}'])
}
