//! Configuration management for roxy
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use roxy::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `ROXY__<section>__<key>`
//!
//! Examples:
//! - `ROXY__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `ROXY__SERVER__PUBLIC_URL=https://roxy.example.com`
//! - `ROXY__WORKER__FETCH_CONCURRENCY=4`
//!
//! # Secrets
//!
//! `CLIENT_PUBLIC_KEY`, `DISCORD_TOKEN` and `PIXIV_SESSION_TOKEN` are read from
//! the environment only. A missing secret fails [`Config::load`].
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/roxy.toml`.
//! This can be overridden using the `ROXY_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{
    Config, DiscordConfig, HttpConfig, PixivConfig, ServerConfig, WorkerConfig,
};
pub use sources::{BOT_TOKEN_ENV, PUBLIC_KEY_ENV, SESSION_TOKEN_ENV};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`ROXY__*`)
    /// 2. TOML file (default: `config/roxy.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - A secret is missing or the public key is not valid hex
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, with secrets from `lookup`
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(
        path: std::path::PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = sources::load_from_sources(path)?;
        sources::load_secrets(&mut config, lookup);
        validation::validate(&config)?;
        Ok(config)
    }

    /// Session token validated at load time
    pub fn pixiv_session_token(&self) -> &str {
        self.pixiv.session_token.as_deref().unwrap_or_default()
    }

    /// Bot token validated at load time
    pub fn discord_bot_token(&self) -> &str {
        self.discord.bot_token.as_deref().unwrap_or_default()
    }

    /// Public key validated at load time
    pub fn discord_public_key(&self) -> &str {
        self.discord.public_key.as_deref().unwrap_or_default()
    }
}
