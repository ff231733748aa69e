use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "ROXY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/roxy.toml";
const ENV_PREFIX: &str = "ROXY";
const ENV_SEPARATOR: &str = "__";

pub const PUBLIC_KEY_ENV: &str = "CLIENT_PUBLIC_KEY";
pub const BOT_TOKEN_ENV: &str = "DISCORD_TOKEN";
pub const SESSION_TOKEN_ENV: &str = "PIXIV_SESSION_TOKEN";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config, |name| env::var(name).ok());

    Ok(config)
}

/// Secrets are never read from TOML files, only from the environment
pub(crate) fn load_secrets(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    config.discord.public_key = lookup(PUBLIC_KEY_ENV);
    config.discord.bot_token = lookup(BOT_TOKEN_ENV);
    config.pixiv.session_token = lookup(SESSION_TOKEN_ENV);
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // ROXY__SERVER__PUBLIC_URL -> server.public_url
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
