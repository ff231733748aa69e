use super::models::Config;
use super::sources::{BOT_TOKEN_ENV, PUBLIC_KEY_ENV, SESSION_TOKEN_ENV};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required secret {name} is not set")]
    MissingSecret { name: &'static str },

    #[error("{name} must be 32 bytes of hex, got {length} characters")]
    InvalidPublicKey { name: &'static str, length: usize },

    #[error("{field} must be an http(s) URL, got '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_secrets(config)?;
    validate_urls(config)?;
    validate_limits(config)?;
    Ok(())
}

/// All three secrets are startup-fatal when absent
fn validate_secrets(config: &Config) -> Result<(), ValidationError> {
    let public_key = require(config.discord.public_key.as_deref(), PUBLIC_KEY_ENV)?;
    require(config.discord.bot_token.as_deref(), BOT_TOKEN_ENV)?;
    require(config.pixiv.session_token.as_deref(), SESSION_TOKEN_ENV)?;

    let decoded = hex::decode(public_key.trim()).ok();
    if decoded.map(|bytes| bytes.len()) != Some(32) {
        return Err(ValidationError::InvalidPublicKey {
            name: PUBLIC_KEY_ENV,
            length: public_key.trim().len(),
        });
    }

    Ok(())
}

fn require<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ValidationError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::MissingSecret { name })
}

fn validate_urls(config: &Config) -> Result<(), ValidationError> {
    let urls = [
        ("server.public_url", &config.server.public_url),
        ("discord.api_base", &config.discord.api_base),
        ("pixiv.ajax_base", &config.pixiv.ajax_base),
        ("pixiv.image_origin", &config.pixiv.image_origin),
    ];

    for (field, value) in urls {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

fn validate_limits(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_body_bytes == 0 {
        return Err(ValidationError::NotPositive {
            field: "server.max_body_bytes",
        });
    }

    if config.worker.queue_capacity == 0 {
        return Err(ValidationError::NotPositive {
            field: "worker.queue_capacity",
        });
    }

    if config.worker.fetch_concurrency == Some(0) {
        return Err(ValidationError::NotPositive {
            field: "worker.fetch_concurrency",
        });
    }

    if config.http.request_timeout_secs == 0 {
        return Err(ValidationError::NotPositive {
            field: "http.request_timeout_secs",
        });
    }

    Ok(())
}
