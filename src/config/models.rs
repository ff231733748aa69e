use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub pixiv: PixivConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Externally reachable origin, used to build image proxy URLs
    #[serde(default = "default_public_url")]
    pub public_url: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_url: default_public_url(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

/// Outbound HTTP client shared by the Discord and Pixiv clients
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Discord application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscordConfig {
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
    /// Slash command handled by the dispatcher
    #[serde(default = "default_command_name")]
    pub command_name: String,
    /// Display name given to webhooks this service creates
    #[serde(default = "default_webhook_name")]
    pub webhook_name: String,
    /// Interaction signing key, hex (loaded from environment only)
    #[serde(skip)]
    pub public_key: Option<String>,
    /// Bot token (loaded from environment only)
    #[serde(skip)]
    pub bot_token: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: default_discord_api_base(),
            command_name: default_command_name(),
            webhook_name: default_webhook_name(),
            public_key: None,
            bot_token: None,
        }
    }
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v8".to_string()
}

fn default_command_name() -> String {
    "pixiv".to_string()
}

fn default_webhook_name() -> String {
    "Previews".to_string()
}

/// Pixiv upstream settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PixivConfig {
    #[serde(default = "default_ajax_base")]
    pub ajax_base: String,
    #[serde(default = "default_image_origin")]
    pub image_origin: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// `PHPSESSID` cookie value (loaded from environment only)
    #[serde(skip)]
    pub session_token: Option<String>,
}

impl Default for PixivConfig {
    fn default() -> Self {
        Self {
            ajax_base: default_ajax_base(),
            image_origin: default_image_origin(),
            referer: default_referer(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            session_token: None,
        }
    }
}

fn default_ajax_base() -> String {
    "https://www.pixiv.net/ajax".to_string()
}

fn default_image_origin() -> String {
    "https://i.pximg.net/".to_string()
}

fn default_referer() -> String {
    "https://www.pixiv.net/ajax".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.150 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en".to_string()
}

/// Background delivery settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Pending deliveries accepted before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Gallery fetches in flight per delivery; defaults to CPU parallelism
    #[serde(default)]
    pub fetch_concurrency: Option<usize>,
}

impl WorkerConfig {
    pub fn effective_fetch_concurrency(&self) -> usize {
        self.fetch_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            fetch_concurrency: None,
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}
