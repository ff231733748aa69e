//! Outbound HTTP client construction
//!
//! One `reqwest::Client` is built per process and handed to the Pixiv and
//! Discord clients, so both share a connection pool.
//!
//! The client itself only bounds connects and individual reads. A total
//! deadline would also cover streamed image bodies, so JSON calls set
//! theirs per request instead.

use reqwest::Client;
use std::time::Duration;

use crate::config::HttpConfig;

const USER_AGENT: &str = concat!("roxy/", env!("CARGO_PKG_VERSION"));

/// Per-request deadline used by clients not given one explicitly
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_client(config: &HttpConfig) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(config.request_timeout())
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}
