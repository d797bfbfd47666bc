//! Server (PDS) configuration.

use serde::{Deserialize, Serialize};

/// Host used when no server is configured.
pub const DEFAULT_SERVER_URL: &str = "https://bsky.social";

fn default_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base URL of the server hosting the account, without a trailing `/xrpc`.
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}
