//! Environment-driven client configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `BALLOT_WS_HOST` | `localhost:8000` |
//! | `BALLOT_API_URL` | `http://localhost:8000` |
//! | `BALLOT_SECURE` | `true` iff the API URL is https |
//! | `BALLOT_RECONNECT_DELAY_MS` | `3000` |
//! | `BALLOT_MAX_RECONNECT_ATTEMPTS` | `5` |

use std::time::Duration;

use url::Url;

use crate::error::ClientError;
use crate::infrastructure::websocket::shared::{
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY_MS,
};

pub const DEFAULT_WS_HOST: &str = "localhost:8000";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Fixed-delay, bounded reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host[:port]` of the game server's WebSocket listener
    pub ws_host: String,
    /// Base URL for the lobby REST endpoints
    pub api_base: Url,
    /// Use `wss` instead of `ws`
    pub secure: bool,
    pub reconnect: ReconnectPolicy,
}

impl ClientConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let ws_host = get("BALLOT_WS_HOST").unwrap_or_else(|| DEFAULT_WS_HOST.to_string());

        let api_raw = get("BALLOT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base = Url::parse(&api_raw)
            .map_err(|e| ClientError::Config(format!("BALLOT_API_URL '{api_raw}': {e}")))?;

        let secure = match get("BALLOT_SECURE") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ClientError::Config(format!("BALLOT_SECURE '{raw}'")))?,
            None => api_base.scheme() == "https",
        };

        let mut reconnect = ReconnectPolicy::default();
        if let Some(raw) = get("BALLOT_RECONNECT_DELAY_MS") {
            let ms: u64 = raw.parse().map_err(|e| {
                ClientError::Config(format!("BALLOT_RECONNECT_DELAY_MS '{raw}': {e}"))
            })?;
            reconnect.delay = Duration::from_millis(ms);
        }
        if let Some(raw) = get("BALLOT_MAX_RECONNECT_ATTEMPTS") {
            reconnect.max_attempts = raw.parse().map_err(|e| {
                ClientError::Config(format!("BALLOT_MAX_RECONNECT_ATTEMPTS '{raw}': {e}"))
            })?;
        }

        Ok(Self {
            ws_host,
            api_base,
            secure,
            reconnect,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
