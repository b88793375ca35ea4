//! Client configuration.

use crate::error::{WsError, WsResult};
use serde::Deserialize;
use std::path::Path;

/// Connection manager configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server address as `host[:port][/path]`, without any scheme.
    /// The `ws` scheme is added by the client.
    pub server_url: String,
    /// Auth token to send to the server after connecting.
    ///
    /// If set, a message of kind "authorization" carrying the token as
    /// content is sent as soon as the connection opens, before any
    /// queued user messages. The server should verify it before
    /// trusting the connection.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Enables verbose per-event diagnostics. Warnings and errors are
    /// emitted regardless of this setting.
    #[serde(default)]
    pub debug: bool,
    /// Whether to automatically reconnect when the connection closes,
    /// for any reason. Default: true.
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,
    /// Maximum number of automatic reconnection attempts. Default: 5.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnection attempts (ms). Default: 5000.
    #[serde(default = "default_auto_reconnect_timeout_ms")]
    pub auto_reconnect_timeout_ms: u64,
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_auto_reconnect_timeout_ms() -> u64 {
    5_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            auth_token: None,
            debug: false,
            auto_reconnect: default_auto_reconnect(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            auto_reconnect_timeout_ms: default_auto_reconnect_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for a server address with defaults for
    /// everything else.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> WsResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WsError::InvalidConfig(format!("failed to read config file: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| WsError::InvalidConfig(format!("failed to parse config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, failing fast on misuse.
    pub fn validate(&self) -> WsResult<()> {
        if self.server_url.is_empty() {
            return Err(WsError::InvalidConfig("server_url is required".to_string()));
        }
        if self.server_url.contains("://") {
            return Err(WsError::InvalidConfig(format!(
                "server_url must not include a scheme: {}",
                self.server_url
            )));
        }
        Ok(())
    }

    /// Full WebSocket URL for this configuration.
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.server_url)
    }
}
