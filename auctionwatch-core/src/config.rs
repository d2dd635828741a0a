// Realtime client configuration

use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Environment variable holding the backend WebSocket endpoint
pub const ENDPOINT_ENV_VAR: &str = "AUCTIONWATCH_WS_URL";

const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8000/ws";

/// Realtime connection configuration
///
/// The endpoint is resolved once, at construction; there is no runtime
/// reconfiguration of a live manager.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// WebSocket endpoint of the auction tracker backend
    pub endpoint: String,
    /// Timeout for a single connect attempt
    pub connect_timeout: Duration,
    /// Reconnect schedule after unplanned closures
    pub retry: RetryPolicy,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl RealtimeConfig {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Self {
        let endpoint = env::var(ENDPOINT_ENV_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Self {
            endpoint,
            ..Self::default()
        }
    }

    /// Create configuration builder
    pub fn builder() -> RealtimeConfigBuilder {
        RealtimeConfigBuilder::default()
    }
}

/// Realtime configuration builder
#[derive(Default)]
pub struct RealtimeConfigBuilder {
    endpoint: Option<String>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl RealtimeConfigBuilder {
    /// Set the backend WebSocket endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the connect attempt timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the reconnect schedule
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build configuration
    pub fn build(self) -> RealtimeConfig {
        let default = RealtimeConfig::default();

        RealtimeConfig {
            endpoint: self.endpoint.unwrap_or(default.endpoint),
            connect_timeout: self.connect_timeout.unwrap_or(default.connect_timeout),
            retry: self.retry.unwrap_or(default.retry),
        }
    }
}
