//! Client configuration with validation.

use relay_bus::InMemoryRelay;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Default deadline for a request awaiting its response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest deadline a request may carry. Longer per-request overrides are
/// clamped to it; longer configured defaults fail validation.
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Largest relay broadcast capacity accepted by [`ClientConfig::validate`].
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

/// Environment variable overriding [`RequestConfig::default_timeout`].
pub const ENV_REQUEST_TIMEOUT: &str = "SESSION_RPC_REQUEST_TIMEOUT";
/// Environment variable overriding [`PendingConfig::cleanup_interval`].
pub const ENV_CLEANUP_INTERVAL: &str = "SESSION_RPC_CLEANUP_INTERVAL";
/// Environment variable overriding [`RelayConfig::channel_capacity`].
pub const ENV_CHANNEL_CAPACITY: &str = "SESSION_RPC_CHANNEL_CAPACITY";

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request lifecycle settings
    pub request: RequestConfig,
    /// Pending table housekeeping
    pub pending: PendingConfig,
    /// Relay and inbound buffering
    pub relay: RelayConfig,
}

impl ClientConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request.default_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "default request timeout cannot be 0".into(),
            ));
        }

        if self.request.default_timeout > MAX_REQUEST_TIMEOUT {
            return Err(ConfigError::InvalidTimeout(format!(
                "default request timeout cannot exceed {}s",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        if self.pending.cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "cleanup interval cannot be 0".into(),
            ));
        }

        if self.pending.cleanup_interval > MAX_REQUEST_TIMEOUT
            || self.pending.sweep_grace > MAX_REQUEST_TIMEOUT
        {
            return Err(ConfigError::InvalidTimeout(format!(
                "cleanup interval and sweep grace cannot exceed {}s",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        if self.relay.channel_capacity == 0 {
            return Err(ConfigError::InvalidLimit(
                "channel_capacity cannot be 0".into(),
            ));
        }

        if self.relay.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(ConfigError::InvalidLimit(format!(
                "channel_capacity cannot exceed {MAX_CHANNEL_CAPACITY}"
            )));
        }

        if self.relay.incoming_buffer == 0 {
            return Err(ConfigError::InvalidLimit(
                "incoming_buffer cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Load defaults, then apply overrides from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`. Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            match duration_serde::parse_duration(&raw) {
                Ok(timeout) => {
                    config.request.default_timeout = timeout;
                    info!(timeout_ms = timeout.as_millis() as u64, "Loaded request timeout from environment");
                }
                Err(e) => warn!(value = %raw, error = e, "Ignoring invalid {}", ENV_REQUEST_TIMEOUT),
            }
        }

        if let Some(raw) = lookup(ENV_CLEANUP_INTERVAL) {
            match duration_serde::parse_duration(&raw) {
                Ok(interval) => config.pending.cleanup_interval = interval,
                Err(e) => warn!(value = %raw, error = e, "Ignoring invalid {}", ENV_CLEANUP_INTERVAL),
            }
        }

        if let Some(raw) = lookup(ENV_CHANNEL_CAPACITY) {
            match raw.trim().parse() {
                Ok(capacity) => config.relay.channel_capacity = capacity,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_CHANNEL_CAPACITY),
            }
        }

        config
    }
}

/// Request lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Deadline applied when a request does not carry its own
    #[serde(with = "duration_serde")]
    pub default_timeout: Duration,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Pending table housekeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingConfig {
    /// How often the sweeper looks for entries whose timer was lost
    #[serde(with = "duration_serde")]
    pub cleanup_interval: Duration,
    /// Extra time past the deadline before the sweeper steps in
    #[serde(with = "duration_serde")]
    pub sweep_grace: Duration,
}

impl Default for PendingConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
            sweep_grace: Duration::from_secs(5),
        }
    }
}

/// Relay and inbound buffering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Broadcast capacity when the client builds its own relay
    pub channel_capacity: usize,
    /// Incoming requests buffered before the router applies backpressure
    pub incoming_buffer: usize,
}

impl RelayConfig {
    /// Build a relay sized by [`channel_capacity`](Self::channel_capacity).
    pub fn build_relay(&self) -> InMemoryRelay {
        InMemoryRelay::with_capacity(self.channel_capacity)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            channel_capacity: relay_bus::DEFAULT_CHANNEL_CAPACITY,
            incoming_buffer: 256,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Duration serialization as `"30s"`, `"500ms"` or `"2m"`.
pub(crate) mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" must be tried before "s" and "m"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            // Plain number means seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
