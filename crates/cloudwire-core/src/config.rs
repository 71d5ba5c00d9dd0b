//! Client configuration.
//!
//! [`ClientConfig`] collects the settings the command runtime consumes: where
//! to send requests, which API version the decoders should assume, the signing
//! identity, and worker-pool and diagnostics knobs. Values can be loaded from
//! environment variables via [`ClientConfig::from_env`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{CoreError, CoreResult};
use crate::version::ApiVersion;

/// Configuration for a cloudwire client.
///
/// # Examples
///
/// ```
/// use cloudwire_core::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.endpoint, "http://localhost:4566");
/// assert_eq!(config.max_concurrent_commands, 0);
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base endpoint requests are sent to.
    #[builder(default = String::from("http://localhost:4566"))]
    pub endpoint: String,

    /// Provider API version; affects legacy status-code interpretation.
    #[builder(default)]
    pub api_version: ApiVersion,

    /// Access key / user identity used for signing.
    #[builder(default, setter(strip_option))]
    pub identity: Option<String>,

    /// Secret paired with `identity`. Never serialized.
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing, default)]
    pub credential: Option<String>,

    /// Maximum number of commands exchanged concurrently. `0` means unbounded.
    #[builder(default = 0)]
    pub max_concurrent_commands: usize,

    /// Per-request timeout handed to the transport, in seconds.
    #[builder(default = 60)]
    pub request_timeout_secs: u64,

    /// Whether signing and exchange bytes are written to the wire log.
    #[builder(default = false)]
    pub wire_log: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://localhost:4566"),
            api_version: ApiVersion::default(),
            identity: None,
            credential: None,
            max_concurrent_commands: 0,
            request_timeout_secs: 60,
            wire_log: false,
            log_level: String::from("info"),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("identity", &self.identity)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .field("max_concurrent_commands", &self.max_concurrent_commands)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("wire_log", &self.wire_log)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CLOUDWIRE_ENDPOINT` | `http://localhost:4566` |
    /// | `CLOUDWIRE_API_VERSION` | `1.0` |
    /// | `CLOUDWIRE_IDENTITY` | *(unset)* |
    /// | `CLOUDWIRE_CREDENTIAL` | *(unset)* |
    /// | `CLOUDWIRE_MAX_CONCURRENT_COMMANDS` | `0` |
    /// | `CLOUDWIRE_REQUEST_TIMEOUT_SECS` | `60` |
    /// | `CLOUDWIRE_WIRE_LOG` | `false` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Unparseable numbers keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("CLOUDWIRE_ENDPOINT") {
            config.endpoint = v;
        }
        if let Ok(v) = std::env::var("CLOUDWIRE_API_VERSION") {
            config.api_version = ApiVersion::new(v);
        }
        if let Ok(v) = std::env::var("CLOUDWIRE_IDENTITY") {
            config.identity = Some(v);
        }
        if let Ok(v) = std::env::var("CLOUDWIRE_CREDENTIAL") {
            config.credential = Some(v);
        }
        if let Ok(v) = std::env::var("CLOUDWIRE_MAX_CONCURRENT_COMMANDS") {
            if let Ok(n) = v.parse::<usize>() {
                config.max_concurrent_commands = n;
            }
        }
        if let Ok(v) = std::env::var("CLOUDWIRE_REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.request_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("CLOUDWIRE_WIRE_LOG") {
            config.wire_log = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the endpoint is empty, the timeout is
    /// zero, or only one half of the identity/credential pair is set.
    pub fn validate(&self) -> CoreResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(CoreError::Config("endpoint must not be empty".to_owned()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request timeout must be at least one second".to_owned(),
            ));
        }
        if self.identity.is_some() != self.credential.is_some() {
            return Err(CoreError::Config(
                "identity and credential must be configured together".to_owned(),
            ));
        }
        Ok(())
    }

    /// The request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
