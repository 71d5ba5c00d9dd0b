//! Shared building blocks for the cloudwire client runtime.
//!
//! This crate holds the pieces every other cloudwire crate consumes:
//!
//! - [`config`]: [`ClientConfig`], loaded from the environment or built in code
//! - [`date`]: normalization of irregular provider ISO 8601 timestamps
//! - [`wire`]: the wire-log sink used for signature debugging
//! - [`version`] and [`media_type`]: the provider configuration surface that
//!   decoders consult
//! - [`telemetry`]: tracing subscriber bootstrap

pub mod config;
pub mod date;
mod error;
pub mod media_type;
pub mod telemetry;
pub mod version;
pub mod wire;

pub use config::ClientConfig;
pub use date::{DateParseError, normalize, parse_iso8601};
pub use error::{CoreError, CoreResult};
pub use version::ApiVersion;
pub use wire::{NoopWire, WireChannel, WireSink};
