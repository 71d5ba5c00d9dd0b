//! Asynchronous command dispatch for cloudwire.
//!
//! A [`Command`] pairs a [`Request`] with the decoders for its success and
//! failure bodies. [`CommandDispatcher::submit`] signs it, exchanges it through
//! a [`Transport`] on a Tokio runtime, and settles the returned
//! [`CommandHandle`] exactly once.
//!
//! ```no_run
//! use cloudwire_core::ClientConfig;
//! use cloudwire_http::{CommandDispatcher, commands};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env();
//! let dispatcher = CommandDispatcher::from_config(&config)?;
//! let endpoint = config.endpoint.parse()?;
//! let buckets = dispatcher
//!     .submit(commands::s3::list_owned_buckets(&endpoint)?)
//!     .await?;
//! println!("{} buckets", buckets.len());
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod commands;
pub mod dispatch;
pub mod transport;

pub use cloudwire_auth::{Request, SignedRequest};
pub use command::{Command, CommandError, CommandHandle, CommandState, ResponseError};
pub use dispatch::{CommandDispatcher, DispatcherBuilder, DispatcherError};
pub use transport::{ReqwestTransport, Response, Transport, TransportError};
