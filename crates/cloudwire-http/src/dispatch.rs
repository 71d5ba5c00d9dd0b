//! The command dispatcher.
//!
//! [`CommandDispatcher::submit`] stamps and signs a command's request on the
//! caller's thread, then runs the exchange as a Tokio task:
//!
//! 1. Wait for a worker permit when concurrency is bounded
//! 2. Hand the signed request to the [`Transport`]
//! 3. Stream a 2xx body through the success decoder
//! 4. Otherwise stream the body through the error decoder and build an
//!    [`ErrorInfo`], attaching the string-to-sign on signature mismatches
//! 5. Settle the handle exactly once
//!
//! Cancellation is observed at every await point of the task.

use std::fmt::Write as _;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use cloudwire_auth::{
    AuthError, Credentials, Request, RequestSigner, SigV2Signer, SignedRequest, UnsignedSigner,
};
use cloudwire_core::date::format_http_date;
use cloudwire_core::wire::{self, TracingWire, WireChannel, WireSink};
use cloudwire_core::{ClientConfig, CoreError};
use cloudwire_model::ErrorInfo;
use cloudwire_xml::{Decoder, parse_bytes};
use http::HeaderValue;
use http::header::{AUTHORIZATION, DATE};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::command::{
    Command, CommandError, CommandHandle, CommandState, Lifecycle, ResponseError,
};
use crate::transport::{ReqwestTransport, Response, Transport, TransportError};

/// Response header carrying the provider's request id.
pub const REQUEST_ID_HEADER: &str = "x-amz-request-id";

/// Response header carrying the provider's secondary request token.
pub const REQUEST_TOKEN_HEADER: &str = "x-amz-id-2";

/// Errors raised while building a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    /// The dispatcher was built outside a Tokio runtime and given no handle.
    #[error("no Tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] CoreError),

    /// The configured credentials could not be used.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The transport could not be built.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

struct Shared {
    transport: Arc<dyn Transport>,
    signer: Arc<dyn RequestSigner>,
    wire: Arc<dyn WireSink>,
    limiter: Option<Arc<Semaphore>>,
}

/// Submits commands and settles their handles.
///
/// Cheap to clone; clones share the transport, signer, wire sink and worker
/// bound.
#[derive(Clone)]
pub struct CommandDispatcher {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("transport", &self.shared.transport)
            .field("signer", &self.shared.signer)
            .field("wire_enabled", &self.shared.wire.enabled())
            .field(
                "max_concurrent_commands",
                &self.shared.limiter.as_ref().map(|_| "bounded"),
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`CommandDispatcher`].
#[derive(Debug)]
pub struct DispatcherBuilder {
    transport: Arc<dyn Transport>,
    signer: Arc<dyn RequestSigner>,
    wire: Arc<dyn WireSink>,
    max_concurrent_commands: usize,
    runtime: Option<Handle>,
}

impl DispatcherBuilder {
    /// Sign requests with `signer` instead of sending them unsigned.
    #[must_use]
    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = signer;
        self
    }

    /// Record request and response heads to `wire`.
    #[must_use]
    pub fn wire(mut self, wire: Arc<dyn WireSink>) -> Self {
        self.wire = wire;
        self
    }

    /// Bound concurrent exchanges. `0` means unbounded.
    #[must_use]
    pub fn max_concurrent_commands(mut self, limit: usize) -> Self {
        self.max_concurrent_commands = limit;
        self
    }

    /// Spawn commands onto `runtime` instead of the current one.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::NoRuntime`] if no runtime handle was given
    /// and the builder is not running inside one.
    pub fn build(self) -> Result<CommandDispatcher, DispatcherError> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()?,
        };
        let limiter =
            (self.max_concurrent_commands > 0).then(|| Arc::new(Semaphore::new(self.max_concurrent_commands)));
        Ok(CommandDispatcher {
            shared: Arc::new(Shared {
                transport: self.transport,
                signer: self.signer,
                wire: self.wire,
                limiter,
            }),
            runtime,
        })
    }
}

impl CommandDispatcher {
    /// Start building a dispatcher over `transport`.
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>) -> DispatcherBuilder {
        DispatcherBuilder {
            transport,
            signer: Arc::new(UnsignedSigner),
            wire: wire::noop(),
            max_concurrent_commands: 0,
            runtime: None,
        }
    }

    /// Build a dispatcher from configuration: a `reqwest` transport, SigV2
    /// signing when an identity is configured, and tracing-backed wire logging
    /// when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError`] if the configuration is invalid or no
    /// runtime is available.
    pub fn from_config(config: &ClientConfig) -> Result<Self, DispatcherError> {
        config.validate()?;
        let wire: Arc<dyn WireSink> = if config.wire_log {
            Arc::new(TracingWire)
        } else {
            wire::noop()
        };
        let signer: Arc<dyn RequestSigner> = if config.identity.is_some() {
            Arc::new(SigV2Signer::new(Credentials::from_config(config)?).with_wire(Arc::clone(&wire)))
        } else {
            Arc::new(UnsignedSigner)
        };
        Self::builder(Arc::new(ReqwestTransport::from_config(config)?))
            .signer(signer)
            .wire(wire)
            .max_concurrent_commands(config.max_concurrent_commands)
            .build()
    }

    /// The signer shared by every command.
    #[must_use]
    pub fn signer(&self) -> &Arc<dyn RequestSigner> {
        &self.shared.signer
    }

    /// Submit a command.
    ///
    /// The request gets a `Date` header if it has none, is signed, and is then
    /// exchanged on the runtime. Signing failures settle the handle
    /// immediately without sending anything.
    pub fn submit<D, E>(&self, command: Command<D, E>) -> CommandHandle<D::Output>
    where
        D: Decoder + Send + 'static,
        D::Output: Send + 'static,
        E: Decoder<Output = ErrorInfo> + Send + 'static,
    {
        let lifecycle = Lifecycle::new();
        let (request, decoder, error_decoder) = command.into_parts();

        let signed = match stamp_date(request).and_then(|r| self.shared.signer.sign(r)) {
            Ok(signed) => signed,
            Err(e) => {
                warn!(command = %lifecycle.id(), error = %e, "Failed to sign command");
                return CommandHandle::failed(lifecycle, CommandError::Sign(e));
            }
        };
        if !lifecycle.advance(CommandState::Built, CommandState::Signed) {
            return CommandHandle::failed(lifecycle, CommandError::Cancelled);
        }
        debug!(
            command = %lifecycle.id(),
            method = %signed.request().method(),
            uri = %signed.request().uri(),
            "Submitting command"
        );

        let (handle, settlement) = CommandHandle::new(Arc::clone(&lifecycle));
        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            let result = shared
                .exchange(&lifecycle, &signed, decoder, error_decoder)
                .await;
            let result = lifecycle.settle(result);
            match &result {
                Ok(_) => info!(command = %lifecycle.id(), "Command succeeded"),
                Err(e) => info!(command = %lifecycle.id(), error = %e, "Command failed"),
            }
            // The caller may have dropped the handle; nobody is left to tell.
            let _ = settlement.send(result);
        });
        handle
    }
}

impl Shared {
    async fn exchange<D, E>(
        &self,
        lifecycle: &Lifecycle,
        signed: &SignedRequest,
        decoder: D,
        error_decoder: E,
    ) -> Result<D::Output, CommandError>
    where
        D: Decoder,
        E: Decoder<Output = ErrorInfo>,
    {
        let _permit = match &self.limiter {
            Some(limiter) => tokio::select! {
                permit = Arc::clone(limiter).acquire_owned() => {
                    Some(permit.map_err(|_| CommandError::Abandoned)?)
                }
                () = lifecycle.cancelled() => return Err(CommandError::Cancelled),
            },
            None => None,
        };

        if !lifecycle.advance(CommandState::Signed, CommandState::Dispatched) {
            return Err(CommandError::Cancelled);
        }
        if self.wire.enabled() {
            self.wire
                .record(WireChannel::Request, render_request(signed.request()).as_bytes());
        }

        let response = tokio::select! {
            response = self.transport.execute(signed) => response?,
            () = lifecycle.cancelled() => return Err(CommandError::Cancelled),
        };
        debug!(command = %lifecycle.id(), status = %response.status, "Received response");
        if self.wire.enabled() {
            self.wire
                .record(WireChannel::Response, &render_response(&response));
        }

        if response.is_success() {
            let body = response.body.unwrap_or_default();
            return parse_bytes(body, decoder).map_err(CommandError::Decode);
        }

        let info = self.error_info(lifecycle, &response, signed, error_decoder);
        Err(ResponseError {
            status: response.status,
            info,
        }
        .into())
    }

    /// Build the [`ErrorInfo`] for a failed response, degrading to header
    /// identifiers when the body is absent or undecodable.
    fn error_info<E>(
        &self,
        lifecycle: &Lifecycle,
        response: &Response,
        signed: &SignedRequest,
        error_decoder: E,
    ) -> ErrorInfo
    where
        E: Decoder<Output = ErrorInfo>,
    {
        let mut info = match response.body.as_ref().filter(|b| !b.is_empty()) {
            Some(body) => match parse_bytes(Bytes::clone(body), error_decoder) {
                Ok(info) => info,
                Err(e) => {
                    warn!(
                        command = %lifecycle.id(),
                        status = %response.status,
                        error = %e,
                        "Failed to decode error body; reporting header identifiers only"
                    );
                    ErrorInfo::default()
                }
            },
            None => {
                warn!(
                    command = %lifecycle.id(),
                    status = %response.status,
                    "Error response has no body; reporting header identifiers only"
                );
                ErrorInfo::default()
            }
        };

        if let Some(id) = response.header_str(REQUEST_ID_HEADER) {
            info.request_id = Some(id.to_owned());
        }
        if let Some(token) = response.header_str(REQUEST_TOKEN_HEADER) {
            info.request_token = Some(token.to_owned());
        }
        if info.is_signature_mismatch() {
            info.string_to_sign = Some(self.signer.string_to_sign(signed.request()));
        }
        info
    }
}

/// Add an RFC 1123 `Date` header unless the request already carries a date.
fn stamp_date(mut request: Request) -> Result<Request, AuthError> {
    if !request.headers().contains_key(DATE) && !request.headers().contains_key("x-amz-date") {
        let value = HeaderValue::try_from(format_http_date(Utc::now()))?;
        request.headers_mut().insert(DATE, value);
    }
    Ok(request)
}

fn render_request(request: &Request) -> String {
    let mut out = format!("{} {}\n", request.method(), request.uri());
    for (name, value) in request.headers() {
        let value = if *name == AUTHORIZATION {
            "***"
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        let _ = writeln!(out, "{name}: {value}");
    }
    out
}

fn render_response(response: &Response) -> Vec<u8> {
    let mut out = format!("{}\n", response.status);
    for (name, value) in &response.headers {
        let _ = writeln!(out, "{name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    out.push('\n');
    let mut bytes = out.into_bytes();
    if let Some(body) = &response.body {
        bytes.extend_from_slice(body);
    }
    bytes
}
