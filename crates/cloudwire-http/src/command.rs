//! Commands, their lifecycle, and the handle callers await.
//!
//! A command moves through `Built -> Signed -> Dispatched` and then into
//! exactly one terminal state. Every transition is a compare-and-swap on a
//! shared atomic, so a command that was cancelled cannot also succeed, and the
//! result is delivered through a oneshot channel that can only be sent once.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll, ready};

use cloudwire_auth::{AuthError, Request};
use cloudwire_model::ErrorInfo;
use cloudwire_xml::{DecodeError, Decoder, S3ErrorDecoder};
use http::StatusCode;
use pin_project_lite::pin_project;
use tokio::sync::{Notify, oneshot};
use uuid::Uuid;

use crate::transport::TransportError;

/// One request/response exchange with the decoders for either outcome.
#[derive(Debug)]
pub struct Command<D, E = S3ErrorDecoder> {
    request: Request,
    decoder: D,
    error_decoder: E,
}

impl<D: Decoder> Command<D> {
    /// A command whose failures carry S3-style error bodies.
    #[must_use]
    pub fn new(request: Request, decoder: D) -> Self {
        Self {
            request,
            decoder,
            error_decoder: S3ErrorDecoder::new(),
        }
    }
}

impl<D: Decoder, E: Decoder<Output = ErrorInfo>> Command<D, E> {
    /// Swap the error decoder.
    #[must_use]
    pub fn with_error_decoder<F: Decoder<Output = ErrorInfo>>(self, error_decoder: F) -> Command<D, F> {
        Command {
            request: self.request,
            decoder: self.decoder,
            error_decoder,
        }
    }

    /// The request this command sends.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the request, e.g. to add headers before submission.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub(crate) fn into_parts(self) -> (Request, D, E) {
        (self.request, self.decoder, self.error_decoder)
    }
}

/// Where a command is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandState {
    /// Submitted, not yet signed.
    Built = 0,
    /// Signed, waiting for a worker permit.
    Signed = 1,
    /// The request has been handed to the transport.
    Dispatched = 2,
    /// Settled with a decoded result.
    Succeeded = 3,
    /// Settled with an error.
    Failed = 4,
    /// Settled by cancellation.
    Cancelled = 5,
}

impl CommandState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Built,
            1 => Self::Signed,
            2 => Self::Dispatched,
            3 => Self::Succeeded,
            4 => Self::Failed,
            _ => Self::Cancelled,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// A failed exchange: the status plus what could be read from the error body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {info}")]
pub struct ResponseError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Decoded (or degraded) error body.
    pub info: ErrorInfo,
}

/// Why a command did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider answered with a non-success status.
    #[error("provider error {0}")]
    Response(Box<ResponseError>),

    /// A success response could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(#[from] DecodeError),

    /// The request could not be signed; nothing was sent.
    #[error("failed to sign request: {0}")]
    Sign(#[from] AuthError),

    /// The command was cancelled.
    #[error("command cancelled")]
    Cancelled,

    /// The worker executing the command went away without settling it.
    #[error("command abandoned by its worker")]
    Abandoned,
}

impl CommandError {
    /// The provider error body, for [`CommandError::Response`].
    #[must_use]
    pub fn error_info(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Response(err) => Some(&err.info),
            _ => None,
        }
    }

    /// The response status, for [`CommandError::Response`].
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response(err) => Some(err.status),
            _ => None,
        }
    }
}

impl From<ResponseError> for CommandError {
    fn from(err: ResponseError) -> Self {
        Self::Response(Box::new(err))
    }
}

/// Lifecycle state shared between a handle and the worker running its command.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    id: Uuid,
    state: AtomicU8,
    cancel: Notify,
}

impl Lifecycle {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            state: AtomicU8::new(CommandState::Built as u8),
            cancel: Notify::new(),
        })
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn state(&self) -> CommandState {
        CommandState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move from `from` to `to`; fails if another transition happened first.
    pub(crate) fn advance(&self, from: CommandState, to: CommandState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Move to `Cancelled` unless already terminal.
    pub(crate) fn cancel(&self) -> bool {
        let mut current = self.state();
        while !current.is_terminal() {
            if self.advance(current, CommandState::Cancelled) {
                self.cancel.notify_waiters();
                return true;
            }
            current = self.state();
        }
        false
    }

    /// Resolves once the command has been cancelled.
    pub(crate) async fn cancelled(&self) {
        loop {
            let notified = self.cancel.notified();
            if self.state() == CommandState::Cancelled {
                return;
            }
            notified.await;
        }
    }

    /// Record the terminal state for `result`.
    ///
    /// A command cancelled while its result was being produced stays
    /// cancelled, and the result is discarded.
    pub(crate) fn settle<T>(&self, result: Result<T, CommandError>) -> Result<T, CommandError> {
        let target = match &result {
            Ok(_) => CommandState::Succeeded,
            Err(CommandError::Cancelled) => CommandState::Cancelled,
            Err(_) => CommandState::Failed,
        };
        let mut current = self.state();
        loop {
            if current.is_terminal() {
                debug_assert_eq!(current, CommandState::Cancelled, "command settled twice");
                return Err(CommandError::Cancelled);
            }
            if self.advance(current, target) {
                return result;
            }
            current = self.state();
        }
    }

    fn abandon(&self) {
        let mut current = self.state();
        while !current.is_terminal() {
            if self.advance(current, CommandState::Failed) {
                return;
            }
            current = self.state();
        }
    }
}

pub(crate) type Settlement<T> = oneshot::Sender<Result<T, CommandError>>;

pin_project! {
    /// The caller's view of a submitted command.
    ///
    /// Await it for the result, poll [`CommandHandle::state`], or block with
    /// [`CommandHandle::wait_blocking`] outside the runtime. The handle always
    /// resolves: a worker that disappears yields [`CommandError::Abandoned`].
    pub struct CommandHandle<T> {
        #[pin]
        rx: oneshot::Receiver<Result<T, CommandError>>,
        lifecycle: Arc<Lifecycle>,
    }
}

impl<T> CommandHandle<T> {
    pub(crate) fn new(lifecycle: Arc<Lifecycle>) -> (Self, Settlement<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { rx, lifecycle }, tx)
    }

    /// A handle that is already settled with `error`.
    pub(crate) fn failed(lifecycle: Arc<Lifecycle>, error: CommandError) -> Self {
        let (handle, tx) = Self::new(lifecycle);
        let settled = handle.lifecycle.settle::<T>(Err(error));
        // The receiver is alive in `handle`.
        let _ = tx.send(settled);
        handle
    }

    /// Identifier used in log output for this command.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.lifecycle.id()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CommandState {
        self.lifecycle.state()
    }

    /// Whether the command has reached a terminal state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state().is_terminal()
    }

    /// Request cancellation.
    ///
    /// Before dispatch this keeps the request from being sent. After dispatch
    /// the in-flight exchange is abandoned and its result discarded. Returns
    /// `false` if the command had already settled.
    pub fn cancel(&self) -> bool {
        self.lifecycle.cancel()
    }

    /// Block the current thread until the command settles.
    ///
    /// Must not be called from within an async context.
    pub fn wait_blocking(self) -> Result<T, CommandError> {
        match self.rx.blocking_recv() {
            Ok(result) => result,
            Err(_) => {
                self.lifecycle.abandon();
                Err(CommandError::Abandoned)
            }
        }
    }
}

impl<T> Future for CommandHandle<T> {
    type Output = Result<T, CommandError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        match ready!(this.rx.poll(cx)) {
            Ok(result) => Poll::Ready(result),
            Err(_) => {
                this.lifecycle.abandon();
                Poll::Ready(Err(CommandError::Abandoned))
            }
        }
    }
}

impl<T> fmt::Debug for CommandHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle")
            .field("id", &self.lifecycle.id())
            .field("state", &self.lifecycle.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_should_follow_lifecycle_transitions() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), CommandState::Built);
        assert!(lifecycle.advance(CommandState::Built, CommandState::Signed));
        assert!(!lifecycle.advance(CommandState::Built, CommandState::Signed));
        assert!(lifecycle.advance(CommandState::Signed, CommandState::Dispatched));
        assert_eq!(lifecycle.settle(Ok::<_, CommandError>(7)).unwrap(), 7);
        assert_eq!(lifecycle.state(), CommandState::Succeeded);
        assert!(!lifecycle.cancel());
    }

    #[test]
    fn test_should_discard_result_after_cancellation() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.advance(CommandState::Built, CommandState::Signed));
        assert!(lifecycle.advance(CommandState::Signed, CommandState::Dispatched));
        assert!(lifecycle.cancel());
        let settled = lifecycle.settle(Ok::<_, CommandError>("late"));
        assert!(matches!(settled, Err(CommandError::Cancelled)));
        assert_eq!(lifecycle.state(), CommandState::Cancelled);
    }

    #[test]
    fn test_should_map_failure_to_failed_state() {
        let lifecycle = Lifecycle::new();
        let settled = lifecycle.settle::<()>(Err(CommandError::Transport(TransportError::Timeout)));
        assert!(matches!(settled, Err(CommandError::Transport(TransportError::Timeout))));
        assert_eq!(lifecycle.state(), CommandState::Failed);
    }

    #[tokio::test]
    async fn test_should_resolve_abandoned_when_worker_drops() {
        let (handle, tx) = CommandHandle::<u32>::new(Lifecycle::new());
        drop(tx);
        let result = handle.await;
        assert!(matches!(result, Err(CommandError::Abandoned)));
    }

    #[tokio::test]
    async fn test_should_wake_cancelled_waiters() {
        let lifecycle = Lifecycle::new();
        let waiter = {
            let lifecycle = Arc::clone(&lifecycle);
            tokio::spawn(async move { lifecycle.cancelled().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(lifecycle.cancel());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancellation wakes waiter")
            .unwrap();
    }

    #[tokio::test]
    async fn test_should_settle_failed_handle_immediately() {
        let handle = CommandHandle::<()>::failed(Lifecycle::new(), CommandError::Sign(AuthError::InvalidKey));
        assert!(handle.is_settled());
        assert_eq!(handle.state(), CommandState::Failed);
        assert!(matches!(handle.await, Err(CommandError::Sign(_))));
    }

    #[test]
    fn test_should_expose_error_info() {
        let err = CommandError::from(ResponseError {
            status: StatusCode::FORBIDDEN,
            info: ErrorInfo::from_identifiers(Some("req".to_owned()), None),
        });
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(
            err.error_info().and_then(|i| i.request_id.as_deref()),
            Some("req")
        );
    }
}
