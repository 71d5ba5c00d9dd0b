//! The signing strategy seam.

use std::fmt;

use crate::error::AuthError;
use crate::request::{Request, SignedRequest};

/// Computes a request's authentication signature.
///
/// Implementations hold no mutable state besides their wire sink, so one
/// signer is shared by every in-flight command.
pub trait RequestSigner: Send + Sync + fmt::Debug {
    /// The canonical string this signer would sign for `request`.
    ///
    /// Pure: calling it does not touch the request or the wire log.
    fn string_to_sign(&self, request: &Request) -> String;

    /// Sign `request`, replacing any existing authorization.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the signature header cannot be produced.
    fn sign(&self, request: Request) -> Result<SignedRequest, AuthError>;
}

/// Passes requests through untouched, for anonymous endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedSigner;

impl RequestSigner for UnsignedSigner {
    fn string_to_sign(&self, _request: &Request) -> String {
        String::new()
    }

    fn sign(&self, request: Request) -> Result<SignedRequest, AuthError> {
        Ok(SignedRequest::new(request, String::new()))
    }
}
