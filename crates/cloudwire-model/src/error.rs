//! Provider error body representation.

use std::collections::BTreeMap;
use std::fmt;

/// Error code a provider returns when the signature it computed differs from ours.
pub const SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// A failed exchange's error body plus the identifiers needed to report it.
///
/// A degraded `ErrorInfo` (no code) is produced when the body was absent or
/// could not be decoded; it still carries the request identifiers read from
/// the response headers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorInfo {
    /// Provider error code (e.g. `NoSuchBucket`).
    pub code: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Request identifier assigned by the provider.
    pub request_id: Option<String>,
    /// Secondary request token (S3's `x-amz-id-2`).
    pub request_token: Option<String>,
    /// The string this client signed, attached for signature mismatches only.
    pub string_to_sign: Option<String>,
    /// Resource the error refers to.
    pub resource: Option<String>,
    /// Host identifier from the body.
    pub host_id: Option<String>,
    /// Any other leaf elements of the error body (e.g. `StringToSignBytes`).
    pub details: BTreeMap<String, String>,
}

impl ErrorInfo {
    /// An error carrying only header-derived identifiers.
    #[must_use]
    pub fn from_identifiers(request_id: Option<String>, request_token: Option<String>) -> Self {
        Self {
            request_id,
            request_token,
            ..Self::default()
        }
    }

    /// Whether the provider rejected our signature.
    #[must_use]
    pub fn is_signature_mismatch(&self) -> bool {
        self.code.as_deref() == Some(SIGNATURE_DOES_NOT_MATCH)
    }

    /// Whether this error was built without a decoded body.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.code.is_none()
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code.as_deref().unwrap_or("UnknownError"))?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request id {request_id})")?;
        }
        Ok(())
    }
}
