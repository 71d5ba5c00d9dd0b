//! Error types for request signing.

/// Errors raised while signing or checking a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The secret could not be used as an HMAC key.
    #[error("Invalid signing key")]
    InvalidKey,

    /// A computed header value is not a valid HTTP header.
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// No identity/credential pair is configured.
    #[error("Missing credentials")]
    MissingCredentials,

    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The header was signed by a different access key.
    #[error("Access key mismatch: {0}")]
    AccessKeyMismatch(String),

    /// The recomputed signature does not match the one on the request.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}
