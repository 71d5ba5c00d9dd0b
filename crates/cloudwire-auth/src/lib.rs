//! Request signing for cloudwire commands.
//!
//! A [`RequestSigner`] turns a [`Request`] into a [`SignedRequest`] that
//! remembers the string its signature covers. [`SigV2Signer`] implements AWS
//! Signature Version 2 (HMAC-SHA1); [`UnsignedSigner`] is for anonymous
//! endpoints.

pub mod credentials;
pub mod error;
pub mod request;
pub mod signer;
pub mod sigv2;

pub use credentials::Credentials;
pub use error::AuthError;
pub use request::{Request, SignedRequest};
pub use signer::{RequestSigner, UnsignedSigner};
pub use sigv2::SigV2Signer;
