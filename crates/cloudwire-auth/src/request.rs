//! Outbound request representation shared by signers and transports.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Uri};

/// A request ready to be signed.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// Create a request without headers or body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A `GET` request.
    #[must_use]
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// A `PUT` request.
    #[must_use]
    pub fn put(uri: Uri) -> Self {
        Self::new(Method::PUT, uri)
    }

    /// Set a header, replacing any previous values.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a header from strings.
    ///
    /// # Errors
    ///
    /// Returns [`http::Error`] if the name or value is not valid in a header.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self, http::Error> {
        let name = HeaderName::try_from(name)?;
        let value = HeaderValue::try_from(value)?;
        Ok(self.with_header(name, value))
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The request body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// A header value as text, or `""` when absent or not visible ASCII.
    #[must_use]
    pub fn header_str(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// The target host, from the URI or else the `Host` header.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.uri.host().or_else(|| {
            self.headers
                .get(http::header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(|h| h.split(':').next().unwrap_or(h))
        })
    }
}

/// A request that has passed through a signer.
///
/// Keeps the exact string the signature was computed over so it can be
/// compared against what a provider reports on a signature mismatch.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    request: Request,
    string_to_sign: String,
}

impl SignedRequest {
    /// Pair a request with the string its signature covers.
    #[must_use]
    pub fn new(request: Request, string_to_sign: String) -> Self {
        Self {
            request,
            string_to_sign,
        }
    }

    /// The signed request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The string the signature was computed over. Empty for unsigned requests.
    #[must_use]
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// Take the request back.
    #[must_use]
    pub fn into_request(self) -> Request {
        self.request
    }
}
