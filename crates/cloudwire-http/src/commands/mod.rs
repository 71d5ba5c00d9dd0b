//! Builders for the commands this client ships with.

pub mod s3;
pub mod vcloud;

use http::Uri;
use http::uri::PathAndQuery;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in a path segment (everything but RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters escaped in an object key, which keeps its `/` separators.
const KEY: &AsciiSet = &SEGMENT.remove(b'/');

pub(crate) fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

pub(crate) fn encode_key(value: &str) -> String {
    utf8_percent_encode(value, KEY).to_string()
}

/// Join `path` (and an optional query) onto the endpoint's scheme, authority
/// and base path.
pub(crate) fn endpoint_uri(endpoint: &Uri, path: &str, query: Option<&str>) -> Result<Uri, http::Error> {
    let base = endpoint.path().trim_end_matches('/');
    let path_and_query = match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{base}{path}?{query}"),
        None => format!("{base}{path}"),
    };

    let mut parts = endpoint.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}
