//! S3-style bucket and object commands.

use cloudwire_auth::Request;
use cloudwire_xml::{CopyObjectDecoder, ListAllMyBucketsDecoder, ListBucketDecoder};
use http::Uri;

use super::{encode_key, encode_segment, endpoint_uri};
use crate::command::Command;

/// Optional parameters of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBucketOptions {
    /// Only list keys starting with this prefix.
    pub prefix: Option<String>,
    /// Start listing after this key.
    pub marker: Option<String>,
    /// Group keys sharing a prefix up to this delimiter.
    pub delimiter: Option<String>,
    /// Maximum number of keys to return.
    pub max_keys: Option<u32>,
}

impl ListBucketOptions {
    fn to_query(&self) -> String {
        let mut params = Vec::new();
        if let Some(delimiter) = &self.delimiter {
            params.push(format!("delimiter={}", encode_segment(delimiter)));
        }
        if let Some(marker) = &self.marker {
            params.push(format!("marker={}", encode_segment(marker)));
        }
        if let Some(max_keys) = self.max_keys {
            params.push(format!("max-keys={max_keys}"));
        }
        if let Some(prefix) = &self.prefix {
            params.push(format!("prefix={}", encode_segment(prefix)));
        }
        params.join("&")
    }
}

/// List the buckets owned by the signing identity.
///
/// # Errors
///
/// Returns [`http::Error`] if the endpoint cannot be extended into a request URI.
pub fn list_owned_buckets(endpoint: &Uri) -> Result<Command<ListAllMyBucketsDecoder>, http::Error> {
    let uri = endpoint_uri(endpoint, "/", None)?;
    Ok(Command::new(Request::get(uri), ListAllMyBucketsDecoder::new()))
}

/// List the contents of `bucket`.
///
/// # Errors
///
/// Returns [`http::Error`] if the bucket name or options do not form a valid URI.
pub fn list_bucket(
    endpoint: &Uri,
    bucket: &str,
    options: &ListBucketOptions,
) -> Result<Command<ListBucketDecoder>, http::Error> {
    let path = format!("/{}/", encode_segment(bucket));
    let uri = endpoint_uri(endpoint, &path, Some(&options.to_query()))?;
    Ok(Command::new(Request::get(uri), ListBucketDecoder::new()))
}

/// Copy an object server-side.
///
/// # Errors
///
/// Returns [`http::Error`] if the names do not form a valid URI or header.
pub fn copy_object(
    endpoint: &Uri,
    source_bucket: &str,
    source_key: &str,
    destination_bucket: &str,
    destination_key: &str,
) -> Result<Command<CopyObjectDecoder>, http::Error> {
    let path = format!(
        "/{}/{}",
        encode_segment(destination_bucket),
        encode_key(destination_key)
    );
    let uri = endpoint_uri(endpoint, &path, None)?;
    let source = format!("/{}/{}", encode_segment(source_bucket), encode_key(source_key));
    let request = Request::put(uri).try_header("x-amz-copy-source", &source)?;
    Ok(Command::new(request, CopyObjectDecoder::new()))
}
