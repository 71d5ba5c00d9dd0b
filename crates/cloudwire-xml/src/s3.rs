//! Decoders for S3-style listings, copy results and error bodies.

use chrono::{DateTime, Utc};
use cloudwire_model::ErrorInfo;
use cloudwire_model::s3::{
    BucketMetadata, CanonicalUser, CopyObjectResult, ListBucketResponse, ObjectMetadata,
};

use crate::engine::{
    Attributes, Decoder, EventSink, TextBuffer, non_empty, parse_bool, parse_timestamp,
    parse_value,
};
use crate::error::DecodeError;

/// Strip the quotes providers wrap entity tags in.
fn unquote(tag: &str) -> String {
    tag.trim_matches('"').to_owned()
}

/// Decodes a `ListAllMyBucketsResult` into the caller's buckets.
///
/// The single `Owner` block applies to every bucket, so the owner is attached
/// when the result is extracted rather than as each bucket closes.
#[derive(Debug, Default)]
pub struct ListAllMyBucketsDecoder {
    text: TextBuffer,
    owner_id: Option<String>,
    owner_display_name: Option<String>,
    name: Option<String>,
    creation_date: Option<DateTime<Utc>>,
    buckets: Vec<(String, DateTime<Utc>)>,
}

impl ListAllMyBucketsDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for ListAllMyBucketsDecoder {
    fn on_start(&mut self, name: &str, _attributes: &Attributes) -> Result<(), DecodeError> {
        self.text.clear();
        if name == "Bucket" {
            self.name = None;
            self.creation_date = None;
        }
        Ok(())
    }

    fn on_end(&mut self, name: &str) -> Result<(), DecodeError> {
        let text = self.text.take();
        match name {
            "ID" => self.owner_id = non_empty(text),
            "DisplayName" => self.owner_display_name = non_empty(text),
            "Name" => self.name = non_empty(text),
            "CreationDate" => self.creation_date = Some(parse_timestamp(name, &text)?),
            "Bucket" => {
                let bucket_name = self
                    .name
                    .take()
                    .ok_or_else(|| DecodeError::MissingElement("Bucket/Name".to_owned()))?;
                let created = self.creation_date.take().ok_or_else(|| {
                    DecodeError::MissingElement("Bucket/CreationDate".to_owned())
                })?;
                self.buckets.push((bucket_name, created));
            }
            _ => {}
        }
        Ok(())
    }

    fn on_text(&mut self, fragment: &str) {
        self.text.push(fragment);
    }
}

impl Decoder for ListAllMyBucketsDecoder {
    type Output = Vec<BucketMetadata>;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        let owner = self.owner_id.take().map(|id| CanonicalUser {
            id,
            display_name: self.owner_display_name.take(),
        });
        let buckets = std::mem::take(&mut self.buckets)
            .into_iter()
            .map(|(name, creation_date)| BucketMetadata {
                name,
                creation_date,
                owner: owner.clone(),
            })
            .collect();
        *self = Self::default();
        Ok(buckets)
    }
}

/// Decodes a `ListBucketResult` into a [`ListBucketResponse`].
///
/// `Prefix` appears both at the top level and inside `CommonPrefixes`, and
/// `ID`/`DisplayName` only inside an entry's `Owner`; the decoder tracks which
/// block it is in to tell them apart.
#[derive(Debug, Default)]
pub struct ListBucketDecoder {
    text: TextBuffer,
    response: ListBucketResponse,
    in_contents: bool,
    in_common_prefixes: bool,
    current: ObjectMetadata,
    owner_id: Option<String>,
    owner_display_name: Option<String>,
}

impl ListBucketDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for ListBucketDecoder {
    fn on_start(&mut self, name: &str, _attributes: &Attributes) -> Result<(), DecodeError> {
        self.text.clear();
        match name {
            "Contents" => {
                self.in_contents = true;
                self.current = ObjectMetadata::default();
            }
            "CommonPrefixes" => self.in_common_prefixes = true,
            "Owner" => {
                self.owner_id = None;
                self.owner_display_name = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_end(&mut self, name: &str) -> Result<(), DecodeError> {
        let text = self.text.take();
        if self.in_contents {
            match name {
                "Key" => self.current.key = text,
                "LastModified" => {
                    self.current.last_modified = Some(parse_timestamp(name, &text)?);
                }
                "ETag" => self.current.e_tag = non_empty(unquote(&text)),
                "Size" => self.current.size = Some(parse_value(name, &text)?),
                "ID" => self.owner_id = non_empty(text),
                "DisplayName" => self.owner_display_name = non_empty(text),
                "Owner" => {
                    self.current.owner = self.owner_id.take().map(|id| CanonicalUser {
                        id,
                        display_name: self.owner_display_name.take(),
                    });
                }
                "StorageClass" => self.current.storage_class = non_empty(text),
                "Contents" => {
                    if self.current.key.is_empty() {
                        return Err(DecodeError::MissingElement("Contents/Key".to_owned()));
                    }
                    self.response
                        .contents
                        .push(std::mem::take(&mut self.current));
                    self.in_contents = false;
                }
                _ => {}
            }
            return Ok(());
        }

        if self.in_common_prefixes {
            match name {
                "Prefix" => {
                    if !text.is_empty() {
                        self.response.common_prefixes.push(text);
                    }
                }
                "CommonPrefixes" => self.in_common_prefixes = false,
                _ => {}
            }
            return Ok(());
        }

        match name {
            "Name" => self.response.bucket_name = text,
            "Prefix" => self.response.prefix = non_empty(text),
            "Marker" => self.response.marker = non_empty(text),
            "NextMarker" => self.response.next_marker = non_empty(text),
            "Delimiter" => self.response.delimiter = non_empty(text),
            "MaxKeys" => {
                if !text.is_empty() {
                    self.response.max_keys = Some(parse_value(name, &text)?);
                }
            }
            "IsTruncated" => self.response.truncated = parse_bool(name, &text)?,
            _ => {}
        }
        Ok(())
    }

    fn on_text(&mut self, fragment: &str) {
        self.text.push(fragment);
    }
}

impl Decoder for ListBucketDecoder {
    type Output = ListBucketResponse;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        let response = std::mem::take(&mut self.response);
        *self = Self::default();
        Ok(response)
    }
}

/// Decodes a `CopyObjectResult`.
#[derive(Debug, Default)]
pub struct CopyObjectDecoder {
    text: TextBuffer,
    last_modified: Option<DateTime<Utc>>,
    e_tag: Option<String>,
}

impl CopyObjectDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for CopyObjectDecoder {
    fn on_start(&mut self, _name: &str, _attributes: &Attributes) -> Result<(), DecodeError> {
        self.text.clear();
        Ok(())
    }

    fn on_end(&mut self, name: &str) -> Result<(), DecodeError> {
        let text = self.text.take();
        match name {
            "LastModified" => self.last_modified = Some(parse_timestamp(name, &text)?),
            "ETag" => self.e_tag = non_empty(unquote(&text)),
            _ => {}
        }
        Ok(())
    }

    fn on_text(&mut self, fragment: &str) {
        self.text.push(fragment);
    }
}

impl Decoder for CopyObjectDecoder {
    type Output = CopyObjectResult;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        let last_modified = self
            .last_modified
            .take()
            .ok_or_else(|| DecodeError::MissingElement("LastModified".to_owned()))?;
        let e_tag = self
            .e_tag
            .take()
            .ok_or_else(|| DecodeError::MissingElement("ETag".to_owned()))?;
        Ok(CopyObjectResult {
            last_modified,
            e_tag,
        })
    }
}

/// Decodes an S3 `Error` body into an [`ErrorInfo`].
///
/// Well-known leaves land in their own fields; any other non-empty leaf (such
/// as `StringToSign` or `SignatureProvided`) is kept in `details`.
#[derive(Debug, Default)]
pub struct S3ErrorDecoder {
    text: TextBuffer,
    info: ErrorInfo,
}

impl S3ErrorDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for S3ErrorDecoder {
    fn on_start(&mut self, _name: &str, _attributes: &Attributes) -> Result<(), DecodeError> {
        self.text.clear();
        Ok(())
    }

    fn on_end(&mut self, name: &str) -> Result<(), DecodeError> {
        let text = self.text.take();
        match name {
            "Code" => self.info.code = non_empty(text),
            "Message" => self.info.message = non_empty(text),
            "RequestId" => self.info.request_id = non_empty(text),
            "HostId" => self.info.host_id = non_empty(text),
            "Resource" => self.info.resource = non_empty(text),
            "Error" => {}
            other => {
                if !text.is_empty() {
                    self.info.details.insert(other.to_owned(), text);
                }
            }
        }
        Ok(())
    }

    fn on_text(&mut self, fragment: &str) {
        self.text.push(fragment);
    }
}

impl Decoder for S3ErrorDecoder {
    type Output = ErrorInfo;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        self.text.clear();
        Ok(std::mem::take(&mut self.info))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::engine::parse_slice;

    const OWNER_ID: &str = "e1a5f66a480ca99a4fdfe8e318c3020446c9989d7004e7778029fbcc5d990fa0";

    const LIST_ALL_MY_BUCKETS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner>
    <ID>e1a5f66a480ca99a4fdfe8e318c3020446c9989d7004e7778029fbcc5d990fa0</ID>
    <DisplayName>adrianjbosstest</DisplayName>
  </Owner>
  <Buckets>
    <Bucket>
      <Name>adrianjbosstest</Name>
      <CreationDate>2009-03-12T02:00:07.000Z</CreationDate>
    </Bucket>
    <Bucket>
      <Name>adrianjbosstest2</Name>
      <CreationDate>2009-03-12T02:00:09.000Z</CreationDate>
    </Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;

    const LIST_BUCKET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>adrianjbosstest</Name>
  <Prefix></Prefix>
  <Marker></Marker>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>3366</Key>
    <LastModified>2009-03-12T02:00:13.000Z</LastModified>
    <ETag>&quot;9d7bb64e8e18ee34eec06dd2cf37b766&quot;</ETag>
    <Size>136</Size>
    <Owner>
      <ID>e1a5f66a480ca99a4fdfe8e318c3020446c9989d7004e7778029fbcc5d990fa0</ID>
      <DisplayName>ferncam</DisplayName>
    </Owner>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
  <CommonPrefixes>
    <Prefix>photos/</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#;

    #[test]
    fn test_should_decode_bucket_list_with_shared_owner() {
        let buckets =
            parse_slice(LIST_ALL_MY_BUCKETS.as_bytes(), ListAllMyBucketsDecoder::new()).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].name, "adrianjbosstest");
        assert_eq!(buckets[1].name, "adrianjbosstest2");
        assert_eq!(
            buckets[0].creation_date,
            Utc.with_ymd_and_hms(2009, 3, 12, 2, 0, 7).unwrap()
        );
        assert_eq!(
            buckets[1].creation_date,
            Utc.with_ymd_and_hms(2009, 3, 12, 2, 0, 9).unwrap()
        );
        let expected = CanonicalUser::new(OWNER_ID).with_display_name("adrianjbosstest");
        for bucket in &buckets {
            assert_eq!(bucket.owner.as_ref(), Some(&expected));
        }
    }

    #[test]
    fn test_should_decode_empty_bucket_list() {
        let xml = "<ListAllMyBucketsResult><Owner><ID>abc</ID></Owner><Buckets/></ListAllMyBucketsResult>";
        let buckets = parse_slice(xml.as_bytes(), ListAllMyBucketsDecoder::new()).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_should_require_bucket_name() {
        let xml = "<ListAllMyBucketsResult><Buckets><Bucket>\
                   <CreationDate>2009-03-12T02:00:07.000Z</CreationDate>\
                   </Bucket></Buckets></ListAllMyBucketsResult>";
        let err = parse_slice(xml.as_bytes(), ListAllMyBucketsDecoder::new()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement(ref e) if e == "Bucket/Name"));
    }

    #[test]
    fn test_should_decode_bucket_contents() {
        let listing = parse_slice(LIST_BUCKET.as_bytes(), ListBucketDecoder::new()).unwrap();

        assert_eq!(listing.bucket_name, "adrianjbosstest");
        assert_eq!(listing.prefix, None);
        assert_eq!(listing.marker, None);
        assert_eq!(listing.max_keys, Some(1000));
        assert!(!listing.is_truncated());
        assert_eq!(listing.len(), 1);

        let object = &listing.contents[0];
        assert_eq!(object.key, "3366");
        assert_eq!(
            object.last_modified,
            Some(Utc.with_ymd_and_hms(2009, 3, 12, 2, 0, 13).unwrap())
        );
        assert_eq!(
            object.e_tag.as_deref(),
            Some("9d7bb64e8e18ee34eec06dd2cf37b766")
        );
        assert_eq!(object.size, Some(136));
        assert_eq!(
            object.owner,
            Some(CanonicalUser::new(OWNER_ID).with_display_name("ferncam"))
        );
        assert_eq!(object.storage_class.as_deref(), Some("STANDARD"));
        assert_eq!(listing.common_prefixes, vec!["photos/"]);
    }

    #[test]
    fn test_should_fail_fast_on_non_numeric_size() {
        let xml = LIST_BUCKET.replace("<Size>136</Size>", "<Size>lots</Size>");
        let err = parse_slice(xml.as_bytes(), ListBucketDecoder::new()).unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidValue { ref element, ref value, .. } if element == "Size" && value == "lots")
        );
    }

    #[test]
    fn test_should_decode_copy_result() {
        let xml = r#"<CopyObjectResult>
            <LastModified>2009-03-19T13:23:27.000Z</LastModified>
            <ETag>"92836a3ea45a6984d1b4d23a747d46bb"</ETag>
        </CopyObjectResult>"#;
        let result = parse_slice(xml.as_bytes(), CopyObjectDecoder::new()).unwrap();
        assert_eq!(
            result.last_modified,
            Utc.with_ymd_and_hms(2009, 3, 19, 13, 23, 27).unwrap()
        );
        assert_eq!(result.e_tag, "92836a3ea45a6984d1b4d23a747d46bb");
    }

    #[test]
    fn test_should_require_copy_etag() {
        let xml = "<CopyObjectResult><LastModified>2009-03-19T13:23:27.000Z</LastModified></CopyObjectResult>";
        let err = parse_slice(xml.as_bytes(), CopyObjectDecoder::new()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement(ref e) if e == "ETag"));
    }

    #[test]
    fn test_should_decode_error_body_with_details() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>SignatureDoesNotMatch</Code>
  <Message>The request signature we calculated does not match the signature you provided.</Message>
  <StringToSignBytes>47 45 54</StringToSignBytes>
  <RequestId>7A84C3CD4437A4C0</RequestId>
  <HostId>fbskVU51OZJg2yZS/wNIxoE2PmCf0ZqFd0iH6Vrzw0uKG3KmokswBytL/Bfp/GWb</HostId>
  <SignatureProvided>xyz=</SignatureProvided>
  <StringToSign>GET


Thu, 19 Mar 2009 17:48:01 GMT
/</StringToSign>
  <AWSAccessKeyId>0101100101001001</AWSAccessKeyId>
</Error>"#;
        let info = parse_slice(xml.as_bytes(), S3ErrorDecoder::new()).unwrap();
        assert!(info.is_signature_mismatch());
        assert_eq!(info.request_id.as_deref(), Some("7A84C3CD4437A4C0"));
        assert!(info.host_id.is_some());
        assert_eq!(
            info.details.get("SignatureProvided").map(String::as_str),
            Some("xyz=")
        );
        assert!(info.details.contains_key("StringToSign"));
        assert!(info.string_to_sign.is_none());
    }
}
