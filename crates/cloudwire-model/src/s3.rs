//! S3-style bucket and object listings.

use chrono::{DateTime, Utc};

/// The owner of a bucket or object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUser {
    /// Canonical user id.
    pub id: String,
    /// Display name, when the provider returns one.
    pub display_name: Option<String>,
}

impl CanonicalUser {
    /// Create an owner with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// One entry of a `ListAllMyBucketsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketMetadata {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
    /// Owner shared by every bucket in the listing.
    pub owner: Option<CanonicalUser>,
}

/// One `Contents` entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectMetadata {
    /// Object key.
    pub key: String,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// Entity tag with surrounding quotes removed.
    pub e_tag: Option<String>,
    /// Size in bytes.
    pub size: Option<u64>,
    /// Object owner.
    pub owner: Option<CanonicalUser>,
    /// Storage class (e.g. `STANDARD`).
    pub storage_class: Option<String>,
}

impl ObjectMetadata {
    /// The entity tag decoded as an MD5 digest.
    ///
    /// Returns `None` when the tag is absent or not plain hex, as with
    /// multipart uploads (`<hex>-<parts>`).
    #[must_use]
    pub fn e_tag_bytes(&self) -> Option<Vec<u8>> {
        self.e_tag.as_deref().and_then(|t| hex::decode(t).ok())
    }
}

/// Result of listing the contents of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListBucketResponse {
    /// Bucket the listing belongs to.
    pub bucket_name: String,
    /// Prefix the listing was restricted to.
    pub prefix: Option<String>,
    /// Marker the listing started after.
    pub marker: Option<String>,
    /// Marker to continue from when truncated.
    pub next_marker: Option<String>,
    /// Delimiter used to group common prefixes.
    pub delimiter: Option<String>,
    /// Maximum number of keys requested.
    pub max_keys: Option<u32>,
    /// Whether more results are available.
    pub truncated: bool,
    /// Object entries in listing order.
    pub contents: Vec<ObjectMetadata>,
    /// Common prefixes in listing order.
    pub common_prefixes: Vec<String>,
}

impl ListBucketResponse {
    /// Number of object entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the listing holds no object entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Whether more results are available.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Iterate over object entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ObjectMetadata> {
        self.contents.iter()
    }
}

impl<'a> IntoIterator for &'a ListBucketResponse {
    type Item = &'a ObjectMetadata;
    type IntoIter = std::slice::Iter<'a, ObjectMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.contents.iter()
    }
}

/// Result of a server-side copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectResult {
    /// Modification time of the new object.
    pub last_modified: DateTime<Utc>,
    /// Entity tag of the new object, quotes removed.
    pub e_tag: String,
}
