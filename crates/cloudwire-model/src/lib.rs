//! Domain result types for cloudwire.
//!
//! Every type here is an immutable value assembled once by a decoder in
//! `cloudwire-xml` at the end of a document. The set is deliberately narrow:
//! S3-style bucket and object listings, vCloud appliances, the DMTF CIM
//! records embedded in them, and the provider error body.

pub mod cim;
pub mod error;
pub mod multimap;
pub mod s3;
pub mod vcloud;

pub use error::ErrorInfo;
pub use multimap::ListMultimap;
