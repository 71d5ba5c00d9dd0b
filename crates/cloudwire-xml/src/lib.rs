//! Streaming, event-driven XML decoding for cloudwire responses.
//!
//! [`engine`] drives `quick-xml` over a byte stream and pushes parse events
//! into a [`Decoder`]. The provider decoders live next to it:
//!
//! - [`s3`]: bucket listings, object listings, copy results, error bodies
//! - [`cim`]: `System` and `Item` records of a virtual hardware section
//! - [`vcloud`]: appliances (nesting the CIM decoders) and error bodies

pub mod cim;
pub mod engine;
pub mod error;
pub mod s3;
pub mod vcloud;

pub use engine::{
    Attributes, Decoder, EventSink, ParseEvent, TextBuffer, parse, parse_bytes, parse_slice,
};
pub use error::DecodeError;
pub use s3::{CopyObjectDecoder, ListAllMyBucketsDecoder, ListBucketDecoder, S3ErrorDecoder};
pub use vcloud::{StatusRule, VAppDecoder, VCloudErrorDecoder};
