//! Decoding error types.

/// Errors raised while turning an XML document into a domain result.
///
/// Decoding fails fast: the first malformed value aborts the document and no
/// partial result is produced.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// An error from the underlying quick-xml reader.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An entity or character reference could not be resolved.
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Element names, attribute values or text were not valid UTF-8.
    #[error("invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Text could not be decoded.
    #[error("XML text decoding error: {0}")]
    Encoding(String),

    /// The input contained no root element.
    #[error("document has no root element")]
    EmptyDocument,

    /// The input ended before the root element was closed.
    #[error("document ended inside <{0}>")]
    UnexpectedEof(String),

    /// A required element was missing when the result was assembled.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// A required attribute was missing from an element.
    #[error("missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        /// Element that should carry the attribute.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Text or an attribute value could not be interpreted.
    #[error("invalid value {value:?} in <{element}>: {reason}")]
    InvalidValue {
        /// Element (or `element@attribute`) holding the value.
        element: String,
        /// The offending raw value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

impl DecodeError {
    /// Build an [`DecodeError::InvalidValue`].
    pub fn invalid(
        element: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            element: element.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
