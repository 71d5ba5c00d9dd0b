//! The streaming decoder engine.
//!
//! Documents are never materialized. [`parse`] pulls events from a
//! `quick-xml` reader over any [`BufRead`] and pushes them, one at a time, into
//! a [`Decoder`]:
//!
//! ```text
//! bytes -> quick_xml::Reader -> ParseEvent -> Decoder (-> child decoders)
//!                                                 |
//!                                  end of document v
//!                                              extract() -> domain result
//! ```
//!
//! A decoder reacts to the element names it owns and forwards everything else
//! to its children, in a fixed order, through [`forward`]. Children keep their
//! own [`TextBuffer`]s, so text captured by one never shows up in another.
//!
//! Element and attribute names are delivered as local names: a namespace
//! prefix (`rasd:`, `ovf:`) is stripped, and `xmlns` declarations are dropped.

use std::io::BufRead;
use std::str::FromStr;

use bytes::{Buf, Bytes};
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::DecodeError;

/// One parse event of a well-nested document.
#[derive(Debug, Clone, Copy)]
pub enum ParseEvent<'a> {
    /// An element was opened.
    Start {
        /// Local element name.
        name: &'a str,
        /// The element's attributes.
        attributes: &'a Attributes,
    },
    /// An element was closed.
    End {
        /// Local element name.
        name: &'a str,
    },
    /// A text fragment. One text node may arrive as several fragments.
    Text(&'a str),
}

/// A consumer of parse events.
///
/// This half of the decoder contract is object safe, so a parent can hold its
/// children as an ordered list of `&mut dyn EventSink`.
pub trait EventSink {
    /// An element was opened.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if an attribute value is malformed.
    fn on_start(&mut self, name: &str, attributes: &Attributes) -> Result<(), DecodeError>;

    /// An element was closed.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the element's text is malformed.
    fn on_end(&mut self, name: &str) -> Result<(), DecodeError>;

    /// A text fragment arrived.
    fn on_text(&mut self, fragment: &str);

    /// Route one event to the matching callback.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error.
    fn on_event(&mut self, event: ParseEvent<'_>) -> Result<(), DecodeError> {
        match event {
            ParseEvent::Start { name, attributes } => self.on_start(name, attributes),
            ParseEvent::End { name } => self.on_end(name),
            ParseEvent::Text(fragment) => {
                self.on_text(fragment);
                Ok(())
            }
        }
    }
}

/// A stateful event consumer that yields one typed result.
pub trait Decoder: EventSink {
    /// The domain result.
    type Output;

    /// Hand over the accumulated result and reset to an empty state.
    ///
    /// The engine only calls this after the end of the document. Parents call
    /// it on a child right after forwarding the end of the child's
    /// sub-structure, which lets one child instance decode a run of repeated
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingElement`] if a required part never arrived.
    fn extract(&mut self) -> Result<Self::Output, DecodeError>;
}

/// Forward one event to each child, in order, stopping at the first error.
///
/// # Errors
///
/// Propagates the first child error.
pub fn forward(children: &mut [&mut dyn EventSink], event: ParseEvent<'_>) -> Result<(), DecodeError> {
    for child in children.iter_mut() {
        child.on_event(event)?;
    }
    Ok(())
}

/// Forward an element start to each child, in order.
///
/// # Errors
///
/// Propagates the first child error.
pub fn forward_start(
    children: &mut [&mut dyn EventSink],
    name: &str,
    attributes: &Attributes,
) -> Result<(), DecodeError> {
    forward(children, ParseEvent::Start { name, attributes })
}

/// Forward an element end to each child, in order.
///
/// # Errors
///
/// Propagates the first child error.
pub fn forward_end(children: &mut [&mut dyn EventSink], name: &str) -> Result<(), DecodeError> {
    forward(children, ParseEvent::End { name })
}

/// Forward a text fragment to each child, in order.
pub fn forward_text(children: &mut [&mut dyn EventSink], fragment: &str) {
    for child in children.iter_mut() {
        child.on_text(fragment);
    }
}

/// Ordered element attributes, keyed by local name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// An empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the first attribute named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether an attribute named `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Value of a mandatory attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingAttribute`] naming `element`.
    pub fn require(&self, element: &str, name: &str) -> Result<&str, DecodeError> {
        self.get(name).ok_or_else(|| DecodeError::MissingAttribute {
            element: element.to_owned(),
            attribute: name.to_owned(),
        })
    }

    /// Parse an optional attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidValue`] naming `element@name` when the
    /// attribute is present but does not parse.
    pub fn parse<T>(&self, element: &str, name: &str) -> Result<Option<T>, DecodeError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|raw| parse_value(&format!("{element}@{name}"), raw))
            .transpose()
    }

    /// Iterate over `(name, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let mut attributes = Self::new();
        for attr in start.attributes() {
            let attr = attr?;
            let raw_key = attr.key.as_ref();
            if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
                continue;
            }
            let key = std::str::from_utf8(attr.key.local_name().as_ref())?.to_owned();
            let raw_value = std::str::from_utf8(&attr.value)?;
            let value = quick_xml::escape::unescape(raw_value)?;
            attributes.push(key, value.into_owned());
        }
        Ok(attributes)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A decoder's text accumulator.
///
/// Fragments are appended as they arrive; [`TextBuffer::take`] hands over the
/// trimmed text and empties the buffer. Decoders clear or take it at every
/// element boundary.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer(String);

impl TextBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment.
    pub fn push(&mut self, fragment: &str) {
        self.0.push_str(fragment);
    }

    /// Take the trimmed contents, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        let text = self.0.trim().to_owned();
        self.0.clear();
        text
    }

    /// Discard the contents.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// The trimmed contents without consuming them.
    #[must_use]
    pub fn peek(&self) -> &str {
        self.0.trim()
    }
}

/// Parse text or an attribute value, naming the element on failure.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidValue`].
pub fn parse_value<T>(element: &str, raw: &str) -> Result<T, DecodeError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| DecodeError::invalid(element, raw, e))
}

/// Parse `true`/`false`.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidValue`] for anything else.
pub fn parse_bool(element: &str, raw: &str) -> Result<bool, DecodeError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DecodeError::invalid(element, other, "expected true or false")),
    }
}

/// Parse a provider timestamp after normalizing its irregularities.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidValue`] if the value is not a date-time.
pub fn parse_timestamp(element: &str, raw: &str) -> Result<DateTime<Utc>, DecodeError> {
    cloudwire_core::parse_iso8601(raw).map_err(|e| DecodeError::invalid(element, raw, e.reason))
}

/// `Some(text)` unless the text is empty.
#[must_use]
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Drive `decoder` over an XML document read incrementally from `input`.
///
/// Events are produced one at a time from a reused buffer; the document is
/// never held as a tree. The decoder's result is extracted only once the root
/// element has been closed and the input is exhausted.
///
/// # Errors
///
/// Returns [`DecodeError::EmptyDocument`] if there is no root element,
/// [`DecodeError::UnexpectedEof`] if the input stops inside the root, or the
/// first error raised by the reader or the decoder.
pub fn parse<R, D>(input: R, mut decoder: D) -> Result<D::Output, DecodeError>
where
    R: BufRead,
    D: Decoder,
{
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::with_capacity(1024);
    let mut depth: usize = 0;
    let mut root: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = element_name(&e)?;
                let attributes = Attributes::from_start(&e)?;
                if depth == 0 {
                    root = Some(name.to_owned());
                }
                depth += 1;
                decoder.on_start(name, &attributes)?;
            }
            Event::Empty(e) => {
                let name = element_name(&e)?;
                let attributes = Attributes::from_start(&e)?;
                if depth == 0 {
                    root = Some(name.to_owned());
                }
                decoder.on_start(name, &attributes)?;
                decoder.on_end(name)?;
            }
            Event::End(e) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref())?;
                depth = depth.saturating_sub(1);
                decoder.on_end(name)?;
            }
            Event::Text(e) if depth > 0 => {
                let decoded = e
                    .decode()
                    .map_err(|err| DecodeError::Encoding(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)?;
                decoder.on_text(&unescaped);
            }
            Event::CData(e) if depth > 0 => {
                decoder.on_text(std::str::from_utf8(&e)?);
            }
            Event::GeneralRef(e) if depth > 0 => {
                let reference = std::str::from_utf8(&e)?;
                let entity = format!("&{reference};");
                let resolved = quick_xml::escape::unescape(&entity)?;
                decoder.on_text(&resolved);
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, whitespace outside the root.
            _ => {}
        }
        buf.clear();
    }

    match root {
        None => Err(DecodeError::EmptyDocument),
        Some(root) if depth > 0 => Err(DecodeError::UnexpectedEof(root)),
        Some(_) => decoder.extract(),
    }
}

/// [`parse`] over an in-memory document.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_slice<D: Decoder>(xml: &[u8], decoder: D) -> Result<D::Output, DecodeError> {
    parse(xml, decoder)
}

/// [`parse`] over a response body, reading it through its [`Buf`] cursor.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_bytes<D: Decoder>(body: Bytes, decoder: D) -> Result<D::Output, DecodeError> {
    parse(body.reader(), decoder)
}

/// Feed a prepared event sequence to a decoder and extract its result.
///
/// # Errors
///
/// Propagates decoder errors.
pub fn feed<'a, D, I>(mut decoder: D, events: I) -> Result<D::Output, DecodeError>
where
    D: Decoder,
    I: IntoIterator<Item = ParseEvent<'a>>,
{
    for event in events {
        decoder.on_event(event)?;
    }
    decoder.extract()
}

fn element_name<'a>(start: &'a BytesStart<'_>) -> Result<&'a str, DecodeError> {
    Ok(std::str::from_utf8(start.local_name().into_inner())?)
}
