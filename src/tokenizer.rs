//! XML tokenization into element/text callbacks.
//!
//! Chapter bytes are pulled through a namespace-aware `quick-xml` reader and
//! pushed into a [`ContentHandler`]. Text, CDATA and entity references all
//! arrive through `character_data`, in document order and possibly split
//! across several calls.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::NsReader;

use crate::error::{ErrorPhase, XhtmlError};

/// Element name as seen by handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagName<'a> {
    /// Name as written, including any prefix.
    pub qualified: &'a str,
    /// Name with the prefix removed.
    pub local: &'a str,
    /// Resolved namespace URI, when the element is bound to one.
    pub namespace: Option<&'a str>,
}

impl<'a> TagName<'a> {
    /// Unbound name.
    pub fn plain(qualified: &'a str) -> Self {
        Self {
            qualified,
            local: local_part(qualified),
            namespace: None,
        }
    }

    /// Name bound to `namespace`.
    pub fn in_namespace(qualified: &'a str, namespace: &'a str) -> Self {
        Self {
            qualified,
            local: local_part(qualified),
            namespace: Some(namespace),
        }
    }
}

fn local_part(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

/// One element attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written, including any prefix.
    pub name: String,
    /// Name with the prefix removed.
    pub local_name: String,
    /// Resolved namespace URI of a prefixed attribute.
    pub namespace: Option<String>,
    /// Unescaped value.
    pub value: String,
}

/// Ordered attribute list of one element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an unbound attribute list from `(name, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut attributes = Self::new();
        for (name, value) in pairs {
            attributes.push(Attribute {
                name: String::from(name),
                local_name: String::from(local_part(name)),
                namespace: None,
                value: String::from(value),
            });
        }
        attributes
    }

    /// Append an attribute.
    pub fn push(&mut self, attribute: Attribute) {
        self.items.push(attribute);
    }

    /// Remove all attributes.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Value of the first attribute whose qualified name is exactly `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Value of the first attribute bound to `(namespace, local)`.
    pub fn get_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|attr| attr.namespace.as_deref() == Some(namespace) && attr.local_name == local)
            .map(|attr| attr.value.as_str())
    }

    /// Attributes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the element has no attributes.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Receiver of tokenizer callbacks.
pub trait ContentHandler {
    /// An element opened.
    fn start_element(&mut self, name: &TagName<'_>, attributes: &Attributes);
    /// An element closed.
    fn end_element(&mut self, name: &TagName<'_>);
    /// A run of character data.
    fn character_data(&mut self, text: &str);
}

/// Tokenize `bytes` and drive `handler` until end of input.
///
/// Mismatched end tags are tolerated. Malformed markup stops the pass and is
/// reported with the byte offset where tokenization failed; callbacks already
/// delivered stay delivered.
pub fn tokenize_xhtml<H: ContentHandler + ?Sized>(
    bytes: &[u8],
    handler: &mut H,
) -> Result<(), XhtmlError> {
    let mut reader = NsReader::from_reader(bytes);
    {
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.expand_empty_elements = true;
    }
    let mut buf = Vec::with_capacity(256);
    let mut attributes = Attributes::new();
    let mut entity_buf = String::with_capacity(16);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let qualified = decode_name(&reader, e.name())?;
                let namespace = element_namespace(&reader, e.name());
                collect_attributes(&reader, &e, &mut attributes);
                handler.start_element(&tag_name(&qualified, namespace.as_deref()), &attributes);
            }
            Ok(Event::Empty(e)) => {
                let qualified = decode_name(&reader, e.name())?;
                let namespace = element_namespace(&reader, e.name());
                collect_attributes(&reader, &e, &mut attributes);
                let name = tag_name(&qualified, namespace.as_deref());
                handler.start_element(&name, &attributes);
                handler.end_element(&name);
            }
            Ok(Event::End(e)) => {
                let qualified = decode_name(&reader, e.name())?;
                let namespace = element_namespace(&reader, e.name());
                handler.end_element(&tag_name(&qualified, namespace.as_deref()));
            }
            Ok(Event::Text(e)) => {
                let text = e.decode().map_err(|err| {
                    decode_error(format!("Decode error: {:?}", err), &reader, "text node decode")
                })?;
                if !text.is_empty() {
                    handler.character_data(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = reader.decoder().decode(&e).map_err(|err| {
                    decode_error(format!("Decode error: {:?}", err), &reader, "cdata decode")
                })?;
                if !text.is_empty() {
                    handler.character_data(&text);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let entity_name = e.decode().map_err(|err| {
                    decode_error(format!("Decode error: {:?}", err), &reader, "entity decode")
                })?;
                entity_buf.clear();
                entity_buf.push('&');
                entity_buf.push_str(entity_name.as_ref());
                entity_buf.push(';');
                let resolved = match quick_xml::escape::unescape(&entity_buf) {
                    Ok(resolved) => resolved,
                    Err(_) => match html_entity(entity_name.as_ref()) {
                        Some(text) => Cow::Borrowed(text),
                        None => {
                            log::trace!("Unknown entity '{}' kept literally", entity_buf);
                            Cow::Borrowed(entity_buf.as_str())
                        }
                    },
                };
                handler.character_data(&resolved);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(XhtmlError::new(
                    ErrorPhase::Tokenize,
                    "XML_ERROR",
                    format!("XML error: {:?}", err),
                )
                .with_token_offset(reader_token_offset(&reader)));
            }
        }
        buf.clear();
    }
    Ok(())
}

fn tag_name<'a>(qualified: &'a str, namespace: Option<&'a str>) -> TagName<'a> {
    match namespace {
        Some(namespace) => TagName::in_namespace(qualified, namespace),
        None => TagName::plain(qualified),
    }
}

fn reader_token_offset(reader: &NsReader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn decode_error(message: String, reader: &NsReader<&[u8]>, source: &str) -> XhtmlError {
    XhtmlError::new(ErrorPhase::Tokenize, "DECODE_ERROR", format!("{} ({})", message, source))
        .with_token_offset(reader_token_offset(reader))
}

fn decode_name(reader: &NsReader<&[u8]>, name: QName<'_>) -> Result<String, XhtmlError> {
    reader
        .decoder()
        .decode(name.as_ref())
        .map(Cow::into_owned)
        .map_err(|err| decode_error(format!("Decode error: {:?}", err), reader, "tag name decode"))
}

fn element_namespace(reader: &NsReader<&[u8]>, name: QName<'_>) -> Option<String> {
    match reader.resolver().resolve_element(name).0 {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        _ => None,
    }
}

fn collect_attributes(reader: &NsReader<&[u8]>, start: &BytesStart<'_>, out: &mut Attributes) {
    out.clear();
    for attr in start.attributes().with_checks(false).flatten() {
        let name = match reader.decoder().decode(attr.key.as_ref()) {
            Ok(name) => name.into_owned(),
            Err(_) => continue,
        };
        let (resolved, local) = reader.resolver().resolve_attribute(attr.key);
        let namespace = match resolved {
            ResolveResult::Bound(namespace) => {
                Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
            }
            _ => None,
        };
        let local_name = String::from_utf8_lossy(local.as_ref()).into_owned();
        let raw = match reader.decoder().decode(&attr.value) {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        let value = match quick_xml::escape::unescape(&raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw.into_owned(),
        };
        out.push(Attribute {
            name,
            local_name,
            namespace,
            value,
        });
    }
}

/// HTML entities commonly found in XHTML chapters without a DTD.
fn html_entity(name: &str) -> Option<&'static str> {
    let text = match name {
        "nbsp" => "\u{00A0}",
        "shy" => "\u{00AD}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "laquo" => "\u{00AB}",
        "raquo" => "\u{00BB}",
        "bull" => "\u{2022}",
        "middot" => "\u{00B7}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        _ => return None,
    };
    Some(text)
}
