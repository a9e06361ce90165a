//! Owned XML element tree built from `quick-xml` events.
//!
//! Response envelopes are small and their shape varies per operation, so the
//! decoder works on a fully materialized tree rather than streaming events.
//! Namespace prefixes are dropped; the service addresses elements by local
//! name only.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::error::MwsError;

/// A parsed XML element: local name, concatenated text content, and child
/// elements in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Local element name, without any namespace prefix.
    pub name: String,
    /// Text content directly inside this element, trimmed.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Parse an XML document and return its root element.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Xml`] if the document is malformed or has no root
    /// element.
    pub fn parse(xml: &str) -> Result<Self, MwsError> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => {
                    stack.push(Element::named(local_name(&start)));
                }
                Event::Empty(start) => {
                    let element = Element::named(local_name(&start));
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let unescaped = text.unescape().map_err(xml_error)?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&unescaped);
                    }
                }
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&bytes));
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| MwsError::Xml {
                        message: "unbalanced closing tag".to_string(),
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Event::Eof => break,
                // Declaration, comments, processing instructions.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(MwsError::Xml {
                message: "unexpected end of document".to_string(),
            });
        }
        root.ok_or_else(|| MwsError::Xml {
            message: "document has no root element".to_string(),
        })
    }

    fn named(name: String) -> Self {
        Element {
            name,
            ..Element::default()
        }
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with the given local name, in document order.
    ///
    /// This is the decoder-wide normalization rule for repeatable elements:
    /// a single wire element comes back as a one-element sequence.
    pub fn children_named<'elem>(
        &'elem self,
        name: &'elem str,
    ) -> impl Iterator<Item = &'elem Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text content of the first child with the given name, if present and
    /// non-empty.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|child| child.text.as_str())
            .filter(|text| !text.is_empty())
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn xml_error(err: impl std::fmt::Display) -> MwsError {
    MwsError::Xml {
        message: err.to_string(),
    }
}
