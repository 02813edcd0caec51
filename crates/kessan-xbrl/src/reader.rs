//! Namespace-aware walk over an XBRL instance.
//!
//! Wraps `quick_xml::NsReader` and flattens its event stream into the three
//! things the context indexer and fact extractor care about: element starts
//! (with resolved namespace and attributes), character data, and element
//! ends. Self-closing elements are reported as a start immediately followed
//! by an end. Anything the reader cannot make sense of is reported as
//! [`ExtractError::MalformedDocument`].

use crate::error::{ExtractError, Result};
use quick_xml::NsReader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

/// Namespace URI of the XBRL 2.1 instance schema (`xbrli:`).
pub(crate) const XBRL_INSTANCE_NS: &str = "http://www.xbrl.org/2003/instance";

/// An element start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementStart {
    /// Local name, without prefix.
    pub(crate) local_name: String,
    /// Resolved namespace URI, if the element is bound to one.
    pub(crate) namespace: Option<String>,
    /// Attributes as (qualified name, unescaped value).
    pub(crate) attributes: Vec<(String, String)>,
}

impl ElementStart {
    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Structural elements of the instance schema (`xbrl`, `context`, `unit`, ...).
    pub(crate) fn in_instance_namespace(&self) -> bool {
        self.namespace.as_deref() == Some(XBRL_INSTANCE_NS)
    }
}

#[derive(Debug)]
pub(crate) enum XmlEvent {
    Start(ElementStart),
    Text(String),
    End,
}

/// Walks `xml` in document order, calling `on_event` for every element
/// boundary and run of character data.
pub(crate) fn walk<F>(xml: &[u8], mut on_event: F) -> Result<()>
where
    F: FnMut(XmlEvent),
{
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = bound_namespace(resolved);
        let decoder = reader.decoder();
        match event {
            Event::Start(ref start) => {
                on_event(XmlEvent::Start(element_start(decoder, namespace, start)?));
                depth += 1;
                saw_root = true;
            }
            Event::Empty(ref start) => {
                on_event(XmlEvent::Start(element_start(decoder, namespace, start)?));
                on_event(XmlEvent::End);
                saw_root = true;
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ExtractError::MalformedDocument("unexpected closing tag".to_string())
                })?;
                on_event(XmlEvent::End);
            }
            Event::Text(text) => {
                if depth > 0 {
                    on_event(XmlEvent::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(data) => {
                if depth > 0 {
                    on_event(XmlEvent::Text(
                        String::from_utf8_lossy(&data.into_inner()).into_owned(),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ExtractError::MalformedDocument(
            "document has no root element".to_string(),
        ));
    }
    if depth > 0 {
        return Err(ExtractError::MalformedDocument(format!(
            "{depth} element(s) left open at end of document"
        )));
    }
    Ok(())
}

// An unknown prefix is tolerated: such an element is simply not in the
// instance namespace.
fn bound_namespace(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn element_start(
    decoder: Decoder,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> Result<ElementStart> {
    let local_name = decoder
        .decode(start.local_name().as_ref())
        .map_err(quick_xml::Error::from)?
        .into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(quick_xml::Error::from)?
            .into_owned();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attributes.push((key, value));
    }

    Ok(ElementStart {
        local_name,
        namespace,
        attributes,
    })
}
