use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::XmlNode;

/// Errors that can occur while parsing an API document into an [`XmlNode`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input XML could not be tokenized.
    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Tag, attribute or text bytes were not valid UTF-8.
    #[error("invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// An entity or escape sequence could not be decoded.
    #[error("failed to decode XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// Structural issue in the document.
    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// Parse an API document into an [`XmlNode`] tree.
///
/// Whitespace-only text (indentation between elements) is dropped. Any other
/// text is kept exactly as sent, so log field values survive untouched;
/// [`XmlNode::get_text`] trims for protocol lookups.
pub fn parse(xml: &[u8]) -> Result<XmlNode, ParseError> {
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut open: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => open.push(start_node(&e, &reader)?),
            Event::Empty(e) => {
                let node = start_node(&e, &reader)?;
                close_node(node, &mut open, &mut root)?;
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                append_text(&mut open, &text);
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?;
                append_text(&mut open, text);
            }
            Event::End(_) => {
                let node = open.pop().ok_or_else(|| {
                    ParseError::Malformed("closing tag without matching open tag".to_string())
                })?;
                close_node(node, &mut open, &mut root)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.last() {
        return Err(ParseError::Malformed(format!(
            "element <{}> is not closed",
            unclosed.tag
        )));
    }

    root.ok_or_else(|| ParseError::Malformed("document has no root element".to_string()))
}

/// Parse an API document held in a string.
pub fn parse_str(xml: &str) -> Result<XmlNode, ParseError> {
    parse(xml.as_bytes())
}

fn append_text(open: &mut [XmlNode], text: &str) {
    let Some(current) = open.last_mut() else {
        return;
    };
    if text.trim().is_empty() {
        return;
    }
    match &mut current.text {
        Some(existing) => existing.push_str(text),
        None => current.text = Some(text.to_string()),
    }
}

fn close_node(
    node: XmlNode,
    open: &mut [XmlNode],
    root: &mut Option<XmlNode>,
) -> Result<(), ParseError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::Malformed(
            "more than one top-level element".to_string(),
        ));
    }
    *root = Some(node);
    Ok(())
}

fn start_node(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlNode, ParseError> {
    let mut node = XmlNode::new(qname_to_string(e.name())?);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = qname_to_string(attr.key)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        node.attributes.insert(key, value);
    }

    Ok(node)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_str, ParseError};

    #[test]
    fn indentation_between_elements_is_dropped() {
        let compact = parse_str("<a><b x=\"1\">v</b><c/></a>").expect("compact");
        let indented = parse_str("<a>\n  <b x=\"1\">v</b>\n  <c/>\n</a>\n").expect("indented");
        assert_eq!(compact, indented);
        assert_eq!(indented.text, None);
    }

    #[test]
    fn value_whitespace_is_kept() {
        let doc = parse_str("<entry><misc>  padded  </misc><rule><![CDATA[ r1 ]]></rule></entry>")
            .expect("parse");
        assert_eq!(doc.children[0].text.as_deref(), Some("  padded  "));
        assert_eq!(doc.children[1].text.as_deref(), Some(" r1 "));
        assert_eq!(doc.get_text(&["misc"]), Some("padded"));
    }

    #[test]
    fn unclosed_element_is_malformed() {
        let err = parse_str("<response><result>").expect_err("must fail");
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn empty_input_has_no_root() {
        let err = parse_str("").expect_err("must fail");
        assert!(err.to_string().contains("no root element"));
    }
}
