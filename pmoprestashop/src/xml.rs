//! XML parse/serialize helpers over xmltree.

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::errors::{PrestashopError, Result};

/// Parse an XML response body.
///
/// An empty body is an error even for a successful HTTP status: the
/// webservice always answers with a document.
pub(crate) fn parse_xml(body: &str) -> Result<Element> {
    if body.is_empty() {
        return Err(PrestashopError::Transport(
            "HTTP response is empty".to_string(),
        ));
    }
    Element::parse(body.as_bytes()).map_err(|e| PrestashopError::XmlParse(e.to_string()))
}

/// Suppressed-errors variant, used when parsing the body of an error
/// response: a parse failure there must not mask the HTTP error itself.
pub(crate) fn parse_xml_suppressed(body: &str) -> Option<Element> {
    if body.is_empty() {
        return None;
    }
    Element::parse(body.as_bytes()).ok()
}

/// Concatenated text content of an element (Text and CData children).
pub fn element_text(element: &Element) -> String {
    let mut text = String::new();
    for child in &element.children {
        match child {
            XMLNode::Text(s) => text.push_str(s),
            XMLNode::CData(s) => text.push_str(s),
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Replace the text content of an element, keeping attributes and
/// element children untouched.
pub(crate) fn set_element_text(element: &mut Element, value: &str) {
    element
        .children
        .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));
    element.children.push(XMLNode::Text(value.to_string()));
}

/// Serialize an element tree to an indented XML string, ready to be sent
/// as a `post_xml`/`put_xml` payload.
pub fn to_xml_string(element: &Element) -> Result<String> {
    let mut buf = Vec::new();
    let config = EmitterConfig::new().perform_indent(true).indent_string("  ");
    element
        .write_with_config(&mut buf, config)
        .map_err(|e| PrestashopError::XmlParse(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| PrestashopError::XmlParse(e.to_string()))
}
