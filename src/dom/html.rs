use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{Document, NodeId};

/// Elements serialised without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "markup parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

/// Escape text for HTML output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl Document {
    /// Parse well-formed (XHTML-style) markup into a document.
    /// Comments, processing instructions and the doctype are dropped;
    /// whitespace-only text between elements is skipped.
    pub fn parse(markup: &str) -> Result<Document, ParseError> {
        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(false);

        let mut doc = Document::empty();
        let mut stack: Vec<NodeId> = vec![doc.root()];

        loop {
            let parent = *stack.last().unwrap_or(&doc.root);
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let el = open_element(&mut doc, e)?;
                    doc.append_child(parent, el);
                    stack.push(el);
                }
                Ok(Event::Empty(ref e)) => {
                    let el = open_element(&mut doc, e)?;
                    doc.append_child(parent, el);
                }
                Ok(Event::End(_)) => {
                    if stack.len() <= 1 {
                        return Err(ParseError(format!(
                            "unbalanced closing tag at byte {}",
                            reader.buffer_position()
                        )));
                    }
                    stack.pop();
                }
                Ok(Event::Text(ref t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| ParseError(format!("bad text at byte {}: {}", reader.buffer_position(), e)))?;
                    if !text.trim().is_empty() {
                        let node = doc.create_text(&text);
                        doc.append_child(parent, node);
                    }
                }
                Ok(Event::CData(ref c)) => {
                    let text = String::from_utf8_lossy(c.as_ref()).to_string();
                    let node = doc.create_text(&text);
                    doc.append_child(parent, node);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(ParseError(format!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
            }
        }

        if stack.len() > 1 {
            return Err(ParseError("unclosed element at end of input".to_string()));
        }
        Ok(doc)
    }

    /// Serialise the whole document, doctype included.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        for &child in self.children(self.root()) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialise one node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialise the children of one node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text(id) {
            out.push_str(&html_escape(text));
            return;
        }
        if self.is_root(id) {
            for &child in self.children(id) {
                self.write_node(child, out);
            }
            return;
        }
        let Some(tag) = self.tag(id) else {
            return;
        };

        out.push('<');
        out.push_str(tag);
        for (k, v) in self.attrs(id) {
            out.push_str(&format!(" {}=\"{}\"", k, html_escape(v)));
        }
        let style = self.style_attr(id);
        if !style.is_empty() {
            out.push_str(&format!(" style=\"{}\"", html_escape(&style)));
        }

        if VOID_ELEMENTS.contains(&tag) {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for &child in self.children(id) {
            self.write_node(child, out);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn open_element(doc: &mut Document, e: &BytesStart) -> Result<NodeId, ParseError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let el = doc.create_element(&tag);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError(format!("bad attribute on <{}>: {}", tag, err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError(format!("bad attribute value on <{}>: {}", tag, err)))?;
        doc.set_attr(el, &key, &value);
    }
    Ok(el)
}
