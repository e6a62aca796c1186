//! XML document handling
//!
//! A small mutable tree used for the generated form document and for
//! instance documents. Element and attribute names are stored in their
//! prefixed form (e.g. `xforms:bind`); prefixes are fixed for one
//! generation run by the prefix table, so name comparisons are textual.
//!
//! Attribute order is preserved so serialized output is deterministic.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Child element
    Element(Element),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

impl Node {
    /// Get the node as an element, if it is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get the node as a mutable element, if it is one
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// XML element with prefixed name, ordered attributes and child nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Prefixed element name (e.g. `xforms:bind`, `po:shipTo`)
    pub name: String,
    /// Attributes in insertion order, keyed by prefixed name
    pub attributes: IndexMap<String, String>,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element with the given (prefixed) name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Get the local part of the element name
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Get the prefix of the element name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Get an attribute value by (prefixed) name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Append a child element
    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Append a text node
    pub fn append_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Append a comment node
    pub fn append_comment(&mut self, comment: impl Into<String>) {
        self.children.push(Node::Comment(comment.into()));
    }

    /// Insert a node at the front of the child list
    pub fn prepend(&mut self, node: Node) {
        self.children.insert(0, node);
    }

    /// Iterate over child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Iterate over child elements mutably
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Concatenated text content of direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Depth-first iterator over this element and all descendant elements
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Find the first descendant (or self) matching a predicate
    pub fn find<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
        self.descendants().find(|e| predicate(e))
    }

    /// Visit this element and all descendants mutably, depth-first.
    pub fn visit_mut(&mut self, visitor: &mut dyn FnMut(&mut Element)) {
        visitor(self);
        for child in self.child_elements_mut() {
            child.visit_mut(visitor);
        }
    }

    fn write_to(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(|e| Error::Xml(e.to_string()))?;
            return Ok(());
        }
        writer
            .write_event(Event::Start(start))
            .map_err(|e| Error::Xml(e.to_string()))?;
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_to(writer)?,
                Node::Text(t) => writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(|e| Error::Xml(e.to_string()))?,
                Node::Comment(c) => writer
                    .write_event(Event::Comment(BytesText::new(c)))
                    .map_err(|e| Error::Xml(e.to_string()))?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| Error::Xml(e.to_string()))?;
        Ok(())
    }
}

/// Depth-first element iterator
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        // Push in reverse so children are yielded in document order
        for child in element.child_elements().collect::<Vec<_>>().into_iter().rev() {
            self.stack.push(child);
        }
        Some(element)
    }
}

/// XML document with a single root element
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Create a document from a root element
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse an XML document from a string.
    ///
    /// Prefixed names are kept verbatim; namespace declarations stay as
    /// plain `xmlns:*` attributes.
    pub fn from_string(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(parse_element(&e)?);
                }
                Ok(Event::End(_)) => {
                    if let Some(done) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.append_child(done),
                            None => root = Some(done),
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let element = parse_element(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.append_child(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("failed to unescape text: {}", e)))?
                            .to_string();
                        if !text.trim().is_empty() {
                            current.append_text(text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        root.map(Document::new)
            .ok_or_else(|| Error::Xml("document has no root element".to_string()))
    }

    /// Serialize the document with an XML declaration and 2-space indent
    pub fn to_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| Error::Xml(e.to_string()))?;
        self.root.write_to(&mut writer)?;
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| Error::Xml(e.to_string()))
    }
}

fn parse_element(start: &BytesStart) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
        .to_string();
    let mut element = Element::new(name);

    for attr_result in start.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
            .to_string();
        element.set_attr(key, value);
    }

    Ok(element)
}
