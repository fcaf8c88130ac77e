use std::io::Read;

use xml::reader::{EventReader, ParserConfig, XmlEvent};

use crate::GenerateError;

/// A node in a parsed registry document.
#[derive(Clone, PartialEq, Debug)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element of a parsed registry document.
///
/// Registry files are small enough to hold in memory in full, which lets the compiler walk them
/// as a tree rather than as an event stream. Comments and processing instructions are dropped;
/// text, including whitespace, is kept because declarations such as `const <ptype>GLubyte</ptype>
/// *<name>glGetString</name>` are spread across text and child elements.
#[derive(Clone, PartialEq, Debug)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parses a complete document and returns its root element.
    pub fn parse<R>(source: R) -> Result<XmlElement, GenerateError>
    where
        R: Read,
    {
        let config = ParserConfig::new()
            .whitespace_to_characters(true)
            .cdata_to_characters(true);
        let reader = EventReader::new_with_config(source, config);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        for event in reader {
            let event = match event {
                Ok(event) => event,
                Err(_) if root.is_none() && stack.is_empty() => {
                    return Err(GenerateError::MissingRoot)
                }
                Err(err) => return Err(GenerateError::Xml(err.to_string())),
            };

            match event {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => {
                    let mut element = XmlElement::new(name.local_name);

                    element.attributes = attributes
                        .into_iter()
                        .map(|a| (a.name.local_name, a.value))
                        .collect();

                    stack.push(element);
                }
                XmlEvent::EndElement { .. } => {
                    if let Some(element) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(XmlNode::Element(element)),
                            None => root = Some(element),
                        }
                    }
                }
                XmlEvent::Characters(text) | XmlEvent::Whitespace(text) => {
                    if let Some(element) = stack.last_mut() {
                        element.push_text(text);
                    }
                }
                XmlEvent::CData(text) => {
                    if let Some(element) = stack.last_mut() {
                        element.push_text(text);
                    }
                }
                _ => (),
            }
        }

        root.ok_or(GenerateError::MissingRoot)
    }

    pub fn parse_str(source: &str) -> Result<XmlElement, GenerateError> {
        XmlElement::parse(source.as_bytes())
    }

    fn push_text(&mut self, text: String) {
        if let Some(XmlNode::Text(existing)) = self.children.last_mut() {
            existing.push_str(&text);
        } else {
            self.children.push(XmlNode::Text(text));
        }
    }

    /// The value of the attribute called `name`, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The child elements of this element, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// The first child element called `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// The concatenated text of this element and all of its descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();

        self.collect_text(&mut text);

        text
    }

    fn collect_text(&self, text: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Element(element) => element.collect_text(text),
                XmlNode::Text(t) => text.push_str(t),
            }
        }
    }
}
