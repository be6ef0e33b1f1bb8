//! XML payloads
//!
//! An XML value is either text the caller already has, or an element tree
//! serialized to text at encode time with `quick-xml`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::AmfError;

/// XML document value
#[derive(Debug, Clone, PartialEq)]
pub enum XmlDocument {
    /// Pre-serialized XML text, written verbatim
    Text(String),
    /// Element tree, serialized with an XML declaration
    Tree(XmlElement),
}

impl XmlDocument {
    /// Text form of the document
    pub fn to_xml_string(&self) -> Result<String, AmfError> {
        match self {
            XmlDocument::Text(s) => Ok(s.clone()),
            XmlDocument::Tree(root) => root.to_document_string(),
        }
    }
}

impl From<XmlElement> for XmlDocument {
    fn from(root: XmlElement) -> Self {
        XmlDocument::Tree(root)
    }
}

/// Child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element
    pub fn child(mut self, element: XmlElement) -> Self {
        self.children.push(XmlNode::Element(element));
        self
    }

    /// Add a text node
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Serialize as a standalone document with an `<?xml?>` declaration
    pub fn to_document_string(&self) -> Result<String, AmfError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
            .map_err(|e| AmfError::InvalidXml(e.to_string()))?;
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| AmfError::InvalidXml(e.to_string()))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), AmfError> {
        if self.name.is_empty() {
            return Err(AmfError::InvalidXml("element with empty name".into()));
        }

        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| AmfError::InvalidXml(e.to_string()));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| AmfError::InvalidXml(e.to_string()))?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_to(writer)?,
                XmlNode::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(|e| AmfError::InvalidXml(e.to_string()))?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| AmfError::InvalidXml(e.to_string()))
    }
}
