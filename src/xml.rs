//! Owned XML element tree for EB-eye dumps.
//!
//! Parsing turns quick-xml events into a [`Document`]; serialization replays the
//! tree through an indenting [`Writer`]. Whitespace-only text nodes are dropped on
//! parse, so pretty printing controls all layout whitespace.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::EnrichError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Replaces the value of an existing attribute, otherwise appends it.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |element| element.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.name == name)
    }

    /// Returns the first direct child called `name`, appending an empty one if none exists.
    pub fn ensure_child(&mut self, name: &str) -> &mut Element {
        let index = match self.child_index(name) {
            Some(index) => index,
            None => {
                self.children.push(Node::Element(Element::new(name)));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Node::Element(element) => element,
            _ => unreachable!("child index always points at an element"),
        }
    }

    fn child_index(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| matches!(child, Node::Element(element) if element.name == name))
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            if let Node::Text(value) | Node::CData(value) = child {
                text.push_str(value);
            }
        }
        text
    }

    /// Calls `visit` on every element called `name` in this subtree, in document order.
    ///
    /// Elements a visit appends are walked afterwards as well.
    pub fn try_visit_named_mut<E, F>(&mut self, name: &str, visit: &mut F) -> Result<(), E>
    where
        F: FnMut(&mut Element) -> Result<(), E>,
    {
        if self.name == name {
            visit(self)?;
        }
        for child in &mut self.children {
            if let Node::Element(element) = child {
                element.try_visit_named_mut(name, visit)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: None,
            standalone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    declaration: Declaration,
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Declaration::default(),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self, EnrichError> {
        let content = fs::read(path)
            .map_err(|err| EnrichError::Filesystem(format!("read {}: {err}", path.display())))?;
        Self::from_bytes(&content)
    }

    pub fn parse(xml: &str) -> Result<Self, EnrichError> {
        Self::parse_events(Reader::from_str(xml))
    }

    /// Parses raw file content, decoding it by its BOM or the `encoding` declaration.
    pub fn from_bytes(xml: &[u8]) -> Result<Self, EnrichError> {
        Self::parse_events(Reader::from_reader(xml))
    }

    fn parse_events(mut reader: Reader<&[u8]>) -> Result<Self, EnrichError> {
        let mut declaration = None;
        let mut entities = HashMap::new();
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|err| {
                EnrichError::XmlParse(format!(
                    "at position {}: {err}",
                    reader.buffer_position()
                ))
            })?;
            let decoder = reader.decoder();
            match event {
                Event::Decl(decl) => {
                    declaration = Some(read_declaration(&decl)?);
                }
                Event::Start(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(multiple_roots());
                    }
                    stack.push(read_element(&start, decoder, &entities)?);
                }
                Event::Empty(start) => {
                    let element = read_element(&start, decoder, &entities)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_element(element),
                        None if root.is_none() => root = Some(element),
                        None => return Err(multiple_roots()),
                    }
                }
                Event::End(end) => {
                    let completed = stack.pop().ok_or_else(|| {
                        EnrichError::XmlParse(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        ))
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_element(completed),
                        None => root = Some(completed),
                    }
                }
                Event::Text(text) => {
                    let value = text
                        .unescape_with(|name| entities.get(name).map(String::as_str))
                        .map_err(|err| EnrichError::XmlParse(err.to_string()))?;
                    if value.chars().all(char::is_whitespace) {
                        continue;
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.push(Node::Text(value.into_owned())),
                        None => {
                            return Err(EnrichError::XmlParse(
                                "text content outside the root element".to_string(),
                            ));
                        }
                    }
                }
                Event::CData(data) => {
                    let value = decode(decoder, &data)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(Node::CData(value)),
                        None => {
                            return Err(EnrichError::XmlParse(
                                "CDATA section outside the root element".to_string(),
                            ));
                        }
                    }
                }
                Event::Comment(comment) => {
                    let node = Node::Comment(decode(decoder, &comment)?);
                    place_misc(node, &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
                Event::PI(pi) => {
                    let node = Node::ProcessingInstruction(decode(decoder, &pi)?);
                    place_misc(node, &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
                Event::DocType(doctype) => {
                    let doctype = decode(decoder, &doctype)?;
                    entities.extend(internal_entities(&doctype));
                    prolog.push(Node::DocType(doctype));
                }
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            let unclosed = stack
                .iter()
                .map(|element| element.name.as_str())
                .collect::<Vec<_>>();
            return Err(EnrichError::XmlParse(format!(
                "unclosed element(s): <{}>",
                unclosed.join(">, <")
            )));
        }
        let root = root
            .ok_or_else(|| EnrichError::XmlParse("no root element found".to_string()))?;

        Ok(Self {
            declaration: declaration.unwrap_or_default(),
            prolog,
            root,
            epilog,
        })
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serializes the document as UTF-8, one element per line, indented by `indent` spaces.
    ///
    /// The declaration never names an encoding, whatever the source declared.
    pub fn to_pretty_string(&self, indent: usize) -> Result<String, EnrichError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);
        let decl = BytesDecl::new(
            &self.declaration.version,
            None,
            self.declaration.standalone.as_deref(),
        );
        write(&mut writer, Event::Decl(decl))?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|err| EnrichError::XmlWrite(err.to_string()))
    }
}

/// Drops lines that are empty after trimming and joins the rest with `\n`.
pub fn strip_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn place_misc(
    node: Node,
    stack: &mut [Element],
    seen_root: bool,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
) {
    match stack.last_mut() {
        Some(parent) => parent.push(node),
        None if seen_root => epilog.push(node),
        None => prolog.push(node),
    }
}

fn multiple_roots() -> EnrichError {
    EnrichError::XmlParse("document has more than one root element".to_string())
}

fn utf8(bytes: Vec<u8>) -> Result<String, EnrichError> {
    String::from_utf8(bytes).map_err(|err| EnrichError::XmlParse(err.to_string()))
}

fn decode(decoder: Decoder, bytes: &[u8]) -> Result<String, EnrichError> {
    decoder
        .decode(bytes)
        .map(|text| text.into_owned())
        .map_err(|err| EnrichError::XmlParse(err.to_string()))
}

fn read_element(
    start: &BytesStart,
    decoder: Decoder,
    entities: &HashMap<String, String>,
) -> Result<Element, EnrichError> {
    let mut element = Element::new(decode(decoder, start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|err| EnrichError::XmlParse(err.to_string()))?;
        let key = decode(decoder, attr.key.as_ref())?;
        let raw = decode(decoder, &attr.value)?;
        let value = unescape_with(&raw, |name| entities.get(name).map(String::as_str))
            .map_err(|err| EnrichError::XmlParse(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

/// General entities declared with a literal value in a DOCTYPE internal subset.
///
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) entities are ignored, and
/// replacement text is taken literally. The first declaration of a name wins.
fn internal_entities(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let mut rest = doctype;
    while let Some(found) = rest.find("<!ENTITY") {
        rest = rest[found + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let name_end = rest
            .find(|ch: char| ch.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        let after_name = rest[name_end..].trim_start();
        let Some(quote) = after_name
            .chars()
            .next()
            .filter(|ch| *ch == '"' || *ch == '\'')
        else {
            continue;
        };
        let body = &after_name[1..];
        if let Some(close) = body.find(quote) {
            entities
                .entry(name.to_string())
                .or_insert_with(|| body[..close].to_string());
        }
    }
    entities
}

fn read_declaration(decl: &BytesDecl) -> Result<Declaration, EnrichError> {
    let version = decl
        .version()
        .map_err(|err| EnrichError::XmlParse(err.to_string()))?;
    let encoding = decl
        .encoding()
        .transpose()
        .map_err(|err| EnrichError::XmlParse(err.to_string()))?;
    let standalone = decl
        .standalone()
        .transpose()
        .map_err(|err| EnrichError::XmlParse(err.to_string()))?;
    Ok(Declaration {
        version: utf8(version.into_owned())?,
        encoding: encoding.map(|value| utf8(value.into_owned())).transpose()?,
        standalone: standalone.map(|value| utf8(value.into_owned())).transpose()?,
    })
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), EnrichError> {
    writer
        .write_event(event)
        .map_err(|err| EnrichError::XmlWrite(err.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), EnrichError> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => write(writer, Event::Text(BytesText::new(text))),
        Node::CData(text) => write(writer, Event::CData(BytesCData::new(text.as_str()))),
        Node::Comment(text) => {
            write(writer, Event::Comment(BytesText::from_escaped(text.as_str())))
        }
        Node::ProcessingInstruction(text) => {
            write(writer, Event::PI(BytesText::from_escaped(text.as_str())))
        }
        Node::DocType(text) => {
            write(writer, Event::DocType(BytesText::from_escaped(text.as_str())))
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), EnrichError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        return write(writer, Event::Empty(start));
    }
    write(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    write(writer, Event::End(BytesEnd::new(element.name.as_str())))
}
