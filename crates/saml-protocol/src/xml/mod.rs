//! A small owned XML tree.
//!
//! Nodes carry their resolved namespace URI alongside the prefix used on the
//! wire, which is all the schema engine and the signature code need.
//! Character data is kept verbatim, whitespace included: `text` holds what
//! precedes the first child and each child's `tail` what follows it, so
//! canonicalization can reproduce a peer's indentation.

pub mod c14n;

use std::borrow::Cow;

use quick_xml::{
    events::{BytesStart, BytesText, Event},
    name::ResolveResult,
    NsReader, Writer,
};

use crate::error::{SamlError, SamlResult};

/// A namespace declaration: `None` prefix is the default namespace.
pub type NamespaceDecl = (Option<String>, String);

/// Deepest element nesting [`XmlNode::parse`] accepts.
pub const MAX_DEPTH: usize = 256;

/// An XML element with its attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Resolved namespace URI.
    pub namespace: Option<String>,
    /// Prefix used for the element name.
    pub prefix: Option<String>,
    /// Local name.
    pub name: String,
    /// Namespace declarations made on this element.
    pub namespaces: Vec<NamespaceDecl>,
    /// Attributes in document order, keyed by their qualified name.
    pub attributes: Vec<(String, String)>,
    /// Character data before the first child.
    pub text: Option<String>,
    /// Character data between this element's end tag and the next sibling.
    pub tail: Option<String>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Creates an empty element.
    #[must_use]
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Parses a document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns `XmlParse` for malformed XML, undeclared prefixes, elements
    /// nested deeper than [`MAX_DEPTH`], or a document without a root
    /// element.
    pub fn parse(xml: &str) -> SamlResult<Self> {
        let mut reader = NsReader::from_str(xml);
        let mut stack: Vec<Self> = Vec::new();
        let mut root = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = match resolved {
                ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
                ResolveResult::Unbound => None,
                ResolveResult::Unknown(prefix) => {
                    return Err(SamlError::XmlParse(format!(
                        "undeclared namespace prefix: {}",
                        String::from_utf8_lossy(&prefix)
                    )))
                }
            };

            if matches!(event, Event::Start(_) | Event::Empty(_)) && stack.len() >= MAX_DEPTH {
                return Err(SamlError::XmlParse(format!(
                    "elements nested deeper than {MAX_DEPTH}"
                )));
            }

            match event {
                Event::Start(start) => {
                    stack.push(Self::from_start(namespace, &start)?);
                }
                Event::Empty(start) => {
                    let node = Self::from_start(namespace, &start)?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| SamlError::XmlParse("unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(SamlError::XmlParse("unexpected end of document".to_string()));
        }
        root.ok_or_else(|| SamlError::XmlParse("document has no root element".to_string()))
    }

    fn from_start(namespace: Option<String>, start: &BytesStart<'_>) -> SamlResult<Self> {
        let qname = start.name();
        let mut node = Self {
            namespace,
            prefix: qname
                .prefix()
                .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned()),
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        };

        for attr in start.attributes() {
            let attr = attr.map_err(|e| SamlError::XmlParse(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            if key == "xmlns" {
                node.namespaces.push((None, value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                node.namespaces.push((Some(prefix.to_string()), value));
            } else {
                node.attributes.push((key, value));
            }
        }
        Ok(node)
    }

    fn attach(stack: &mut [Self], root: &mut Option<Self>, node: Self) -> SamlResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => *root = Some(node),
            None => {
                return Err(SamlError::XmlParse(
                    "multiple root elements".to_string(),
                ))
            }
        }
        Ok(())
    }

    /// Appends character data after the last child, or to `text` when
    /// there are no children yet.
    fn push_text(&mut self, text: &str) {
        let slot = match self.children.last_mut() {
            Some(child) => &mut child.tail,
            None => &mut self.text,
        };
        match slot {
            Some(existing) => existing.push_str(text),
            None => *slot = Some(text.to_string()),
        }
    }

    /// Returns the text content with surrounding whitespace removed, or
    /// `None` when it is blank.
    #[must_use]
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Removes and returns the child at `index`.
    ///
    /// The removed element's tail joins the preceding character data, the
    /// way detaching a node from a document leaves its neighbours' text in
    /// place.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_child(&mut self, index: usize) -> Self {
        let mut removed = self.children.remove(index);
        if let Some(tail) = removed.tail.take() {
            let slot = match index.checked_sub(1) {
                Some(previous) => &mut self.children[previous].tail,
                None => &mut self.text,
            };
            slot.get_or_insert_with(String::new).push_str(&tail);
        }
        removed
    }

    /// Returns `prefix:name`, or `name` for unprefixed elements.
    #[must_use]
    pub fn qualified_name(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{prefix}:{}", self.name)),
            None => Cow::Borrowed(&self.name),
        }
    }

    /// Returns the name in Clark notation, `{uri}local`.
    #[must_use]
    pub fn clark_name(&self) -> String {
        clark(self.namespace.as_deref(), &self.name)
    }

    /// Returns true if this element has the given namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// Looks up an attribute by qualified name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Declares a namespace on this element unless already declared here.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        let prefix = prefix.map(str::to_string);
        if !self.namespaces.iter().any(|(p, _)| *p == prefix) {
            self.namespaces.push((prefix, uri.to_string()));
        }
    }

    /// Returns the first child with the given namespace and local name.
    #[must_use]
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.is(namespace, name))
    }

    /// Returns the position of the first matching child.
    #[must_use]
    pub fn child_position(&self, namespace: &str, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.is(namespace, name))
    }

    /// Serializes the tree to a string.
    ///
    /// # Errors
    ///
    /// Returns `XmlWrite` if the writer fails.
    pub fn to_xml(&self) -> SamlResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer, &mut Vec::new())?;
        String::from_utf8(writer.into_inner()).map_err(|e| SamlError::XmlWrite(e.to_string()))
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>, scope: &mut Vec<NamespaceDecl>) -> SamlResult<()> {
        let mark = scope.len();
        let mut declarations: Vec<NamespaceDecl> = self
            .namespaces
            .iter()
            .filter(|(prefix, uri)| lookup(scope, prefix.as_deref()) != Some(uri.as_str()))
            .cloned()
            .collect();

        if let Some(uri) = &self.namespace {
            let bound = declarations
                .iter()
                .rev()
                .chain(scope.iter().rev())
                .find(|(p, _)| *p == self.prefix)
                .map(|(_, u)| u.as_str());
            if bound != Some(uri.as_str()) {
                declarations.push((self.prefix.clone(), uri.clone()));
            }
        }

        let qname = self.qualified_name();
        let mut start = BytesStart::new(qname.as_ref());
        for (prefix, uri) in &declarations {
            let key = match prefix {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            start.push_attribute((key.as_str(), uri.as_str()));
        }
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        scope.extend(declarations);

        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(write_error)?;
        } else {
            let end = start.to_end().into_owned();
            writer.write_event(Event::Start(start)).map_err(write_error)?;
            if let Some(text) = &self.text {
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(write_error)?;
            }
            for child in &self.children {
                child.write(writer, scope)?;
                if let Some(tail) = &child.tail {
                    writer
                        .write_event(Event::Text(BytesText::new(tail)))
                        .map_err(write_error)?;
                }
            }
            writer.write_event(Event::End(end)).map_err(write_error)?;
        }

        scope.truncate(mark);
        Ok(())
    }

    /// Compares two trees by qualified name, attribute set, text and children.
    ///
    /// Prefixes, namespace declarations, attribute order and whitespace
    /// around text are ignored.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        let mut ours: Vec<_> = self.attributes.iter().collect();
        let mut theirs: Vec<_> = other.attributes.iter().collect();
        ours.sort();
        theirs.sort();

        self.namespace == other.namespace
            && self.name == other.name
            && ours == theirs
            && self.trimmed_text() == other.trimmed_text()
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_structure(b))
    }
}

fn write_error(err: quick_xml::Error) -> SamlError {
    SamlError::XmlWrite(err.to_string())
}

/// Formats a name in Clark notation.
#[must_use]
pub fn clark(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(uri) => format!("{{{uri}}}{name}"),
        None => name.to_string(),
    }
}

pub(crate) fn lookup<'a>(scope: &'a [NamespaceDecl], prefix: Option<&str>) -> Option<&'a str> {
    scope
        .iter()
        .rev()
        .find(|(p, _)| p.as_deref() == prefix)
        .map(|(_, uri)| uri.as_str())
}
