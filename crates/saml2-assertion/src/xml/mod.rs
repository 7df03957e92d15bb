//! Minimal owned XML tree.
//!
//! Documents are parsed with `quick-xml` into [`Element`] trees that the
//! builders edit in place and serialize compactly. Namespace declarations
//! are kept as ordinary `xmlns`/`xmlns:*` attributes; [`Element::namespaces_at`]
//! resolves the in-scope declarations for any node by walking its path.
//!
//! Nodes are addressed by *paths*: the sequence of child indices leading
//! from the root to the node. The root itself has the empty path.

mod c14n;
mod name;
mod selector;

pub use c14n::canonicalize;
pub use name::is_name;
pub use selector::NodeSelector;

use std::collections::BTreeMap;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{SamlError, SamlResult};

/// In-scope namespace declarations, keyed by prefix (`""` for the default).
pub type NamespaceScope = BTreeMap<String, String>;

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element.
    Element(Element),
    /// Character data, stored unescaped.
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified name, e.g. `saml:Assertion`.
    pub name: String,
    /// Attributes in document order, values unescaped. Includes namespace
    /// declarations.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Adds a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Returns the namespace prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Returns an attribute value by qualified name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Concatenates the direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Appends a child element.
    pub fn push(&mut self, child: Self) {
        self.children.push(Node::Element(child));
    }

    /// Iterates over the child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Returns the first child element with the given local name.
    #[must_use]
    pub fn child(&self, local_name: &str) -> Option<&Self> {
        self.elements().find(|el| el.local_name() == local_name)
    }

    /// Returns the first element, in document order and including `self`,
    /// with the given local name.
    #[must_use]
    pub fn find(&self, local_name: &str) -> Option<&Self> {
        let path = self.find_path(|el| el.local_name() == local_name)?;
        self.at_path(&path)
    }

    /// Mutable variant of [`Element::find`].
    pub fn find_mut(&mut self, local_name: &str) -> Option<&mut Self> {
        let path = self.find_path(|el| el.local_name() == local_name)?;
        self.at_path_mut(&path)
    }

    /// Returns the path of the first element in document order matching
    /// the predicate.
    pub fn find_path(&self, mut predicate: impl FnMut(&Self) -> bool) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        find_path_inner(self, &mut predicate, &mut path).then_some(path)
    }

    /// Returns the paths of every element matching the predicate, in
    /// document order.
    pub fn find_all_paths(&self, mut predicate: impl FnMut(&Self) -> bool) -> Vec<Vec<usize>> {
        let mut found = Vec::new();
        let mut path = Vec::new();
        collect_paths(self, &mut predicate, &mut path, &mut found);
        found
    }

    /// Returns the element at `path`.
    #[must_use]
    pub fn at_path(&self, path: &[usize]) -> Option<&Self> {
        let mut current = self;
        for &index in path {
            current = match current.children.get(index)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(current)
    }

    /// Returns the element at `path` mutably.
    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        let mut current = self;
        for &index in path {
            current = match current.children.get_mut(index)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(current)
    }

    /// Inserts `child` as the next sibling of the element at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is the root or does not exist.
    pub fn insert_after(&mut self, path: &[usize], child: Self) -> SamlResult<Vec<usize>> {
        let (&index, parent_path) = path
            .split_last()
            .ok_or_else(|| SamlError::InvalidOption("cannot insert a sibling of the root".to_string()))?;
        let parent = self
            .at_path_mut(parent_path)
            .ok_or_else(|| SamlError::XmlParse("node path does not exist".to_string()))?;
        parent.children.insert(index + 1, Node::Element(child));

        let mut inserted = parent_path.to_vec();
        inserted.push(index + 1);
        Ok(inserted)
    }

    /// Removes and returns the node at `path`.
    pub fn remove_at(&mut self, path: &[usize]) -> Option<Node> {
        let (&index, parent_path) = path.split_last()?;
        let parent = self.at_path_mut(parent_path)?;
        (index < parent.children.len()).then(|| parent.children.remove(index))
    }

    /// Collects the namespace declarations in scope at the element at
    /// `path`, including that element's own declarations.
    #[must_use]
    pub fn namespaces_at(&self, path: &[usize]) -> NamespaceScope {
        let mut scope = NamespaceScope::new();
        let mut current = Some(self);
        declare_namespaces(self, &mut scope);
        for &index in path {
            current = current.and_then(|el| match el.children.get(index) {
                Some(Node::Element(child)) => Some(child),
                _ => None,
            });
            if let Some(el) = current {
                declare_namespaces(el, &mut scope);
            }
        }
        scope
    }

    /// Removes whitespace-only text nodes throughout the subtree.
    pub fn remove_whitespace(&mut self) {
        self.children.retain(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(_) => true,
        });
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.remove_whitespace();
            }
        }
    }

    /// Serializes the subtree compactly, without an XML declaration.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

/// Returns the local part of a qualified name.
#[must_use]
pub fn local_part(qname: &str) -> &str {
    qname.split_once(':').map_or(qname, |(_, local)| local)
}

/// Builds a qualified name from an optional prefix.
#[must_use]
pub fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn declare_namespaces(el: &Element, scope: &mut NamespaceScope) {
    for (key, value) in &el.attributes {
        if key == "xmlns" {
            scope.insert(String::new(), value.clone());
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.insert(prefix.to_string(), value.clone());
        }
    }
}

fn find_path_inner(
    el: &Element,
    predicate: &mut impl FnMut(&Element) -> bool,
    path: &mut Vec<usize>,
) -> bool {
    if predicate(el) {
        return true;
    }
    for (index, node) in el.children.iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(index);
            if find_path_inner(child, predicate, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn collect_paths(
    el: &Element,
    predicate: &mut impl FnMut(&Element) -> bool,
    path: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
) {
    if predicate(el) {
        found.push(path.clone());
    }
    for (index, node) in el.children.iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(index);
            collect_paths(child, predicate, path, found);
            path.pop();
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        write_attribute_value(value, out);
        out.push('"');
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(child, out),
            Node::Text(text) => write_text(text, out),
        }
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

/// Whitespace a parser would normalize away is written as character
/// references, so the parsed value matches the canonical form.
fn write_attribute_value(value: &str, out: &mut String) {
    for ch in escape(value).chars() {
        match ch {
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}

fn write_text(text: &str, out: &mut String) {
    for ch in partial_escape(text).chars() {
        match ch {
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}

fn start_element(start: &BytesStart<'_>) -> SamlResult<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| SamlError::XmlParse(e.to_string()))?
        .to_string();
    let mut el = Element::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| SamlError::XmlParse(e.to_string()))?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn append_text(stack: &mut [Element], text: String) -> SamlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            if let Some(Node::Text(existing)) = parent.children.last_mut() {
                existing.push_str(&text);
            } else {
                parent.children.push(Node::Text(text));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(SamlError::XmlParse("text outside of the root element".to_string())),
    }
}

fn close_element(stack: &mut Vec<Element>, root: &mut Option<Element>, el: Element) -> SamlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(el);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        None => Err(SamlError::XmlParse("document has more than one root element".to_string())),
    }
}

/// Parses a document into its root element.
///
/// Comments, processing instructions and the XML declaration are dropped.
///
/// # Errors
///
/// Returns [`SamlError::XmlParse`] on malformed input or an empty document.
pub fn parse(xml: &str) -> SamlResult<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let el = start_element(&start)?;
                close_element(&mut stack, &mut root, el)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| SamlError::XmlParse("unexpected closing tag".to_string()))?;
                close_element(&mut stack, &mut root, el)?;
            }
            Event::Text(text) => append_text(&mut stack, text.unescape()?.into_owned())?,
            Event::CData(cdata) => {
                let text = std::str::from_utf8(&cdata)
                    .map_err(|e| SamlError::XmlParse(e.to_string()))?
                    .to_string();
                append_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SamlError::XmlParse("unclosed element at end of document".to_string()));
    }
    root.ok_or_else(|| SamlError::XmlParse("document has no root element".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize_compact() -> anyhow::Result<()> {
        let xml = r#"<a:Root xmlns:a="urn:a" ID="_1"><a:Child>text &amp; more</a:Child><a:Empty/></a:Root>"#;
        let root = parse(xml)?;
        assert_eq!(root.local_name(), "Root");
        assert_eq!(root.prefix(), Some("a"));
        assert_eq!(root.attr("ID"), Some("_1"));
        assert_eq!(root.to_xml(), xml);
        Ok(())
    }

    #[test]
    fn whitespace_only_text_is_removed() -> anyhow::Result<()> {
        let mut root = parse("<r>\n  <c> keep </c>\n  <d/>\n</r>")?;
        root.remove_whitespace();
        assert_eq!(root.to_xml(), "<r><c> keep </c><d/></r>");
        Ok(())
    }

    #[test]
    fn find_is_document_order() -> anyhow::Result<()> {
        let root = parse("<r><a><x n=\"1\"/></a><x n=\"2\"/></r>")?;
        let path = root.find_path(|el| el.local_name() == "x");
        assert_eq!(path, Some(vec![0, 0]));
        assert_eq!(root.find("x").and_then(|el| el.attr("n")), Some("1"));
        assert_eq!(root.find_all_paths(|el| el.local_name() == "x").len(), 2);
        Ok(())
    }

    #[test]
    fn insert_after_places_next_sibling() -> anyhow::Result<()> {
        let mut root = parse("<r><a/><b/></r>")?;
        let inserted = root.insert_after(&[0], Element::new("s"))?;
        assert_eq!(inserted, vec![1]);
        assert_eq!(root.to_xml(), "<r><a/><s/><b/></r>");
        assert!(root.insert_after(&[], Element::new("s")).is_err());
        Ok(())
    }

    #[test]
    fn namespaces_are_resolved_along_the_path() -> anyhow::Result<()> {
        let root = parse(r#"<r xmlns="urn:d" xmlns:p="urn:p"><p:a xmlns:p="urn:q"><b/></p:a></r>"#)?;
        let scope = root.namespaces_at(&[0, 0]);
        assert_eq!(scope.get("p").map(String::as_str), Some("urn:q"));
        assert_eq!(scope.get("").map(String::as_str), Some("urn:d"));
        Ok(())
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(parse("").is_err());
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("<a/><b/>").is_err());
        assert!(parse("<a>").is_err());
    }

    #[test]
    fn attribute_values_roundtrip_escaping() -> anyhow::Result<()> {
        let root = parse(r#"<r v="a &lt; b &quot;c&quot;"/>"#)?;
        assert_eq!(root.attr("v"), Some("a < b \"c\""));
        let reparsed = parse(&root.to_xml())?;
        assert_eq!(reparsed.attr("v"), Some("a < b \"c\""));
        Ok(())
    }

    #[test]
    fn normalizable_whitespace_is_written_as_references() -> anyhow::Result<()> {
        let root = Element::new("r")
            .with_attr("v", "a\tb\nc\r")
            .with_text("line\r\nnext");
        let xml = root.to_xml();
        assert_eq!(xml, "<r v=\"a&#x9;b&#xA;c&#xD;\">line&#xD;\nnext</r>");

        let reparsed = parse(&xml)?;
        assert_eq!(reparsed.attr("v"), Some("a\tb\nc\r"));
        assert_eq!(reparsed.text(), "line\r\nnext");
        Ok(())
    }
}
