//! Exclusive XML Canonicalization 1.0, without comments.
//!
//! Only namespaces visibly utilized by an element or its attributes are
//! rendered, and only where the nearest rendered ancestor does not already
//! carry the same binding.

use super::{local_part, Element, NamespaceScope, Node};

const XML_PREFIX: &str = "xml";

/// Canonicalizes `element` as an apex node.
///
/// `inherited` holds the namespace declarations in scope at the element's
/// parent, as returned by [`Element::namespaces_at`].
#[must_use]
pub fn canonicalize(element: &Element, inherited: &NamespaceScope) -> String {
    let mut out = String::new();
    write_element(element, inherited, &NamespaceScope::new(), &mut out);
    out
}

fn write_element(
    el: &Element,
    parent_scope: &NamespaceScope,
    rendered: &NamespaceScope,
    out: &mut String,
) {
    let mut scope = parent_scope.clone();
    let mut attributes: Vec<(&str, &str)> = Vec::new();
    for (key, value) in &el.attributes {
        if key == "xmlns" {
            scope.insert(String::new(), value.clone());
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.insert(prefix.to_string(), value.clone());
        } else {
            attributes.push((key.as_str(), value.as_str()));
        }
    }

    let mut utilized: Vec<&str> = vec![el.prefix().unwrap_or("")];
    for (key, _) in &attributes {
        if let Some((prefix, _)) = key.split_once(':') {
            if prefix != XML_PREFIX && !utilized.contains(&prefix) {
                utilized.push(prefix);
            }
        }
    }

    let mut rendered_here = rendered.clone();
    let mut declarations: Vec<(String, String)> = Vec::new();
    for prefix in utilized {
        let uri = scope.get(prefix).map_or("", String::as_str);
        let current = rendered.get(prefix).map_or("", String::as_str);
        if uri == current && (rendered.contains_key(prefix) || prefix.is_empty()) {
            continue;
        }
        declarations.push((prefix.to_string(), uri.to_string()));
        rendered_here.insert(prefix.to_string(), uri.to_string());
    }
    // Default namespace first, then by prefix.
    declarations.sort();

    attributes.sort_by(|(a, _), (b, _)| {
        let key_a = (attribute_namespace(a, &scope), local_part(a));
        let key_b = (attribute_namespace(b, &scope), local_part(b));
        key_a.cmp(&key_b)
    });

    out.push('<');
    out.push_str(&el.name);
    for (prefix, uri) in &declarations {
        if prefix.is_empty() {
            out.push_str(" xmlns=\"");
        } else {
            out.push_str(" xmlns:");
            out.push_str(prefix);
            out.push_str("=\"");
        }
        escape_attribute(uri, out);
        out.push('"');
    }
    for (key, value) in &attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }
    out.push('>');

    for node in &el.children {
        match node {
            Node::Element(child) => write_element(child, &scope, &rendered_here, out),
            Node::Text(text) => escape_text(text, out),
        }
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn attribute_namespace<'a>(qname: &str, scope: &'a NamespaceScope) -> &'a str {
    match qname.split_once(':') {
        Some((XML_PREFIX, _)) => "http://www.w3.org/XML/1998/namespace",
        Some((prefix, _)) => scope.get(prefix).map_or("", String::as_str),
        None => "",
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}

fn escape_text(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}
