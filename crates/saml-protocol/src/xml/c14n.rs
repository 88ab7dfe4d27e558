//! Exclusive XML canonicalization (without comments).
//!
//! Only the namespace declarations an element visibly uses are rendered, and
//! only where an output ancestor has not already rendered the same binding.
//! Prefixes named in an `InclusiveNamespaces` list are rendered whenever
//! they are in scope, used or not.

use std::collections::BTreeMap;

use super::{lookup, NamespaceDecl, XmlNode};

/// Canonicalizes `node` and its descendants.
///
/// `inherited` holds the declarations in scope from the node's ancestors in
/// the source document, so prefixed attributes on a detached subtree still
/// resolve.
#[must_use]
pub fn canonicalize(node: &XmlNode, inherited: &[NamespaceDecl]) -> String {
    canonicalize_with_prefixes(node, inherited, &[])
}

/// Canonicalizes `node` treating `inclusive` prefixes the way inclusive
/// canonicalization does. `#default` names the default namespace.
#[must_use]
pub fn canonicalize_with_prefixes(
    node: &XmlNode,
    inherited: &[NamespaceDecl],
    inclusive: &[&str],
) -> String {
    let mut out = String::new();
    let mut scope = inherited.to_vec();
    write_element(node, inclusive, &mut Vec::new(), &mut scope, &mut out);
    out
}

fn write_element(
    node: &XmlNode,
    inclusive: &[&str],
    rendered: &mut Vec<NamespaceDecl>,
    scope: &mut Vec<NamespaceDecl>,
    out: &mut String,
) {
    let scope_mark = scope.len();
    scope.extend(node.namespaces.iter().cloned());

    // prefix ("" for the default namespace) -> uri
    let mut utilized: BTreeMap<String, String> = BTreeMap::new();
    utilized.insert(
        node.prefix.clone().unwrap_or_default(),
        node.namespace.clone().unwrap_or_default(),
    );
    for (key, _) in &node.attributes {
        if let Some((prefix, _)) = key.split_once(':') {
            if let Some(uri) = lookup(scope, Some(prefix)) {
                utilized.insert(prefix.to_string(), uri.to_string());
            }
        }
    }
    for &prefix in inclusive {
        let key = (prefix != "#default").then_some(prefix);
        if let Some(uri) = lookup(scope, key).filter(|uri| !uri.is_empty()) {
            utilized.insert(key.unwrap_or_default().to_string(), uri.to_string());
        }
    }

    let rendered_mark = rendered.len();
    let qname = node.qualified_name();
    out.push('<');
    out.push_str(&qname);

    for (prefix, uri) in utilized {
        let key = (!prefix.is_empty()).then_some(prefix.as_str());
        let current = lookup(rendered, key).unwrap_or("");
        if current == uri {
            continue;
        }
        match key {
            Some(prefix) => {
                out.push_str(" xmlns:");
                out.push_str(prefix);
            }
            None => out.push_str(" xmlns"),
        }
        out.push_str("=\"");
        out.push_str(&escape_attribute(&uri));
        out.push('"');
        rendered.push((key.map(str::to_string), uri));
    }

    let mut attributes: Vec<(String, &str, &str)> = node
        .attributes
        .iter()
        .map(|(key, value)| {
            let (uri, local) = match key.split_once(':') {
                Some((prefix, local)) => (lookup(scope, Some(prefix)).unwrap_or(prefix), local),
                None => ("", key.as_str()),
            };
            (format!("{uri}\u{0}{local}"), key.as_str(), value.as_str())
        })
        .collect();
    attributes.sort_by(|a, b| a.0.cmp(&b.0));

    for (_, key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');

    if let Some(text) = &node.text {
        out.push_str(&escape_text(text));
    }
    for child in &node.children {
        write_element(child, inclusive, rendered, scope, out);
        if let Some(tail) = &child.tail {
            out.push_str(&escape_text(tail));
        }
    }

    out.push_str("</");
    out.push_str(&qname);
    out.push('>');

    rendered.truncate(rendered_mark);
    scope.truncate(scope_mark);
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}
