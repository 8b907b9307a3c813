//! HTML serialization of [`Node`] trees.
//!
//! Produces compact markup with no whitespace between tags. Void elements are
//! self-closed (`<br/>`) and never render children.

use crate::node::{Attrs, Node};

/// Elements that cannot have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Render a tree to an HTML string.
#[must_use]
pub fn render_to_string(node: &Node) -> String {
    let mut out = String::with_capacity(1024);
    render_into(node, &mut out);
    out
}

/// Render a tree, appending the markup to `out`.
pub fn render_into(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Raw(html) => out.push_str(html),
        Node::Fragment(children) => {
            for child in children {
                render_into(child, out);
            }
        }
        Node::Element {
            tag,
            attrs,
            children,
        } => render_element(tag, attrs, children, out),
    }
}

fn render_element(tag: &str, attrs: &Attrs, children: &[Node], out: &mut String) {
    if !is_valid_name(tag) {
        tracing::warn!(tag = %tag, "Skipping element with invalid tag name");
        return;
    }

    let tag = tag.to_ascii_lowercase();
    out.push('<');
    out.push_str(&tag);
    for (name, value) in attrs.iter() {
        if !is_valid_name(name) {
            tracing::warn!(tag = %tag, attribute = %name, "Skipping invalid attribute name");
            continue;
        }
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
    }

    if VOID_ELEMENTS.contains(&tag.as_str()) {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in children {
        render_into(child, out);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

/// Whether `name` is acceptable as a tag or attribute name.
///
/// Names are limited to `[A-Za-z0-9-_:.]` so a name can never break out of
/// its tag.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
