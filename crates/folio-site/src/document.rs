//! HTML document assembly.
//!
//! A document is laid out in a fixed order:
//!
//! ```text
//! <!DOCTYPE html>
//! <html lang="en">
//! <head>
//! <meta charset="utf-8" />
//! <meta name="viewport" ... />
//! {meta tags}
//! <title>{title}</title>
//! {stylesheet links}
//! </head>
//! <body>
//! <div id="root">{rendered root}</div>
//! {scripts}
//! </body>
//! </html>
//! ```

use std::collections::HashSet;

use folio_pages::{AssetKind, MetaTag, PageDefinition};
use folio_view::{escape_html, is_valid_name, render_into};

const CHARSET_META: &str = r#"<meta charset="utf-8" />"#;
const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1" />"#;

/// Imports split by the tag they turn into, in declaration order.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Assets<'a> {
    pub stylesheets: Vec<&'a str>,
    pub scripts: Vec<&'a str>,
}

/// Classify imports, dropping unrecognized ones.
///
/// Each unrecognized path is warned about once, even if it is listed twice.
pub(crate) fn classify_imports<'a>(id: &str, imports: &'a [String]) -> Assets<'a> {
    let mut assets = Assets::default();
    let mut warned = HashSet::new();

    for import in imports {
        match AssetKind::classify(import) {
            Some(AssetKind::Stylesheet) => assets.stylesheets.push(import),
            Some(AssetKind::Script) => assets.scripts.push(import),
            None => {
                if warned.insert(import.as_str()) {
                    tracing::warn!(page = %id, import = %import, "Skipping import with unknown asset type");
                }
            }
        }
    }

    assets
}

/// Append one `<meta ... />` line. Tags left without valid attributes emit
/// nothing.
fn push_meta_tag(out: &mut String, tag: &MetaTag) {
    let attrs: Vec<(&str, &str)> = tag
        .attrs()
        .iter()
        .filter(|(name, _)| {
            let valid = is_valid_name(name);
            if !valid {
                tracing::warn!(attribute = %name, "Skipping invalid meta attribute name");
            }
            valid
        })
        .collect();
    if attrs.is_empty() {
        return;
    }

    out.push_str("<meta");
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push_str(" />\n");
}

/// Assemble the complete HTML document for a page definition.
///
/// Pure apart from warnings about unrecognized imports: the same definition
/// always yields the same document.
///
/// # Example
///
/// ```
/// use folio_pages::PageDefinition;
/// use folio_site::assemble_document;
/// use folio_view::Node;
///
/// let def = PageDefinition::new("Home", Node::text("hi")).with_import("site.css");
/// let html = assemble_document("index", &def);
///
/// assert!(html.starts_with("<!DOCTYPE html>"));
/// assert!(html.contains(r#"<link rel="stylesheet" href="site.css" />"#));
/// assert!(html.contains(r#"<div id="root">hi</div>"#));
/// ```
#[must_use]
pub fn assemble_document(id: &str, definition: &PageDefinition) -> String {
    let assets = classify_imports(id, &definition.imports);
    let mut out = String::with_capacity(2048);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str(CHARSET_META);
    out.push('\n');
    out.push_str(VIEWPORT_META);
    out.push('\n');
    for tag in &definition.meta_tags {
        push_meta_tag(&mut out, tag);
    }
    out.push_str("<title>");
    out.push_str(&escape_html(&definition.title));
    out.push_str("</title>\n");
    for href in &assets.stylesheets {
        out.push_str("<link rel=\"stylesheet\" href=\"");
        out.push_str(&escape_html(href));
        out.push_str("\" />\n");
    }
    out.push_str("</head>\n<body>\n<div id=\"root\">");
    render_into(&definition.root, &mut out);
    out.push_str("</div>\n");
    for src in &assets.scripts {
        out.push_str("<script src=\"");
        out.push_str(&escape_html(src));
        out.push_str("\"></script>\n");
    }
    out.push_str("</body>\n</html>\n");

    out
}
