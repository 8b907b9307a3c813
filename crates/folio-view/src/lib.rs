//! Renderable UI tree and server-side HTML rendering for Folio.
//!
//! A page body is described as a [`Node`] tree: elements with ordered
//! attributes, escaped text, pre-rendered HTML and fragments. The tree is
//! converted to markup by [`render_to_string`], a pure function of the tree:
//! the same tree always produces the same string and nothing outside the
//! returned value is touched.
//!
//! # Example
//!
//! ```
//! use folio_view::{Node, render_to_string};
//!
//! let tree = Node::element("main")
//!     .attr("class", "hero")
//!     .child(Node::element("h1").child(Node::text("Hello & welcome")))
//!     .child(Node::element("br"));
//!
//! assert_eq!(
//!     render_to_string(&tree),
//!     r#"<main class="hero"><h1>Hello &amp; welcome</h1><br/></main>"#
//! );
//! ```
//!
//! # Deserialization
//!
//! With the `serde` feature, [`Node`] can be loaded from YAML or JSON:
//!
//! - a string is a text node
//! - a sequence is a fragment
//! - `{ raw: "<b>x</b>" }` is pre-rendered HTML
//! - `{ tag: "p", attrs: { ... }, children: [ ... ] }` is an element

#[cfg(feature = "serde")]
mod de;
mod html;
mod node;

pub use html::{escape_html, is_valid_name, render_into, render_to_string};
pub use node::{Attrs, Node};
