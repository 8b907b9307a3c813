//! UI tree types.

/// Ordered list of attribute name/value pairs.
///
/// Iteration order is insertion order, and it is the order attributes are
/// rendered in. Setting a name that is already present replaces its value in
/// place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, keeping the original position if `name` exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Look up the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}

/// A node of a renderable UI tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// An HTML element with ordered attributes and child nodes.
    Element {
        /// Tag name (e.g., `div`).
        tag: String,
        /// Attributes in render order.
        attrs: Attrs,
        /// Child nodes. Ignored for void elements such as `br`.
        children: Vec<Node>,
    },
    /// Text content, escaped on render.
    Text(String),
    /// Pre-rendered HTML, inserted verbatim.
    Raw(String),
    /// A list of nodes rendered without a wrapper element.
    Fragment(Vec<Node>),
}

impl Node {
    /// Create an element with no attributes or children.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    #[must_use]
    pub fn raw(html: impl Into<String>) -> Self {
        Self::Raw(html.into())
    }

    #[must_use]
    pub fn fragment(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self::Fragment(nodes.into_iter().collect())
    }

    /// Set an attribute. Has no effect on non-element nodes.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            attrs.set(name, value);
        }
        self
    }

    /// Append a child. Elements and fragments accept children; text and raw
    /// nodes are returned unchanged.
    #[must_use]
    pub fn child(mut self, node: Node) -> Self {
        match &mut self {
            Self::Element { children, .. } | Self::Fragment(children) => children.push(node),
            Self::Text(_) | Self::Raw(_) => {}
        }
        self
    }

    /// Append several children in order.
    #[must_use]
    pub fn children(self, nodes: impl IntoIterator<Item = Node>) -> Self {
        nodes.into_iter().fold(self, Self::child)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
