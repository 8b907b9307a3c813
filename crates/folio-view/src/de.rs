//! Deserialization of UI trees from self-describing formats (YAML, JSON).

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::node::{Attrs, Node};

impl<'de> Deserialize<'de> for Attrs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttrsVisitor)
    }
}

struct AttrsVisitor;

impl<'de> Visitor<'de> for AttrsVisitor {
    type Value = Attrs;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of attribute names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Attrs, A::Error> {
        let mut attrs = Attrs::new();
        while let Some((name, AttrValue(value))) = map.next_entry::<String, AttrValue>()? {
            attrs.set(name, value);
        }
        Ok(attrs)
    }
}

/// Attribute value accepting any scalar, so `width: 640` and `defer: true`
/// work without quoting.
struct AttrValue(String);

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor).map(AttrValue)
    }
}

struct ScalarVisitor;

impl Visitor<'_> for ScalarVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a sequence of nodes, or a mapping with `tag` or `raw`")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Text(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Text(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Text(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Text(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Text(v.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut nodes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(node) = seq.next_element::<Node>()? {
            nodes.push(node);
        }
        Ok(Node::Fragment(nodes))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut tag: Option<String> = None;
        let mut attrs: Option<Attrs> = None;
        let mut children: Option<Vec<Node>> = None;
        let mut raw: Option<String> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "tag" => tag = Some(map.next_value()?),
                "attrs" => attrs = Some(map.next_value()?),
                "children" => {
                    // A single child may be written without a surrounding list.
                    children = Some(match map.next_value::<Node>()? {
                        Node::Fragment(nodes) => nodes,
                        node => vec![node],
                    });
                }
                "raw" => raw = Some(map.next_value()?),
                other => {
                    return Err(de::Error::unknown_field(
                        other,
                        &["tag", "attrs", "children", "raw"],
                    ));
                }
            }
        }

        match (tag, raw) {
            (Some(tag), None) => Ok(Node::Element {
                tag,
                attrs: attrs.unwrap_or_default(),
                children: children.unwrap_or_default(),
            }),
            (None, Some(html)) if attrs.is_none() && children.is_none() => Ok(Node::Raw(html)),
            (None, Some(_)) => Err(de::Error::custom(
                "`raw` nodes cannot have `attrs` or `children`",
            )),
            (Some(_), Some(_)) => Err(de::Error::custom(
                "a node cannot have both `tag` and `raw`",
            )),
            (None, None) => Err(de::Error::missing_field("tag")),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::render_to_string;

    #[test]
    fn test_yaml_element_tree() {
        let yaml = r#"
tag: main
attrs:
  id: app
  class: hero
children:
  - tag: h1
    children: Welcome
  - "plain & simple"
  - raw: "<hr/>"
"#;
        let node: Node = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            render_to_string(&node),
            r#"<main id="app" class="hero"><h1>Welcome</h1>plain &amp; simple<hr/></main>"#
        );
    }

    #[test]
    fn test_yaml_sequence_is_fragment() {
        let node: Node = serde_yaml::from_str("- a\n- b\n").unwrap();
        assert_eq!(node, Node::Fragment(vec![Node::text("a"), Node::text("b")]));
    }

    #[test]
    fn test_yaml_scalar_attribute_values() {
        let yaml = "tag: img\nattrs:\n  width: 640\n  hidden: true\n";
        let node: Node = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            render_to_string(&node),
            r#"<img width="640" hidden="true"/>"#
        );
    }

    #[test]
    fn test_json_element_tree() {
        let json = r#"{"tag": "p", "attrs": {"b": "2", "a": "1"}, "children": ["x"]}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(render_to_string(&node), r#"<p b="2" a="1">x</p>"#);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = serde_yaml::from_str::<Node>("tag: p\nstyle: red\n").unwrap_err();
        assert!(err.to_string().contains("style"), "got: {err}");
    }

    #[test]
    fn test_mapping_without_tag_rejected() {
        let err = serde_yaml::from_str::<Node>("attrs:\n  id: x\n").unwrap_err();
        assert!(err.to_string().contains("tag"), "got: {err}");
    }

    #[test]
    fn test_tag_and_raw_conflict_rejected() {
        let result = serde_yaml::from_str::<Node>("tag: p\nraw: <b/>\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_attrs_preserve_document_order() {
        let attrs: Attrs = serde_yaml::from_str("name: description\ncontent: x\n").unwrap();
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("name", "description"), ("content", "x")]);
    }
}
