use std::fmt::Write as _;

use indexmap::IndexMap;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Element node of a rendered scene graph.
///
/// Attributes keep insertion order so serialized output is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneNode {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<SceneNode>,
    pub text: Option<String>,
}

impl SceneNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Root `svg` element of the given pixel size.
    #[must_use]
    pub fn svg_root(width: u32, height: u32) -> Self {
        Self::new("svg")
            .with_attr("xmlns", SVG_NAMESPACE)
            .with_attr("width", width.to_string())
            .with_attr("height", height.to_string())
            .with_attr("viewBox", format!("0 0 {width} {height}"))
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn push(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First node with `tag` in document order, `self` included.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&SceneNode> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tag))
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Serializes the subtree as XML.
    ///
    /// A standalone `svg` root always declares the SVG namespace, matching
    /// what a DOM serializer emits for an element lifted out of its page.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out, true);
        out
    }

    fn write_markup(&self, out: &mut String, is_root: bool) {
        out.push('<');
        out.push_str(&self.tag);
        if is_root && self.tag == "svg" && !self.attributes.contains_key("xmlns") {
            let _ = write!(out, " xmlns=\"{SVG_NAMESPACE}\"");
        }
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_xml(value));
        }
        if self.children.is_empty() && self.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_xml(text));
        }
        for child in &self.children {
            child.write_markup(out, false);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_escapes_text_and_attributes() {
        let node = SceneNode::new("g")
            .with_attr("data-label", "a<b & \"c\"")
            .with_child(SceneNode::new("text").with_text("Orion's belt"));
        assert_eq!(
            node.to_markup(),
            "<g data-label=\"a&lt;b &amp; &quot;c&quot;\"><text>Orion&apos;s belt</text></g>"
        );
    }

    #[test]
    fn bare_svg_root_gains_namespace() {
        let node = SceneNode::new("svg").with_attr("width", "10");
        assert_eq!(
            node.to_markup(),
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\"/>"
        );
    }

    #[test]
    fn find_walks_in_document_order() {
        let tree = SceneNode::new("div")
            .with_child(SceneNode::new("canvas"))
            .with_child(SceneNode::new("svg").with_attr("id", "first"))
            .with_child(SceneNode::new("svg").with_attr("id", "second"));
        assert_eq!(tree.find("svg").and_then(|n| n.attr("id")), Some("first"));
        assert_eq!(tree.node_count(), 4);
        assert!(tree.find("path").is_none());
    }
}
