//! Markup tree definitions.

use serde::{Deserialize, Serialize};

/// Tag used for the synthetic root that holds a parsed fragment.
pub const FRAGMENT_TAG: &str = "#fragment";

/// HTML elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// A single `name="value"` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Lower-cased attribute name
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

impl Attribute {
    /// Creates a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element node with its attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Lower-cased tag name
    pub tag: String,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
    /// Children in document order
    pub children: Vec<MarkupNode>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns true if the tag is one of `tags`.
    pub fn is_any(&self, tags: &[&str]) -> bool {
        tags.contains(&self.tag.as_str())
    }

    /// Returns true for elements that cannot have children.
    pub fn is_void(&self) -> bool {
        self.is_any(VOID_ELEMENTS)
    }

    /// Returns true for the synthetic fragment root.
    pub fn is_fragment(&self) -> bool {
        self.tag == FRAGMENT_TAG
    }

    /// Gets an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Returns true if the `class` attribute contains `class` as a token.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Returns true if every child is whitespace-only text.
    pub fn is_blank(&self) -> bool {
        self.children.iter().all(|c| match c {
            MarkupNode::Text(t) => t.trim().is_empty(),
            MarkupNode::Element(_) => false,
        })
    }

    /// Merges adjacent text children and drops empty ones.
    ///
    /// Only this element's own child list is touched.
    pub fn normalize(&mut self) {
        let mut merged: Vec<MarkupNode> = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            match child {
                MarkupNode::Text(text) if text.is_empty() => {}
                MarkupNode::Text(text) => match merged.last_mut() {
                    Some(MarkupNode::Text(prev)) => prev.push_str(&text),
                    _ => merged.push(MarkupNode::Text(text)),
                },
                element => merged.push(element),
            }
        }
        self.children = merged;
    }
}

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkupNode {
    /// Character data
    Text(String),
    /// An element with attributes and children
    Element(Element),
}

impl MarkupNode {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        MarkupNode::Text(value.into())
    }

    /// Creates an empty element node.
    pub fn element(tag: impl Into<String>) -> Self {
        MarkupNode::Element(Element::new(tag))
    }

    /// Creates a fragment root holding `children`.
    pub fn fragment(children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element(Element {
            tag: FRAGMENT_TAG.to_string(),
            attributes: Vec::new(),
            children,
        })
    }

    /// Adds an attribute (builder style). No-op on text nodes.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let MarkupNode::Element(el) = &mut self {
            el.set_attr(name, value);
        }
        self
    }

    /// Appends a child (builder style). No-op on text nodes.
    pub fn with_child(mut self, child: MarkupNode) -> Self {
        if let MarkupNode::Element(el) = &mut self {
            el.children.push(child);
        }
        self
    }

    /// Appends a text child (builder style).
    pub fn with_text(self, value: impl Into<String>) -> Self {
        self.with_child(MarkupNode::text(value))
    }

    /// Returns the element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(el) => Some(el),
            MarkupNode::Text(_) => None,
        }
    }

    /// Returns the element mutably, if this is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            MarkupNode::Element(el) => Some(el),
            MarkupNode::Text(_) => None,
        }
    }

    /// Returns true if this is an element with the given tag.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|el| el.tag == tag)
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            MarkupNode::Text(text) => out.push_str(text),
            MarkupNode::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Returns true if the tree contains no non-whitespace text.
    pub fn is_empty_text(&self) -> bool {
        match self {
            MarkupNode::Text(text) => text.trim().is_empty(),
            MarkupNode::Element(el) => el.children.iter().all(MarkupNode::is_empty_text),
        }
    }

    /// Counts elements (including this one) matching `predicate`.
    pub fn count_elements<F>(&self, predicate: &F) -> usize
    where
        F: Fn(&Element) -> bool,
    {
        match self {
            MarkupNode::Text(_) => 0,
            MarkupNode::Element(el) => {
                let own = usize::from(predicate(el));
                own + el
                    .children
                    .iter()
                    .map(|c| c.count_elements(predicate))
                    .sum::<usize>()
            }
        }
    }
}

impl Default for MarkupNode {
    fn default() -> Self {
        MarkupNode::fragment(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_text_content() {
        let node = MarkupNode::element("p")
            .with_text("Hello ")
            .with_child(MarkupNode::element("b").with_text("bold"))
            .with_text(" world");
        assert_eq!(node.text_content(), "Hello bold world");
        assert!(node.is_tag("p"));
    }

    #[test]
    fn test_attr_roundtrip() {
        let mut el = Element::new("span");
        el.set_attr("style", "color: red");
        el.set_attr("class", "a highlight");
        el.set_attr("style", "color: blue");
        assert_eq!(el.attr("style"), Some("color: blue"));
        assert_eq!(el.attributes.len(), 2);
        assert!(el.has_class("highlight"));
        assert!(!el.has_class("high"));
        assert_eq!(el.remove_attr("style").as_deref(), Some("color: blue"));
        assert!(el.attr("style").is_none());
    }

    #[test]
    fn test_normalize_merges_adjacent_text() {
        let mut el = Element::new("p");
        el.children = vec![
            MarkupNode::text("a"),
            MarkupNode::text(""),
            MarkupNode::text("b"),
            MarkupNode::element("br"),
            MarkupNode::text("c"),
        ];
        el.normalize();
        assert_eq!(
            el.children,
            vec![
                MarkupNode::text("ab"),
                MarkupNode::element("br"),
                MarkupNode::text("c"),
            ]
        );
    }

    #[test]
    fn test_count_elements() {
        let tree = MarkupNode::fragment(vec![
            MarkupNode::element("b").with_child(MarkupNode::element("b").with_text("x")),
            MarkupNode::element("i").with_text("y"),
        ]);
        assert_eq!(tree.count_elements(&|el| el.tag == "b"), 2);
        assert_eq!(tree.count_elements(&|el| el.tag == "a"), 0);
    }

    #[test]
    fn test_blank_and_void() {
        let mut div = Element::new("div");
        assert!(div.is_blank());
        div.children.push(MarkupNode::text("  \n "));
        assert!(div.is_blank());
        div.children.push(MarkupNode::element("br"));
        assert!(!div.is_blank());
        assert!(Element::new("hr").is_void());
        assert!(!Element::new("p").is_void());
    }
}
