//! Text-node traversal.
//!
//! The walker rewrites text node values in document order and never
//! touches element tags, attributes, or child lists.

use crate::model::MarkupNode;

/// Replaces every text node's value with `f(value)`.
///
/// Returns the number of text nodes whose value changed.
pub fn walk_text<F>(node: &mut MarkupNode, f: &mut F) -> usize
where
    F: FnMut(&str) -> String,
{
    match node {
        MarkupNode::Text(value) => {
            let replaced = f(value.as_str());
            if replaced == *value {
                0
            } else {
                *value = replaced;
                1
            }
        }
        MarkupNode::Element(el) => {
            let mut changed = 0;
            for child in &mut el.children {
                changed += walk_text(child, f);
            }
            changed
        }
    }
}

/// Visits every text node value in document order without modifying it.
pub fn for_each_text<F>(node: &MarkupNode, f: &mut F)
where
    F: FnMut(&str),
{
    match node {
        MarkupNode::Text(value) => f(value),
        MarkupNode::Element(el) => {
            for child in &el.children {
                for_each_text(child, f);
            }
        }
    }
}
