//! Plain-text extraction and text statistics.

use crate::model::{Element, MarkupNode};
use serde::Serialize;

/// Elements that start on their own line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

/// Returns the visible text of a tree, with line breaks for `br` and
/// between block elements.
pub fn plain_text(node: &MarkupNode) -> String {
    let mut out = String::new();
    write_text(node, &mut out);
    out.trim_end_matches('\n').to_string()
}

fn write_text(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(text) => out.push_str(text),
        MarkupNode::Element(el) if el.tag == "br" => out.push('\n'),
        MarkupNode::Element(el) => {
            let block = is_block(el);
            if block {
                break_line(out);
            }
            for child in &el.children {
                write_text(child, out);
            }
            if block {
                break_line(out);
            }
        }
    }
}

fn is_block(el: &Element) -> bool {
    el.is_any(BLOCK_ELEMENTS)
}

fn break_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Word and character counts of a tree's plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Whitespace-separated words
    pub words: usize,
    /// Characters (Unicode scalar values)
    pub characters: usize,
}

impl TextStats {
    /// Computes stats for a plain-text string.
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
        }
    }
}

impl std::fmt::Display for TextStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} words, {} characters", self.words, self.characters)
    }
}
