//! Feature vector describing which formatting artifacts a tree contains.

use serde::{Deserialize, Serialize};

/// Formatting features detected in the live tree.
///
/// Always recomputed from scratch after a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Bold text (tags or inline weight)
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
    /// Anchor elements
    pub has_links: bool,
    /// URL-shaped substrings in the plain text
    pub has_source_links: bool,
    /// Divider artifacts
    pub has_dividers: bool,
}

impl FeatureVector {
    /// Returns true if nothing was detected.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    /// Labels of the detected features, in indicator order.
    pub fn labels(&self) -> Vec<&'static str> {
        let flags = [
            (self.bold, "Bold Text"),
            (self.italic, "Italic Text"),
            (self.has_links, "Hyperlinks"),
            (self.underline, "Underlined"),
            (self.has_source_links, "Source Links"),
            (self.has_dividers, "AI Dividers"),
        ];
        flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, label)| *label)
            .collect()
    }

    /// Field-wise union.
    pub fn union(self, other: Self) -> Self {
        Self {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
            has_links: self.has_links || other.has_links,
            has_source_links: self.has_source_links || other.has_source_links,
            has_dividers: self.has_dividers || other.has_dividers,
        }
    }
}
