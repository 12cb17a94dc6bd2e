//! # Text Cleanup
//!
//! Rewrites every text node of a tree in place. Element structure is never
//! touched; only text node values change.
//!
//! ## Rules (applied in order)
//!
//! 1. **Unicode normalization** - NFC
//! 2. **Joined dashes** - an em or en dash between two word characters becomes `", "`
//! 3. **Loose dashes** - any remaining em or en dash, with the whitespace around
//!    it (line breaks too), becomes a single space
//! 4. **Whitespace** - runs of horizontal whitespace collapse to one space; line
//!    breaks are kept

use crate::model::MarkupNode;
use crate::walk::walk_text;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::{is_nfc, UnicodeNormalization};

/// Cleanup configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Apply Unicode NFC normalization first
    pub normalize_unicode: bool,
    /// Apply the dash rules
    pub dashes: bool,
    /// Collapse horizontal whitespace
    pub collapse_whitespace: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            dashes: true,
            collapse_whitespace: true,
        }
    }
}

impl CleanupOptions {
    /// Creates options for minimal cleanup (normalization and whitespace only)
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            dashes: false,
            collapse_whitespace: true,
        }
    }

    /// Enables or disables the dash rules.
    pub fn with_dashes(mut self, enabled: bool) -> Self {
        self.dashes = enabled;
        self
    }

    /// Enables or disables whitespace collapsing.
    pub fn with_collapse_whitespace(mut self, enabled: bool) -> Self {
        self.collapse_whitespace = enabled;
        self
    }

    /// Enables or disables NFC normalization.
    pub fn with_normalize_unicode(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }
}

// ============================================================================
// Dashes
// ============================================================================

const EM_DASH: char = '\u{2014}';
const EN_DASH: char = '\u{2013}';

/// A dash with optional whitespace, line breaks included, on either side.
static RE_LOOSE_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\u{2014}\u{2013}]\s*").unwrap());

fn is_dash(c: char) -> bool {
    c == EM_DASH || c == EN_DASH
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replaces each dash that sits directly between two word characters with `", "`.
///
/// Neighbours are taken from the input, so `a—b—c` becomes `a, b, c`.
pub fn join_dashes(input: &str) -> String {
    if !input.contains(is_dash) {
        return input.to_string();
    }

    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        let joined = is_dash(c)
            && i > 0
            && is_word_char(chars[i - 1])
            && chars.get(i + 1).copied().is_some_and(is_word_char);
        if joined {
            result.push_str(", ");
        } else {
            result.push(c);
        }
    }
    result
}

/// Replaces every remaining dash and the whitespace around it with one space.
pub fn loosen_dashes(input: &str) -> String {
    RE_LOOSE_DASH.replace_all(input, " ").into_owned()
}

// ============================================================================
// Whitespace
// ============================================================================

/// Horizontal whitespace: any whitespace except CR and LF.
static RE_HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\r\n]+").unwrap());

/// Collapses runs of horizontal whitespace into a single space.
pub fn collapse_whitespace(input: &str) -> String {
    RE_HORIZONTAL_SPACE.replace_all(input, " ").into_owned()
}

// ============================================================================
// Entry points
// ============================================================================

/// Cleans a single string.
pub fn clean_text(input: &str, options: &CleanupOptions) -> String {
    let mut text = if options.normalize_unicode && !is_nfc(input) {
        input.nfc().collect::<String>()
    } else {
        input.to_string()
    };

    if options.dashes {
        text = join_dashes(&text);
        text = loosen_dashes(&text);
    }

    if options.collapse_whitespace {
        text = collapse_whitespace(&text);
    }

    text
}

/// Cleans every text node of a tree in place.
///
/// Returns the number of text nodes that changed.
pub fn clean(tree: &mut MarkupNode, options: &CleanupOptions) -> usize {
    let changed = walk_text(tree, &mut |text| clean_text(text, options));
    log::debug!("cleanup changed {} text nodes", changed);
    changed
}

/// Cleans a tree with default options.
pub fn clean_default(tree: &mut MarkupNode) -> usize {
    clean(tree, &CleanupOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_html;
    use crate::render::to_html;
    use crate::ParseOptions;

    fn cleaned(input: &str) -> String {
        clean_text(input, &CleanupOptions::default())
    }

    #[test]
    fn test_dash_between_words() {
        assert_eq!(cleaned("a—b"), "a, b");
        assert_eq!(cleaned("pages 3–5"), "pages 3, 5");
        assert_eq!(cleaned("a—b—c"), "a, b, c");
    }

    #[test]
    fn test_spaced_dash() {
        assert_eq!(cleaned("a — b"), "a b");
        assert_eq!(cleaned("a –b"), "a b");
        assert_eq!(cleaned("— leading"), " leading");
    }

    #[test]
    fn test_spaced_dash_across_line_break() {
        assert_eq!(cleaned("a\n— b"), "a b");
        assert_eq!(cleaned("end —\r\nnext"), "end next");
        assert_eq!(cleaned("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_dash_at_edges_of_words() {
        assert_eq!(cleaned("end—"), "end ");
        assert_eq!(cleaned("(a)—(b)"), "(a) (b)");
    }

    #[test]
    fn test_hyphen_untouched() {
        assert_eq!(cleaned("well-known"), "well-known");
    }

    #[test]
    fn test_whitespace_collapse_keeps_newlines() {
        assert_eq!(cleaned("a  \t b\n\n  c"), "a b\n\n c");
        assert_eq!(cleaned("a\u{00A0}\u{00A0}b"), "a b");
    }

    #[test]
    fn test_nfc() {
        assert_eq!(cleaned("cafe\u{0301}"), "caf\u{00E9}");
        let raw = clean_text(
            "cafe\u{0301}",
            &CleanupOptions::default().with_normalize_unicode(false),
        );
        assert_eq!(raw, "cafe\u{0301}");
    }

    #[test]
    fn test_minimal_keeps_dashes() {
        assert_eq!(clean_text("a—b  c", &CleanupOptions::minimal()), "a—b c");
    }

    #[test]
    fn test_clean_tree_only_touches_text() {
        let mut tree = parse_html(
            "<p title=\"a — b\">x — y</p><b>ok</b><p>m—n</p>",
            &ParseOptions::default(),
        )
        .unwrap();
        let changed = clean(&mut tree, &CleanupOptions::default());
        assert_eq!(changed, 2);
        assert_eq!(
            to_html(&tree),
            "<p title=\"a — b\">x y</p><b>ok</b><p>m, n</p>"
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let once = cleaned("a — b—c   d");
        assert_eq!(cleaned(&once), once);
    }
}
