//! Feature stripping.
//!
//! Each operation removes one kind of formatting and returns how many
//! instances it removed. A zero count means the tree was not touched.

use crate::detect::{find_source_links, sweep_dividers, DividerCounts};
use crate::error::Result;
use crate::model::{Element, InlineStyle, MarkupNode};
use crate::parse::parse_html;
use crate::parse_options::ParseOptions;
use crate::render::{escape_text, plain_text, to_html};

/// Tags unwrapped by [`strip_bold`].
pub const STRIP_BOLD_TAGS: &[&str] = &["b", "strong"];

/// Tags unwrapped by [`strip_italic`].
pub const STRIP_ITALIC_TAGS: &[&str] = &["i", "em"];

/// Which formatting a tag/style pass removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn tags(self) -> &'static [&'static str] {
        match self {
            Emphasis::Bold => STRIP_BOLD_TAGS,
            Emphasis::Italic => STRIP_ITALIC_TAGS,
        }
    }

    /// Returns true if a single declaration turns this emphasis on.
    fn is_offending(self, declaration: &str) -> bool {
        let style = InlineStyle::parse(declaration);
        let on = match self {
            Emphasis::Bold => style.bold(),
            Emphasis::Italic => style.italic(),
        };
        on == Some(true)
    }

    /// Elements this pass will touch inside a flattened subtree.
    fn is_marked(self, el: &Element) -> bool {
        el.is_any(self.tags()) || el.attr("style").is_some_and(|s| self.strip_style(s).is_some())
    }

    /// Removes the offending declarations from a style value.
    ///
    /// Returns `None` when nothing was removed, otherwise the remaining
    /// declarations joined with `"; "` (possibly empty).
    fn strip_style(self, style: &str) -> Option<String> {
        let mut removed = false;
        let kept: Vec<&str> = style
            .split(';')
            .map(str::trim)
            .filter(|decl| !decl.is_empty())
            .filter(|decl| {
                let offending = self.is_offending(decl);
                removed |= offending;
                !offending
            })
            .collect();
        removed.then(|| kept.join("; "))
    }
}

// ============================================================================
// Bold / italic
// ============================================================================

/// Unwraps `b`/`strong` elements and removes bold style declarations.
pub fn strip_bold(tree: &mut MarkupNode) -> usize {
    let count = strip_emphasis(tree, Emphasis::Bold);
    log::debug!("stripped {} bold instances", count);
    count
}

/// Unwraps `i`/`em` elements and removes italic style declarations.
pub fn strip_italic(tree: &mut MarkupNode) -> usize {
    let count = strip_emphasis(tree, Emphasis::Italic);
    log::debug!("stripped {} italic instances", count);
    count
}

fn strip_emphasis(tree: &mut MarkupNode, emphasis: Emphasis) -> usize {
    match tree {
        MarkupNode::Element(el) => {
            let mut count = strip_own_style(el, emphasis);
            count += strip_emphasis_children(el, emphasis);
            count
        }
        MarkupNode::Text(_) => 0,
    }
}

fn strip_emphasis_children(parent: &mut Element, emphasis: Emphasis) -> usize {
    let mut count = 0;
    let mut unwrapped = false;
    for child in &mut parent.children {
        let MarkupNode::Element(el) = child else {
            continue;
        };
        if el.is_any(emphasis.tags()) {
            // Flattening also drops any marked descendants
            count += count_within(el, &|e| emphasis.is_marked(e));
            *child = MarkupNode::Text(el.text_content());
            unwrapped = true;
        } else {
            count += strip_own_style(el, emphasis);
            count += strip_emphasis_children(el, emphasis);
        }
    }
    if unwrapped {
        parent.normalize();
    }
    count
}

fn strip_own_style(el: &mut Element, emphasis: Emphasis) -> usize {
    let Some(stripped) = el.attr("style").and_then(|s| emphasis.strip_style(s)) else {
        return 0;
    };
    if stripped.is_empty() {
        el.remove_attr("style");
    } else {
        el.set_attr("style", stripped);
    }
    1
}

/// Counts `el` and its descendants matching `predicate`.
fn count_within<F>(el: &Element, predicate: &F) -> usize
where
    F: Fn(&Element) -> bool,
{
    usize::from(predicate(el))
        + el.children
            .iter()
            .map(|c| c.count_elements(predicate))
            .sum::<usize>()
}

// ============================================================================
// Links
// ============================================================================

/// Unwraps anchor elements to their text content.
///
/// Plain-text URLs are left alone.
pub fn strip_hyperlinks(tree: &mut MarkupNode) -> usize {
    let count = match tree {
        MarkupNode::Element(el) => unwrap_anchors(el),
        MarkupNode::Text(_) => 0,
    };
    log::debug!("stripped {} hyperlinks", count);
    count
}

fn unwrap_anchors(parent: &mut Element) -> usize {
    let mut count = 0;
    let mut unwrapped = false;
    for child in &mut parent.children {
        let MarkupNode::Element(el) = child else {
            continue;
        };
        if el.tag == "a" {
            count += count_within(el, &|e| e.tag == "a");
            *child = MarkupNode::Text(el.text_content());
            unwrapped = true;
        } else {
            count += unwrap_anchors(el);
        }
    }
    if unwrapped {
        parent.normalize();
    }
    count
}

/// Deletes URL-shaped text found in the tree's plain text.
///
/// Every occurrence of each URL is removed from the serialized markup,
/// including occurrences inside attribute values, and the result is parsed
/// back into `tree`. Returns the number of occurrences removed; a URL split
/// across elements has no literal occurrence and is left in place.
pub fn strip_source_links(tree: &mut MarkupNode) -> Result<usize> {
    let text = plain_text(tree);
    let links = find_source_links(&text);
    if links.is_empty() {
        return Ok(0);
    }

    let mut urls: Vec<&str> = links.iter().map(|l| l.matched_text.as_str()).collect();
    // Longest first so a URL is not split by removing a shorter one it contains
    urls.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    urls.dedup();

    let mut markup = to_html(tree);
    let mut removed = 0;
    for url in urls {
        let escaped = escape_text(url);
        let found = markup.matches(escaped.as_str()).count();
        if found > 0 {
            removed += found;
            markup = markup.replace(escaped.as_str(), "");
        }
    }
    if removed == 0 {
        return Ok(0);
    }

    *tree = parse_html(&markup, &ParseOptions::default())?;
    log::debug!("stripped {} source links", removed);
    Ok(removed)
}

// ============================================================================
// Dividers
// ============================================================================

/// Removes divider artifacts in one pass and returns the counts by kind.
pub fn remove_dividers(tree: &mut MarkupNode) -> DividerCounts {
    let counts = sweep_dividers(tree);
    log::debug!("removed dividers: {:?}", counts);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn tree(html: &str) -> MarkupNode {
        parse_html(html, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_strip_bold_tags_preserves_text() {
        let mut t = tree("<p>A <b>bold</b> and <strong>strong <i>mixed</i></strong> word</p>");
        let before = plain_text(&t);
        assert_eq!(strip_bold(&mut t), 2);
        assert_eq!(plain_text(&t), before);
        assert_eq!(to_html(&t), "<p>A bold and strong mixed word</p>");
    }

    #[test]
    fn test_strip_bold_merges_text_nodes() {
        let mut t = tree("<p>a<b>b</b>c</p>");
        strip_bold(&mut t);
        let p = t.as_element().unwrap().children[0].as_element().unwrap();
        assert_eq!(p.children, vec![MarkupNode::text("abc")]);
    }

    #[test]
    fn test_strip_bold_inline_style_keeps_other_properties() {
        let mut t = tree("<span style=\"color: red; font-weight: 700; margin: 0\">x</span>");
        assert_eq!(strip_bold(&mut t), 1);
        assert_eq!(
            to_html(&t),
            "<span style=\"color: red; margin: 0\">x</span>"
        );
    }

    #[test]
    fn test_strip_bold_removes_empty_style() {
        let mut t = tree("<span style=\"font-weight:bold;\">x</span>");
        assert_eq!(strip_bold(&mut t), 1);
        assert_eq!(to_html(&t), "<span>x</span>");
    }

    #[test]
    fn test_strip_bold_font_shorthand() {
        let mut t = tree("<p style=\"font: bold 12px serif; color: blue\">x</p>");
        assert_eq!(strip_bold(&mut t), 1);
        assert_eq!(to_html(&t), "<p style=\"color: blue\">x</p>");
    }

    #[test]
    fn test_strip_bold_ignores_normal_weight() {
        let mut t = tree("<span style=\"font-weight: 400\">x</span>");
        let before = to_html(&t);
        assert_eq!(strip_bold(&mut t), 0);
        assert_eq!(to_html(&t), before);
    }

    #[test]
    fn test_strip_italic() {
        let mut t = tree("<p><em>a</em><i>b</i><span style=\"font-style: italic; color: red\">c</span></p>");
        assert_eq!(strip_italic(&mut t), 3);
        assert_eq!(to_html(&t), "<p>ab<span style=\"color: red\">c</span></p>");
        assert!(!classify(&t).italic);
    }

    #[test]
    fn test_strip_hyperlinks() {
        let mut t = tree("<p>go <a href=\"https://a.test\">there</a> or www.b.org</p>");
        assert_eq!(strip_hyperlinks(&mut t), 1);
        assert_eq!(to_html(&t), "<p>go there or www.b.org</p>");
    }

    #[test]
    fn test_strip_hyperlinks_no_anchor_is_noop() {
        let mut t = tree("<p>no <b>links</b> here</p>");
        let before = to_html(&t);
        assert_eq!(strip_hyperlinks(&mut t), 0);
        assert_eq!(to_html(&t), before);
    }

    #[test]
    fn test_strip_source_links() {
        let mut t = tree("<p>Source: https://example.com/a?x=1&amp;y=2 and www.test.org.</p>");
        assert_eq!(strip_source_links(&mut t).unwrap(), 2);
        assert_eq!(to_html(&t), "<p>Source:  and .</p>");
        assert!(!classify(&t).has_source_links);
    }

    #[test]
    fn test_strip_source_links_also_hits_attributes() {
        let mut t = tree("<p data-src=\"www.a.org\">see www.a.org</p>");
        assert_eq!(strip_source_links(&mut t).unwrap(), 2);
        assert_eq!(to_html(&t), "<p data-src=\"\">see </p>");
    }

    #[test]
    fn test_strip_source_links_none() {
        let mut t = tree("<p>3.14 is pi</p>");
        assert_eq!(strip_source_links(&mut t).unwrap(), 0);
        assert_eq!(to_html(&t), "<p>3.14 is pi</p>");
    }

    #[test]
    fn test_strip_source_links_split_across_elements() {
        let mut t = tree("<p>see <b>www.</b>example.org</p>");
        let before = to_html(&t);
        assert_eq!(strip_source_links(&mut t).unwrap(), 0);
        assert_eq!(to_html(&t), before);
    }

    #[test]
    fn test_remove_dividers() {
        let mut t = tree("<p>Intro</p><hr><p></p><p>Body</p>");
        let counts = remove_dividers(&mut t);
        assert_eq!(counts.total(), 2);
        assert_eq!(to_html(&t), "<p>Intro</p><p>Body</p>");
        assert!(!classify(&t).has_dividers);
    }
}
