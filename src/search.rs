//! Search, highlight and replace over text nodes.
//!
//! Matching is always case-insensitive and global. Both operations only
//! rewrite text nodes (highlight additionally splices marker elements in
//! next to them) and keep sibling order intact.

use crate::detect::{compile_pattern, find_all, MatchSpan};
use crate::error::Result;
use crate::model::{Element, MarkupNode};
use crate::walk::{for_each_text, walk_text};
use regex::Regex;

/// A compiled user search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pattern: String,
    is_regex: bool,
    regex: Regex,
}

impl SearchQuery {
    /// Compiles a search. Literal patterns have every metacharacter escaped.
    pub fn new(pattern: &str, is_regex: bool) -> Result<Self> {
        Ok(Self {
            pattern: pattern.to_string(),
            is_regex,
            regex: compile_pattern(pattern, is_regex)?,
        })
    }

    /// The pattern as the user typed it.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the pattern is a regular expression.
    pub fn is_regex(&self) -> bool {
        self.is_regex
    }

    /// Non-empty matches in `text`, ascending and non-overlapping.
    pub fn find(&self, text: &str) -> Vec<MatchSpan> {
        find_all(text, &self.regex)
    }

    /// Substitutes every non-empty match in `text`.
    ///
    /// Regex queries expand `$1` / `${name}` in `replacement`; literal
    /// queries insert it verbatim. Returns the new text and the match count.
    pub fn replace_in(&self, text: &str, replacement: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut count = 0;
        for caps in self.regex.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if m.is_empty() {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            if self.is_regex {
                caps.expand(replacement, &mut out);
            } else {
                out.push_str(replacement);
            }
            last = m.end();
            count += 1;
        }
        if count == 0 {
            return (text.to_string(), 0);
        }
        out.push_str(&text[last..]);
        (out, count)
    }
}

/// The element used to wrap highlighted matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarker {
    /// Wrapper tag
    pub tag: String,
    /// Class token identifying the wrapper
    pub class: String,
}

impl Default for HighlightMarker {
    fn default() -> Self {
        Self::new("span", "highlight")
    }
}

impl HighlightMarker {
    /// Creates a marker description.
    pub fn new(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            class: class.into(),
        }
    }

    /// Returns true if `el` is a marker.
    pub fn matches(&self, el: &Element) -> bool {
        el.tag == self.tag && el.has_class(&self.class)
    }

    fn wrap(&self, text: &str) -> MarkupNode {
        MarkupNode::element(self.tag.as_str())
            .with_attr("class", self.class.as_str())
            .with_text(text)
    }
}

/// Replaces every marker with a text node of its content and merges
/// adjacent text. Returns the number of markers removed.
pub fn remove_highlights(tree: &mut MarkupNode, marker: &HighlightMarker) -> usize {
    match tree {
        MarkupNode::Element(el) => unwrap_markers(el, marker),
        MarkupNode::Text(_) => 0,
    }
}

fn unwrap_markers(parent: &mut Element, marker: &HighlightMarker) -> usize {
    let mut removed = 0;
    for child in &mut parent.children {
        if let MarkupNode::Element(el) = child {
            if marker.matches(el) {
                *child = MarkupNode::Text(el.text_content());
                removed += 1;
            } else {
                removed += unwrap_markers(el, marker);
            }
        }
    }
    if removed > 0 {
        parent.normalize();
    }
    removed
}

/// Wraps every match in a marker element.
///
/// Existing markers are removed first, so highlighting twice with the same
/// query yields the same tree. Returns the number of matches wrapped.
pub fn highlight(tree: &mut MarkupNode, query: &SearchQuery, marker: &HighlightMarker) -> usize {
    remove_highlights(tree, marker);
    let count = match tree {
        MarkupNode::Element(el) => splice_matches(el, query, marker),
        MarkupNode::Text(text) => {
            // A bare text root cannot hold siblings; promote it to a fragment.
            let spans = query.find(text);
            if spans.is_empty() {
                0
            } else {
                let pieces = fragments(text, &spans, marker);
                *tree = MarkupNode::fragment(pieces);
                spans.len()
            }
        }
    };
    log::debug!("highlighted {} matches of {:?}", count, query.pattern());
    count
}

fn splice_matches(parent: &mut Element, query: &SearchQuery, marker: &HighlightMarker) -> usize {
    let mut count = 0;
    let children = std::mem::take(&mut parent.children);
    let mut spliced = Vec::with_capacity(children.len());
    for child in children {
        match child {
            MarkupNode::Text(text) => {
                let spans = query.find(&text);
                if spans.is_empty() {
                    spliced.push(MarkupNode::Text(text));
                } else {
                    count += spans.len();
                    spliced.extend(fragments(&text, &spans, marker));
                }
            }
            MarkupNode::Element(mut el) => {
                count += splice_matches(&mut el, query, marker);
                spliced.push(MarkupNode::Element(el));
            }
        }
    }
    parent.children = spliced;
    count
}

/// Splits `text` into plain and marker-wrapped pieces covering it exactly once.
fn fragments(text: &str, spans: &[MatchSpan], marker: &HighlightMarker) -> Vec<MarkupNode> {
    let mut pieces = Vec::with_capacity(spans.len() * 2 + 1);
    let mut last = 0;
    for span in spans {
        if span.start > last {
            pieces.push(MarkupNode::text(&text[last..span.start]));
        }
        pieces.push(marker.wrap(&span.matched_text));
        last = span.end;
    }
    if last < text.len() {
        pieces.push(MarkupNode::text(&text[last..]));
    }
    pieces
}

/// Substitutes every match in every text node.
///
/// Markers are removed first. Returns the number of substitutions.
pub fn replace(
    tree: &mut MarkupNode,
    query: &SearchQuery,
    replacement: &str,
    marker: &HighlightMarker,
) -> usize {
    remove_highlights(tree, marker);
    let mut count = 0;
    walk_text(tree, &mut |text| {
        let (replaced, n) = query.replace_in(text, replacement);
        count += n;
        replaced
    });
    log::debug!("replaced {} matches of {:?}", count, query.pattern());
    count
}

/// Counts matches across every text node without changing the tree.
pub fn count_matches(tree: &MarkupNode, query: &SearchQuery) -> usize {
    let mut count = 0;
    for_each_text(tree, &mut |text| count += query.find(text).len());
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parse::parse_html;
    use crate::render::to_html;
    use crate::ParseOptions;

    fn tree(html: &str) -> MarkupNode {
        parse_html(html, &ParseOptions::default()).unwrap()
    }

    fn query(pattern: &str, is_regex: bool) -> SearchQuery {
        SearchQuery::new(pattern, is_regex).unwrap()
    }

    #[test]
    fn test_highlight_splits_text() {
        let mut t = tree("<p>The cat and the Cat</p>");
        let n = highlight(&mut t, &query("cat", false), &HighlightMarker::default());
        assert_eq!(n, 2);
        assert_eq!(
            to_html(&t),
            "<p>The <span class=\"highlight\">cat</span> and the <span class=\"highlight\">Cat</span></p>"
        );
    }

    #[test]
    fn test_highlight_is_idempotent() {
        let marker = HighlightMarker::default();
        let q = query("a.", true);
        let mut once = tree("<div>banana <b>cabana</b></div>");
        highlight(&mut once, &q, &marker);
        let mut twice = once.clone();
        highlight(&mut twice, &q, &marker);
        assert_eq!(to_html(&once), to_html(&twice));
        assert_eq!(once.text_content(), "banana cabana");
    }

    #[test]
    fn test_highlight_new_pattern_clears_old_markers() {
        let marker = HighlightMarker::default();
        let mut t = tree("<p>one two</p>");
        highlight(&mut t, &query("one", false), &marker);
        highlight(&mut t, &query("two", false), &marker);
        assert_eq!(
            to_html(&t),
            "<p>one <span class=\"highlight\">two</span></p>"
        );
    }

    #[test]
    fn test_highlight_custom_marker() {
        let marker = HighlightMarker::new("mark", "hit");
        let mut t = tree("x");
        assert_eq!(highlight(&mut t, &query("x", false), &marker), 1);
        assert_eq!(to_html(&t), "<mark class=\"hit\">x</mark>");
    }

    #[test]
    fn test_remove_highlights_merges_text() {
        let mut t = tree("<p>a<span class=\"highlight\">b</span>c<span class=\"other\">d</span></p>");
        assert_eq!(remove_highlights(&mut t, &HighlightMarker::default()), 1);
        let p = t.as_element().unwrap().children[0].as_element().unwrap();
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.children[0], MarkupNode::text("abc"));
    }

    #[test]
    fn test_replace_literal_case_insensitive() {
        let mut t = tree("<p>Cat sat, CAT ran</p>");
        let n = replace(&mut t, &query("cat", false), "dog", &HighlightMarker::default());
        assert_eq!(n, 2);
        assert_eq!(to_html(&t), "<p>dog sat, dog ran</p>");
    }

    #[test]
    fn test_replace_literal_is_verbatim() {
        let (out, n) = query("a.c", false).replace_in("abc a.c", "$0");
        assert_eq!(n, 1);
        assert_eq!(out, "abc $0");
    }

    #[test]
    fn test_replace_regex_expands_groups() {
        let (out, n) = query(r"(\w+)@(\w+)", true).replace_in("me@host you@there", "$2:${1}");
        assert_eq!(n, 2);
        assert_eq!(out, "host:me there:you");
    }

    #[test]
    fn test_replace_skips_empty_matches() {
        let (out, n) = query("z*", true).replace_in("abc", "-");
        assert_eq!(n, 0);
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_replace_unwraps_markers_first() {
        let marker = HighlightMarker::default();
        let mut t = tree("<p>red fox</p>");
        highlight(&mut t, &query("fox", false), &marker);
        replace(&mut t, &query("red fox", false), "blue hen", &marker);
        assert_eq!(to_html(&t), "<p>blue hen</p>");
    }

    #[test]
    fn test_count_matches() {
        let t = tree("<p>aa</p><p>a</p>");
        assert_eq!(count_matches(&t, &query("a", false)), 3);
    }

    #[test]
    fn test_invalid_query() {
        assert!(matches!(
            SearchQuery::new("[", true),
            Err(Error::Pattern { .. })
        ));
    }
}
