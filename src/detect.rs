//! Pattern detection over text and markup.
//!
//! Stateless checks for URL-shaped text, divider artifacts, and the
//! shared match step used by highlight and replace.

use crate::error::{Error, Result};
use crate::model::{Element, MarkupNode};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::LazyLock;

// ============================================================================
// Source links
// ============================================================================

/// `scheme://...`, `www.` prefixed, or bare `label.label.tld[:port][/path]`.
static RE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)[a-z][a-z0-9+.\-]*://[^\s<>"']+|www\.[^\s<>"']+|\b[a-z0-9]+(?:[-.][a-z0-9]+)*\.[a-z]{2,}(?::[0-9]{1,5})?(?:/[^\s<>"']*)?"#,
    )
    .unwrap()
});

/// Sentence punctuation that is not part of a URL when it ends one.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// A match inside a single text string. Offsets are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// The matched text
    pub matched_text: String,
}

impl MatchSpan {
    fn new(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            matched_text: text[start..end].to_string(),
        }
    }
}

/// Returns true if `text` contains a URL-shaped substring.
pub fn has_source_links(text: &str) -> bool {
    RE_URL.is_match(text)
}

/// Finds URL-shaped substrings, dropping trailing sentence punctuation.
pub fn find_source_links(text: &str) -> Vec<MatchSpan> {
    RE_URL
        .find_iter(text)
        .filter_map(|m| {
            let trimmed = m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION);
            if trimmed.is_empty() {
                return None;
            }
            Some(MatchSpan::new(text, m.start(), m.start() + trimmed.len()))
        })
        .collect()
}

// ============================================================================
// Dividers
// ============================================================================

static RE_EMPTY_DIV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<div\b[^>]*>\s*</div>").unwrap());

static RE_EMPTY_P: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p\b[^>]*>\s*</p>").unwrap());

static RE_EMPTY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<span\b[^>]*>\s*</span>").unwrap());

static RE_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<hr\b[^>]*>").unwrap());

static RE_DOUBLE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>\s*<br\s*/?>").unwrap());

/// Runs of three or more `-`, `_`, `*` or `=`.
static RE_PUNCTUATION_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{3,}|_{3,}|\*{3,}|={3,}").unwrap());

static RE_DIVIDER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\b[^>]*\bclass\s*=\s*["']?[^"'>]*divider"#).unwrap()
});

static RE_BORDER_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\b[^>]*\bstyle\s*=\s*["']?[^"'>]*border"#).unwrap()
});

/// Elements that count as dividers when they hold nothing but whitespace.
const EMPTY_DIVIDER_TAGS: &[&str] = &["div", "p", "span"];

/// Returns true if serialized markup contains any divider pattern.
///
/// This is the string-level check for callers that only hold raw markup;
/// tree operations use [`count_dividers`], which applies the same list to
/// the typed tree.
pub fn has_dividers(markup: &str) -> bool {
    let patterns: [&Regex; 8] = [
        &RE_EMPTY_DIV,
        &RE_RULE,
        &RE_DOUBLE_BREAK,
        &RE_EMPTY_P,
        &RE_EMPTY_SPAN,
        &RE_PUNCTUATION_RUN,
        &RE_DIVIDER_CLASS,
        &RE_BORDER_STYLE,
    ];
    patterns.iter().any(|re| re.is_match(markup))
}

/// Divider instances found (or removed) by a sweep, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DividerCounts {
    /// Whitespace-only `div`, `p` or `span`
    pub empty_blocks: usize,
    /// `hr` elements
    pub rules: usize,
    /// Two `br` separated only by whitespace
    pub double_breaks: usize,
    /// `---`, `___`, `***`, `===` runs in text
    pub punctuation_runs: usize,
    /// `div` elements with a `divider` class or a `border` inline style
    pub decorated: usize,
}

impl DividerCounts {
    /// Sum over all kinds.
    pub fn total(&self) -> usize {
        self.empty_blocks + self.rules + self.double_breaks + self.punctuation_runs + self.decorated
    }
}

/// Counts divider instances in a tree without modifying it.
pub fn count_dividers(node: &MarkupNode) -> DividerCounts {
    let mut scratch = node.clone();
    sweep_dividers(&mut scratch)
}

/// Removes divider instances from a tree in one pass.
///
/// Empty blocks, rules and break pairs are deleted; decorated elements are
/// unwrapped so their content survives; punctuation runs are cut out of
/// text. A `div`, `p` or `span` left empty by the sweep is dropped too,
/// without being counted again.
pub(crate) fn sweep_dividers(node: &mut MarkupNode) -> DividerCounts {
    let mut counts = DividerCounts::default();
    if let MarkupNode::Element(el) = node {
        sweep_children(el, &mut counts);
    } else if let MarkupNode::Text(text) = node {
        *text = cut_punctuation_runs(text, &mut counts);
    }
    counts
}

fn sweep_children(parent: &mut Element, counts: &mut DividerCounts) {
    let children = std::mem::take(&mut parent.children);
    let mut kept: Vec<MarkupNode> = Vec::with_capacity(children.len());
    let mut iter = children.into_iter().peekable();

    while let Some(child) = iter.next() {
        match child {
            MarkupNode::Text(text) => {
                kept.push(MarkupNode::Text(cut_punctuation_runs(&text, counts)));
            }
            MarkupNode::Element(el) if el.is_any(EMPTY_DIVIDER_TAGS) && el.is_blank() => {
                counts.empty_blocks += 1;
            }
            MarkupNode::Element(el) if el.tag == "hr" => {
                counts.rules += 1;
            }
            MarkupNode::Element(el) if el.tag == "br" => {
                // Look past whitespace for a second break
                let mut pending: Vec<MarkupNode> = Vec::new();
                let mut paired = false;
                loop {
                    let (is_gap, is_break) = match iter.peek() {
                        Some(MarkupNode::Text(t)) => (t.trim().is_empty(), false),
                        Some(MarkupNode::Element(n)) => (false, n.tag == "br"),
                        None => (false, false),
                    };
                    if is_gap {
                        pending.extend(iter.next());
                    } else {
                        if is_break {
                            iter.next();
                            paired = true;
                        }
                        break;
                    }
                }
                if paired {
                    counts.double_breaks += 1;
                } else {
                    kept.push(MarkupNode::Element(el));
                    kept.extend(pending);
                }
            }
            MarkupNode::Element(mut el) => {
                let decorated = is_decorated(&el);
                sweep_children(&mut el, counts);
                if decorated {
                    counts.decorated += 1;
                    kept.extend(el.children);
                } else if el.is_any(EMPTY_DIVIDER_TAGS) && el.is_blank() {
                    // Emptied by this sweep; its content was already counted
                } else {
                    kept.push(MarkupNode::Element(el));
                }
            }
        }
    }

    parent.children = kept;
    parent.normalize();
}

/// Only `div` counts; tables and cells carry borders legitimately.
fn is_decorated(el: &Element) -> bool {
    if el.tag != "div" {
        return false;
    }
    let divider_class = el
        .attr("class")
        .is_some_and(|c| c.to_ascii_lowercase().contains("divider"));
    let border_style = el
        .attr("style")
        .is_some_and(|s| s.to_ascii_lowercase().contains("border"));
    divider_class || border_style
}

fn cut_punctuation_runs(text: &str, counts: &mut DividerCounts) -> String {
    let found = RE_PUNCTUATION_RUN.find_iter(text).count();
    if found == 0 {
        return text.to_string();
    }
    counts.punctuation_runs += found;
    RE_PUNCTUATION_RUN.replace_all(text, "").into_owned()
}

// ============================================================================
// Search matching
// ============================================================================

/// Compiles a user search pattern: case-insensitive, literal unless `is_regex`.
pub fn compile_pattern(pattern: &str, is_regex: bool) -> Result<Regex> {
    let source = if is_regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// All non-overlapping, non-empty matches of `regex` in `text`, ascending.
pub fn find_all(text: &str, regex: &Regex) -> Vec<MatchSpan> {
    regex
        .find_iter(text)
        .filter(|m| !m.is_empty())
        .map(|m| MatchSpan::new(text, m.start(), m.end()))
        .collect()
}

/// Finds every match of a user pattern in `text`.
pub fn find_matches(text: &str, pattern: &str, is_regex: bool) -> Result<Vec<MatchSpan>> {
    let regex = compile_pattern(pattern, is_regex)?;
    Ok(find_all(text, &regex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_html;
    use crate::render::to_html;
    use crate::ParseOptions;

    fn tree(html: &str) -> MarkupNode {
        parse_html(html, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_source_links() {
        assert!(has_source_links("visit https://example.com now"));
        assert!(has_source_links("see www.example.org"));
        assert!(has_source_links("docs at docs.rs/regex"));
        assert!(has_source_links("host localhost.dev:8080/path"));
        assert!(!has_source_links("3.14 is pi"));
        assert!(!has_source_links("no links here"));
    }

    #[test]
    fn test_find_source_links_trims_punctuation() {
        let links = find_source_links("Read https://a.test/x. Then www.b.org, ok");
        let texts: Vec<&str> = links.iter().map(|s| s.matched_text.as_str()).collect();
        assert_eq!(texts, vec!["https://a.test/x", "www.b.org"]);
        assert_eq!(links[0].start, 5);
    }

    #[test]
    fn test_has_dividers_string() {
        assert!(has_dividers("<p>a</p><hr><p>b</p>"));
        assert!(has_dividers("<DIV class=\"x\">  </DIV>"));
        assert!(has_dividers("one<br><br>two"));
        assert!(has_dividers("<p>***</p>"));
        assert!(has_dividers("<div class=\"ai-divider\">x</div>"));
        assert!(!has_dividers("<section class=\"ai-divider\">x</section>"));
        assert!(has_dividers("<div style=\"border-top: 1px solid\">x</div>"));
        assert!(!has_dividers("<p>plain -- text</p><pre>x</pre>"));
    }

    #[test]
    fn test_count_dividers_matches_string_check() {
        let html = "<p>a</p><hr><p> </p>b<br> <br>c<div class=\"divider\">keep</div><p>===</p>";
        let counts = count_dividers(&tree(html));
        assert_eq!(counts.rules, 1);
        assert_eq!(counts.empty_blocks, 1);
        assert_eq!(counts.double_breaks, 1);
        assert_eq!(counts.decorated, 1);
        assert_eq!(counts.punctuation_runs, 1);
        assert_eq!(counts.total(), 5);
        assert!(has_dividers(html));
    }

    #[test]
    fn test_sweep_unwraps_decorated_and_keeps_single_breaks() {
        let mut t = tree("a<br>b<div style=\"border: 1px\"><b>kept</b></div>c---d");
        let counts = sweep_dividers(&mut t);
        assert_eq!(counts.total(), 2);
        assert_eq!(to_html(&t), "a<br>b<b>kept</b>cd");
    }

    #[test]
    fn test_sweep_drops_emptied_containers_once() {
        let mut t = tree("<div><span></span></div><p>***</p><p>kept</p>");
        let counts = sweep_dividers(&mut t);
        assert_eq!(counts.empty_blocks, 1);
        assert_eq!(counts.punctuation_runs, 1);
        assert_eq!(counts.total(), 2);
        assert_eq!(to_html(&t), "<p>kept</p>");
        assert_eq!(count_dividers(&t).total(), 0);
    }

    #[test]
    fn test_bordered_table_is_not_a_divider() {
        let html = "<p>Intro</p><table style=\"border-collapse: collapse\"><tr><td style=\"border: 1px solid\">A</td><td>B</td></tr></table>";
        assert!(!has_dividers(html));
        let mut t = tree(html);
        let before = to_html(&t);
        assert_eq!(sweep_dividers(&mut t).total(), 0);
        assert_eq!(to_html(&t), before);
    }

    #[test]
    fn test_count_does_not_mutate() {
        let t = tree("<hr>");
        assert_eq!(count_dividers(&t).total(), 1);
        assert_eq!(to_html(&t), "<hr>");
    }

    #[test]
    fn test_find_matches_literal_escapes() {
        let spans = find_matches("a.b axb A.B", "a.b", false).unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| s.matched_text.as_str()).collect();
        assert_eq!(texts, vec!["a.b", "A.B"]);
    }

    #[test]
    fn test_find_matches_regex_case_insensitive() {
        let spans = find_matches("Cat sat, CAT ran", "c.t", true).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].start, 9);
        assert_eq!(spans[1].end, 12);
    }

    #[test]
    fn test_find_matches_skips_empty() {
        assert!(find_matches("abc", "x*", true).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            find_matches("abc", "(unclosed", true),
            Err(Error::Pattern { .. })
        ));
        // The same text is fine as a literal
        assert!(find_matches("(unclosed", "(unclosed", false).unwrap().len() == 1);
    }
}
