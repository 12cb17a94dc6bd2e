//! Formatting feature classification.
//!
//! The structural scan inspects each element's effective style. A second,
//! string-level pass over the serialized markup catches formatting the
//! scan cannot see, and the two results are unioned.

use crate::detect::{count_dividers, has_dividers, has_source_links};
use crate::model::{Element, FeatureVector, InlineStyle, MarkupNode, TextStyle};
use crate::render::{plain_text, to_html};
use regex::Regex;
use std::sync::LazyLock;

static RE_BOLD_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:b|strong)[\s>/]").unwrap());

// Declarations only count inside a tag, never in visible text.
static RE_BOLD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<[^>]*font-weight\s*:\s*(?:bold|bolder|[6-9]\d{2,})").unwrap()
});

static RE_ITALIC_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:i|em)[\s>/]").unwrap());

static RE_ITALIC_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[^>]*font-style\s*:\s*(?:italic|oblique)").unwrap());

static RE_UNDERLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<u[\s>/]").unwrap());

static RE_UNDERLINE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<[^>]*text-decoration(?:-line)?\s*:[^;"'>]*underline"#).unwrap()
});

static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\s|<[^>]*\shref\s*=").unwrap());

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Computes the feature vector of a live tree.
///
/// Never fails; an empty tree yields an all-false vector.
pub fn classify(tree: &MarkupNode) -> FeatureVector {
    let mut structural = FeatureVector::default();
    scan(tree, &mut structural);

    let markup = to_html(tree);
    let mut features = structural.union(markup_signals(&markup));
    features.has_source_links = has_source_links(&plain_text(tree));
    features.has_dividers = count_dividers(tree).total() > 0;

    log::debug!("classified tree: {:?}", features.labels());
    features
}

/// Computes the feature vector from raw markup alone.
pub fn classify_markup(markup: &str) -> FeatureVector {
    let mut features = markup_signals(markup);
    let text = RE_TAG.replace_all(markup, " ");
    features.has_source_links = has_source_links(&text);
    features.has_dividers = has_dividers(markup);
    features
}

/// Formatting an element applies to its own content.
///
/// Only the bold, italic, underline and link fields are set.
pub fn element_formats(el: &Element) -> FeatureVector {
    let style = match el.attr("style") {
        Some(s) => TextStyle::for_tag(&el.tag).apply(&InlineStyle::parse(s)),
        None => TextStyle::for_tag(&el.tag),
    };
    FeatureVector {
        bold: style.bold,
        italic: style.italic,
        underline: style.underline,
        has_links: el.tag == "a",
        ..FeatureVector::default()
    }
}

fn scan(node: &MarkupNode, features: &mut FeatureVector) {
    let MarkupNode::Element(el) = node else {
        return;
    };
    if !el.is_fragment() {
        *features = features.union(element_formats(el));
    }
    for child in &el.children {
        scan(child, features);
    }
}

fn markup_signals(markup: &str) -> FeatureVector {
    FeatureVector {
        bold: RE_BOLD_TAG.is_match(markup) || RE_BOLD_DECL.is_match(markup),
        italic: RE_ITALIC_TAG.is_match(markup) || RE_ITALIC_DECL.is_match(markup),
        underline: RE_UNDERLINE_TAG.is_match(markup) || RE_UNDERLINE_DECL.is_match(markup),
        has_links: RE_LINK.is_match(markup),
        ..FeatureVector::default()
    }
}
