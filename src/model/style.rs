//! Inline style declarations and effective text formatting.

use serde::Serialize;

/// Tags rendered bold by default.
pub const BOLD_TAGS: &[&str] = &["b", "strong", "h1", "h2", "h3", "h4", "h5", "h6", "th"];

/// Tags rendered italic by default.
pub const ITALIC_TAGS: &[&str] = &["i", "em", "cite", "var", "dfn"];

/// Tags rendered underlined by default.
pub const UNDERLINE_TAGS: &[&str] = &["u", "ins"];

/// A parsed `style` attribute.
///
/// Property names are lower-cased; values are trimmed but otherwise kept
/// as written. Later declarations of the same property win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineStyle {
    /// `(property, value)` pairs in source order
    pub declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parses a `;`-delimited declaration list. Fragments without a colon are skipped.
    pub fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|decl| {
                let (prop, value) = decl.split_once(':')?;
                let prop = prop.trim().to_ascii_lowercase();
                if prop.is_empty() {
                    return None;
                }
                Some((prop, value.trim().to_string()))
            })
            .collect();
        Self { declarations }
    }

    /// Returns the effective value of a property.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if no declarations were found.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Bold state requested by `font-weight` or the `font` shorthand.
    ///
    /// `None` means the style says nothing about weight.
    pub fn bold(&self) -> Option<bool> {
        if let Some(weight) = self.get("font-weight") {
            return Some(is_bold_weight(weight));
        }
        self.get("font")
            .and_then(|font| font.split_whitespace().find_map(shorthand_weight))
    }

    /// Italic state requested by `font-style` or the `font` shorthand.
    pub fn italic(&self) -> Option<bool> {
        if let Some(style) = self.get("font-style") {
            let style = style.to_ascii_lowercase();
            return Some(style.starts_with("italic") || style.starts_with("oblique"));
        }
        self.get("font").and_then(|font| {
            font.split_whitespace()
                .any(|t| t.eq_ignore_ascii_case("italic") || t.eq_ignore_ascii_case("oblique"))
                .then_some(true)
        })
    }

    /// Underline state requested by `text-decoration` / `text-decoration-line`.
    pub fn underline(&self) -> Option<bool> {
        self.get("text-decoration-line")
            .or_else(|| self.get("text-decoration"))
            .map(|v| v.to_ascii_lowercase().contains("underline"))
    }
}

/// Returns true for `bold`, `bolder` or a numeric weight of at least 600.
pub fn is_bold_weight(value: &str) -> bool {
    let value = value.trim().trim_end_matches("!important").trim();
    if value.eq_ignore_ascii_case("bold") || value.eq_ignore_ascii_case("bolder") {
        return true;
    }
    value.parse::<u32>().is_ok_and(|w| w >= 600)
}

fn shorthand_weight(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("bold") || token.eq_ignore_ascii_case("bolder") {
        return Some(true);
    }
    // Font sizes like "12px" are not weights; only bare hundreds are.
    match token.parse::<u32>() {
        Ok(w) if w % 100 == 0 && (100..=900).contains(&w) => Some(w >= 600),
        _ => None,
    }
}

/// Effective text formatting of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underline
    pub underline: bool,
}

impl TextStyle {
    /// Default presentation of a tag before inline styles apply.
    pub fn for_tag(tag: &str) -> Self {
        Self {
            bold: BOLD_TAGS.contains(&tag),
            italic: ITALIC_TAGS.contains(&tag),
            underline: UNDERLINE_TAGS.contains(&tag),
        }
    }

    /// Overrides the defaults with whatever `style` declares.
    pub fn apply(mut self, style: &InlineStyle) -> Self {
        if let Some(bold) = style.bold() {
            self.bold = bold;
        }
        if let Some(italic) = style.italic() {
            self.italic = italic;
        }
        if let Some(underline) = style.underline() {
            self.underline = underline;
        }
        self
    }

    /// Returns true if this style has any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.underline
    }
}
