//! HTML fragment reader.
//!
//! Pasted rich text is HTML, not XML, so the reader is run with end-name
//! checks disabled and the tree builder repairs what a browser would:
//! void elements never open a scope, stray end tags are dropped, and
//! anything left open at the end of input is closed.

use crate::error::{Error, Result};
use crate::model::{Attribute, Element, MarkupNode, FRAGMENT_TAG, VOID_ELEMENTS};
use crate::parse_options::ParseOptions;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// Parses an HTML fragment into a tree rooted at a fragment element.
pub fn parse_html(html: &str, options: &ParseOptions) -> Result<MarkupNode> {
    if options.max_input_bytes > 0 && html.len() > options.max_input_bytes {
        return Err(Error::InputTooLarge {
            size: html.len(),
            limit: options.max_input_bytes,
        });
    }

    let mut parser = FragmentParser::new(html, options);
    parser.parse()?;
    Ok(parser.finish())
}

/// Open-element stack for tree construction. Index 0 is the fragment root.
struct FragmentParser<'a> {
    reader: Reader<&'a [u8]>,
    options: &'a ParseOptions,
    stack: Vec<Element>,
}

impl<'a> FragmentParser<'a> {
    fn new(html: &'a str, options: &'a ParseOptions) -> Self {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;

        Self {
            reader,
            options,
            stack: vec![Element::new(FRAGMENT_TAG)],
        }
    }

    fn parse(&mut self) -> Result<()> {
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) if !is_tag_name(e.name().as_ref()) => {
                    self.literal_tag("<", &e, ">")?;
                }
                Ok(Event::Start(e)) => {
                    let element = self.read_element(&e)?;
                    if element.is_void() {
                        self.append(MarkupNode::Element(element));
                    } else {
                        self.stack.push(element);
                    }
                }
                Ok(Event::Empty(e)) if !is_tag_name(e.name().as_ref()) => {
                    self.literal_tag("<", &e, "/>")?;
                }
                Ok(Event::Empty(e)) => {
                    let element = self.read_element(&e)?;
                    self.append(MarkupNode::Element(element));
                }
                Ok(Event::End(e)) if !is_tag_name(e.name().as_ref()) => {
                    self.literal_tag("</", &e, ">")?;
                }
                Ok(Event::End(e)) => {
                    let name = lower_name(e.name().as_ref());
                    self.close(&name)?;
                }
                Ok(Event::Text(t)) => {
                    let raw = std::str::from_utf8(&t)?;
                    let text = self.unescape(raw)?;
                    self.append_text(&text);
                }
                Ok(Event::CData(t)) => {
                    let raw = std::str::from_utf8(&t)?;
                    self.append_text(raw);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::MarkupParse(e.to_string())),
                // Comments, doctypes, declarations and PIs are not content
                _ => {}
            }
            buf.clear();
        }

        if self.stack.len() > 1 && !self.options.is_lenient() {
            let open = self.stack.last().map(|el| el.tag.clone()).unwrap_or_default();
            return Err(Error::MarkupParse(format!("unclosed element <{}>", open)));
        }

        Ok(())
    }

    fn finish(mut self) -> MarkupNode {
        while self.stack.len() > 1 {
            self.pop_into_parent();
        }
        let mut root = self.stack.pop().unwrap_or_default();
        root.normalize();
        MarkupNode::Element(root)
    }

    fn read_element(&self, e: &BytesStart) -> Result<Element> {
        let mut element = Element::new(lower_name(e.name().as_ref()));
        let mut attributes = e.html_attributes();
        attributes.with_checks(false);

        for attr in attributes {
            let attr = match attr {
                Ok(attr) => attr,
                Err(err) if self.options.is_lenient() => {
                    log::debug!("skipping malformed attribute on <{}>: {}", element.tag, err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let name = lower_name(attr.key.as_ref());
            let raw = std::str::from_utf8(&attr.value)?;
            let value = self.unescape(raw)?;
            element.attributes.push(Attribute::new(name, value.into_owned()));
        }

        Ok(element)
    }

    /// Keeps a `<` that does not open a tag (`a < b`, `<3`) as text.
    fn literal_tag(&mut self, open: &str, raw: &[u8], close: &str) -> Result<()> {
        let raw = std::str::from_utf8(raw)?;
        if !self.options.is_lenient() {
            return Err(Error::MarkupParse(format!(
                "invalid tag name in \"{}{}{}\"",
                open, raw, close
            )));
        }
        let text = self.unescape(raw)?;
        let literal = format!("{}{}{}", open, text, close);
        self.append_text(&literal);
        Ok(())
    }

    fn unescape<'s>(&self, raw: &'s str) -> Result<Cow<'s, str>> {
        match unescape_with(raw, resolve_html5_entity) {
            Ok(text) => Ok(text),
            Err(_) if self.options.is_lenient() => Ok(Cow::Borrowed(raw)),
            Err(err) => Err(err.into()),
        }
    }

    fn append(&mut self, node: MarkupNode) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            match parent.children.last_mut() {
                Some(MarkupNode::Text(prev)) => prev.push_str(text),
                _ => parent.children.push(MarkupNode::text(text)),
            }
        }
    }

    /// Closes the nearest open element named `name`, along with anything
    /// opened inside it. Unmatched end tags are ignored in lenient mode.
    fn close(&mut self, name: &str) -> Result<()> {
        if VOID_ELEMENTS.contains(&name) {
            return Ok(());
        }

        let position = self.stack.iter().skip(1).rposition(|el| el.tag == name);
        match position {
            Some(offset) => {
                let target = offset + 1;
                if target != self.stack.len() - 1 && !self.options.is_lenient() {
                    return Err(Error::MarkupParse(format!(
                        "mismatched end tag </{}>",
                        name
                    )));
                }
                while self.stack.len() > target {
                    self.pop_into_parent();
                }
                Ok(())
            }
            None if self.options.is_lenient() => {
                log::debug!("ignoring unmatched end tag </{}>", name);
                Ok(())
            }
            None => Err(Error::MarkupParse(format!("unmatched end tag </{}>", name))),
        }
    }

    fn pop_into_parent(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(element) = self.stack.pop() {
            self.append(MarkupNode::Element(element));
        }
    }
}

/// HTML tag names start with an ASCII letter.
fn is_tag_name(name: &[u8]) -> bool {
    name.first().is_some_and(u8::is_ascii_alphabetic)
}

fn lower_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}
