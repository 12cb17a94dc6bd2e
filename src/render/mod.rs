//! Serializing trees back to markup and text.

mod html;
mod text;

pub use html::{escape_text, to_html};
pub use text::{plain_text, TextStats};

use crate::error::Result;
use crate::model::MarkupNode;
use std::io::Write;
use std::path::Path;

/// Serializes a tree and writes it to a file.
pub fn render_to_file(node: &MarkupNode, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, to_html(node))?;
    Ok(())
}

/// Serializes a tree and writes it to a writer.
pub fn render_to_writer<W: Write>(node: &MarkupNode, writer: &mut W) -> Result<()> {
    writer.write_all(to_html(node).as_bytes())?;
    Ok(())
}
