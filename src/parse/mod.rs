//! Reading serialized markup into a tree.

mod html;

pub use html::parse_html;
