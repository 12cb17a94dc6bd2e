//! Markup tree model.
//!
//! This module defines the tree every transform operates on, the parsed
//! form of inline styles, and the derived feature vector.

mod features;
mod node;
mod style;

pub use features::*;
pub use node::*;
pub use style::*;
