//! # aifixer
//!
//! Detects and strips the formatting artifacts that AI text generators leave
//! in pasted rich text: stray bold and italic, hyperlinks, bare source URLs,
//! and divider runs such as `---` or empty paragraphs.
//!
//! ## Quick Start
//!
//! ```
//! use aifixer::{Session, LogNotifier};
//!
//! fn main() -> aifixer::Result<()> {
//!     let mut session = Session::new(LogNotifier);
//!     session.load_html("<p><strong>Note</strong>—see www.example.com</p><hr>")?;
//!
//!     assert!(session.features().bold);
//!     session.strip_bold();
//!     session.strip_source_links()?;
//!     session.remove_dividers();
//!     session.clean();
//!
//!     assert_eq!(session.html(), "<p>Note, see </p>");
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`parse`] / [`render`]: markup in and out of [`MarkupNode`] trees
//! - [`detect`] and [`classify`]: pattern checks and the [`FeatureVector`]
//! - [`cleanup`], [`search`] and [`strip`]: the tree transforms
//! - [`session`]: the live tree, its [`HistoryLog`] and the [`host`] collaborators
//!
//! ## Features
//!
//! - `async`: Async loading and export with Tokio

pub mod classify;
pub mod cleanup;
pub mod detect;
pub mod error;
pub mod history;
pub mod host;
pub mod model;
pub mod parse;
pub mod parse_options;
pub mod render;
pub mod search;
pub mod session;
pub mod strip;
pub mod walk;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use classify::{classify, classify_markup};
pub use cleanup::{clean, clean_text, CleanupOptions};
pub use detect::{find_matches, find_source_links, has_dividers, has_source_links, MatchSpan};
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryLog};
pub use host::{
    BusyIndicator, Clipboard, Exporter, HtmlDocumentExporter, LogNotifier, MemoryClipboard,
    MemoryNotifier, NoBusy, Notifier, Severity,
};
pub use model::{Element, FeatureVector, MarkupNode};
pub use parse::parse_html;
pub use parse_options::{ErrorMode, ParseOptions};
pub use render::{plain_text, to_html, TextStats};
pub use search::{HighlightMarker, SearchQuery};
pub use session::{CopyFormat, Outcome, Session, SessionOptions, StripTarget};

use std::path::Path;

/// Parses an HTML file into a tree.
///
/// # Example
///
/// ```no_run
/// use aifixer::parse_file;
///
/// let tree = parse_file("pasted.html")?;
/// println!("{}", aifixer::plain_text(&tree));
/// # Ok::<(), aifixer::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<MarkupNode> {
    let html = std::fs::read_to_string(path)?;
    parse_str(&html)
}

/// Parses markup with default (lenient) options.
pub fn parse_str(html: &str) -> Result<MarkupNode> {
    parse_html(html, &ParseOptions::default())
}

/// Detects the formatting features of a markup string.
///
/// # Example
///
/// ```
/// let features = aifixer::detect_features("<p><em>hi</em> ---</p>")?;
/// assert_eq!(features.labels(), vec!["Italic Text", "AI Dividers"]);
/// # Ok::<(), aifixer::Error>(())
/// ```
pub fn detect_features(html: &str) -> Result<FeatureVector> {
    Ok(classify(&parse_str(html)?))
}

/// Cleans dashes and whitespace in a markup string with default options.
///
/// # Example
///
/// ```
/// let html = aifixer::clean_html("<p>fast—cheap   and — good</p>")?;
/// assert_eq!(html, "<p>fast, cheap and good</p>");
/// # Ok::<(), aifixer::Error>(())
/// ```
pub fn clean_html(html: &str) -> Result<String> {
    let mut tree = parse_str(html)?;
    clean(&mut tree, &CleanupOptions::default());
    Ok(to_html(&tree))
}

/// Builder for batch fixing.
///
/// Runs the chosen strip actions in order, then the clean action, on a
/// fresh [`Session`].
///
/// # Example
///
/// ```
/// use aifixer::{Fixer, StripTarget};
///
/// let fixed = Fixer::new()
///     .strip(StripTarget::Bold)
///     .strip(StripTarget::Dividers)
///     .run_str("<p><b>Title</b></p><hr><p>Body  text</p>")?;
///
/// assert_eq!(fixed.html(), "<p>Title</p><p>Body text</p>");
/// # Ok::<(), aifixer::Error>(())
/// ```
pub struct Fixer {
    options: SessionOptions,
    targets: Vec<StripTarget>,
    clean: bool,
}

impl Default for Fixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixer {
    /// Creates a builder that only cleans.
    pub fn new() -> Self {
        Self {
            options: SessionOptions::default(),
            targets: Vec::new(),
            clean: true,
        }
    }

    /// Adds a strip action.
    pub fn strip(mut self, target: StripTarget) -> Self {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
        self
    }

    /// Adds every strip action.
    pub fn strip_all(mut self) -> Self {
        for target in StripTarget::ALL {
            self = self.strip(target);
        }
        self
    }

    /// Enables or disables the final clean action.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Sets the cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.options = self.options.with_cleanup(cleanup);
        self
    }

    /// Fails on malformed markup instead of repairing it.
    pub fn strict(mut self) -> Self {
        self.options.parse = self.options.parse.strict();
        self
    }

    /// Sets the input size limit in megabytes.
    pub fn with_limit_mb(mut self, mb: usize) -> Self {
        self.options.parse = self.options.parse.with_limit_mb(mb);
        self
    }

    /// Fixes a markup string.
    pub fn run_str(self, html: &str) -> Result<FixedDocument> {
        let mut session = Session::with_options(self.options, LogNotifier);
        session.load_html(html)?;
        for target in &self.targets {
            session.strip(*target)?;
        }
        if self.clean {
            session.clean();
        }
        Ok(FixedDocument { session })
    }

    /// Fixes an HTML file.
    pub fn run_file(self, path: impl AsRef<Path>) -> Result<FixedDocument> {
        let html = std::fs::read_to_string(path)?;
        self.run_str(&html)
    }
}

/// The result of a [`Fixer`] run.
pub struct FixedDocument {
    session: Session<LogNotifier>,
}

impl FixedDocument {
    /// The fixed markup.
    pub fn html(&self) -> String {
        self.session.html()
    }

    /// The fixed visible text.
    pub fn text(&self) -> String {
        self.session.plain_text()
    }

    /// Features left after fixing.
    pub fn features(&self) -> FeatureVector {
        self.session.features()
    }

    /// Word and character counts.
    pub fn stats(&self) -> TextStats {
        self.session.stats()
    }

    /// Actions applied, oldest first.
    pub fn history(&self) -> &HistoryLog {
        self.session.history()
    }

    /// Consumes self and returns the session for further editing.
    pub fn into_session(self) -> Session<LogNotifier> {
        self.session
    }
}
