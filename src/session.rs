//! Editing session.
//!
//! A [`Session`] owns the live tree, its feature vector and the history
//! log, and runs every user action against them. Actions work on a copy
//! of the tree and only replace the live tree when they succeed, so a
//! failed or empty action never leaves a half-edited tree behind.

use crate::classify::classify;
use crate::cleanup::{clean, CleanupOptions};
use crate::error::{Error, Result};
use crate::history::{HistoryLog, DEFAULT_HISTORY_CAPACITY};
use crate::host::{BusyIndicator, Clipboard, Exporter, LogNotifier, Notifier, Severity};
use crate::model::{FeatureVector, MarkupNode};
use crate::parse::parse_html;
use crate::parse_options::ParseOptions;
use crate::render::{plain_text, to_html, TextStats};
use crate::search::{self, HighlightMarker, SearchQuery};
use crate::strip;
use bytes::Bytes;
use serde::Serialize;

/// Session configuration options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Maximum number of history entries
    pub history_capacity: usize,
    /// Tag of highlight marker elements
    pub highlight_tag: String,
    /// Class token of highlight marker elements
    pub highlight_class: String,
    /// Options for the clean action
    pub cleanup: CleanupOptions,
    /// Options for loading and restoring markup
    pub parse: ParseOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            highlight_tag: "span".to_string(),
            highlight_class: "highlight".to_string(),
            cleanup: CleanupOptions::default(),
            parse: ParseOptions::default(),
        }
    }
}

impl SessionOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets the highlight marker tag and class.
    pub fn with_highlight_marker(mut self, tag: impl Into<String>, class: impl Into<String>) -> Self {
        self.highlight_tag = tag.into();
        self.highlight_class = class.into();
        self
    }

    /// Sets the cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Sets the parse options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// The highlight marker these options describe.
    pub fn marker(&self) -> HighlightMarker {
        HighlightMarker::new(self.highlight_tag.as_str(), self.highlight_class.as_str())
    }
}

/// Result of an action that may find nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The tree was changed; the count of affected instances
    Applied(usize),
    /// Nothing matched; the tree is unchanged
    NothingFound,
    /// A required input was empty; the tree is unchanged
    EmptyInput,
}

impl Outcome {
    /// Number of affected instances (zero unless applied).
    pub fn count(&self) -> usize {
        match self {
            Outcome::Applied(n) => *n,
            Outcome::NothingFound | Outcome::EmptyInput => 0,
        }
    }

    /// Returns true if the tree was changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

/// A feature the stripping actions remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StripTarget {
    /// Bold tags and bold style declarations
    Bold,
    /// Italic tags and italic style declarations
    Italic,
    /// Anchor elements
    Hyperlinks,
    /// URL-shaped text
    SourceLinks,
    /// Divider artifacts
    Dividers,
}

impl StripTarget {
    /// Every target, in toolbar order.
    pub const ALL: [StripTarget; 5] = [
        StripTarget::Bold,
        StripTarget::Italic,
        StripTarget::SourceLinks,
        StripTarget::Hyperlinks,
        StripTarget::Dividers,
    ];
}

/// How content ended up on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CopyFormat {
    /// Markup with a plain-text alternative
    Rich,
    /// Plain text only, after the rich write was refused
    Plain,
}

/// The live tree, its history and the notifier actions report to.
#[derive(Debug)]
pub struct Session<N: Notifier = LogNotifier> {
    tree: MarkupNode,
    features: FeatureVector,
    history: HistoryLog,
    options: SessionOptions,
    notifier: N,
}

impl Default for Session<LogNotifier> {
    fn default() -> Self {
        Self::new(LogNotifier)
    }
}

impl<N: Notifier> Session<N> {
    /// Creates an empty session with default options.
    pub fn new(notifier: N) -> Self {
        Self::with_options(SessionOptions::default(), notifier)
    }

    /// Creates an empty session.
    pub fn with_options(options: SessionOptions, notifier: N) -> Self {
        Self {
            tree: MarkupNode::default(),
            features: FeatureVector::default(),
            history: HistoryLog::new(options.history_capacity),
            options,
            notifier,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The live tree.
    pub fn tree(&self) -> &MarkupNode {
        &self.tree
    }

    /// The live tree serialized to markup.
    pub fn html(&self) -> String {
        to_html(&self.tree)
    }

    /// The live tree's visible text.
    pub fn plain_text(&self) -> String {
        plain_text(&self.tree)
    }

    /// Word and character counts of the visible text.
    pub fn stats(&self) -> TextStats {
        TextStats::of(&self.plain_text())
    }

    /// Features of the live tree, as of the last change.
    pub fn features(&self) -> FeatureVector {
        self.features
    }

    /// The action history.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The notifier, mutably.
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Consumes the session and returns its notifier.
    pub fn into_notifier(self) -> N {
        self.notifier
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Replaces the live tree with pasted markup. Not recorded in history.
    pub fn load_html(&mut self, html: &str) -> Result<()> {
        match parse_html(html, &self.options.parse) {
            Ok(tree) => {
                self.load_tree(tree);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Replaces the live tree. Not recorded in history.
    pub fn load_tree(&mut self, tree: MarkupNode) {
        self.tree = tree;
        self.refresh();
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Cleans dashes and whitespace in every text node.
    ///
    /// Always recorded, even when no text changed. Returns the number of
    /// text nodes that changed.
    pub fn clean(&mut self) -> usize {
        let mut working = self.tree.clone();
        let changed = clean(&mut working, &self.options.cleanup);
        self.commit(working, "Cleaned text");
        self.notify("Cleaned text", Severity::Info);
        changed
    }

    /// Wraps every match of `pattern` in a highlight marker.
    pub fn highlight(&mut self, pattern: &str, is_regex: bool) -> Result<Outcome> {
        let Some(query) = self.query(pattern, is_regex)? else {
            return Ok(Outcome::EmptyInput);
        };
        let mut working = self.tree.clone();
        let count = search::highlight(&mut working, &query, &self.options.marker());
        if count == 0 {
            self.warn(&format!("No matches found for \"{}\"", pattern));
            return Ok(Outcome::NothingFound);
        }
        let label = format!("Highlighted: \"{}\"", pattern);
        self.commit(working, &label);
        self.notify(&label, Severity::Info);
        Ok(Outcome::Applied(count))
    }

    /// Substitutes every match of `pattern` with `replacement`.
    pub fn replace(&mut self, pattern: &str, replacement: &str, is_regex: bool) -> Result<Outcome> {
        let Some(query) = self.query(pattern, is_regex)? else {
            return Ok(Outcome::EmptyInput);
        };
        let mut working = self.tree.clone();
        let count = search::replace(&mut working, &query, replacement, &self.options.marker());
        if count == 0 {
            self.warn(&format!("No matches found for \"{}\"", pattern));
            return Ok(Outcome::NothingFound);
        }
        let label = format!("Replaced: \"{}\" with \"{}\"", pattern, replacement);
        self.commit(working, &label);
        self.notify(&label, Severity::Info);
        Ok(Outcome::Applied(count))
    }

    /// Removes bold tags and bold style declarations.
    pub fn strip_bold(&mut self) -> Outcome {
        let mut working = self.tree.clone();
        let count = strip::strip_bold(&mut working);
        self.finish_strip(
            working,
            count,
            "Removed all bold formatting",
            "No bold text found!",
            format!("Removed {} bold formatting instances", count),
        )
    }

    /// Removes italic tags and italic style declarations.
    pub fn strip_italic(&mut self) -> Outcome {
        let mut working = self.tree.clone();
        let count = strip::strip_italic(&mut working);
        self.finish_strip(
            working,
            count,
            "Removed all italic formatting",
            "No italic text found!",
            format!("Removed {} italic formatting instances", count),
        )
    }

    /// Unwraps hyperlinks to plain text.
    pub fn strip_hyperlinks(&mut self) -> Outcome {
        let mut working = self.tree.clone();
        let count = strip::strip_hyperlinks(&mut working);
        self.finish_strip(
            working,
            count,
            "Removed hyperlinks",
            "No hyperlinks found!",
            format!("Converted {} hyperlinks to plain text", count),
        )
    }

    /// Deletes URL-shaped text.
    pub fn strip_source_links(&mut self) -> Result<Outcome> {
        let mut working = self.tree.clone();
        let count = match strip::strip_source_links(&mut working) {
            Ok(count) => count,
            Err(e) => return Err(self.fail(e)),
        };
        Ok(self.finish_strip(
            working,
            count,
            "Removed source links",
            "No source links found!",
            format!("Removed {} source links", count),
        ))
    }

    /// Removes divider artifacts.
    pub fn remove_dividers(&mut self) -> Outcome {
        let mut working = self.tree.clone();
        let count = strip::remove_dividers(&mut working).total();
        self.finish_strip(
            working,
            count,
            "Removed AI dividers",
            "No AI dividers found!",
            format!("Removed {} AI dividers", count),
        )
    }

    /// Runs the stripping action for `target`.
    pub fn strip(&mut self, target: StripTarget) -> Result<Outcome> {
        match target {
            StripTarget::Bold => Ok(self.strip_bold()),
            StripTarget::Italic => Ok(self.strip_italic()),
            StripTarget::Hyperlinks => Ok(self.strip_hyperlinks()),
            StripTarget::SourceLinks => self.strip_source_links(),
            StripTarget::Dividers => Ok(self.remove_dividers()),
        }
    }

    /// Empties the live tree.
    pub fn clear(&mut self) {
        self.commit(MarkupNode::default(), "Cleared editor");
        self.notify("Editor cleared!", Severity::Info);
    }

    /// Installs the snapshot of history entry `index` (0 is the oldest)
    /// and records a `Restored: ...` entry for it.
    pub fn restore(&mut self, index: usize) -> Result<()> {
        let (action, snapshot) = match self.history.restore(index) {
            Ok(entry) => (entry.action.clone(), entry.snapshot.clone()),
            Err(e) => return Err(self.fail(e)),
        };
        let tree = match parse_html(&snapshot, &ParseOptions::default()) {
            Ok(tree) => tree,
            Err(e) => return Err(self.fail(e)),
        };
        let label = format!("Restored: {}", action);
        self.commit(tree, &label);
        self.notify(&label, Severity::Info);
        Ok(())
    }

    /// Copies the live tree, falling back to plain text when the
    /// clipboard refuses rich content.
    pub fn copy_to<C: Clipboard>(&mut self, clipboard: &mut C) -> Result<CopyFormat> {
        let html = self.html();
        let plain = self.plain_text();

        let format = match clipboard.write_rich(&html, &plain) {
            Ok(()) => CopyFormat::Rich,
            Err(e) => {
                log::debug!("rich copy refused, falling back to plain text: {}", e);
                if let Err(e) = clipboard.write_plain(&plain) {
                    self.notify("Failed to copy text", Severity::Error);
                    return Err(e);
                }
                CopyFormat::Plain
            }
        };

        let (label, message) = match format {
            CopyFormat::Rich => ("Copied text with formatting", "Text copied with formatting!"),
            CopyFormat::Plain => ("Copied text as plain text", "Text copied as plain text"),
        };
        self.history.record(label, html);
        self.notify(message, Severity::Info);
        Ok(format)
    }

    /// Exports a snapshot of the live tree, showing the busy state while
    /// the exporter runs.
    pub fn export_with<E, B>(&mut self, exporter: &mut E, busy: &mut B) -> Result<Bytes>
    where
        E: Exporter + ?Sized,
        B: BusyIndicator + ?Sized,
    {
        let snapshot = self.tree.clone();
        busy.set_busy(true);
        let result = exporter.export(&snapshot);
        busy.set_busy(false);

        match result {
            Ok(bytes) => {
                self.history.record("Exported document", to_html(&snapshot));
                self.notify("Document exported successfully!", Severity::Info);
                Ok(bytes)
            }
            Err(e) => {
                self.notify(&format!("Failed to export document: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Validates and compiles a search. `Ok(None)` means the pattern was empty.
    fn query(&mut self, pattern: &str, is_regex: bool) -> Result<Option<SearchQuery>> {
        if pattern.is_empty() {
            self.warn("Please enter text to search for");
            return Ok(None);
        }
        match SearchQuery::new(pattern, is_regex) {
            Ok(query) => Ok(Some(query)),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn finish_strip(
        &mut self,
        working: MarkupNode,
        count: usize,
        label: &str,
        nothing: &str,
        message: String,
    ) -> Outcome {
        if count == 0 {
            self.warn(nothing);
            return Outcome::NothingFound;
        }
        self.commit(working, label);
        self.notify(&message, Severity::Info);
        Outcome::Applied(count)
    }

    /// Installs `tree` as the live tree and records it.
    fn commit(&mut self, tree: MarkupNode, label: &str) {
        self.tree = tree;
        self.refresh();
        self.history.record(label, to_html(&self.tree));
    }

    fn refresh(&mut self) {
        self.features = classify(&self.tree);
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    fn warn(&mut self, message: &str) {
        self.notify(message, Severity::Warning);
    }

    /// Reports an error and hands it back for the caller to return.
    fn fail(&mut self, err: Error) -> Error {
        let message = match &err {
            Error::Pattern { message, .. } => format!("Regex error: {}", message),
            other => other.to_string(),
        };
        self.notify(&message, Severity::Error);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HtmlDocumentExporter, MemoryClipboard, MemoryNotifier, NoBusy};

    fn session(html: &str) -> Session<MemoryNotifier> {
        let mut s = Session::new(MemoryNotifier::new());
        s.load_html(html).unwrap();
        s
    }

    fn last(s: &Session<MemoryNotifier>) -> (String, Severity) {
        let (m, sev) = s.notifier().last().unwrap();
        (m.to_string(), sev)
    }

    #[derive(Default)]
    struct RecordingBusy(Vec<bool>);

    impl BusyIndicator for RecordingBusy {
        fn set_busy(&mut self, busy: bool) {
            self.0.push(busy);
        }
    }

    struct FailingExporter;

    impl Exporter for FailingExporter {
        fn export(&mut self, _tree: &MarkupNode) -> Result<Bytes> {
            Err(Error::Export("renderer unavailable".to_string()))
        }
    }

    #[test]
    fn test_load_refreshes_features_without_history() {
        let s = session("<p><b>x</b> www.a.org</p>");
        assert!(s.features().bold);
        assert!(s.features().has_source_links);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_clean_records_history() {
        let mut s = session("<p>a—b and c — d</p>");
        assert_eq!(s.clean(), 1);
        assert_eq!(s.html(), "<p>a, b and c d</p>");
        assert_eq!(s.history().latest().unwrap().action, "Cleaned text");
        assert_eq!(s.history().latest().unwrap().snapshot, s.html());
    }

    #[test]
    fn test_highlight_idempotent() {
        let mut s = session("<p>Cat and cat</p>");
        assert_eq!(s.highlight("cat", false).unwrap(), Outcome::Applied(2));
        let once = s.html();
        assert_eq!(s.highlight("cat", false).unwrap(), Outcome::Applied(2));
        assert_eq!(s.html(), once);
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.history().latest().unwrap().action, "Highlighted: \"cat\"");
    }

    #[test]
    fn test_highlight_nothing_found_keeps_old_markers() {
        let mut s = session("<p>one two</p>");
        s.highlight("one", false).unwrap();
        let before = s.html();
        assert_eq!(s.highlight("zzz", false).unwrap(), Outcome::NothingFound);
        assert_eq!(s.html(), before);
        assert_eq!(s.history().len(), 1);
        assert_eq!(last(&s).1, Severity::Warning);
    }

    #[test]
    fn test_empty_search_is_warning() {
        let mut s = session("<p>text</p>");
        assert_eq!(s.highlight("", false).unwrap(), Outcome::EmptyInput);
        assert_eq!(s.replace("", "x", true).unwrap(), Outcome::EmptyInput);
        assert_eq!(
            last(&s),
            ("Please enter text to search for".to_string(), Severity::Warning)
        );
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_invalid_pattern_leaves_state() {
        let mut s = session("<p>text</p>");
        let before = s.html();
        let err = s.highlight("(", true).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
        assert!(err.is_user_error());
        assert_eq!(s.html(), before);
        assert!(s.history().is_empty());
        let (message, severity) = last(&s);
        assert!(message.starts_with("Regex error: "));
        assert_eq!(severity, Severity::Error);
    }

    #[test]
    fn test_replace_correctness() {
        let mut s = session("<p>Cat sat, CAT ran</p>");
        assert_eq!(s.replace("cat", "dog", false).unwrap(), Outcome::Applied(2));
        assert_eq!(s.plain_text(), "dog sat, dog ran");
        assert_eq!(
            s.history().latest().unwrap().action,
            "Replaced: \"cat\" with \"dog\""
        );
    }

    #[test]
    fn test_strip_bold_round_trip() {
        let mut s = session("<p><b>One</b> two <strong>three</strong></p><p><b>four</b></p>");
        let before = s.plain_text();
        assert_eq!(s.strip_bold(), Outcome::Applied(3));
        assert_eq!(s.plain_text(), before);
        assert!(!s.features().bold);
        assert_eq!(
            last(&s),
            ("Removed 3 bold formatting instances".to_string(), Severity::Info)
        );
    }

    #[test]
    fn test_strip_hyperlinks_noop_safety() {
        let mut s = session("<p>plain <em>text</em> www.a.org</p>");
        let before = s.html();
        assert_eq!(s.strip_hyperlinks(), Outcome::NothingFound);
        assert_eq!(s.html(), before);
        assert!(s.history().is_empty());
        assert_eq!(
            last(&s),
            ("No hyperlinks found!".to_string(), Severity::Warning)
        );
    }

    #[test]
    fn test_style_text_is_not_bold() {
        let mut s = session("<p>Use font-weight: bold</p>");
        assert!(!s.features().bold);
        assert_eq!(s.strip_bold(), Outcome::NothingFound);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_bordered_table_keeps_its_borders() {
        let mut s = session(
            "<table style=\"border-collapse: collapse\"><tr><td style=\"border: 1px solid\">x</td></tr></table>",
        );
        let before = s.html();
        assert!(!s.features().has_dividers);
        assert_eq!(s.remove_dividers(), Outcome::NothingFound);
        assert_eq!(s.html(), before);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_split_source_link_is_nothing_found() {
        let mut s = session("<p>see <b>www.</b>example.org</p>");
        let before = s.html();
        assert_eq!(s.strip_source_links().unwrap(), Outcome::NothingFound);
        assert_eq!(s.html(), before);
        assert!(s.history().is_empty());
        assert_eq!(
            last(&s),
            ("No source links found!".to_string(), Severity::Warning)
        );
    }

    #[test]
    fn test_strip_family_updates_features() {
        let mut s = session(
            "<p><i>i</i> <a href=\"#\">link</a> see https://x.test</p><hr><p>***</p>",
        );
        assert!(s.strip_italic().is_applied());
        assert!(s.strip_hyperlinks().is_applied());
        assert!(s.strip_source_links().unwrap().is_applied());
        assert!(s.remove_dividers().is_applied());
        let f = s.features();
        assert!(!f.italic && !f.has_links && !f.has_source_links && !f.has_dividers);
        let actions: Vec<&str> = s.history().iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "Removed all italic formatting",
                "Removed hyperlinks",
                "Removed source links",
                "Removed AI dividers",
            ]
        );
    }

    #[test]
    fn test_strip_dispatch() {
        let mut s = session("<p><b>a</b> <i>b</i></p>");
        let outcomes: Vec<Outcome> = StripTarget::ALL
            .iter()
            .map(|t| s.strip(*t).unwrap())
            .collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Applied(1),
                Outcome::Applied(1),
                Outcome::NothingFound,
                Outcome::NothingFound,
                Outcome::NothingFound,
            ]
        );
        assert_eq!(s.html(), "<p>a b</p>");
    }

    #[test]
    fn test_history_bound() {
        let mut s = session("<p>x0</p>");
        for i in 0..15 {
            let from = format!("x{}", i);
            let to = format!("x{}", i + 1);
            assert!(s.replace(&from, &to, false).unwrap().is_applied());
        }
        assert_eq!(s.history().len(), 10);
        assert_eq!(
            s.history().get(0).unwrap().action,
            "Replaced: \"x5\" with \"x6\""
        );
    }

    #[test]
    fn test_custom_history_capacity() {
        let options = SessionOptions::new().with_history_capacity(3);
        let mut s = Session::with_options(options, MemoryNotifier::new());
        for _ in 0..5 {
            s.clean();
        }
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn test_restore_appends_entry() {
        let mut s = session("<p><b>bold</b></p>");
        s.clean();
        s.strip_bold();
        assert_eq!(s.html(), "<p>bold</p>");

        s.restore(0).unwrap();
        assert_eq!(s.html(), "<p><b>bold</b></p>");
        assert!(s.features().bold);
        assert_eq!(s.history().len(), 3);
        assert_eq!(s.history().latest().unwrap().action, "Restored: Cleaned text");
    }

    #[test]
    fn test_restore_out_of_range() {
        let mut s = session("<p>x</p>");
        assert!(matches!(s.restore(4), Err(Error::HistoryIndex { .. })));
        assert_eq!(last(&s).1, Severity::Error);
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut s = session("<p>a  b</p>");
        s.clean();
        let snapshot = s.history().latest().unwrap().snapshot.clone();
        s.replace("a", "z", false).unwrap();
        assert_eq!(s.history().get(0).unwrap().snapshot, snapshot);
        assert_ne!(s.html(), snapshot);
    }

    #[test]
    fn test_clear() {
        let mut s = session("<p>x</p>");
        s.clear();
        assert_eq!(s.html(), "");
        assert!(s.features().is_clean());
        assert_eq!(s.history().latest().unwrap().action, "Cleared editor");
        assert_eq!(s.stats(), TextStats::default());
    }

    #[test]
    fn test_custom_marker() {
        let options = SessionOptions::new().with_highlight_marker("mark", "hit");
        let mut s = Session::with_options(options, MemoryNotifier::new());
        s.load_html("<p>abc</p>").unwrap();
        s.highlight("b", false).unwrap();
        assert_eq!(s.html(), "<p>a<mark class=\"hit\">b</mark>c</p>");
    }

    #[test]
    fn test_copy_rich_and_fallback() {
        let mut s = session("<p><b>x</b></p>");
        let mut rich = MemoryClipboard::new();
        assert_eq!(s.copy_to(&mut rich).unwrap(), CopyFormat::Rich);
        assert_eq!(rich.html.as_deref(), Some("<p><b>x</b></p>"));

        let mut plain = MemoryClipboard::plain_only();
        assert_eq!(s.copy_to(&mut plain).unwrap(), CopyFormat::Plain);
        assert_eq!(plain.plain.as_deref(), Some("x"));
        assert_eq!(
            s.history().latest().unwrap().action,
            "Copied text as plain text"
        );
    }

    #[test]
    fn test_export_toggles_busy() {
        let mut s = session("<p>doc</p>");
        let mut busy = RecordingBusy::default();
        let bytes = s
            .export_with(&mut HtmlDocumentExporter::new(), &mut busy)
            .unwrap();
        assert!(std::str::from_utf8(&bytes).unwrap().contains("<p>doc</p>"));
        assert_eq!(busy.0, vec![true, false]);
        assert_eq!(s.history().latest().unwrap().action, "Exported document");
    }

    #[test]
    fn test_export_failure_leaves_tree() {
        let mut s = session("<p>doc</p>");
        let err = s.export_with(&mut FailingExporter, &mut NoBusy).unwrap_err();
        assert!(matches!(err, Error::Export(_)));
        assert_eq!(s.html(), "<p>doc</p>");
        assert!(s.history().is_empty());
        assert_eq!(last(&s).1, Severity::Error);
    }

    #[test]
    fn test_load_rejects_oversized_input() {
        let options = SessionOptions::new().with_parse_options(ParseOptions::new().with_limit_mb(1));
        let mut s = Session::with_options(options, MemoryNotifier::new());
        let big = "a".repeat(2 * 1024 * 1024);
        assert!(matches!(
            s.load_html(&big),
            Err(Error::InputTooLarge { .. })
        ));
        assert_eq!(s.html(), "");
    }
}
