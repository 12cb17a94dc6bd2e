//! Collaborators supplied by the host application.
//!
//! The engine reports through [`Notifier`], toggles [`BusyIndicator`]
//! around exports, and hands frozen snapshots to [`Exporter`] and
//! [`Clipboard`]. Stock implementations cover logging, tests and simple
//! embedders.

use crate::error::{Error, Result};
use crate::model::MarkupNode;
use crate::render::{escape_text, to_html};
use bytes::Bytes;
use serde::Serialize;
use std::fmt;

/// How prominent a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// Success or progress
    Info,
    /// Nothing was done, but nothing failed
    Warning,
    /// The action failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// Receives user-visible messages.
pub trait Notifier {
    /// Shows `message` to the user.
    fn notify(&mut self, message: &str, severity: Severity);
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, message: &str, severity: Severity) {
        (**self).notify(message, severity);
    }
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => log::info!("{}", message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Error => log::error!("{}", message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    /// `(message, severity)` in arrival order
    pub messages: Vec<(String, Severity)>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<(&str, Severity)> {
        self.messages.last().map(|(m, s)| (m.as_str(), *s))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.messages.push((message.to_string(), severity));
    }
}

/// Shows or hides a busy state while a slow collaborator runs.
pub trait BusyIndicator {
    /// Turns the busy state on or off.
    fn set_busy(&mut self, busy: bool);
}

/// Ignores busy-state changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBusy;

impl BusyIndicator for NoBusy {
    fn set_busy(&mut self, _busy: bool) {}
}

/// Turns a frozen tree into an exported document.
pub trait Exporter {
    /// Exports `tree`. The tree is a snapshot and is never the live one.
    fn export(&mut self, tree: &MarkupNode) -> Result<Bytes>;
}

/// Exports a standalone HTML5 document.
#[derive(Debug, Clone)]
pub struct HtmlDocumentExporter {
    title: String,
}

impl Default for HtmlDocumentExporter {
    fn default() -> Self {
        Self {
            title: "Cleaned Document".to_string(),
        }
    }
}

impl HtmlDocumentExporter {
    /// Creates an exporter with the default title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Renders the full document as a string.
    pub fn render(&self, tree: &MarkupNode) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_text(&self.title),
            to_html(tree)
        )
    }
}

impl Exporter for HtmlDocumentExporter {
    fn export(&mut self, tree: &MarkupNode) -> Result<Bytes> {
        Ok(Bytes::from(self.render(tree)))
    }
}

/// Writes copied content to the host clipboard.
pub trait Clipboard {
    /// Writes markup with a plain-text alternative.
    fn write_rich(&mut self, html: &str, plain: &str) -> Result<()>;

    /// Writes plain text only.
    fn write_plain(&mut self, plain: &str) -> Result<()>;
}

/// Clipboard that keeps the last write in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    /// Markup from the last rich write
    pub html: Option<String>,
    /// Plain text from the last write
    pub plain: Option<String>,
    reject_rich: bool,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clipboard that refuses rich writes, like hosts without
    /// rich clipboard access.
    pub fn plain_only() -> Self {
        Self {
            reject_rich: true,
            ..Self::default()
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn write_rich(&mut self, html: &str, plain: &str) -> Result<()> {
        if self.reject_rich {
            return Err(Error::Clipboard("rich content is not supported".to_string()));
        }
        self.html = Some(html.to_string());
        self.plain = Some(plain.to_string());
        Ok(())
    }

    fn write_plain(&mut self, plain: &str) -> Result<()> {
        self.html = None;
        self.plain = Some(plain.to_string());
        Ok(())
    }
}
