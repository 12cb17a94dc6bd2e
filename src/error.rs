//! Error types for aifixer library.

use std::io;
use thiserror::Error;

/// Result type alias for aifixer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for aifixer library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The markup could not be read into a tree.
    #[error("Markup parsing error: {0}")]
    MarkupParse(String),

    /// The input exceeds the configured size limit.
    #[error("Input too large: {size} bytes (limit {limit})")]
    InputTooLarge { size: usize, limit: usize },

    /// Text encoding error.
    #[error("Text encoding error: {0}")]
    Encoding(String),

    /// A user-supplied search pattern is not a valid regular expression.
    #[error("Regex error in \"{pattern}\": {message}")]
    Pattern { pattern: String, message: String },

    /// A history index outside the stored range.
    #[error("No history entry at index {index} (history holds {len})")]
    HistoryIndex { index: usize, len: usize },

    /// The export collaborator failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// The clipboard collaborator rejected a write.
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl Error {
    /// Returns true for errors caused by user input that can be retried
    /// with different input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Pattern { .. } | Error::HistoryIndex { .. })
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MarkupParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::MarkupParse(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Error::MarkupParse(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_message() {
        let err = Error::Pattern {
            pattern: "(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "Regex error in \"(\": unclosed group");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_collaborator_errors_are_not_user_errors() {
        assert!(!Error::Export("canvas".into()).is_user_error());
        assert!(!Error::Clipboard("denied".into()).is_user_error());
    }
}
