//! Parsing options for reading markup.

/// Options for controlling markup parsing behavior.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// How to handle malformed markup.
    pub error_mode: ErrorMode,

    /// Input size limit in bytes (0 = unlimited).
    pub max_input_bytes: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            max_input_bytes: 0,
        }
    }
}

impl ParseOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets lenient error handling (keep malformed pieces raw).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Sets strict error handling (fail on any error).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Sets the input size limit in megabytes.
    pub fn with_limit_mb(mut self, mb: usize) -> Self {
        self.max_input_bytes = mb * 1024 * 1024;
        self
    }

    /// Returns true if errors should be ignored where possible.
    pub fn is_lenient(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Lenient)
    }
}

/// How to handle parsing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail immediately on any error.
    Strict,
    /// Keep going and preserve malformed text as written.
    #[default]
    Lenient,
}
