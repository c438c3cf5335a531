//! Structured errors for document-level conversion failures.
//!
//! Element-level problems (missing attributes, absent images, unreadable
//! linked stylesheets) never surface here; they degrade to no-ops inside the
//! converter. What remains are failures that invalidate a whole chapter.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// Processing phase where an error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// Locating or reading the chapter resource.
    Open,
    /// XML tokenization of chapter bytes.
    Tokenize,
    /// Stylesheet loading and parsing.
    Style,
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Tokenize => "tokenize",
            Self::Style => "style",
        };
        f.write_str(name)
    }
}

/// Typed actual-vs-limit context for limit violations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorLimitContext {
    /// Limit name, e.g. `max_css_bytes`.
    pub kind: &'static str,
    /// Observed value.
    pub actual: usize,
    /// Configured ceiling.
    pub limit: usize,
}

impl ErrorLimitContext {
    /// Create a limit context.
    pub fn new(kind: &'static str, actual: usize, limit: usize) -> Self {
        Self {
            kind,
            actual,
            limit,
        }
    }
}

/// Error raised when a chapter cannot be converted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XhtmlError {
    /// Processing phase where this error originated.
    pub phase: ErrorPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional resource path context.
    pub path: Option<Box<str>>,
    /// Optional tokenizer byte offset.
    pub token_offset: Option<usize>,
    /// Optional typed actual-vs-limit context.
    pub limit: Option<Box<ErrorLimitContext>>,
}

impl XhtmlError {
    pub(crate) fn new(phase: ErrorPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            path: None,
            token_offset: None,
            limit: None,
        }
    }

    pub(crate) fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into().into_boxed_str());
        self
    }

    pub(crate) fn with_token_offset(mut self, token_offset: usize) -> Self {
        self.token_offset = Some(token_offset);
        self
    }

    pub(crate) fn with_limit(mut self, kind: &'static str, actual: usize, limit: usize) -> Self {
        self.limit = Some(Box::new(ErrorLimitContext::new(kind, actual, limit)));
        self
    }
}

impl fmt::Display for XhtmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(path) = self.path.as_deref() {
            write!(f, " [path={}]", path)?;
        }
        if let Some(token_offset) = self.token_offset {
            write!(f, " [token_offset={}]", token_offset)?;
        }
        if let Some(limit) = self.limit.as_deref() {
            write!(
                f,
                " [limit_kind={} actual={} limit={}]",
                limit.kind, limit.actual, limit.limit
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for XhtmlError {}
