//! Error types for moddoc.
//!
//! Library crates use [`ModdocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all moddoc operations.
#[derive(Debug, thiserror::Error)]
pub enum ModdocError {
    /// The external documentation tool could not be run, or exited non-zero.
    #[error("invocation error: {message}")]
    Invocation { message: String },

    /// Tool output was empty or not valid JSON.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// JSON parsed but did not fit the documentation schema.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input rejected before any work was done (bad output dir, bad file name).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ModdocError>;

impl ModdocError {
    /// Create an invocation error from any displayable message.
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a schema error from any displayable message.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short label for the error class, used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Invocation { .. } => "invocation",
            Self::Parse { .. } => "parse",
            Self::Schema { .. } => "schema",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
            Self::Validation { .. } => "validation",
        }
    }
}
