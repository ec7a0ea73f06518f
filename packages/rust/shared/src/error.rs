//! Error types for kmimport.
//!
//! Library crates use [`ImportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Missing references, missing annotations and empty matches are *not* errors:
//! the crawler skips them silently. Only collaborator failures (the triple
//! store, the reply sink, loading input) surface as an [`ImportError`].

use std::path::PathBuf;

/// Top-level error type for all kmimport operations.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Graph syntax error while reading N-Triples / N-Quads.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Knowledge model document could not be read or decoded.
    #[error("knowledge model error: {0}")]
    KnowledgeModel(String),

    /// The triple store failed to answer a pattern query.
    #[error("graph error: {0}")]
    Graph(String),

    /// The reply sink rejected an item or reply.
    #[error("reply sink error: {0}")]
    Sink(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ImportError>;

impl ImportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error for the given 1-based line.
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ImportError::config("unknown annotation key");
        assert_eq!(err.to_string(), "config error: unknown annotation key");

        let err = ImportError::parse(7, "unterminated IRI");
        assert_eq!(err.to_string(), "parse error at line 7: unterminated IRI");

        let err = ImportError::Sink("transmission failed".into());
        assert!(err.to_string().contains("transmission failed"));
    }
}
