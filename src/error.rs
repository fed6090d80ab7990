//! Error types for the packaging pipeline.
//!
//! The taxonomy distinguishes three user-visible kinds of failure:
//!
//! - [`Error::Configuration`] — user-fixable mistakes: deprecated keys,
//!   unresolved macro tokens, missing resources, a compatibility shim that is
//!   absent or too old.
//! - [`Error::Integrity`] — the packaged tree failed a sanity check (missing
//!   output directory, entry file or manifest). This signals a packaging
//!   defect, not a configuration mistake.
//! - [`Error::Tool`] — an external helper tool produced output we could not
//!   parse; the raw output is kept for diagnosis.
//!
//! Everything else (I/O, globs, downloads) converts into infrastructure
//! variants. All errors abort the current pack invocation; there is no
//! partial-success signaling.
//!
//! The [`Context`] and [`ErrorExt`] traits and the [`bail!`](crate::bail)
//! macro provide anyhow-style ergonomics over the concrete error type.

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the packager.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "reading config file")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned or awaited.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Child process did not finish within the allotted time.
    #[error("command {command} timed out after {timeout_ms} ms")]
    CommandTimeout {
        /// Command that timed out
        command: String,
        /// Timeout that was exceeded, in milliseconds
        timeout_ms: u64,
    },

    /// User-fixable configuration mistake.
    ///
    /// Deprecated keys, unresolved macro tokens, missing resource references,
    /// icon conversion failures and compatibility-shim problems all land here.
    #[error("{message}")]
    Configuration {
        /// Description of the mistake, including what to change
        message: String,
    },

    /// A sanity check on the packaged tree failed.
    #[error("{message}: {path}")]
    Integrity {
        /// Description of what is missing or malformed
        message: String,
        /// The offending path
        path: PathBuf,
    },

    /// An external tool produced a response we could not parse.
    #[error("cannot parse response of {tool}: {error}. Raw output: {output}")]
    Tool {
        /// Name of the tool that was invoked
        tool: String,
        /// The parse failure
        error: serde_json::Error,
        /// Raw output captured from the tool, kept for diagnosis
        output: String,
    },

    /// A user-supplied lifecycle hook failed.
    #[error("hook failed: {0}")]
    Hook(#[source] anyhow::Error),

    /// Application signing failed.
    #[error("failed to sign app: {0}")]
    Sign(String),

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid glob pattern.
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Error walking a directory tree.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Semantic version parsing error.
    #[error("{0}")]
    SemverError(#[from] semver::Error),

    /// HTTP client error (downloading the compatibility shim).
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Hash mismatch for a downloaded file.
    #[error("hash mismatch of downloaded file: expected {expected}, got {actual}")]
    HashMismatch {
        /// Expected hash value
        expected: String,
        /// Actual hash value
        actual: String,
    },

    /// Generic error with a custom message. Created by [`bail!`](crate::bail).
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Creates an [`Error::Configuration`] from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an [`Error::Integrity`] naming the offending path.
    pub fn integrity(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Integrity {
            message: message.into(),
            path: path.into(),
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the packager's
/// [`Error`] type. Works with both `Result<T>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
///
/// The `context` should be a present-tense verb phrase describing the
/// operation, e.g., "reading file", "creating directory", "copying binary".
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with an error.
///
/// Converts the message into an [`Error::GenericError`] and returns
/// immediately.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_error() {
        let err: Result<()> = Err(Error::GenericError("inner".into()));
        let wrapped = err.context("doing something").unwrap_err();
        assert_eq!(wrapped.to_string(), "doing something: inner");
    }

    #[test]
    fn test_option_context() {
        let missing: Option<u32> = None;
        let err = missing.context("value is required").unwrap_err();
        assert!(matches!(err, Error::GenericError(_)));
    }

    #[test]
    fn test_integrity_error_names_path() {
        let err = Error::integrity("output directory does not exist", "/tmp/out");
        assert_eq!(err.to_string(), "output directory does not exist: /tmp/out");
    }
}
