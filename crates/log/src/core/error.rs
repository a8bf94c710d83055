//! Error handling for vlogging
//!
//! Every fallible operation returns [`LogResult<T>`]. Rejections happen when a
//! configuration is applied: the merger itself never fails.

use thiserror::Error;

/// Type alias for results of logging operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while building or applying a logging configuration
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LogError {
    /// Structurally invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid format string or date format
    #[error("Invalid format '{format}': {reason}")]
    Format {
        /// The offending format string
        format: String,
        /// Why it was rejected
        reason: String,
    },

    /// Unknown level name or number
    #[error("Unknown level: {0}")]
    Level(String),

    /// A `class` tag with no registered factory
    #[error("Unknown {kind} class '{class}'")]
    UnknownClass {
        /// `formatter`, `handler` or `filter`
        kind: &'static str,
        /// The tag as written in the configuration
        class: String,
    },

    /// A spec names a formatter, filter or handler that is not configured
    #[error("Unable to configure {owner}: {kind} '{name}' is not defined")]
    UnresolvedReference {
        /// What holds the reference, e.g. `handler 'console'`
        owner: String,
        /// `formatter`, `filter` or `handler`
        kind: &'static str,
        /// The missing name
        name: String,
    },

    /// A constructor argument was missing, unknown or had the wrong type
    #[error("Invalid argument '{argument}' for {class}: {reason}")]
    InvalidArgument {
        /// Class tag the argument was meant for
        class: String,
        /// Argument name
        argument: String,
        /// Why it was rejected
        reason: String,
    },

    /// IO error (opening log files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LogError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            format: format.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn argument(
        class: impl Into<String>,
        argument: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            class: class.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the configuration content
    /// rather than by the environment (files, permissions).
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
