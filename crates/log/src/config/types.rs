//! Level, style and stream vocabulary shared by specs and the runtime

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::LogError;

/// Token resolved to the process standard output
pub const STDOUT_STREAM: &str = "ext://sys.stdout";

/// Token resolved to the process standard error
pub const STDERR_STREAM: &str = "ext://sys.stderr";

/// Severity level
///
/// Numeric values follow the conventional dictionary-config scale so that
/// configurations written for other runtimes keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Defer to the parent logger
    #[default]
    NotSet,
    /// Finer than debug; only produced by `tracing::trace!`
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warning,
    /// Error level
    Error,
    /// Critical level
    Critical,
}

impl Level {
    /// All levels, ascending
    pub const ALL: [Level; 7] = [
        Level::NotSet,
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Numeric value of the level
    #[inline]
    pub const fn value(self) -> u32 {
        match self {
            Level::NotSet => 0,
            Level::Trace => 5,
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Upper-case level name as rendered by `%(levelname)s`
    pub const fn name(self) -> &'static str {
        match self {
            Level::NotSet => "NOTSET",
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Level with exactly this numeric value
    pub fn from_value(value: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|l| u64::from(l.value()) == value)
    }

    /// Map a tracing level onto this scale
    pub fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }

    /// Parse a level from a spec value (name or number)
    pub fn from_value_spec(value: &serde_json::Value) -> Result<Self, LogError> {
        match value {
            serde_json::Value::String(s) => s.parse(),
            serde_json::Value::Number(n) => n
                .as_u64()
                .and_then(Self::from_value)
                .ok_or_else(|| LogError::Level(n.to_string())),
            other => Err(LogError::Level(other.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOTSET" => Ok(Level::NotSet),
            "TRACE" => Ok(Level::Trace),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            other => other
                .parse::<u64>()
                .ok()
                .and_then(Self::from_value)
                .ok_or_else(|| LogError::Level(s.to_string())),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_value_spec(&value).map_err(serde::de::Error::custom)
    }
}

impl From<Level> for serde_json::Value {
    fn from(level: Level) -> Self {
        serde_json::Value::String(level.name().to_string())
    }
}

/// Placeholder style of a format string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Style {
    /// `%(name)s`
    #[default]
    #[serde(rename = "%")]
    Percent,
    /// `{name}`
    #[serde(rename = "{")]
    Brace,
    /// `$name` / `${name}`
    #[serde(rename = "$")]
    Dollar,
}

impl Style {
    /// The one-character tag used in specs
    pub const fn as_str(self) -> &'static str {
        match self {
            Style::Percent => "%",
            Style::Brace => "{",
            Style::Dollar => "$",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "%" => Ok(Style::Percent),
            "{" => Ok(Style::Brace),
            "$" => Ok(Style::Dollar),
            other => Err(LogError::config(format!(
                "Style must be one of: %, {{, $ (got '{other}')"
            ))),
        }
    }
}
