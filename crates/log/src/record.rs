//! Log records as seen by formatters, filters and handlers

use std::borrow::Cow;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Level;

static START: LazyLock<f64> = LazyLock::new(now);

/// Seconds since the epoch, fractional
pub fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// One log event
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Logger name the record was emitted through
    pub name: String,
    /// Severity
    pub level: Level,
    /// Rendered message, without exception text
    pub message: String,
    /// Creation time in seconds since the epoch
    pub created: f64,
    /// Source file path, when known
    pub pathname: Option<String>,
    /// Source line, when known
    pub lineno: Option<u32>,
    /// Module path of the call site (`tracing` target)
    pub target: String,
    /// Enclosing function or span name, when known
    pub func_name: Option<String>,
    /// Emitting thread id
    pub thread: u64,
    /// Emitting thread name
    pub thread_name: Option<String>,
    /// Process id
    pub process: u32,
    /// Error chain captured by `exception`
    pub exc_text: Option<String>,
}

impl Record {
    /// Record created now on the current thread
    pub fn new(name: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        let name = name.into();
        let current = std::thread::current();
        Self {
            target: name.clone(),
            name,
            level,
            message: message.into(),
            created: now(),
            pathname: None,
            lineno: None,
            func_name: None,
            thread: thread_number(current.id()),
            thread_name: current.name().map(str::to_string),
            process: std::process::id(),
            exc_text: None,
        }
    }

    /// Override the creation time
    #[must_use]
    pub fn with_created(mut self, created: f64) -> Self {
        self.created = created;
        self
    }

    /// Attach a source location
    #[must_use]
    pub fn with_location(mut self, pathname: impl Into<String>, lineno: u32) -> Self {
        self.pathname = Some(pathname.into());
        self.lineno = Some(lineno);
        self
    }

    /// Attach exception text
    #[must_use]
    pub fn with_exc_text(mut self, exc_text: impl Into<String>) -> Self {
        self.exc_text = Some(exc_text.into());
        self
    }

    /// Final path component of [`Record::pathname`]
    pub fn filename(&self) -> Cow<'_, str> {
        match &self.pathname {
            Some(path) => Cow::Borrowed(
                path.rsplit(['/', '\\'])
                    .next()
                    .unwrap_or(path.as_str()),
            ),
            None => Cow::Borrowed("(unknown file)"),
        }
    }

    /// [`Record::filename`] without its extension
    pub fn module(&self) -> Cow<'_, str> {
        match self.filename() {
            Cow::Borrowed(name) if self.pathname.is_some() => {
                Cow::Borrowed(name.split_once('.').map_or(name, |(stem, _)| stem))
            }
            _ => Cow::Borrowed("Unknown module"),
        }
    }

    /// Millisecond part of [`Record::created`]
    pub fn msecs(&self) -> f64 {
        ((self.created - self.created.floor()) * 1000.0).floor()
    }

    /// Milliseconds between logging start-up and this record
    pub fn relative_created(&self) -> f64 {
        (self.created - *START) * 1000.0
    }
}

/// Force the start-up timestamp used by `relativeCreated`
pub(crate) fn mark_start() {
    LazyLock::force(&START);
}

fn thread_number(id: std::thread::ThreadId) -> u64 {
    // ThreadId only exposes its counter through Debug ("ThreadId(7)")
    format!("{id:?}")
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or_default()
}
