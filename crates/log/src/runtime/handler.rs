//! Handlers: level + formatter + filters + sink

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Level;
use crate::filter::Filter;
use crate::format::Formatter;
use crate::record::Record;
use crate::sink::Sink;

/// A configured output: records at or above `level` that pass every filter
/// are formatted and written to the sink
pub struct Handler {
    name: String,
    level: Level,
    formatter: Arc<Formatter>,
    filters: Vec<Arc<dyn Filter>>,
    sink: Mutex<Box<dyn Sink>>,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("formatter", &self.formatter.pattern().as_str())
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

impl Handler {
    /// Assemble a handler
    pub fn new(
        name: impl Into<String>,
        level: Level,
        formatter: Arc<Formatter>,
        filters: Vec<Arc<dyn Filter>>,
        sink: Box<dyn Sink>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            formatter,
            filters,
            sink: Mutex::new(sink),
        }
    }

    /// Name the handler was configured under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Threshold level
    pub fn level(&self) -> Level {
        self.level
    }

    /// Formatter used for every record
    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Format and write `record` if it passes the level and filters.
    ///
    /// Write failures are reported on stderr and otherwise ignored.
    pub fn handle(&self, record: &Record) {
        if record.level < self.level {
            return;
        }
        if !self.filters.iter().all(|f| f.filter(record)) {
            return;
        }
        let line = self.formatter.format(record);
        let result = self.sink.lock().write_line(&line);
        if let Err(error) = result {
            report_error(&self.name, record, &error);
        }
    }

    /// Flush the sink
    pub fn flush(&self) {
        let _ = self.sink.lock().flush();
    }
}

impl Drop for Handler {
    fn drop(&mut self) {
        let _ = self.sink.get_mut().flush();
    }
}

pub(crate) fn report_error(handler: &str, record: &Record, error: &io::Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "--- Logging error ---");
    let _ = writeln!(stderr, "Handler '{handler}' failed: {error}");
    let _ = writeln!(
        stderr,
        "Message: {:?} (logger '{}', level {})",
        record.message, record.name, record.level
    );
}
