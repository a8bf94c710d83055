//! Output destinations for formatted records

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::{STDERR_STREAM, STDOUT_STREAM, Spec};
use crate::core::{LogError, LogResult};

/// Destination of formatted lines
///
/// Implementations receive one rendered record at a time, without a
/// trailing newline. Handlers serialize calls, so `&mut self` is enough.
pub trait Sink: Send {
    /// Write one formatted record
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Process standard stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

impl Stream {
    /// Resolve a stream token such as `ext://sys.stdout`
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            STDOUT_STREAM | "sys.stdout" | "stdout" => Some(Stream::Stdout),
            STDERR_STREAM | "sys.stderr" | "stderr" => Some(Stream::Stderr),
            _ => None,
        }
    }
}

/// Writes to stdout or stderr
#[derive(Debug)]
pub struct StreamSink {
    stream: Stream,
}

impl StreamSink {
    /// Sink bound to `stream`
    pub fn new(stream: Stream) -> Self {
        Self { stream }
    }
}

impl Sink for StreamSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{line}")?;
                out.flush()
            }
            Stream::Stderr => writeln!(io::stderr().lock(), "{line}"),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}

/// How a [`FileSink`] opens its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// `a`: keep existing content
    Append,
    /// `w`: truncate on open
    Truncate,
}

impl FileMode {
    fn parse(mode: &str) -> Option<Self> {
        match mode {
            "a" | "at" => Some(FileMode::Append),
            "w" | "wt" => Some(FileMode::Truncate),
            _ => None,
        }
    }
}

/// Writes to a plain file
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    mode: FileMode,
    file: Option<File>,
}

impl FileSink {
    /// Open `path` now, or on the first write when `delay` is set
    pub fn open(path: impl Into<PathBuf>, mode: FileMode, delay: bool) -> io::Result<Self> {
        let mut sink = Self {
            path: path.into(),
            mode,
            file: None,
        };
        if !delay {
            sink.file = Some(sink.open_file()?);
        }
        Ok(sink)
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(&self) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true);
        match self.mode {
            FileMode::Append => options.append(true),
            FileMode::Truncate => options.write(true).truncate(true),
        };
        options.open(&self.path)
    }
}

impl Sink for FileSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.file.is_none() {
            self.file = Some(self.open_file()?);
        }
        match self.file.as_mut() {
            Some(file) => writeln!(file, "{line}"),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.as_mut().map_or(Ok(()), Write::flush)
    }
}

/// Time-based rotating file, backed by `tracing-appender`
#[cfg(feature = "rolling")]
pub struct RollingSink {
    appender: tracing_appender::rolling::RollingFileAppender,
}

#[cfg(feature = "rolling")]
impl RollingSink {
    /// Rotate `path` every hour (`H`), or every day (`D`, `MIDNIGHT`)
    pub fn new(path: &Path, when: &str, max_files: Option<usize>) -> LogResult<Self> {
        use tracing_appender::rolling::{RollingFileAppender, Rotation};

        let rotation = match when.to_ascii_uppercase().as_str() {
            "H" => Rotation::HOURLY,
            "D" | "MIDNIGHT" => Rotation::DAILY,
            other => {
                return Err(LogError::argument(
                    crate::config::defaults::TIMED_ROTATING_FILE_HANDLER_CLASS,
                    "when",
                    format!("unsupported interval '{other}', expected H, D or MIDNIGHT"),
                ));
            }
        };
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let prefix = path.file_name().ok_or_else(|| {
            LogError::config(format!("Invalid file path (no filename): '{}'", path.display()))
        })?;

        let mut builder = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(prefix.to_string_lossy());
        if let Some(max_files) = max_files.filter(|n| *n > 0) {
            builder = builder.max_log_files(max_files);
        }
        let appender = builder
            .build(dir)
            .map_err(|e| LogError::config(format!("Failed to open rolling file: {e}")))?;
        Ok(Self { appender })
    }
}

#[cfg(feature = "rolling")]
impl Sink for RollingSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.appender, "{line}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.appender.flush()
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn write_line(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps lines in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drop everything captured so far
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

/// Constructor arguments of a handler or formatter spec
///
/// Factories take the keys they understand; whatever is left when the
/// factory returns is rejected as an unknown argument.
#[derive(Debug)]
pub struct Arguments {
    class: String,
    values: Spec,
}

impl Arguments {
    pub(crate) fn new(class: impl Into<String>, values: Spec) -> Self {
        Self {
            class: class.into(),
            values,
        }
    }

    /// Class tag being constructed
    pub fn class(&self) -> &str {
        &self.class
    }

    fn invalid(&self, argument: &str, reason: impl Into<String>) -> LogError {
        LogError::argument(&self.class, argument, reason)
    }

    /// Remove a raw value; `null` counts as absent
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name).filter(|v| !v.is_null())
    }

    /// Remove a string argument
    pub fn take_str(&mut self, name: &str) -> LogResult<Option<String>> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.invalid(name, format!("expected a string, got {other}"))),
        }
    }

    /// Remove a required string argument
    pub fn require_str(&mut self, name: &str) -> LogResult<String> {
        self.take_str(name)?
            .ok_or_else(|| self.invalid(name, "missing required argument"))
    }

    /// Remove a boolean argument
    pub fn take_bool(&mut self, name: &str) -> LogResult<Option<bool>> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(self.invalid(name, format!("expected a boolean, got {other}"))),
        }
    }

    /// Remove a non-negative integer argument
    pub fn take_u64(&mut self, name: &str) -> LogResult<Option<u64>> {
        match self.take(name) {
            None => Ok(None),
            Some(Value::Number(n)) if n.is_u64() => Ok(n.as_u64()),
            Some(other) => Err(self.invalid(
                name,
                format!("expected a non-negative integer, got {other}"),
            )),
        }
    }

    /// Fail on any argument nobody took
    pub(crate) fn finish(self) -> LogResult<()> {
        match self.values.keys().next() {
            Some(key) => Err(self.invalid(key, "unexpected keyword argument")),
            None => Ok(()),
        }
    }
}

pub(crate) fn stream_sink(args: &mut Arguments) -> LogResult<Box<dyn Sink>> {
    let stream = match args.take_str("stream")? {
        None => Stream::Stderr,
        Some(token) => Stream::from_token(&token)
            .ok_or_else(|| args.invalid("stream", format!("unknown stream '{token}'")))?,
    };
    Ok(Box::new(StreamSink::new(stream)))
}

pub(crate) fn console_sink(args: &mut Arguments) -> LogResult<Box<dyn Sink>> {
    if args.values.get("stream").is_none_or(Value::is_null) {
        return Ok(Box::new(StreamSink::new(Stream::Stdout)));
    }
    stream_sink(args)
}

fn check_encoding(args: &mut Arguments) -> LogResult<()> {
    if let Some(encoding) = args.take_str("encoding")? {
        let normalized = encoding.to_ascii_lowercase().replace(['-', '_'], "");
        if normalized != "utf8" {
            return Err(args.invalid(
                "encoding",
                format!("unsupported encoding '{encoding}', only utf-8 is written"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn file_sink(args: &mut Arguments) -> LogResult<Box<dyn Sink>> {
    let filename = args.require_str("filename")?;
    let mode = match args.take_str("mode")? {
        None => FileMode::Append,
        Some(mode) => FileMode::parse(&mode)
            .ok_or_else(|| args.invalid("mode", format!("unsupported mode '{mode}'")))?,
    };
    check_encoding(args)?;
    let delay = args.take_bool("delay")?.unwrap_or(false);
    args.take("errors");

    Ok(Box::new(FileSink::open(filename, mode, delay)?))
}

#[cfg(feature = "rolling")]
pub(crate) fn rolling_sink(args: &mut Arguments) -> LogResult<Box<dyn Sink>> {
    let filename = args.require_str("filename")?;
    let when = args.take_str("when")?.unwrap_or_else(|| "H".to_string());
    if let Some(interval) = args.take_u64("interval")?
        && interval != 1
    {
        return Err(args.invalid("interval", "only an interval of 1 is supported"));
    }
    let max_files = args.take_u64("backupCount")?.map(|n| n as usize);
    check_encoding(args)?;
    args.take_bool("delay")?;
    args.take_bool("utc")?;

    Ok(Box::new(RollingSink::new(Path::new(&filename), &when, max_files)?))
}

pub(crate) fn null_sink(_args: &mut Arguments) -> LogResult<Box<dyn Sink>> {
    Ok(Box::new(NullSink))
}
