//! Record formatting
//!
//! [`Formatter`] turns a [`Record`] into one line of text using a compiled
//! [`Pattern`] in one of the three placeholder styles, with millisecond or
//! microsecond timestamps.

mod pattern;
mod time;

use std::borrow::Cow;

pub use pattern::{Attr, FieldValue, Pattern};
pub use time::{DateFormat, TimeStyle, format_time};

use crate::config::Style;
use crate::core::LogResult;
use crate::record::Record;

/// Formats records into text
#[derive(Debug, Clone)]
pub struct Formatter {
    pattern: Pattern,
    datefmt: Option<DateFormat>,
    time_style: TimeStyle,
}

impl Formatter {
    /// Build a formatter, validating both the format string and the date format.
    ///
    /// A missing `format` renders the bare message in the chosen style.
    pub fn new(
        format: Option<&str>,
        datefmt: Option<&str>,
        style: Style,
        time_style: TimeStyle,
    ) -> LogResult<Self> {
        let format = format.unwrap_or(match style {
            Style::Percent => "%(message)s",
            Style::Brace => "{message}",
            Style::Dollar => "${message}",
        });
        Ok(Self {
            pattern: Pattern::parse(format, style)?,
            datefmt: datefmt.map(DateFormat::parse).transpose()?,
            time_style,
        })
    }

    /// Compiled format string
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Configured date format, if any
    pub fn datefmt(&self) -> Option<&str> {
        self.datefmt.as_ref().map(DateFormat::as_str)
    }

    /// Render the creation time of `record`.
    ///
    /// `None` selects this formatter's default rendering, not its configured
    /// date format.
    pub fn format_time(&self, record: &Record, datefmt: Option<&str>) -> LogResult<String> {
        match datefmt {
            Some(datefmt) => Ok(DateFormat::parse(datefmt)?.render(record.created)),
            None => Ok(self.time_style.render(record.created)),
        }
    }

    /// Render `record`, appending its exception text on a new line
    pub fn format(&self, record: &Record) -> String {
        let asctime = self.pattern.uses(Attr::AscTime).then(|| match &self.datefmt {
            Some(datefmt) => datefmt.render(record.created),
            None => self.time_style.render(record.created),
        });

        let mut out = self.pattern.render(|attr| match attr {
            Attr::Name => FieldValue::Str(Cow::Borrowed(&record.name)),
            Attr::LevelNo => FieldValue::Int(i64::from(record.level.value())),
            Attr::LevelName => FieldValue::Str(Cow::Borrowed(record.level.name())),
            Attr::Message => FieldValue::Str(Cow::Borrowed(&record.message)),
            Attr::AscTime => FieldValue::Str(Cow::Borrowed(asctime.as_deref().unwrap_or_default())),
            Attr::Created => FieldValue::Float(record.created),
            Attr::Msecs => FieldValue::Float(record.msecs()),
            Attr::RelativeCreated => FieldValue::Float(record.relative_created()),
            Attr::PathName => FieldValue::Str(Cow::Borrowed(
                record.pathname.as_deref().unwrap_or("(unknown file)"),
            )),
            Attr::FileName => FieldValue::Str(record.filename()),
            Attr::Module => FieldValue::Str(record.module()),
            Attr::LineNo => FieldValue::Int(i64::from(record.lineno.unwrap_or(0))),
            Attr::FuncName => FieldValue::Str(Cow::Borrowed(
                record.func_name.as_deref().unwrap_or("(unknown function)"),
            )),
            Attr::Thread => FieldValue::Int(record.thread as i64),
            Attr::ThreadName => FieldValue::Str(Cow::Borrowed(
                record.thread_name.as_deref().unwrap_or("<unnamed>"),
            )),
            Attr::Process => FieldValue::Int(i64::from(record.process)),
            Attr::Target => FieldValue::Str(Cow::Borrowed(&record.target)),
        });

        if let Some(exc_text) = record.exc_text.as_deref().filter(|t| !t.is_empty()) {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(exc_text);
        }
        out
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            pattern: Pattern::parse("%(message)s", Style::Percent)
                .unwrap_or_else(|_| unreachable!("the bare message pattern is valid")),
            datefmt: None,
            time_style: TimeStyle::IsoMillis,
        }
    }
}
