//! Field extraction from tracing events

use std::fmt::{self, Write};

use tracing::field::{Field, Visit};

/// Field carrying an explicit logger name
pub const LOGGER_FIELD: &str = "logger";
/// Field carrying a numeric level (overrides the event level)
pub const LEVELNO_FIELD: &str = "levelno";
/// Field carrying exception text
pub const EXC_TEXT_FIELD: &str = "exc_text";
/// Field carrying the caller's source path
pub const PATHNAME_FIELD: &str = "pathname";
/// Field carrying the caller's source line
pub const LINENO_FIELD: &str = "lineno";

/// Collects the message, the routing fields and everything else as
/// `key=value` pairs
#[derive(Debug, Default)]
pub(crate) struct RecordVisitor {
    pub message: String,
    pub extra: String,
    pub logger: Option<String>,
    pub levelno: Option<u64>,
    pub exc_text: Option<String>,
    pub pathname: Option<String>,
    pub lineno: Option<u32>,
}

impl RecordVisitor {
    /// Message followed by any extra fields
    pub fn into_message(self) -> String {
        match (self.message.is_empty(), self.extra.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.extra,
            (false, false) => format!("{} {}", self.message, self.extra),
        }
    }

    fn push_extra(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        // bridged `log` records carry their metadata as `log.*` fields
        if field.name().starts_with("log.") {
            return;
        }
        if !self.extra.is_empty() {
            self.extra.push(' ');
        }
        let _ = write!(self.extra, "{}={}", field.name(), value);
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => value.clone_into(&mut self.message),
            LOGGER_FIELD => self.logger = Some(value.to_string()),
            EXC_TEXT_FIELD => self.exc_text = Some(value.to_string()),
            PATHNAME_FIELD => self.pathname = Some(value.to_string()),
            _ => self.push_extra(field, format_args!("{value:?}")),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            LEVELNO_FIELD => self.levelno = Some(value),
            LINENO_FIELD => self.lineno = u32::try_from(value).ok(),
            _ => self.push_extra(field, format_args!("{value}")),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            LEVELNO_FIELD => self.levelno = u64::try_from(value).ok(),
            LINENO_FIELD => self.lineno = u32::try_from(value).ok(),
            _ => self.push_extra(field, format_args!("{value}")),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push_extra(field, format_args!("{value}"));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_extra(field, format_args!("{value:?}"));
        }
    }
}
