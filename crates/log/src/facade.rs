//! Process-wide entry points
//!
//! These functions work on [`Config::global`], installing it as the global
//! tracing subscriber on first use.

use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde_json::{Value, json};

use crate::builders::{console_handler_config, file_handler_config, formatter_config, logger_config};
use crate::config::defaults::{
    BASIC_FORMAT, DEFAULT_FORMATTER_NAME, DEFAULT_HANDLER_NAME, DEFAULT_LOGGER_NAME,
    MODULE_LOGGER_NAME,
};
use crate::config::{Level, Spec, Style};
use crate::context::Config;
use crate::core::{LogError, LogResult};
use crate::logger::Logger;

static MODULE_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Logger handle from the process-wide context.
///
/// `config` is merged in first. A `name` missing from the live loggers gets
/// a copy of the default logger spec. `None` returns the root logger.
pub fn get_logger(name: Option<&str>, config: Option<&Value>) -> LogResult<Logger> {
    let global = Config::global();
    Config::install_global();
    if config.is_some() {
        global.configure(config)?;
    }
    global.prepare(name)?;
    Ok(global.logger(name))
}

fn module_logger() -> &'static Logger {
    MODULE_LOGGER.get_or_init(|| {
        get_logger(Some(MODULE_LOGGER_NAME), None).unwrap_or_else(|e| {
            tracing::debug!(target: "vlogging::facade", error = %e, "module logger not prepared");
            Config::global().logger(Some(MODULE_LOGGER_NAME))
        })
    })
}

/// Log at `CRITICAL` on the module logger
#[track_caller]
pub fn critical(message: impl Display) {
    module_logger().critical(message);
}

/// Deprecated alias of [`critical`]
#[deprecated(note = "use `critical`")]
#[track_caller]
pub fn fatal(message: impl Display) {
    module_logger().critical(message);
}

/// Log at `ERROR` on the module logger
#[track_caller]
pub fn error(message: impl Display) {
    module_logger().error(message);
}

/// Log at `WARNING` on the module logger
#[track_caller]
pub fn warning(message: impl Display) {
    module_logger().warning(message);
}

/// Log at `INFO` on the module logger
#[track_caller]
pub fn info(message: impl Display) {
    module_logger().info(message);
}

/// Log at `DEBUG` on the module logger
#[track_caller]
pub fn debug(message: impl Display) {
    module_logger().debug(message);
}

/// Log at `level` on the module logger
#[track_caller]
pub fn log(level: Level, message: impl Display) {
    module_logger().log(level, message);
}

/// Log at `ERROR` on the module logger, with `error` and its sources
#[track_caller]
pub fn exception<E: Error + ?Sized>(message: impl Display, error: &E) {
    module_logger().exception(message, error);
}

/// Options of [`basic_config`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicConfig {
    format: Option<String>,
    datefmt: Option<String>,
    style: Style,
    filename: Option<PathBuf>,
    filemode: Option<String>,
    stream: Option<String>,
    encoding: Option<String>,
    level: Option<Level>,
}

impl BasicConfig {
    /// No options: basic format on standard output
    pub fn new() -> Self {
        Self::default()
    }

    /// Format string (defaults to [`BASIC_FORMAT`])
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Date format for `asctime`
    pub fn datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.datefmt = Some(datefmt.into());
        self
    }

    /// Placeholder style of the format string
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Write to this file instead of a stream
    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// File open mode, `a` or `w`
    pub fn filemode(mut self, filemode: impl Into<String>) -> Self {
        self.filemode = Some(filemode.into());
        self
    }

    /// Stream token such as [`crate::STDERR_STREAM`]
    pub fn stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// File encoding
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Level of both the handler and the default logger
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// The dictionary these options stand for
    pub fn to_dictionary(&self) -> LogResult<Value> {
        if self.filename.is_some() && self.stream.is_some() {
            return Err(LogError::config(
                "'stream' and 'filename' should not be specified together",
            ));
        }

        let formatter = formatter_config(
            self.format.as_deref().unwrap_or(BASIC_FORMAT),
            self.datefmt.as_deref(),
            self.style,
            None,
            Spec::new(),
        );
        let handler = match &self.filename {
            Some(filename) => file_handler_config(
                &filename.to_string_lossy(),
                Some(self.filemode.as_deref().unwrap_or("a")),
                self.encoding.as_deref(),
                self.level,
                Some(DEFAULT_FORMATTER_NAME),
                Spec::new(),
            ),
            None => console_handler_config(
                self.level,
                Some(DEFAULT_FORMATTER_NAME),
                self.stream.as_deref(),
            ),
        };
        let logger = logger_config(self.level, Some(&[DEFAULT_HANDLER_NAME][..]), None, None);

        Ok(json!({
            "formatters": { DEFAULT_FORMATTER_NAME: formatter },
            "handlers": { DEFAULT_HANDLER_NAME: handler },
            "loggers": { DEFAULT_LOGGER_NAME: logger },
        }))
    }

    /// Configure `config` with these options
    pub fn apply(&self, config: &Config) -> LogResult<()> {
        config.configure(Some(&self.to_dictionary()?))
    }
}

/// One-shot setup of the process-wide context
pub fn basic_config(options: BasicConfig) -> LogResult<()> {
    Config::install_global();
    options.apply(Config::global())
}
