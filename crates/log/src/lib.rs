//! # vlogging - dictionary-driven logging configuration
//!
//! Declare formatters, filters, handlers and loggers as a JSON dictionary,
//! merge it over a set of built-in defaults and serve it through `tracing`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use vlogging::{
//!     DEFAULT_HANDLER_NAME, Level, LogResult, Style, console_handler_config,
//!     microseconds_formatter_config,
//! };
//!
//! fn main() -> LogResult<()> {
//!     let precise = microseconds_formatter_config(None, Style::Percent);
//!     let console = console_handler_config(Some(Level::Info), Some("precise"), None);
//!     let log = vlogging::get_logger(
//!         Some("app"),
//!         Some(&json!({
//!             "formatters": { "precise": precise },
//!             "handlers": { DEFAULT_HANDLER_NAME: console },
//!         })),
//!     )?;
//!
//!     log.info("Server starting");
//!     tracing::warn!(target: "app::db", "pool almost exhausted");
//!     Ok(())
//! }
//! ```
//!
//! ## Merging
//!
//! Every category keeps its default entry (`defaut_format`, `defaut_handler`,
//! `defaut_logger`) unless the user replaces it by name. A `null` under a
//! default name keeps the default; a `null` under any other name disables
//! that entry.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

#[macro_use]
mod macros;

pub mod builders;
pub mod config;
mod context;
mod core;
mod facade;
mod filter;
pub mod format;
mod layer;
mod logger;
mod record;
mod registry;
pub mod runtime;
pub mod sink;

// Public API
pub use builders::{
    console_handler_config, file_handler_config, formatter_config, handler_config, logger_config,
    microseconds_formatter_config,
};
pub use config::defaults::{
    BASIC_FORMAT, CONSOLE_HANDLER_CLASS, DEFAULT_FORMATTER_NAME, DEFAULT_HANDLER_NAME,
    DEFAULT_LOGGER_NAME, FILE_HANDLER_CLASS, FILE_LINE_FORMAT, FILTER_CLASS, FORMATTER_CLASS,
    MICROSECONDS_DATEFMT, MODULE_LOGGER_NAME, NULL_HANDLER_CLASS, ROOT_LOGGER_NAME,
    STANDARD_FORMATTER_CLASS, STD_FILE_HANDLER_CLASS, STREAM_HANDLER_CLASS,
    TIMED_ROTATING_FILE_HANDLER_CLASS,
};
pub use config::{
    Category, Configuration, Level, STDERR_STREAM, STDOUT_STREAM, Section, Spec, Style,
};
pub use context::Config;
pub use crate::core::{LogError, LogResult};
pub use facade::{
    BasicConfig, basic_config, critical, debug, error, exception, get_logger, info, log, warning,
};
#[allow(deprecated)]
pub use facade::fatal;
pub use filter::{Filter, NameFilter};
pub use format::{Formatter, format_time};
pub use layer::{
    DispatchLayer, EXC_TEXT_FIELD, LEVELNO_FIELD, LINENO_FIELD, LOGGER_FIELD, PATHNAME_FIELD,
    logger_name_for_target,
};
pub use logger::{Logger, error_chain};
pub use record::Record;
pub use registry::{ClassRegistry, FilterFactory, FormatterFactory, SinkFactory};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        BasicConfig, Config, Level, LogError, LogResult, Logger, Style, basic_config, get_logger,
    };
}
