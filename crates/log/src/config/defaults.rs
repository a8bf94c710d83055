//! Built-in default registry and public constants
//!
//! The registry holds one formatter, one handler and one logger. It is an
//! immutable template: callers always receive copies.

use std::sync::LazyLock;

use serde_json::Value;

use super::types::{Level, STDOUT_STREAM, Style};
use super::{Category, Configuration, Spec};
use crate::builders::{console_handler_config, formatter_config, logger_config};

/// Name of the seeded formatter
pub const DEFAULT_FORMATTER_NAME: &str = "defaut_format";

/// Name of the seeded handler
pub const DEFAULT_HANDLER_NAME: &str = "defaut_handler";

/// Name of the seeded logger
pub const DEFAULT_LOGGER_NAME: &str = "defaut_logger";

/// Name of the process-wide logger behind the module-level functions
pub const MODULE_LOGGER_NAME: &str = "vlogging";

/// Name reported by the root logger handle
pub const ROOT_LOGGER_NAME: &str = "root";

/// Time, padded level name and message
pub const BASIC_FORMAT: &str = "%(asctime)s %(levelname)-8s %(message)s";

/// [`BASIC_FORMAT`] with the source location
pub const FILE_LINE_FORMAT: &str =
    "%(asctime)s %(levelname)-8s %(filename)s:%(lineno)d: %(message)s";

/// Date format with microsecond precision
pub const MICROSECONDS_DATEFMT: &str = "%Y-%m-%d %H:%M:%S.%f";

/// Formatter rendering millisecond ISO timestamps (`2023-11-14 22:13:20.123`)
pub const FORMATTER_CLASS: &str = "vlogging.Formatter";

/// Formatter rendering comma-millisecond timestamps (`2023-11-14 22:13:20,123`)
pub const STANDARD_FORMATTER_CLASS: &str = "logging.Formatter";

/// Console handler (`stream`)
pub const CONSOLE_HANDLER_CLASS: &str = "vlogging.handlers.ConsoleHandler";

/// Alias of [`CONSOLE_HANDLER_CLASS`]
pub const STREAM_HANDLER_CLASS: &str = "logging.StreamHandler";

/// File handler (`filename`, `mode`, `encoding`, `delay`)
pub const FILE_HANDLER_CLASS: &str = "vlogging.handlers.FileHandler";

/// Alias of [`FILE_HANDLER_CLASS`]
pub const STD_FILE_HANDLER_CLASS: &str = "logging.FileHandler";

/// Time-rotated file handler (`filename`, `when`)
pub const TIMED_ROTATING_FILE_HANDLER_CLASS: &str = "vlogging.handlers.TimedRotatingFileHandler";

/// Handler that discards every record
pub const NULL_HANDLER_CLASS: &str = "logging.NullHandler";

/// Logger-name prefix filter (`name`)
pub const FILTER_CLASS: &str = "logging.Filter";

static DEFAULTS: LazyLock<Configuration> = LazyLock::new(|| {
    let mut config = Configuration::default();
    config.formatters.insert(
        DEFAULT_FORMATTER_NAME.into(),
        Value::Object(formatter_config(
            BASIC_FORMAT,
            None,
            Style::Percent,
            None,
            Spec::new(),
        )),
    );
    config.handlers.insert(
        DEFAULT_HANDLER_NAME.into(),
        Value::Object(console_handler_config(
            Some(Level::Debug),
            Some(DEFAULT_FORMATTER_NAME),
            Some(STDOUT_STREAM),
        )),
    );
    config.loggers.insert(
        DEFAULT_LOGGER_NAME.into(),
        Value::Object(logger_config(
            Some(Level::Debug),
            Some(&[DEFAULT_HANDLER_NAME][..]),
            None,
            None,
        )),
    );
    config
});

/// Copy of the default spec stored under `(key, name)`
pub fn default_spec(key: &str, name: &str) -> Option<Spec> {
    let category = Category::ALL.into_iter().find(|c| c.key() == key)?;
    DEFAULTS.spec(category, name).cloned()
}

/// Copy of the whole default registry
pub fn default_configuration() -> Configuration {
    DEFAULTS.clone()
}
