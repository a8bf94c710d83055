//! Ready-made dictionaries and environment loading

use std::path::Path;

use serde_json::{Value, json};

use super::defaults::{
    DEFAULT_FORMATTER_NAME, DEFAULT_HANDLER_NAME, DEFAULT_LOGGER_NAME, FILE_LINE_FORMAT, default_spec,
};
use super::merge::validate_shape;
use super::types::Level;
use crate::core::{LogError, LogResult};

/// Path of a JSON dictionary to apply at startup
pub const CONFIG_ENV: &str = "VLOGGING_CONFIG";

/// Level override for the default logger
pub const LEVEL_ENV: &str = "VLOGGING_LEVEL";

/// Parse a JSON dictionary
pub fn from_json_str(source: &str) -> LogResult<Value> {
    let value: Value = serde_json::from_str(source)?;
    validate_shape(&value)?;
    Ok(value)
}

/// Read and parse a JSON dictionary file
pub fn load_json_file(path: impl AsRef<Path>) -> LogResult<Value> {
    let source = std::fs::read_to_string(path.as_ref())?;
    from_json_str(&source)
}

/// Build a user dictionary from the process environment
///
/// Returns `None` when neither variable is set.
pub fn from_env() -> LogResult<Option<Value>> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`from_env`], reading variables through `lookup`
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LogResult<Option<Value>> {
    let mut config = match lookup(CONFIG_ENV) {
        Some(path) if !path.trim().is_empty() => Some(load_json_file(path.trim())?),
        _ => None,
    };

    if let Some(level) = lookup(LEVEL_ENV) {
        let level: Level = level.parse()?;
        let dict = config.get_or_insert_with(|| json!({}));
        let loggers = dict
            .as_object_mut()
            .ok_or_else(|| LogError::config("configuration must be a mapping"))?
            .entry("loggers")
            .or_insert_with(|| json!({}));
        if loggers.is_null() {
            *loggers = json!({});
        }
        let entry = loggers
            .as_object_mut()
            .ok_or_else(|| LogError::config("'loggers' must be a mapping"))?
            .entry(DEFAULT_LOGGER_NAME)
            .or_insert_with(|| {
                Value::Object(default_spec("loggers", DEFAULT_LOGGER_NAME).unwrap_or_default())
            });
        if !entry.is_object() {
            *entry = json!({});
        }
        if let Some(spec) = entry.as_object_mut() {
            spec.insert("level".into(), level.into());
        }
    }

    Ok(config)
}

/// Development dictionary: source locations in every line, everything from
/// `DEBUG` up
pub fn development() -> Value {
    json!({
        "formatters": {
            DEFAULT_FORMATTER_NAME: { "format": FILE_LINE_FORMAT },
        },
        "loggers": {
            DEFAULT_LOGGER_NAME: { "level": "DEBUG", "handlers": [DEFAULT_HANDLER_NAME] },
        },
        "root": { "level": "DEBUG" },
    })
}

/// Quiet dictionary: warnings and above only
pub fn quiet() -> Value {
    json!({
        "loggers": {
            DEFAULT_LOGGER_NAME: { "level": "WARNING", "handlers": [DEFAULT_HANDLER_NAME] },
        },
        "root": { "level": "WARNING" },
    })
}
