use serde_json::Value;

use super::string_list;
use crate::config::Spec;
use crate::config::defaults::{CONSOLE_HANDLER_CLASS, FILE_HANDLER_CLASS};
use crate::config::types::{Level, STDOUT_STREAM};

/// Create a handler spec.
///
/// `class` is always present; `level`, `formatter` and `filters` only when
/// given. `extra` carries constructor arguments of the handler class.
pub fn handler_config(
    class_name: &str,
    level: Option<Level>,
    formatter: Option<&str>,
    filters: Option<&[&str]>,
    extra: Spec,
) -> Spec {
    let mut config = Spec::new();
    config.insert("class".into(), Value::String(class_name.to_string()));
    if let Some(level) = level {
        config.insert("level".into(), level.into());
    }
    if let Some(formatter) = formatter {
        config.insert("formatter".into(), Value::String(formatter.to_string()));
    }
    if let Some(filters) = filters {
        config.insert("filters".into(), string_list(filters));
    }
    config.extend(extra);
    config
}

/// Create a console handler spec writing to `stream`
/// ([`STDOUT_STREAM`] when `None`).
pub fn console_handler_config(
    level: Option<Level>,
    formatter: Option<&str>,
    stream: Option<&str>,
) -> Spec {
    let mut extra = Spec::new();
    extra.insert(
        "stream".into(),
        Value::String(stream.unwrap_or(STDOUT_STREAM).to_string()),
    );
    handler_config(CONSOLE_HANDLER_CLASS, level, formatter, None, extra)
}

/// Create a file handler spec.
///
/// `mode` defaults to `"a"`; `encoding` is only written when given.
pub fn file_handler_config(
    filename: &str,
    mode: Option<&str>,
    encoding: Option<&str>,
    level: Option<Level>,
    formatter: Option<&str>,
    extra: Spec,
) -> Spec {
    let mut config = Spec::new();
    config.insert("filename".into(), Value::String(filename.to_string()));
    config.insert("mode".into(), Value::String(mode.unwrap_or("a").to_string()));
    if let Some(encoding) = encoding {
        config.insert("encoding".into(), Value::String(encoding.to_string()));
    }
    config.extend(extra);
    handler_config(FILE_HANDLER_CLASS, level, formatter, None, config)
}
