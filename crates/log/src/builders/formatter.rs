use serde_json::Value;

use crate::config::Spec;
use crate::config::defaults::{BASIC_FORMAT, FORMATTER_CLASS, MICROSECONDS_DATEFMT};
use crate::config::types::Style;

/// Create a formatter spec.
///
/// `class_name` defaults to [`FORMATTER_CLASS`]. `datefmt` is only written
/// when given; `extra` keys are copied in last and win on collision.
pub fn formatter_config(
    format: &str,
    datefmt: Option<&str>,
    style: Style,
    class_name: Option<&str>,
    extra: Spec,
) -> Spec {
    let mut config = Spec::new();
    config.insert(
        "class".into(),
        Value::String(class_name.unwrap_or(FORMATTER_CLASS).to_string()),
    );
    config.insert("format".into(), Value::String(format.to_string()));
    if let Some(datefmt) = datefmt {
        config.insert("datefmt".into(), Value::String(datefmt.to_string()));
    }
    config.insert("style".into(), Value::String(style.as_str().to_string()));
    config.extend(extra);
    config
}

/// Create a formatter spec whose timestamps carry microseconds.
///
/// `format` defaults to [`BASIC_FORMAT`].
pub fn microseconds_formatter_config(format: Option<&str>, style: Style) -> Spec {
    formatter_config(
        format.unwrap_or(BASIC_FORMAT),
        Some(MICROSECONDS_DATEFMT),
        style,
        None,
        Spec::new(),
    )
}
