//! Spec builders
//!
//! Small pure functions that produce the mappings [`Config::configure`]
//! consumes. Optional inputs left as `None` are omitted from the result
//! rather than written as `null`.
//!
//! [`Config::configure`]: crate::Config::configure

mod formatter;
mod handler;
mod logger;

pub use formatter::{formatter_config, microseconds_formatter_config};
pub use handler::{console_handler_config, file_handler_config, handler_config};
pub use logger::logger_config;

use serde_json::Value;

fn string_list(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|s| Value::String((*s).to_string())).collect())
}
