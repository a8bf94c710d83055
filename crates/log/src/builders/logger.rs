use serde_json::Value;

use super::string_list;
use crate::config::Spec;
use crate::config::types::Level;

/// Create a logger spec containing only the given fields.
pub fn logger_config(
    level: Option<Level>,
    handlers: Option<&[&str]>,
    propagate: Option<bool>,
    filters: Option<&[&str]>,
) -> Spec {
    let mut config = Spec::new();
    if let Some(level) = level {
        config.insert("level".into(), level.into());
    }
    if let Some(handlers) = handlers {
        config.insert("handlers".into(), string_list(handlers));
    }
    if let Some(propagate) = propagate {
        config.insert("propagate".into(), Value::Bool(propagate));
    }
    if let Some(filters) = filters {
        config.insert("filters".into(), string_list(filters));
    }
    config
}
