//! Category-wise configuration merge
//!
//! Every merge starts from a fresh copy of the default registry:
//! - the default entry of a category is seeded first
//! - user entries are layered on top by name (same name replaces)
//! - a `null` under the default name is dropped, so the default survives
//! - a `null` under any other name is kept as-is; the runtime treats it as
//!   an entry that does not exist

use serde_json::{Map, Value};

use super::defaults::default_spec;
use super::{Category, Configuration, Section};
use crate::core::{LogError, LogResult};

/// Merge one category of `cfg` over its default entry.
///
/// `cfg` is a full dictionary; only `cfg[key]` is read.
pub fn configure_items(cfg: Option<&Value>, key: &str, default_name: Option<&str>) -> Section {
    let mut result = Section::new();

    if let Some(name) = default_name
        && let Some(spec) = default_spec(key, name)
    {
        result.insert(name.to_string(), Value::Object(spec));
    }

    let mut user = cfg
        .and_then(|c| c.get(key))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    if let Some(name) = default_name
        && user.get(name).is_some_and(Value::is_null)
    {
        user.remove(name);
    }

    for (name, spec) in user {
        result.insert(name, spec);
    }
    result
}

/// Check that a user dictionary has the expected shape.
///
/// The top level must be an object and every category present must be an
/// object (or `null`, meaning "nothing to add"). Entry contents are checked
/// later, when the runtime builds them.
pub fn validate_shape(user: &Value) -> LogResult<()> {
    let dict = user
        .as_object()
        .ok_or_else(|| LogError::config("configuration must be a mapping"))?;

    for category in Category::ALL {
        match dict.get(category.key()) {
            None | Some(Value::Null | Value::Object(_)) => {}
            Some(other) => {
                return Err(LogError::config(format!(
                    "'{}' must be a mapping of name to spec, got {}",
                    category.key(),
                    type_name(other)
                )));
            }
        }
    }

    match dict.get("root") {
        None | Some(Value::Null | Value::Object(_)) => Ok(()),
        Some(other) => Err(LogError::config(format!(
            "'root' must be a mapping, got {}",
            type_name(other)
        ))),
    }
}

/// Layer `user` over the live configuration and re-seed defaults.
///
/// Live entries are kept unless the user supplies the same name. The result
/// of every category goes through [`configure_items`], so defaults are
/// always present afterwards.
pub fn merge(live: &Configuration, user: Option<&Value>) -> Configuration {
    let mut input = Map::new();

    for category in Category::ALL {
        let mut section = live.section(category).clone();
        let entries = user
            .and_then(|u| u.get(category.key()))
            .and_then(Value::as_object);

        if let Some(entries) = entries {
            for (name, spec) in entries {
                if spec.is_null() && category.default_name() == Some(name.as_str()) {
                    continue;
                }
                section.insert(name.clone(), spec.clone());
            }
        }
        input.insert(category.key().to_string(), Value::Object(section));
    }

    let input = Value::Object(input);
    let mut merged = Configuration::default();
    for category in Category::ALL {
        *merged.section_mut(category) =
            configure_items(Some(&input), category.key(), category.default_name());
    }

    merged.root = match user.and_then(|u| u.get("root")) {
        Some(Value::Object(root)) => Some(root.clone()),
        Some(_) => None,
        None => live.root.clone(),
    };
    merged
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
