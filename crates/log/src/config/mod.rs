//! Configuration model
//!
//! A configuration is a dictionary of four category sections, each mapping a
//! name to a spec:
//! - `types`: level / style / stream vocabulary
//! - `defaults`: the built-in registry every merge starts from
//! - `merge`: category-wise layering of user entries over defaults
//! - `presets`: environment and file loading, ready-made dictionaries

pub mod defaults;
pub mod merge;
pub mod presets;
pub mod types;

use serde_json::{Map, Value};

pub use types::{Level, STDERR_STREAM, STDOUT_STREAM, Style};

/// Construction parameters of one formatter, filter, handler or logger
pub type Spec = Map<String, Value>;

/// Name → spec mapping of one category
pub type Section = Map<String, Value>;

/// Version number written into dictionary snapshots
pub const DICTIONARY_VERSION: u64 = 1;

/// The four configuration categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `formatters`
    Formatters,
    /// `filters`
    Filters,
    /// `handlers`
    Handlers,
    /// `loggers`
    Loggers,
}

impl Category {
    /// Categories in application order
    pub const ALL: [Category; 4] = [
        Category::Formatters,
        Category::Filters,
        Category::Handlers,
        Category::Loggers,
    ];

    /// Dictionary key of the section
    pub const fn key(self) -> &'static str {
        match self {
            Category::Formatters => "formatters",
            Category::Filters => "filters",
            Category::Handlers => "handlers",
            Category::Loggers => "loggers",
        }
    }

    /// Name of the seeded default entry, if the category has one
    pub const fn default_name(self) -> Option<&'static str> {
        match self {
            Category::Formatters => Some(defaults::DEFAULT_FORMATTER_NAME),
            Category::Filters => None,
            Category::Handlers => Some(defaults::DEFAULT_HANDLER_NAME),
            Category::Loggers => Some(defaults::DEFAULT_LOGGER_NAME),
        }
    }

    /// Singular noun used in error messages
    pub const fn kind(self) -> &'static str {
        match self {
            Category::Formatters => "formatter",
            Category::Filters => "filter",
            Category::Handlers => "handler",
            Category::Loggers => "logger",
        }
    }
}

/// A complete (merged) configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    /// Formatter specs by name
    pub formatters: Section,
    /// Filter specs by name
    pub filters: Section,
    /// Handler specs by name
    pub handlers: Section,
    /// Logger specs by name
    pub loggers: Section,
    /// Root logger spec
    pub root: Option<Spec>,
}

impl Configuration {
    /// Section of one category
    pub fn section(&self, category: Category) -> &Section {
        match category {
            Category::Formatters => &self.formatters,
            Category::Filters => &self.filters,
            Category::Handlers => &self.handlers,
            Category::Loggers => &self.loggers,
        }
    }

    /// Mutable section of one category
    pub fn section_mut(&mut self, category: Category) -> &mut Section {
        match category {
            Category::Formatters => &mut self.formatters,
            Category::Filters => &mut self.filters,
            Category::Handlers => &mut self.handlers,
            Category::Loggers => &mut self.loggers,
        }
    }

    /// Spec stored under `name` in `category`, skipping `null` entries
    pub fn spec(&self, category: Category, name: &str) -> Option<&Spec> {
        self.section(category).get(name).and_then(Value::as_object)
    }

    /// Dictionary form, as accepted by [`Config::configure`]
    ///
    /// [`Config::configure`]: crate::Config::configure
    pub fn to_dictionary(&self) -> Value {
        let mut dict = Map::new();
        dict.insert("version".into(), Value::from(DICTIONARY_VERSION));
        dict.insert("disable_existing_loggers".into(), Value::Bool(false));
        for category in Category::ALL {
            dict.insert(
                category.key().into(),
                Value::Object(self.section(category).clone()),
            );
        }
        if let Some(root) = &self.root {
            dict.insert("root".into(), Value::Object(root.clone()));
        }
        Value::Object(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_defaults() {
        assert_eq!(Category::Filters.default_name(), None);
        for category in [Category::Formatters, Category::Handlers, Category::Loggers] {
            assert!(category.default_name().is_some());
        }
    }

    #[test]
    fn test_to_dictionary() {
        let mut config = Configuration::default();
        config
            .loggers
            .insert("app".into(), json!({"level": "INFO"}));
        config.root = Some(json!({"level": "ERROR"}).as_object().unwrap().clone());

        let dict = config.to_dictionary();
        assert_eq!(dict["version"], json!(1));
        assert_eq!(dict["disable_existing_loggers"], json!(false));
        assert_eq!(dict["loggers"]["app"]["level"], json!("INFO"));
        assert_eq!(dict["filters"], json!({}));
        assert_eq!(dict["root"]["level"], json!("ERROR"));
    }

    #[test]
    fn test_spec_skips_null_entries() {
        let mut config = Configuration::default();
        config.handlers.insert("gone".into(), Value::Null);
        assert!(config.spec(Category::Handlers, "gone").is_none());
        assert!(config.section(Category::Handlers).contains_key("gone"));
    }
}
