//! Class registry: symbolic `class` tags to constructors
//!
//! A spec names what to build with a `class` string. The registry maps
//! those strings to factories, so custom sinks, formatters and filters can
//! be plugged in without touching the applier.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::Style;
use crate::config::defaults::{
    CONSOLE_HANDLER_CLASS, FILE_HANDLER_CLASS, FILTER_CLASS, FORMATTER_CLASS, NULL_HANDLER_CLASS,
    STANDARD_FORMATTER_CLASS, STD_FILE_HANDLER_CLASS, STREAM_HANDLER_CLASS,
};
#[cfg(feature = "rolling")]
use crate::config::defaults::TIMED_ROTATING_FILE_HANDLER_CLASS;
use crate::core::{LogError, LogResult};
use crate::filter::{Filter, NameFilter};
use crate::format::{Formatter, TimeStyle};
use crate::sink::{self, Arguments, Sink};

/// Builds a formatter from its arguments
pub type FormatterFactory = Arc<dyn Fn(&mut Arguments) -> LogResult<Formatter> + Send + Sync>;

/// Builds a handler's sink from its arguments
pub type SinkFactory = Arc<dyn Fn(&mut Arguments) -> LogResult<Box<dyn Sink>> + Send + Sync>;

/// Builds a filter from its arguments
pub type FilterFactory = Arc<dyn Fn(&mut Arguments) -> LogResult<Arc<dyn Filter>> + Send + Sync>;

/// Maps `class` tags to factories
#[derive(Clone)]
pub struct ClassRegistry {
    formatters: HashMap<String, FormatterFactory>,
    sinks: HashMap<String, SinkFactory>,
    filters: HashMap<String, FilterFactory>,
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sinks: Vec<_> = self.sinks.keys().collect();
        sinks.sort();
        f.debug_struct("ClassRegistry")
            .field("formatters", &self.formatters.len())
            .field("sinks", &sinks)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register_formatter(FORMATTER_CLASS, |args| build_formatter(args, TimeStyle::IsoMillis));
        registry.register_formatter(STANDARD_FORMATTER_CLASS, |args| {
            build_formatter(args, TimeStyle::CommaMillis)
        });

        registry.register_sink(CONSOLE_HANDLER_CLASS, sink::console_sink);
        registry.register_sink(STREAM_HANDLER_CLASS, sink::stream_sink);
        registry.register_sink(FILE_HANDLER_CLASS, sink::file_sink);
        registry.register_sink(STD_FILE_HANDLER_CLASS, sink::file_sink);
        #[cfg(feature = "rolling")]
        registry.register_sink(TIMED_ROTATING_FILE_HANDLER_CLASS, sink::rolling_sink);
        registry.register_sink(NULL_HANDLER_CLASS, sink::null_sink);

        registry.register_filter(FILTER_CLASS, |args| {
            let name = args.take_str("name")?.unwrap_or_default();
            Ok(Arc::new(NameFilter::new(name)))
        });
        registry
    }
}

impl ClassRegistry {
    /// Registry without any class
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
            sinks: HashMap::new(),
            filters: HashMap::new(),
        }
    }

    /// Register (or replace) a formatter class
    pub fn register_formatter<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&mut Arguments) -> LogResult<Formatter> + Send + Sync + 'static,
    {
        self.formatters.insert(class.into(), Arc::new(factory));
        self
    }

    /// Register (or replace) a handler class by the sink it writes to
    pub fn register_sink<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&mut Arguments) -> LogResult<Box<dyn Sink>> + Send + Sync + 'static,
    {
        self.sinks.insert(class.into(), Arc::new(factory));
        self
    }

    /// Register (or replace) a filter class
    pub fn register_filter<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&mut Arguments) -> LogResult<Arc<dyn Filter>> + Send + Sync + 'static,
    {
        self.filters.insert(class.into(), Arc::new(factory));
        self
    }

    /// Whether a handler class is known
    pub fn has_sink(&self, class: &str) -> bool {
        self.sinks.contains_key(class)
    }

    pub(crate) fn formatter(&self, class: &str, args: &mut Arguments) -> LogResult<Formatter> {
        let factory = self.formatters.get(class).ok_or_else(|| LogError::UnknownClass {
            kind: "formatter",
            class: class.to_string(),
        })?;
        factory(args)
    }

    pub(crate) fn sink(&self, class: &str, args: &mut Arguments) -> LogResult<Box<dyn Sink>> {
        let factory = self.sinks.get(class).ok_or_else(|| LogError::UnknownClass {
            kind: "handler",
            class: class.to_string(),
        })?;
        factory(args)
    }

    pub(crate) fn filter(&self, class: &str, args: &mut Arguments) -> LogResult<Arc<dyn Filter>> {
        let factory = self.filters.get(class).ok_or_else(|| LogError::UnknownClass {
            kind: "filter",
            class: class.to_string(),
        })?;
        factory(args)
    }
}

fn build_formatter(args: &mut Arguments, time_style: TimeStyle) -> LogResult<Formatter> {
    let format = args.take_str("format")?;
    let datefmt = args.take_str("datefmt")?;
    let style = match args.take_str("style")? {
        None => Style::Percent,
        Some(style) => style
            .parse()
            .map_err(|_| LogError::argument(args.class(), "style", format!("unknown style '{style}'")))?,
    };
    // format strings are always validated
    args.take_bool("validate")?;
    Formatter::new(format.as_deref(), datefmt.as_deref(), style, time_style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;
    use crate::record::Record;
    use crate::sink::MemorySink;
    use serde_json::{Value, json};

    fn args(class: &str, value: Value) -> Arguments {
        Arguments::new(class, value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_builtin_classes() {
        let registry = ClassRegistry::default();
        for class in [
            CONSOLE_HANDLER_CLASS,
            STREAM_HANDLER_CLASS,
            FILE_HANDLER_CLASS,
            STD_FILE_HANDLER_CLASS,
            NULL_HANDLER_CLASS,
        ] {
            assert!(registry.has_sink(class), "{class}");
        }
        assert!(!ClassRegistry::empty().has_sink(CONSOLE_HANDLER_CLASS));
    }

    #[test]
    fn test_formatter_classes_differ_in_time_style() {
        let registry = ClassRegistry::default();
        let record = Record::new("app", Level::Info, "x").with_created(1_700_000_000.5);

        let mut spec = args(FORMATTER_CLASS, json!({"format": "%(asctime)s"}));
        let dotted = registry.formatter(FORMATTER_CLASS, &mut spec).unwrap();
        assert!(dotted.format(&record).ends_with(".500"));

        let mut spec = args(STANDARD_FORMATTER_CLASS, json!({"format": "%(asctime)s"}));
        let comma = registry.formatter(STANDARD_FORMATTER_CLASS, &mut spec).unwrap();
        assert!(comma.format(&record).ends_with(",500"));
    }

    #[test]
    fn test_formatter_style_argument() {
        let registry = ClassRegistry::default();
        let mut spec = args(FORMATTER_CLASS, json!({"format": "{levelname}:{message}", "style": "{"}));
        let formatter = registry.formatter(FORMATTER_CLASS, &mut spec).unwrap();
        spec.finish().unwrap();
        assert_eq!(formatter.format(&Record::new("app", Level::Error, "boom")), "ERROR:boom");

        let mut spec = args(FORMATTER_CLASS, json!({"style": "#"}));
        assert!(registry.formatter(FORMATTER_CLASS, &mut spec).is_err());
    }

    #[test]
    fn test_unknown_class() {
        let registry = ClassRegistry::default();
        let result = registry.sink("nope.Handler", &mut args("nope.Handler", json!({})));
        assert!(matches!(result, Err(LogError::UnknownClass { kind: "handler", .. })));
    }

    #[test]
    fn test_custom_sink_registration() {
        let memory = MemorySink::new();
        let mut registry = ClassRegistry::default();
        let shared = memory.clone();
        registry.register_sink("test.Memory", move |_| Ok(Box::new(shared.clone())));

        let mut sink = registry.sink("test.Memory", &mut args("test.Memory", json!({}))).unwrap();
        sink.write_line("captured").unwrap();
        assert_eq!(memory.lines(), vec!["captured"]);
    }

    #[test]
    fn test_name_filter_factory() {
        let registry = ClassRegistry::default();
        let filter = registry
            .filter(FILTER_CLASS, &mut args(FILTER_CLASS, json!({"name": "app"})))
            .unwrap();
        assert!(filter.filter(&Record::new("app.db", Level::Info, "x")));
        assert!(!filter.filter(&Record::new("other", Level::Info, "x")));
    }
}
