//! Routing table built from a merged configuration

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use serde_json::Value;
use smallvec::SmallVec;

use super::handler::Handler;
use crate::config::defaults::{FILTER_CLASS, FORMATTER_CLASS, ROOT_LOGGER_NAME};
use crate::config::{Configuration, Level, Spec};
use crate::core::{LogError, LogResult};
use crate::filter::Filter;
use crate::format::Formatter;
use crate::record::Record;
use crate::registry::ClassRegistry;
use crate::sink::Arguments;

/// Level of the root logger when its spec does not set one
pub const ROOT_DEFAULT_LEVEL: Level = Level::Warning;

static LAST_RESORT: LazyLock<Formatter> = LazyLock::new(Formatter::default);

type Handlers = SmallVec<[Arc<Handler>; 2]>;

#[derive(Debug)]
struct LoggerNode {
    /// `None` defers to the parent
    level: Option<Level>,
    handlers: Handlers,
    filters: Vec<Arc<dyn Filter>>,
    propagate: bool,
}

impl LoggerNode {
    fn root() -> Self {
        Self {
            level: Some(ROOT_DEFAULT_LEVEL),
            handlers: Handlers::new(),
            filters: Vec::new(),
            propagate: false,
        }
    }
}

/// Named loggers, handlers and formatters ready to route records
#[derive(Debug)]
pub struct Table {
    formatters: HashMap<String, Arc<Formatter>>,
    handlers: HashMap<String, Arc<Handler>>,
    loggers: HashMap<String, LoggerNode>,
    root: LoggerNode,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            formatters: HashMap::new(),
            handlers: HashMap::new(),
            loggers: HashMap::new(),
            root: LoggerNode::root(),
        }
    }
}

impl Table {
    /// Build every formatter, filter, handler and logger of `config`.
    ///
    /// Fails on the first malformed entry or unresolved reference; nothing
    /// is kept from a failed build.
    pub fn build(config: &Configuration, registry: &ClassRegistry) -> LogResult<Self> {
        let mut formatters = HashMap::new();
        for (name, spec) in entries(&config.formatters, "formatter")? {
            let class = class_of(spec, FORMATTER_CLASS, "formatter", name)?;
            let mut args = Arguments::new(class, without(spec, &["class"]));
            let formatter = registry.formatter(class, &mut args)?;
            args.finish()?;
            formatters.insert(name.to_string(), Arc::new(formatter));
        }

        let mut filters: HashMap<String, Arc<dyn Filter>> = HashMap::new();
        for (name, spec) in entries(&config.filters, "filter")? {
            let class = class_of(spec, FILTER_CLASS, "filter", name)?;
            let mut args = Arguments::new(class, without(spec, &["class"]));
            let filter = registry.filter(class, &mut args)?;
            args.finish()?;
            filters.insert(name.to_string(), filter);
        }

        let mut handlers = HashMap::new();
        for (name, spec) in entries(&config.handlers, "handler")? {
            let owner = format!("handler '{name}'");
            let class = spec
                .get("class")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    LogError::config(format!("Unable to configure {owner}: missing 'class'"))
                })?;

            let level = match spec.get("level") {
                None | Some(Value::Null) => Level::NotSet,
                Some(level) => Level::from_value_spec(level)?,
            };
            let formatter = match spec.get("formatter") {
                None | Some(Value::Null) => Arc::new(Formatter::default()),
                Some(Value::String(formatter)) => {
                    Arc::clone(resolve(&formatters, &owner, "formatter", formatter)?)
                }
                Some(other) => {
                    return Err(LogError::config(format!(
                        "Unable to configure {owner}: 'formatter' must be a name, got {other}"
                    )));
                }
            };
            let handler_filters = resolve_list(spec.get("filters"), &filters, &owner, "filter")?;

            let reserved = ["class", "level", "formatter", "filters"];
            let mut args = Arguments::new(class, without(spec, &reserved));
            let sink = registry.sink(class, &mut args)?;
            args.finish()?;

            handlers.insert(
                name.to_string(),
                Arc::new(Handler::new(name, level, formatter, handler_filters, sink)),
            );
        }

        let mut loggers = HashMap::new();
        for (name, spec) in entries(&config.loggers, "logger")? {
            let node = logger_node(spec, &format!("logger '{name}'"), &handlers, &filters, None)?;
            loggers.insert(name.to_string(), node);
        }

        let root = match &config.root {
            Some(spec) => logger_node(
                spec,
                "root logger",
                &handlers,
                &filters,
                Some(ROOT_DEFAULT_LEVEL),
            )?,
            None => LoggerNode::root(),
        };

        Ok(Self {
            formatters,
            handlers,
            loggers,
            root,
        })
    }

    /// Handler configured under `name`
    pub fn handler(&self, name: &str) -> Option<&Arc<Handler>> {
        self.handlers.get(name)
    }

    /// Formatter configured under `name`
    pub fn formatter(&self, name: &str) -> Option<&Arc<Formatter>> {
        self.formatters.get(name)
    }

    /// Whether a logger named `name` is configured
    pub fn has_logger(&self, name: &str) -> bool {
        self.loggers.contains_key(name)
    }

    fn node(&self, name: &str) -> Option<&LoggerNode> {
        if name == ROOT_LOGGER_NAME {
            Some(&self.root)
        } else {
            self.loggers.get(name)
        }
    }

    /// Configured ancestors of `name`, nearest first, ending with root
    fn chain<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LoggerNode> + 'a {
        let own = (name != ROOT_LOGGER_NAME)
            .then(|| self.loggers.get(name))
            .flatten();
        let parents = std::iter::successors(parent(name), |n| parent(*n))
            .filter_map(|n| self.loggers.get(n));
        own.into_iter().chain(parents).chain(std::iter::once(&self.root))
    }

    /// Level a record must reach to be handled by `name`
    pub fn effective_level(&self, name: &str) -> Level {
        self.chain(name)
            .find_map(|node| node.level)
            .unwrap_or(Level::NotSet)
    }

    /// Whether a record of `level` from `name` would be processed
    pub fn is_enabled_for(&self, name: &str, level: Level) -> bool {
        level >= self.effective_level(name)
    }

    /// Route `record` through its logger and ancestors
    pub fn dispatch(&self, record: &Record) {
        if !self.is_enabled_for(&record.name, record.level) {
            return;
        }
        if let Some(node) = self.node(&record.name)
            && !node.filters.iter().all(|f| f.filter(record))
        {
            return;
        }

        let mut found = 0usize;
        for node in self.chain(&record.name) {
            for handler in &node.handlers {
                found += 1;
                handler.handle(record);
            }
            if !node.propagate {
                break;
            }
        }

        if found == 0 && record.level >= Level::Warning {
            let line = LAST_RESORT.format(record);
            eprintln!("{line}");
        }
    }

    /// Flush every handler
    pub fn flush(&self) {
        for handler in self.handlers.values() {
            handler.flush();
        }
    }
}

fn parent(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(parent, _)| parent)
}

/// Entries of a section; `null` entries are skipped
fn entries<'a>(
    section: &'a serde_json::Map<String, Value>,
    kind: &'static str,
) -> LogResult<Vec<(&'a str, &'a Spec)>> {
    let mut out = Vec::with_capacity(section.len());
    for (name, spec) in section {
        match spec {
            Value::Null => {}
            Value::Object(spec) => out.push((name.as_str(), spec)),
            other => {
                return Err(LogError::config(format!(
                    "Unable to configure {kind} '{name}': expected a mapping, got {other}"
                )));
            }
        }
    }
    Ok(out)
}

fn class_of<'a>(spec: &'a Spec, default: &'a str, kind: &str, name: &str) -> LogResult<&'a str> {
    match spec.get("class") {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(class)) => Ok(class),
        Some(other) => Err(LogError::config(format!(
            "Unable to configure {kind} '{name}': 'class' must be a string, got {other}"
        ))),
    }
}

fn without(spec: &Spec, reserved: &[&str]) -> Spec {
    spec.iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn resolve<'a, T>(
    available: &'a HashMap<String, T>,
    owner: &str,
    kind: &'static str,
    name: &str,
) -> LogResult<&'a T> {
    available.get(name).ok_or_else(|| LogError::UnresolvedReference {
        owner: owner.to_string(),
        kind,
        name: name.to_string(),
    })
}

fn resolve_list<T: Clone>(
    names: Option<&Value>,
    available: &HashMap<String, T>,
    owner: &str,
    kind: &'static str,
) -> LogResult<Vec<T>> {
    match names {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| match name {
                Value::String(name) => resolve(available, owner, kind, name).cloned(),
                other => Err(LogError::config(format!(
                    "Unable to configure {owner}: {kind} names must be strings, got {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(LogError::config(format!(
            "Unable to configure {owner}: {kind}s must be a list, got {other}"
        ))),
    }
}

fn logger_node(
    spec: &Spec,
    owner: &str,
    handlers: &HashMap<String, Arc<Handler>>,
    filters: &HashMap<String, Arc<dyn Filter>>,
    default_level: Option<Level>,
) -> LogResult<LoggerNode> {
    let mut args = Arguments::new(owner, without(spec, &["handlers", "filters"]));

    let level = match args.take("level") {
        None => default_level,
        Some(level) => match Level::from_value_spec(&level)? {
            Level::NotSet if default_level.is_none() => None,
            level => Some(level),
        },
    };
    let propagate = args.take_bool("propagate")?.unwrap_or(true);
    args.finish()?;

    Ok(LoggerNode {
        level,
        handlers: resolve_list(spec.get("handlers"), handlers, owner, "handler")?.into(),
        filters: resolve_list(spec.get("filters"), filters, owner, "filter")?,
        propagate,
    })
}
