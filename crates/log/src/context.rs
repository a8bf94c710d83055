//! The configuration context
//!
//! [`Config`] owns the live configuration, the class registry and the
//! runtime that serves it. Every `configure` merges into the live
//! configuration and re-applies the result; the live configuration only
//! changes when the runtime accepted the new one.

use std::sync::LazyLock;

use parking_lot::{Mutex, const_mutex};
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::defaults::{DEFAULT_LOGGER_NAME, default_configuration, default_spec};
use crate::config::merge::{self, validate_shape};
use crate::config::{Category, Configuration, Section, presets};
use crate::core::{LogError, LogResult};
use crate::layer::DispatchLayer;
use crate::logger::Logger;
use crate::record;
use crate::registry::ClassRegistry;
use crate::runtime::Runtime;

static GLOBAL: LazyLock<Config> = LazyLock::new(|| {
    let config = Config::new();
    if let Err(e) = config.configure(None) {
        tracing::debug!(target: "vlogging::context", error = %e, "default configuration rejected");
    }
    config
});
static INSTALLED: Mutex<bool> = const_mutex(false);

struct State {
    live: Configuration,
    registry: ClassRegistry,
}

/// Logging configuration context
pub struct Config {
    state: Mutex<State>,
    runtime: Runtime,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Config")
            .field("live", &state.live)
            .field("registry", &state.registry)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Context holding the default registry, not yet applied
    pub fn new() -> Self {
        Self::with_registry(ClassRegistry::default())
    }

    /// Context resolving `class` tags through `registry`
    pub fn with_registry(registry: ClassRegistry) -> Self {
        record::mark_start();
        Self {
            state: Mutex::new(State {
                live: default_configuration(),
                registry,
            }),
            runtime: Runtime::new(),
        }
    }

    /// Context configured from `VLOGGING_CONFIG` and `VLOGGING_LEVEL`
    pub fn from_env() -> LogResult<Self> {
        let config = Self::new();
        config.configure(presets::from_env()?.as_ref())?;
        Ok(config)
    }

    /// The process-wide context used by [`crate::get_logger`] and the
    /// module-level functions
    pub fn global() -> &'static Config {
        &GLOBAL
    }

    /// Install the process-wide context as the global tracing subscriber.
    ///
    /// Returns `true` once installed. Scoped subscribers do not count; when
    /// another global subscriber already exists this returns `false` and can
    /// be retried later. Add [`Config::layer`] to that subscriber instead.
    pub fn install_global() -> bool {
        let mut installed = INSTALLED.lock();
        if *installed {
            return true;
        }
        let subscriber = tracing_subscriber::registry().with(GLOBAL.layer());
        *installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        #[cfg(feature = "log-compat")]
        if *installed && let Err(e) = tracing_log::LogTracer::init() {
            tracing::debug!(target: "vlogging::context", error = %e, "log bridge not installed");
        }
        tracing::debug!(target: "vlogging::context", installed = *installed, "global subscriber");
        *installed
    }

    /// Layer routing events through this context
    pub fn layer(&self) -> DispatchLayer {
        DispatchLayer::new(self.runtime.clone())
    }

    /// Runtime serving this context
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Register a handler class on this context.
    ///
    /// Takes effect on the next `configure`.
    pub fn register_sink<F>(&self, class: impl Into<String>, factory: F)
    where
        F: Fn(&mut crate::sink::Arguments) -> LogResult<Box<dyn crate::sink::Sink>>
            + Send
            + Sync
            + 'static,
    {
        self.state.lock().registry.register_sink(class, factory);
    }

    /// Merge one category of `cfg` over its default entry
    pub fn configure_items(cfg: Option<&Value>, key: &str, default_name: Option<&str>) -> Section {
        merge::configure_items(cfg, key, default_name)
    }

    /// Merge `user` into the live configuration and apply the result.
    ///
    /// `None` re-applies the live configuration. On error nothing changes.
    pub fn configure(&self, user: Option<&Value>) -> LogResult<()> {
        if let Some(user) = user {
            validate_shape(user)?;
        }
        let mut state = self.state.lock();
        self.apply(&mut state, user)
    }

    fn apply(&self, state: &mut State, user: Option<&Value>) -> LogResult<()> {
        let merged = merge::merge(&state.live, user);
        self.runtime.apply(&merged, &state.registry)?;
        tracing::debug!(
            target: "vlogging::context",
            formatters = merged.formatters.len(),
            handlers = merged.handlers.len(),
            loggers = merged.loggers.len(),
            "configuration applied"
        );
        state.live = merged;
        Ok(())
    }

    /// Make sure a logger named `name` is configured.
    ///
    /// A missing logger gets a copy of the default logger spec and the
    /// configuration is re-applied. `None` does nothing.
    pub fn prepare(&self, name: Option<&str>) -> LogResult<()> {
        let Some(name) = name else {
            return Ok(());
        };
        let mut state = self.state.lock();
        if state.live.loggers.contains_key(name) {
            return Ok(());
        }

        let spec = state
            .live
            .spec(Category::Loggers, DEFAULT_LOGGER_NAME)
            .cloned()
            .or_else(|| default_spec(Category::Loggers.key(), DEFAULT_LOGGER_NAME))
            .ok_or_else(|| LogError::config("default logger spec is missing"))?;

        let previous = state.live.clone();
        state.live.loggers.insert(name.to_string(), Value::Object(spec));
        if let Err(e) = self.apply(&mut state, None) {
            state.live = previous;
            return Err(e);
        }
        tracing::debug!(target: "vlogging::context", logger = name, "logger prepared");
        Ok(())
    }

    /// Drop back to the default registry and apply it
    pub fn reset(&self) -> LogResult<()> {
        let mut state = self.state.lock();
        let defaults = default_configuration();
        self.runtime.apply(&defaults, &state.registry)?;
        state.live = defaults;
        tracing::debug!(target: "vlogging::context", "configuration reset");
        Ok(())
    }

    /// Snapshot of the live configuration
    pub fn configuration(&self) -> Configuration {
        self.state.lock().live.clone()
    }

    /// Live configuration in dictionary form
    pub fn dictionary(&self) -> Value {
        self.state.lock().live.to_dictionary()
    }

    /// Handle for the logger `name`, or root for `None`.
    ///
    /// Nothing is configured by this call; see [`crate::get_logger`].
    pub fn logger(&self, name: Option<&str>) -> Logger {
        Logger::new(name, self.runtime.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;
    use crate::config::defaults::{
        DEFAULT_FORMATTER_NAME, DEFAULT_HANDLER_NAME, ROOT_LOGGER_NAME,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_configure_none_applies_defaults() {
        let config = Config::new();
        config.configure(None).unwrap();
        let live = config.configuration();
        assert_eq!(live, default_configuration());
        assert_eq!(config.runtime().effective_level(DEFAULT_LOGGER_NAME), Level::Debug);
    }

    #[test]
    fn test_null_default_then_reconfigure() {
        let config = Config::new();
        config
            .configure(Some(&json!({"handlers": {DEFAULT_HANDLER_NAME: null}})))
            .unwrap();
        config.configure(None).unwrap();
        assert_eq!(
            config.configuration().spec(Category::Handlers, DEFAULT_HANDLER_NAME).cloned(),
            default_spec("handlers", DEFAULT_HANDLER_NAME)
        );
    }

    #[test]
    fn test_configure_is_cumulative() {
        let config = Config::new();
        config
            .configure(Some(&json!({"loggers": {"app": {"level": "INFO"}}})))
            .unwrap();
        config
            .configure(Some(&json!({"loggers": {"db": {"level": "ERROR"}}})))
            .unwrap();
        let live = config.configuration();
        assert!(live.loggers.contains_key("app"));
        assert!(live.loggers.contains_key("db"));
        assert!(live.loggers.contains_key(DEFAULT_LOGGER_NAME));
    }

    #[test]
    fn test_failed_configure_changes_nothing() {
        let config = Config::new();
        config.configure(None).unwrap();
        let before = config.configuration();

        let err = config
            .configure(Some(&json!({"loggers": {"app": {"handlers": ["missing"]}}})))
            .unwrap_err();
        assert!(matches!(err, LogError::UnresolvedReference { .. }));
        assert_eq!(config.configuration(), before);

        let err = config.configure(Some(&json!(["not", "a", "mapping"]))).unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
    }

    #[test]
    fn test_prepare_clones_default_logger() {
        let config = Config::new();
        config.prepare(None).unwrap();
        config.prepare(Some("custom")).unwrap();
        let live = config.configuration();
        assert_eq!(
            live.spec(Category::Loggers, "custom"),
            live.spec(Category::Loggers, DEFAULT_LOGGER_NAME)
        );
        assert_eq!(config.runtime().effective_level("custom"), Level::Debug);
    }

    #[test]
    fn test_prepare_keeps_existing_logger() {
        let config = Config::new();
        config
            .configure(Some(&json!({"loggers": {"custom": {"level": "ERROR"}}})))
            .unwrap();
        config.prepare(Some("custom")).unwrap();
        assert_eq!(
            config.configuration().loggers["custom"],
            json!({"level": "ERROR"})
        );
    }

    #[test]
    fn test_reset() {
        let config = Config::new();
        config
            .configure(Some(&json!({
                "formatters": {DEFAULT_FORMATTER_NAME: {"format": "%(message)s"}},
                "loggers": {"app": {"level": "INFO"}},
                "root": {"level": "ERROR"},
            })))
            .unwrap();
        config.reset().unwrap();
        assert_eq!(config.configuration(), default_configuration());
        assert_eq!(config.runtime().effective_level(ROOT_LOGGER_NAME), Level::Warning);
    }

    #[test]
    fn test_dictionary_round_trip() {
        let config = Config::new();
        config
            .configure(Some(&json!({"loggers": {"app": {"level": "INFO"}}})))
            .unwrap();
        let dictionary = config.dictionary();
        assert_eq!(dictionary["version"], json!(1));

        let other = Config::new();
        other.configure(Some(&dictionary)).unwrap();
        assert_eq!(other.configuration(), config.configuration());
    }

    #[test]
    fn test_root_replaced_and_cleared() {
        let config = Config::new();
        config.configure(Some(&json!({"root": {"level": "INFO"}}))).unwrap();
        config.configure(Some(&json!({"loggers": {}}))).unwrap();
        assert_eq!(config.configuration().root, json!({"level": "INFO"}).as_object().cloned());

        config.configure(Some(&json!({"root": null}))).unwrap();
        assert_eq!(config.configuration().root, None);
    }
}
