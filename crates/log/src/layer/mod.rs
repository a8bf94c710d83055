//! tracing layer that routes events through the configured loggers
//!
//! Every event seen by the subscriber becomes a [`Record`]:
//! - the logger name is the `logger` field, or the target with `::` as `.`
//! - the level is the `levelno` field, or the event level
//! - the location is the `pathname`/`lineno` fields, or the callsite

mod visitor;

use tracing::{Event, Subscriber};
use tracing_subscriber::{
    layer::{Context, Layer},
    registry::LookupSpan,
};

pub use visitor::{EXC_TEXT_FIELD, LEVELNO_FIELD, LINENO_FIELD, LOGGER_FIELD, PATHNAME_FIELD};
use visitor::RecordVisitor;

use crate::config::Level;
use crate::record::Record;
use crate::runtime::Runtime;

/// Targets of this crate's own diagnostics; never routed
const INTERNAL_TARGET: &str = "vlogging::";

/// Layer feeding events into a [`Runtime`]
#[derive(Debug, Clone)]
pub struct DispatchLayer {
    runtime: Runtime,
}

impl DispatchLayer {
    /// Layer routing through `runtime`
    pub fn new(runtime: Runtime) -> Self {
        Self { runtime }
    }
}

/// Logger name for an event without an explicit `logger` field
pub fn logger_name_for_target(target: &str) -> String {
    target.replace("::", ".")
}

impl<S> Layer<S> for DispatchLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        #[cfg(feature = "log-compat")]
        let normalized = tracing_log::NormalizeEvent::normalized_metadata(event);
        #[cfg(feature = "log-compat")]
        let meta = normalized.as_ref().unwrap_or_else(|| event.metadata());
        #[cfg(not(feature = "log-compat"))]
        let meta = event.metadata();

        if meta.target().starts_with(INTERNAL_TARGET) {
            return;
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let name = visitor
            .logger
            .take()
            .unwrap_or_else(|| logger_name_for_target(meta.target()));
        let level = visitor
            .levelno
            .and_then(Level::from_value)
            .unwrap_or_else(|| Level::from_tracing(meta.level()));

        let table = self.runtime.table();
        if !table.is_enabled_for(&name, level) {
            return;
        }

        let pathname = visitor.pathname.take().or_else(|| meta.file().map(str::to_string));
        let lineno = visitor.lineno.take().or_else(|| meta.line());
        let exc_text = visitor.exc_text.take();

        let mut record = Record::new(name, level, visitor.into_message());
        record.target = meta.target().to_string();
        record.pathname = pathname;
        record.lineno = lineno;
        record.exc_text = exc_text;
        record.func_name = ctx.event_span(event).map(|span| span.name().to_string());

        table.dispatch(&record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::registry::ClassRegistry;
    use crate::sink::MemorySink;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;

    fn setup(format: &str) -> (Runtime, MemorySink) {
        let memory = MemorySink::new();
        let mut registry = ClassRegistry::default();
        let shared = memory.clone();
        registry.register_sink("test.Memory", move |_| Ok(Box::new(shared.clone())));

        let mut config = Configuration::default();
        config.formatters.insert("f".into(), json!({"format": format}));
        config
            .handlers
            .insert("mem".into(), json!({"class": "test.Memory", "formatter": "f"}));
        config.root = json!({"level": "DEBUG", "handlers": ["mem"]}).as_object().cloned();

        let runtime = Runtime::new();
        runtime.apply(&config, &registry).unwrap();
        (runtime, memory)
    }

    fn capture(runtime: &Runtime, f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(DispatchLayer::new(runtime.clone()));
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_target_becomes_logger_name() {
        let (runtime, memory) = setup("%(name)s|%(levelname)s|%(message)s");
        capture(&runtime, || {
            tracing::info!(target: "app::db", "connected");
            tracing::warn!(target: "app::db", "slow");
            tracing::trace!(target: "app::db", "dropped by root level");
        });
        assert_eq!(memory.lines(), vec!["app.db|INFO|connected", "app.db|WARNING|slow"]);
    }

    #[test]
    fn test_explicit_fields() {
        let (runtime, memory) = setup("%(name)s|%(levelno)d|%(filename)s:%(lineno)d|%(message)s");
        capture(&runtime, || {
            tracing::error!(
                target: "app",
                logger = "billing",
                levelno = 50u64,
                pathname = "src/pay.rs",
                lineno = 7u64,
                "card declined"
            );
        });
        assert_eq!(memory.lines(), vec!["billing|50|pay.rs:7|card declined"]);
    }

    #[test]
    fn test_extra_fields_and_exc_text() {
        let (runtime, memory) = setup("%(message)s");
        capture(&runtime, || {
            tracing::warn!(
                target: "app::auth",
                user = "ana",
                attempts = 3u64,
                exc_text = "Error: locked",
                "login failed"
            );
        });
        assert_eq!(
            memory.lines(),
            vec!["login failed user=\"ana\" attempts=3\nError: locked"]
        );
    }

    #[test]
    fn test_span_name_is_func_name() {
        let (runtime, memory) = setup("%(funcName)s: %(message)s");
        capture(&runtime, || {
            let span = tracing::info_span!("checkout");
            let _guard = span.enter();
            tracing::info!(target: "app", "inside");
        });
        assert_eq!(memory.lines(), vec!["checkout: inside"]);
    }

    #[test]
    fn test_internal_targets_are_skipped() {
        let (runtime, memory) = setup("%(message)s");
        capture(&runtime, || {
            tracing::warn!(target: "vlogging::context", "internal");
            tracing::warn!(target: "vlogging", "facade");
        });
        assert_eq!(memory.lines(), vec!["facade"]);
    }
}
