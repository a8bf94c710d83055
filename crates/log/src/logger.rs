//! Logger handles

use std::error::Error;
use std::fmt::{self, Display, Write};
use std::panic::Location;

use crate::config::Level;
use crate::config::defaults::ROOT_LOGGER_NAME;
use crate::runtime::Runtime;

/// Named handle emitting records through a [`Runtime`]
///
/// Records are emitted as tracing events carrying the logger name, so the
/// subscriber in scope must include the matching [`Config::layer`].
///
/// [`Config::layer`]: crate::Config::layer
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    runtime: Runtime,
}

impl Logger {
    pub(crate) fn new(name: Option<&str>, runtime: Runtime) -> Self {
        Self {
            name: name.unwrap_or(ROOT_LOGGER_NAME).to_string(),
            runtime,
        }
    }

    /// Logger name; `root` for the root logger
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level a record must reach to be handled
    pub fn effective_level(&self) -> Level {
        self.runtime.effective_level(&self.name)
    }

    /// Whether a record at `level` would be handled
    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.effective_level()
    }

    /// Log `message` at `level`
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Display) {
        self.emit(level, &message, None);
    }

    /// Log at `CRITICAL`
    #[track_caller]
    pub fn critical(&self, message: impl Display) {
        self.emit(Level::Critical, &message, None);
    }

    /// Deprecated alias of [`Logger::critical`]
    #[deprecated(note = "use `critical`")]
    #[track_caller]
    pub fn fatal(&self, message: impl Display) {
        self.emit(Level::Critical, &message, None);
    }

    /// Log at `ERROR`
    #[track_caller]
    pub fn error(&self, message: impl Display) {
        self.emit(Level::Error, &message, None);
    }

    /// Log at `WARNING`
    #[track_caller]
    pub fn warning(&self, message: impl Display) {
        self.emit(Level::Warning, &message, None);
    }

    /// Log at `INFO`
    #[track_caller]
    pub fn info(&self, message: impl Display) {
        self.emit(Level::Info, &message, None);
    }

    /// Log at `DEBUG`
    #[track_caller]
    pub fn debug(&self, message: impl Display) {
        self.emit(Level::Debug, &message, None);
    }

    /// Log at `ERROR` with the error and its sources as exception text
    #[track_caller]
    pub fn exception<E: Error + ?Sized>(&self, message: impl Display, error: &E) {
        if self.is_enabled_for(Level::Error) {
            self.emit(Level::Error, &message, Some(error_chain(error).as_str()));
        }
    }

    /// Flush every handler of the runtime
    pub fn flush(&self) {
        self.runtime.flush();
    }

    #[track_caller]
    fn emit(&self, level: Level, message: &dyn Display, exc_text: Option<&str>) {
        if !self.is_enabled_for(level) {
            return;
        }
        let caller = Location::caller();
        emit_at!(
            level,
            logger = self.name.as_str(),
            levelno = u64::from(level.value()),
            pathname = caller.file(),
            lineno = u64::from(caller.line()),
            exc_text,
            "{message}"
        );
    }
}

/// `Error: ...` followed by one `Caused by: ...` line per source
pub fn error_chain<E: Error + ?Sized>(error: &E) -> String {
    let mut out = format!("Error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(out, "\nCaused by: {cause}");
        source = cause.source();
    }
    out
}

impl fmt::Display for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Logger {} ({})>", self.name, self.effective_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Config;
    use crate::sink::MemorySink;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io;
    use tracing_subscriber::layer::SubscriberExt;

    fn configured(level: &str) -> (Config, MemorySink) {
        let memory = MemorySink::new();
        let config = Config::new();
        let shared = memory.clone();
        config.register_sink("test.Memory", move |_| Ok(Box::new(shared.clone())));
        config
            .configure(Some(&json!({
                "formatters": {"f": {"format": "%(name)s %(levelname)s %(filename)s %(message)s"}},
                "handlers": {"mem": {"class": "test.Memory", "formatter": "f"}},
                "loggers": {"svc": {"level": level, "handlers": ["mem"], "propagate": false}},
            })))
            .unwrap();
        (config, memory)
    }

    fn with_layer(config: &Config, f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(config.layer());
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_root_handle_name() {
        let config = Config::new();
        assert_eq!(config.logger(None).name(), "root");
        assert_eq!(config.logger(Some("a.b")).name(), "a.b");
    }

    #[test]
    fn test_levels_and_caller() {
        let (config, memory) = configured("INFO");
        let logger = config.logger(Some("svc"));
        with_layer(&config, || {
            logger.debug("hidden");
            logger.info("shown");
            logger.log(Level::Warning, format_args!("{} left", 3));
            logger.critical("down");
        });
        assert_eq!(
            memory.lines(),
            vec![
                "svc INFO logger.rs shown",
                "svc WARNING logger.rs 3 left",
                "svc CRITICAL logger.rs down",
            ]
        );
    }

    #[test]
    #[allow(deprecated)]
    fn test_fatal_is_critical() {
        let (config, memory) = configured("DEBUG");
        let logger = config.logger(Some("svc"));
        with_layer(&config, || logger.fatal("gone"));
        assert_eq!(memory.lines(), vec!["svc CRITICAL logger.rs gone"]);
    }

    #[test]
    fn test_exception_text() {
        #[derive(Debug)]
        struct Outer(io::Error);

        impl Display for Outer {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("request failed")
            }
        }

        impl Error for Outer {
            fn source(&self) -> Option<&(dyn Error + 'static)> {
                Some(&self.0)
            }
        }

        let (config, memory) = configured("DEBUG");
        let logger = config.logger(Some("svc"));
        let error = Outer(io::Error::other("connection reset"));
        with_layer(&config, || logger.exception("retrying", &error));
        assert_eq!(
            memory.lines(),
            vec!["svc ERROR logger.rs retrying\nError: request failed\nCaused by: connection reset"]
        );
    }

    #[test]
    fn test_effective_level() {
        let (config, _) = configured("ERROR");
        let logger = config.logger(Some("svc.child"));
        assert_eq!(logger.effective_level(), Level::Error);
        assert!(!logger.is_enabled_for(Level::Warning));
        assert_eq!(logger.to_string(), "<Logger svc.child (ERROR)>");
    }
}
