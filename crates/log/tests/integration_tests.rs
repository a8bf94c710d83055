//! Integration tests for vlogging
//!
//! These tests drive the public API end to end: dictionaries in, formatted
//! lines out.


use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tracing_subscriber::layer::SubscriberExt;
use vlogging::sink::MemorySink;
use vlogging::{
    BasicConfig, Category, Config, DEFAULT_FORMATTER_NAME, DEFAULT_HANDLER_NAME,
    DEFAULT_LOGGER_NAME, Level, LogError, MICROSECONDS_DATEFMT, Spec, Style, file_handler_config,
    formatter_config, logger_config,
};

// Serialization lock for tests using the process-wide context
static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

const MEMORY_CLASS: &str = "test.Memory";

fn memory_config() -> (Config, MemorySink) {
    let memory = MemorySink::new();
    let config = Config::new();
    let shared = memory.clone();
    config.register_sink(MEMORY_CLASS, move |_| Ok(Box::new(shared.clone())));
    (config, memory)
}

fn scoped(config: &Config, f: impl FnOnce()) {
    let subscriber = tracing_subscriber::registry().with(config.layer());
    tracing::subscriber::with_default(subscriber, f);
}

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_configure_items_seeds_only_the_default() {
    for category in Category::ALL {
        let section = Config::configure_items(None, category.key(), category.default_name());
        match category.default_name() {
            Some(name) => {
                assert_eq!(section.len(), 1, "{category:?}");
                assert!(section[name].is_object());
            }
            None => assert!(section.is_empty()),
        }
    }
}

#[test]
fn test_user_entries_sit_next_to_defaults() {
    let user = json!({"loggers": {"app": {"level": "INFO"}}});
    let section = Config::configure_items(Some(&user), "loggers", Some(DEFAULT_LOGGER_NAME));
    let names: Vec<&str> = section.keys().map(String::as_str).collect();
    assert_eq!(names, vec![DEFAULT_LOGGER_NAME, "app"]);
}

#[test]
fn test_file_handler_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let config = Config::new();
    config
        .configure(Some(&json!({
            "formatters": {
                "plain": formatter_config("%(levelname)s %(name)s: %(message)s", None, Style::Percent, None, Spec::new()),
            },
            "handlers": {
                "file": file_handler_config(path.to_str().unwrap(), Some("w"), None, Some(Level::Info), Some("plain"), Spec::new()),
            },
            "loggers": {
                "app": logger_config(Some(Level::Debug), Some(&["file"][..]), Some(false), None),
            },
        })))
        .unwrap();

    let logger = config.logger(Some("app.db"));
    scoped(&config, || {
        logger.debug("below the handler level");
        logger.info("connected");
        tracing::error!(target: "app::db", "lost connection");
        tracing::error!(target: "other", "not for this file");
    });
    config.runtime().flush();

    assert_eq!(read(&path), "INFO app.db: connected\nERROR app.db: lost connection\n");
}

#[test]
fn test_microsecond_timestamps() {
    let (config, memory) = memory_config();
    config
        .configure(Some(&json!({
            "formatters": {"us": vlogging::microseconds_formatter_config(Some("%(asctime)s|%(message)s"), Style::Percent)},
            "handlers": {"mem": {"class": MEMORY_CLASS, "formatter": "us"}},
            "loggers": {"svc": {"level": "DEBUG", "handlers": ["mem"], "propagate": false}},
        })))
        .unwrap();

    scoped(&config, || config.logger(Some("svc")).info("tick"));

    let lines = memory.lines();
    assert_eq!(lines.len(), 1);
    let (stamp, message) = lines[0].split_once('|').unwrap();
    assert_eq!(message, "tick");
    // YYYY-MM-DD HH:MM:SS.ffffff
    assert_eq!(stamp.len(), 26, "{stamp}");
    assert_eq!(&stamp[19..20], ".");
    assert!(stamp[20..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(config.configuration().formatters["us"]["datefmt"], json!(MICROSECONDS_DATEFMT));
}

#[test]
fn test_brace_style_and_filters() {
    let (config, memory) = memory_config();
    config
        .configure(Some(&json!({
            "formatters": {"brace": {"format": "[{levelname:^9}] {name}: {message}", "style": "{"}},
            "filters": {"db_only": {"name": "app.db"}},
            "handlers": {"mem": {"class": MEMORY_CLASS, "formatter": "brace", "filters": ["db_only"]}},
            "root": {"level": "DEBUG", "handlers": ["mem"]},
        })))
        .unwrap();

    scoped(&config, || {
        tracing::info!(target: "app::db::pool", "checked out");
        tracing::info!(target: "app::web", "request");
    });
    assert_eq!(memory.lines(), vec!["[  INFO   ] app.db.pool: checked out"]);
}

#[test]
fn test_null_default_survives_reconfigure() {
    let config = Config::new();
    config
        .configure(Some(&json!({"handlers": {DEFAULT_HANDLER_NAME: null}})))
        .unwrap();
    config.configure(None).unwrap();

    let handlers = &config.dictionary()["handlers"];
    assert_eq!(
        handlers[DEFAULT_HANDLER_NAME],
        Value::Object(vlogging::console_handler_config(
            Some(Level::Debug),
            Some(DEFAULT_FORMATTER_NAME),
            None,
        ))
    );
}

#[test]
fn test_null_non_default_disables_entry() {
    let (config, memory) = memory_config();
    config
        .configure(Some(&json!({
            "handlers": {"mem": {"class": MEMORY_CLASS}},
            "loggers": {"svc": {"level": "INFO", "handlers": ["mem"], "propagate": false}},
        })))
        .unwrap();
    config.configure(Some(&json!({"loggers": {"svc": null}}))).unwrap();

    assert!(config.configuration().loggers["svc"].is_null());
    assert_eq!(config.runtime().effective_level("svc"), Level::Warning);

    scoped(&config, || config.logger(Some("svc")).info("nobody listens"));
    assert!(memory.lines().is_empty());
}

#[test]
fn test_bad_configuration_is_rejected_whole() {
    let (config, memory) = memory_config();
    config
        .configure(Some(&json!({
            "handlers": {"mem": {"class": MEMORY_CLASS}},
            "root": {"level": "INFO", "handlers": ["mem"]},
        })))
        .unwrap();

    let err = config
        .configure(Some(&json!({
            "formatters": {"broken": {"format": "%(nope)s"}},
            "root": {"level": "DEBUG", "handlers": ["mem"]},
        })))
        .unwrap_err();
    assert!(matches!(err, LogError::Format { .. }), "{err}");
    assert_eq!(config.runtime().effective_level("x"), Level::Info);

    scoped(&config, || tracing::info!("still routed"));
    assert_eq!(memory.lines(), vec!["still routed"]);
}

#[test]
fn test_basic_config_on_a_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("basic.log");
    let config = Config::new();
    BasicConfig::new()
        .format("%(levelname)s:%(message)s")
        .filename(&path)
        .level(Level::Info)
        .apply(&config)
        .unwrap();

    let logger = config.logger(Some(DEFAULT_LOGGER_NAME));
    scoped(&config, || {
        logger.debug("skipped");
        logger.warning("written");
    });
    config.runtime().flush();
    assert_eq!(read(&path), "WARNING:written\n");
}

#[test]
fn test_get_logger_on_the_global_context() {
    let _guard = TEST_LOCK.lock();

    let root = vlogging::get_logger(None, None).unwrap();
    assert_eq!(root.name(), "root");

    let custom = vlogging::get_logger(Some("integration.custom"), None).unwrap();
    assert_eq!(custom.name(), "integration.custom");
    let live = Config::global().configuration();
    assert_eq!(
        live.spec(Category::Loggers, "integration.custom"),
        live.spec(Category::Loggers, DEFAULT_LOGGER_NAME)
    );
}

#[test]
fn test_module_functions_reach_configured_handlers() {
    let _guard = TEST_LOCK.lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("module.log");

    vlogging::get_logger(
        None,
        Some(&json!({
            "formatters": {"short": {"format": "%(name)s %(levelname)s %(message)s"}},
            "handlers": {"module_file": file_handler_config(path.to_str().unwrap(), None, None, None, Some("short"), Spec::new())},
            "loggers": {vlogging::MODULE_LOGGER_NAME: {"level": "INFO", "handlers": ["module_file"], "propagate": false}},
        })),
    )
    .unwrap();

    vlogging::debug("hidden");
    vlogging::info("hello");
    vlogging::log(Level::Warning, "careful");
    vlogging::exception("failed", &std::io::Error::other("disk full"));
    vlogging::critical("down");
    Config::global().runtime().flush();

    assert_eq!(
        read(&path),
        "vlogging INFO hello\n\
         vlogging WARNING careful\n\
         vlogging ERROR failed\nError: disk full\n\
         vlogging CRITICAL down\n"
    );

    vlogging::get_logger(None, Some(&json!({
        "handlers": {"module_file": null},
        "loggers": {vlogging::MODULE_LOGGER_NAME: null},
    })))
    .unwrap();
}

#[test]
fn test_presets_apply_cleanly() {
    let config = Config::new();
    config.configure(Some(&vlogging::config::presets::development())).unwrap();
    assert_eq!(config.runtime().effective_level("anything"), Level::Debug);
    assert_eq!(
        config.configuration().formatters[DEFAULT_FORMATTER_NAME]["format"],
        json!(vlogging::FILE_LINE_FORMAT)
    );

    config.configure(Some(&vlogging::config::presets::quiet())).unwrap();
    assert_eq!(config.runtime().effective_level(DEFAULT_LOGGER_NAME), Level::Warning);
    assert_eq!(config.runtime().effective_level("anything"), Level::Warning);
}

#[test]
fn test_log_error_returns_the_error() {
    let _guard = TEST_LOCK.lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("errors.log");

    vlogging::get_logger(
        None,
        Some(&json!({
            "formatters": {"bare": {"format": "%(levelname)s %(message)s"}},
            "handlers": {"errors_file": file_handler_config(path.to_str().unwrap(), None, None, None, Some("bare"), Spec::new())},
            "loggers": {vlogging::MODULE_LOGGER_NAME: {"level": "ERROR", "handlers": ["errors_file"], "propagate": false}},
        })),
    )
    .unwrap();

    let err = vlogging::log_error!(std::io::Error::other("no route"), "request {} failed", 7);
    assert_eq!(err.to_string(), "no route");
    Config::global().runtime().flush();
    assert_eq!(read(&path), "ERROR request 7 failed\nError: no route\n");

    vlogging::get_logger(None, Some(&json!({
        "handlers": {"errors_file": null},
        "loggers": {vlogging::MODULE_LOGGER_NAME: null},
    })))
    .unwrap();
}
