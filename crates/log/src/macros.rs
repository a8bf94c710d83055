//! Convenience macros

/// Emit a tracing event at a runtime [`Level`](crate::Level).
///
/// tracing fixes the level of a callsite at compile time, so every level
/// gets its own callsite.
macro_rules! emit_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            $crate::Level::Critical | $crate::Level::Error => {
                tracing::error!(target: "vlogging", $($rest)+)
            }
            $crate::Level::Warning => tracing::warn!(target: "vlogging", $($rest)+),
            $crate::Level::Info => tracing::info!(target: "vlogging", $($rest)+),
            $crate::Level::Debug => tracing::debug!(target: "vlogging", $($rest)+),
            $crate::Level::Trace | $crate::Level::NotSet => {
                tracing::trace!(target: "vlogging", $($rest)+)
            }
        }
    };
}

/// Log an error through the module logger, with its source chain, and
/// return it
///
/// ```rust,ignore
/// let err = vlogging::log_error!(parse(input).unwrap_err(), "bad input {input}");
/// ```
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        $crate::exception(&e, &e);
        e
    }};
    ($err:expr, $($arg:tt)+) => {{
        let e = $err;
        $crate::exception(format_args!($($arg)+), &e);
        e
    }};
}
