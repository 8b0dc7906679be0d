//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. The message is
//! only formatted when the entry will be written or the level terminates.
//!
//! # Examples
//!
//! ```
//! use rust_logger_config::prelude::*;
//! use rust_logger_config::info;
//! use rust_logger_config::sinks::BufferSink;
//! use std::sync::Arc;
//!
//! let buffer = Arc::new(BufferSink::new());
//! let logger = Logger::new(JsonEncoder::new(), buffer.clone(), AtomicLevel::new());
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert_eq!(buffer.lines().len(), 2);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::new(JsonEncoder::new(), std::sync::Arc::new(rust_logger_config::sinks::BufferSink::new()), AtomicLevel::new());
/// use rust_logger_config::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level: $crate::LogLevel = $level;
        if logger.enabled(level) || level >= $crate::LogLevel::DPanic {
            logger.log(level, format!($($arg)+));
        }
    }};
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::new(JsonEncoder::new(), std::sync::Arc::new(rust_logger_config::sinks::BufferSink::new()), AtomicLevel::at(LogLevel::Debug));
/// use rust_logger_config::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::new(JsonEncoder::new(), std::sync::Arc::new(rust_logger_config::sinks::BufferSink::new()), AtomicLevel::new());
/// use rust_logger_config::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log at `DPanic`; panics when the logger is in development mode.
#[macro_export]
macro_rules! dpanic {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::DPanic, $($arg)+)
    };
}

/// Log a fatal-level message, then exit the process.
///
/// # Examples
///
/// ```no_run
/// # use rust_logger_config::prelude::*;
/// # let logger = Logger::new(JsonEncoder::new(), std::sync::Arc::new(rust_logger_config::sinks::BufferSink::new()), AtomicLevel::new());
/// use rust_logger_config::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{AtomicLevel, LogLevel, Logger, LoggerOption};
    use crate::encoders::JsonEncoder;
    use crate::sinks::BufferSink;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    fn logger_at(level: LogLevel) -> (Logger, Arc<BufferSink>) {
        let buffer = Arc::new(BufferSink::new());
        let logger = Logger::new(JsonEncoder::new(), buffer.clone(), AtomicLevel::at(level));
        (logger, buffer)
    }

    #[test]
    fn test_log_macro() {
        let (logger, buffer) = logger_at(LogLevel::Info);
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Formatted: 42"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, buffer) = logger_at(LogLevel::Debug);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        dpanic!(logger, "Unexpected state");

        let levels: Vec<String> = buffer
            .lines()
            .iter()
            .map(|line| {
                let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
                parsed["level"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(levels, ["debug", "info", "warn", "error", "dpanic"]);
    }

    #[test]
    fn test_disabled_level_is_skipped() {
        let (logger, buffer) = logger_at(LogLevel::Error);
        info!(logger, "Hidden {}", "value");
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_dpanic_macro_in_development() {
        let (logger, _) = logger_at(LogLevel::Error);
        let logger = logger.with_options([LoggerOption::Development]);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            dpanic!(logger, "Invariant broken: {}", 1);
        }));
        assert!(result.is_err());
    }
}
