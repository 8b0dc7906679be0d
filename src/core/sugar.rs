//! Format-string and key/value conveniences over [`Logger`]

use super::{
    error::Result,
    log_context::{FieldValue, LogContext},
    log_level::LogLevel,
    logger::Logger,
};
use std::fmt;
use std::panic::Location;

/// A [`Logger`] wrapper taking `format_args!` messages or loose key/value
/// pairs instead of prepared contexts.
///
/// ```
/// use rust_logger_config::prelude::*;
/// use rust_logger_config::sinks::BufferSink;
/// use std::sync::Arc;
///
/// let buffer = Arc::new(BufferSink::new());
/// let logger = Logger::new(JsonEncoder::new(), buffer.clone(), AtomicLevel::new());
/// let sugar = logger.sugar();
///
/// sugar.infof(format_args!("listening on port {}", 8080));
/// sugar.infow("request served", [("path", "/health"), ("method", "GET")]);
/// assert_eq!(buffer.lines().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct SugaredLogger {
    base: Logger,
}

impl SugaredLogger {
    pub(crate) fn new(base: Logger) -> Self {
        Self { base }
    }

    /// The underlying structured logger
    pub fn desugar(&self) -> Logger {
        self.base.clone()
    }

    /// A child logger that adds the pairs to every entry
    #[must_use]
    pub fn with<I, K, V>(&self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self::new(self.base.with(pairs.into_iter().collect()))
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.base.enabled(level)
    }

    pub fn sync(&self) -> Result<()> {
        self.base.sync()
    }

    #[track_caller]
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        let caller = Location::caller().into();
        // skip formatting when nothing will be written or raised
        if self.base.enabled(level) || level >= LogLevel::DPanic {
            self.base.log_at(level, args.to_string(), None, caller);
        }
    }

    #[track_caller]
    pub fn logw<I, K, V>(&self, level: LogLevel, message: impl Into<String>, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let context: LogContext = pairs.into_iter().collect();
        self.base
            .log_at(level, message.into(), Some(context), Location::caller().into());
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Debug, args);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Info, args);
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Warn, args);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Error, args);
    }

    #[track_caller]
    pub fn dpanicf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::DPanic, args);
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Panic, args);
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Fatal, args);
    }

    #[track_caller]
    pub fn debugw<I, K, V>(&self, message: impl Into<String>, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.logw(LogLevel::Debug, message, pairs);
    }

    #[track_caller]
    pub fn infow<I, K, V>(&self, message: impl Into<String>, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.logw(LogLevel::Info, message, pairs);
    }

    #[track_caller]
    pub fn warnw<I, K, V>(&self, message: impl Into<String>, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.logw(LogLevel::Warn, message, pairs);
    }

    #[track_caller]
    pub fn errorw<I, K, V>(&self, message: impl Into<String>, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.logw(LogLevel::Error, message, pairs);
    }
}
