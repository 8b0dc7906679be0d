//! Main logger implementation
//!
//! A [`Logger`] pairs an [`Encoder`] with a sink and a shared
//! [`AtomicLevel`]. Loggers are immutable: [`Logger::with`] and
//! [`Logger::with_options`] return adjusted copies that share the same
//! encoder, sink and level.

use super::{
    atomic_level::AtomicLevel,
    error::Result,
    log_context::LogContext,
    log_entry::{Caller, LogEntry},
    log_level::LogLevel,
    sink::SharedSink,
    sugar::SugaredLogger,
};
use crate::encoders::{Encoder, EncoderKind};
use crate::sinks::StreamSink;
use chrono::Utc;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Frames from these paths belong to the logger, its `log` bridge or the
/// `log` crate itself and are cut from captured stack traces.
const INTERNAL_FRAMES: [&str; 4] = [
    concat!(env!("CARGO_CRATE_NAME"), "::core::logger::"),
    concat!(env!("CARGO_CRATE_NAME"), "::core::sugar::"),
    concat!(env!("CARGO_CRATE_NAME"), "::global::LogBridge"),
    ": log::__private_api::",
];

/// Adjustments applied on top of a logger's encoder, sink and level
#[derive(Clone)]
pub enum LoggerOption {
    /// Where write failures are reported
    ErrorOutput(SharedSink),
    /// DPanic panics and stack capture is more liberal
    Development,
    /// Annotate entries with the calling file and line
    AddCaller,
    WithCaller(bool),
    /// Capture a stack trace for entries at or above the level
    AddStacktrace(LogLevel),
    /// Additional frames to drop from captured stack traces
    AddCallerSkip(usize),
    /// Fields attached to every entry
    Fields(LogContext),
}

impl fmt::Debug for LoggerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerOption::ErrorOutput(sink) => write!(f, "ErrorOutput({})", sink.name()),
            LoggerOption::Development => f.write_str("Development"),
            LoggerOption::AddCaller => f.write_str("AddCaller"),
            LoggerOption::WithCaller(enabled) => write!(f, "WithCaller({})", enabled),
            LoggerOption::AddStacktrace(level) => write!(f, "AddStacktrace({})", level),
            LoggerOption::AddCallerSkip(skip) => write!(f, "AddCallerSkip({})", skip),
            LoggerOption::Fields(context) => write!(f, "Fields({})", context),
        }
    }
}

struct Core {
    encoder: Encoder,
    sink: SharedSink,
    level: AtomicLevel,
}

#[derive(Clone)]
struct Options {
    error_output: SharedSink,
    development: bool,
    add_caller: bool,
    stack_level: Option<LogLevel>,
    caller_skip: usize,
}

impl Options {
    fn apply(&mut self, option: LoggerOption, context: &mut LogContext) {
        match option {
            LoggerOption::ErrorOutput(sink) => self.error_output = sink,
            LoggerOption::Development => self.development = true,
            LoggerOption::AddCaller => self.add_caller = true,
            LoggerOption::WithCaller(enabled) => self.add_caller = enabled,
            LoggerOption::AddStacktrace(level) => self.stack_level = Some(level),
            LoggerOption::AddCallerSkip(skip) => self.caller_skip += skip,
            LoggerOption::Fields(fields) => context.extend(&fields),
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    options: Options,
    context: LogContext,
}

impl Logger {
    /// A logger without caller annotation or stack capture, reporting write
    /// failures on stderr
    pub fn new(encoder: impl Into<Encoder>, sink: SharedSink, level: AtomicLevel) -> Self {
        Self {
            core: Arc::new(Core {
                encoder: encoder.into(),
                sink,
                level,
            }),
            options: Options {
                error_output: Arc::new(StreamSink::stderr()),
                development: false,
                add_caller: false,
                stack_level: None,
                caller_skip: 0,
            },
            context: LogContext::new(),
        }
    }

    /// A copy with the options applied in order
    #[must_use]
    pub fn with_options<I>(&self, options: I) -> Self
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let mut logger = self.clone();
        for option in options {
            logger.options.apply(option, &mut logger.context);
        }
        logger
    }

    /// A child logger that adds `context` to every entry
    #[must_use]
    pub fn with(&self, context: LogContext) -> Self {
        let mut logger = self.clone();
        logger.context.extend(&context);
        logger
    }

    pub fn sugar(&self) -> SugaredLogger {
        SugaredLogger::new(self.clone())
    }

    pub fn level(&self) -> LogLevel {
        self.core.level.level()
    }

    pub fn atomic_level(&self) -> &AtomicLevel {
        &self.core.level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.level.enabled(level)
    }

    pub fn encoder_kind(&self) -> EncoderKind {
        self.core.encoder.kind()
    }

    pub fn is_development(&self) -> bool {
        self.options.development
    }

    pub fn adds_caller(&self) -> bool {
        self.options.add_caller
    }

    pub fn stack_level(&self) -> Option<LogLevel> {
        self.options.stack_level
    }

    pub fn caller_skip(&self) -> usize {
        self.options.caller_skip
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    /// Flush the sink
    pub fn sync(&self) -> Result<()> {
        self.core.sink.sync()
    }

    /// Whether both loggers write through the same encoder, sink and level
    pub fn shares_core(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_at(level, message.into(), None, Location::caller().into());
    }

    #[track_caller]
    pub fn log_with_context(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
    ) {
        self.log_at(level, message.into(), Some(context), Location::caller().into());
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Debug, message.into(), None, Location::caller().into());
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Info, message.into(), None, Location::caller().into());
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Warn, message.into(), None, Location::caller().into());
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Error, message.into(), None, Location::caller().into());
    }

    /// Logs at `DPanic`, then panics if the logger is in development mode
    #[track_caller]
    pub fn dpanic(&self, message: impl Into<String>) {
        self.log_at(LogLevel::DPanic, message.into(), None, Location::caller().into());
    }

    /// Logs at `Panic`, then panics, even when the level is disabled
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Panic, message.into(), None, Location::caller().into());
    }

    /// Logs at `Fatal`, syncs, then exits the process with status 1
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Fatal, message.into(), None, Location::caller().into());
    }

    pub(crate) fn log_at(
        &self,
        level: LogLevel,
        message: String,
        extra: Option<LogContext>,
        caller: Caller,
    ) {
        let message = if self.enabled(level) {
            let entry = self.entry(level, message, extra, caller);
            self.write(&entry);
            entry.message
        } else {
            message
        };
        self.terminate(level, message);
    }

    fn entry(
        &self,
        level: LogLevel,
        message: String,
        extra: Option<LogContext>,
        caller: Caller,
    ) -> LogEntry {
        let context = match extra {
            Some(extra) if !self.context.is_empty() => {
                let mut merged = self.context.clone();
                merged.extend(&extra);
                merged
            }
            Some(extra) => extra,
            None => self.context.clone(),
        };

        let mut entry = LogEntry::new(level, message).with_context(context);
        if self.options.add_caller {
            entry.caller = Some(caller);
        }
        if self.options.stack_level.is_some_and(|min| level >= min) {
            entry.stacktrace = Some(capture_stack(self.options.caller_skip));
        }
        entry
    }

    fn write(&self, entry: &LogEntry) {
        let written = self
            .core
            .encoder
            .encode(entry)
            .and_then(|buf| self.core.sink.write(&buf));

        // entries that may end the process are flushed right away
        let synced = if entry.level > LogLevel::Error {
            self.core.sink.sync()
        } else {
            Ok(())
        };

        if let Err(err) = written.and(synced) {
            let report = format!("{} write error: {}\n", Utc::now(), err);
            let _ = self.options.error_output.write(report.as_bytes());
            let _ = self.options.error_output.sync();
        }
    }

    fn terminate(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::DPanic if self.options.development => panic!("{}", message),
            LogLevel::Panic => panic!("{}", message),
            LogLevel::Fatal => {
                let _ = self.sync();
                std::process::exit(1);
            }
            _ => {}
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("encoder", &self.encoder_kind())
            .field("sink", &self.core.sink.name())
            .field("level", &self.level())
            .field("development", &self.options.development)
            .field("add_caller", &self.options.add_caller)
            .field("stack_level", &self.options.stack_level)
            .field("caller_skip", &self.options.caller_skip)
            .finish()
    }
}

fn capture_stack(skip: usize) -> String {
    trim_stack(&Backtrace::force_capture().to_string(), skip)
}

fn is_frame_start(line: &str) -> bool {
    let trimmed = line.trim_start();
    match trimmed.split_once(':') {
        Some((index, _)) => !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Drop every frame up to and including the last logger frame, then `skip`
/// more.
fn trim_stack(trace: &str, skip: usize) -> String {
    let mut frames: Vec<Vec<&str>> = Vec::new();
    for line in trace.lines() {
        match frames.last_mut() {
            Some(frame) if !is_frame_start(line) => frame.push(line),
            _ => frames.push(vec![line]),
        }
    }

    let is_internal = |frame: &Vec<&str>| {
        let head = frame.first().copied().unwrap_or_default();
        INTERNAL_FRAMES.iter().any(|prefix| head.contains(prefix)) && !head.contains("::tests::")
    };
    let first_external = frames
        .iter()
        .rposition(is_internal)
        .map_or(0, |last| last + 1);

    frames
        .iter()
        .skip(first_external + skip)
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}
