//! Process-wide logger
//!
//! The global logger is held by a [`Registry`]: a base [`Logger`], a variant
//! that skips one extra stack frame for the package-level functions in this
//! module, and a [`SugaredLogger`]. The three are always swapped together,
//! so a reader never sees a mix of old and new.
//!
//! ```no_run
//! use rust_logger_config::global;
//!
//! let revert = global::init_from_uri("logger:console?outputPaths=stdout")?;
//! global::info("using the console encoder");
//! revert.revert();
//! # Ok::<(), rust_logger_config::LoggerError>(())
//! ```

use crate::config::{base_level, parse_config_from_uri, DEFAULT_URI};
use crate::core::{
    Caller, LogContext, LogLevel, Logger, LoggerOption, Result, SugaredLogger,
};
use crate::encoders::JsonEncoder;
use crate::sinks::StreamSink;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Once};

/// Extra frames skipped by the package-level logging functions
const QUICK_LOGGER_DEPTH: usize = 1;

/// The loggers installed by one replacement
pub struct Snapshot {
    pub logger: Logger,
    /// `logger` skipping one more stack frame
    pub quick: Logger,
    pub sugared: SugaredLogger,
}

impl Snapshot {
    fn new(logger: Logger) -> Self {
        Self {
            quick: logger.with_options([LoggerOption::AddCallerSkip(QUICK_LOGGER_DEPTH)]),
            sugared: logger.sugar(),
            logger,
        }
    }
}

/// Holder of a replaceable logger
pub struct Registry {
    current: RwLock<Arc<Snapshot>>,
}

impl Registry {
    pub fn new(logger: Logger) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::new(logger))),
        }
    }

    pub fn logger(&self) -> Logger {
        self.current.read().logger.clone()
    }

    pub fn sugared(&self) -> SugaredLogger {
        self.current.read().sugared.clone()
    }

    pub fn quick(&self) -> Logger {
        self.current.read().quick.clone()
    }

    /// All three loggers as installed together
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Install `logger` and return a handle that restores what was installed
    /// before this call
    pub fn replace(&self, logger: Logger) -> Revert<'_> {
        // derived loggers are built before taking the lock
        let next = Arc::new(Snapshot::new(logger));
        let previous = std::mem::replace(&mut *self.current.write(), next);
        Revert {
            registry: self,
            previous,
        }
    }

    fn restore(&self, snapshot: Arc<Snapshot>) {
        *self.current.write() = snapshot;
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("logger", &self.current.read().logger)
            .finish()
    }
}

/// Undoes one [`Registry::replace`]
pub struct Revert<'a> {
    registry: &'a Registry,
    previous: Arc<Snapshot>,
}

impl Revert<'_> {
    /// The logger this handle restores
    pub fn previous(&self) -> &Logger {
        &self.previous.logger
    }

    pub fn revert(self) {
        self.registry.restore(self.previous);
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(|| Registry::new(default_logger()));

fn default_logger() -> Logger {
    parse_config_from_uri(DEFAULT_URI)
        .and_then(|config| config.build([]))
        .unwrap_or_else(|err| {
            eprintln!("[LOGGER WARN] Failed to build default logger: {}", err);
            Logger::new(
                JsonEncoder::new(),
                Arc::new(StreamSink::stderr()),
                base_level().clone(),
            )
        })
}

pub fn registry() -> &'static Registry {
    &GLOBAL
}

pub fn logger() -> Logger {
    GLOBAL.logger()
}

pub fn sugared() -> SugaredLogger {
    GLOBAL.sugared()
}

/// Replace the global logger.
///
/// The first replacement also routes records of the `log` crate to the
/// global logger, unless another `log` implementation is already set.
pub fn replace(logger: Logger) -> Revert<'static> {
    install_log_bridge();
    GLOBAL.replace(logger)
}

/// Parse `uri`, build a logger from it and install it globally
pub fn init_from_uri(uri: &str) -> Result<Revert<'static>> {
    let logger = parse_config_from_uri(uri)?.build([])?;
    Ok(replace(logger))
}

/// Set the base level from its name
pub fn set_level(text: &str) -> Result<()> {
    base_level().set(text)
}

pub fn level() -> LogLevel {
    base_level().level()
}

pub fn sync() -> Result<()> {
    GLOBAL.logger().sync()
}

#[track_caller]
pub fn log(level: LogLevel, message: impl Into<String>, context: LogContext) {
    GLOBAL
        .quick()
        .log_at(level, message.into(), Some(context), Location::caller().into());
}

#[track_caller]
pub fn debug(message: impl Into<String>) {
    GLOBAL
        .quick()
        .log_at(LogLevel::Debug, message.into(), None, Location::caller().into());
}

#[track_caller]
pub fn info(message: impl Into<String>) {
    GLOBAL
        .quick()
        .log_at(LogLevel::Info, message.into(), None, Location::caller().into());
}

#[track_caller]
pub fn warn(message: impl Into<String>) {
    GLOBAL
        .quick()
        .log_at(LogLevel::Warn, message.into(), None, Location::caller().into());
}

#[track_caller]
pub fn error(message: impl Into<String>) {
    GLOBAL
        .quick()
        .log_at(LogLevel::Error, message.into(), None, Location::caller().into());
}

/// Panics afterwards when the global logger is in development mode
#[track_caller]
pub fn dpanic(message: impl Into<String>) {
    GLOBAL
        .quick()
        .log_at(LogLevel::DPanic, message.into(), None, Location::caller().into());
}

/// Panics afterwards, even if the level is disabled
#[track_caller]
pub fn panic(message: impl Into<String>) {
    GLOBAL
        .quick()
        .log_at(LogLevel::Panic, message.into(), None, Location::caller().into());
}

/// Exits the process afterwards, even if the level is disabled
#[track_caller]
pub fn fatal(message: impl Into<String>) {
    GLOBAL
        .quick()
        .log_at(LogLevel::Fatal, message.into(), None, Location::caller().into());
}

struct LogBridge;

static LOG_BRIDGE: LogBridge = LogBridge;
static LOG_BRIDGE_INIT: Once = Once::new();

fn install_log_bridge() {
    LOG_BRIDGE_INIT.call_once(|| {
        if log::set_logger(&LOG_BRIDGE).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
}

fn bridge_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Trace | log::Level::Debug => LogLevel::Debug,
        log::Level::Info => LogLevel::Info,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Error => LogLevel::Error,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        GLOBAL.logger().enabled(bridge_level(metadata.level()))
    }

    // bridge and `log` frames are trimmed as internal, no extra skip
    fn log(&self, record: &log::Record<'_>) {
        let level = bridge_level(record.level());
        let logger = GLOBAL.logger();
        if !logger.enabled(level) {
            return;
        }
        let caller = Caller::new(
            record.file().unwrap_or("<unknown>"),
            record.line().unwrap_or(0),
        );
        logger.log_at(level, record.args().to_string(), None, caller);
    }

    fn flush(&self) {
        let _ = sync();
    }
}
