//! # Rust Logger Config
//!
//! A structured logger configured from a single URI, writing to any mix of
//! standard streams, plain files, rotating files and syslog connections, with
//! a process-wide logger that can be replaced and reverted at runtime.
//!
//! ## Features
//!
//! - **URI Configuration**: `logger:json?outputPaths=stdout,app.log&lumberjack=filename=app.log;maxsize=10`
//! - **Fan-out Sinks**: every entry reaches every destination, in the same order
//! - **Rotating Files**: size-based rotation with backup pruning and gzip
//! - **Syslog**: RFC 5424 messages over TCP, UDP or Unix sockets
//! - **Dynamic Level**: adjust the threshold of running loggers atomically
//! - **Global Logger**: replace with revert, safe under concurrent use
//!
//! ```
//! use rust_logger_config::prelude::*;
//! use rust_logger_config::sinks::BufferSink;
//! use std::sync::Arc;
//!
//! let buffer = Arc::new(BufferSink::new());
//! let logger = Logger::new(JsonEncoder::new(), buffer.clone(), AtomicLevel::new());
//! logger.with(LogContext::new().with_field("user_id", 42)).info("signed in");
//!
//! assert!(buffer.contents().contains(r#""user_id":42"#));
//! ```

pub mod config;
pub mod core;
pub mod encoders;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::config::{parse_config_from_uri, Config, RotationTargetConfig};
    pub use crate::core::{
        AtomicLevel, FieldValue, LogContext, LogEntry, LogLevel, Logger, LoggerError,
        LoggerOption, Result, SharedSink, Sink, SugaredLogger,
    };
    pub use crate::encoders::{
        ConsoleEncoder, EncoderKind, Facility, Framing, JsonEncoder, SyslogEncoder,
    };
}

pub use config::{parse_config_from_uri, Config, RotationTargetConfig, DEFAULT_URI};
pub use core::{
    AtomicLevel, Caller, FieldValue, LogContext, LogEntry, LogLevel, Logger, LoggerError,
    LoggerOption, Result, SharedSink, Sink, SugaredLogger,
};
pub use encoders::{Encoder, EncoderKind, Facility, Framing};
