//! Core logger types and traits

pub mod atomic_level;
pub mod error;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod sink;
pub mod sugar;

pub use atomic_level::AtomicLevel;
pub use error::{LoggerError, Result};
pub use log_context::{FieldValue, LogContext};
pub use log_entry::{Caller, LogEntry};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerOption};
pub use sink::{SharedSink, Sink};
pub use sugar::SugaredLogger;
