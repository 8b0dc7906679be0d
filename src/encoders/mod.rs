//! Entry encoders
//!
//! An [`Encoder`] renders a [`LogEntry`] into the bytes handed to a sink.

pub mod console;
pub mod json;
pub mod syslog;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;
pub use syslog::{Facility, Framing, SyslogEncoder};

use crate::core::{LogEntry, LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which encoder a configuration selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    #[default]
    Json,
    Console,
    Syslog,
}

impl EncoderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderKind::Json => "json",
            EncoderKind::Console => "console",
            EncoderKind::Syslog => "syslog",
        }
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncoderKind {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(EncoderKind::Json),
            "console" => Ok(EncoderKind::Console),
            "syslog" => Ok(EncoderKind::Syslog),
            _ => Err(LoggerError::unsupported_encoder(s)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Encoder {
    Json(JsonEncoder),
    Console(ConsoleEncoder),
    Syslog(SyslogEncoder),
}

impl Encoder {
    pub fn kind(&self) -> EncoderKind {
        match self {
            Encoder::Json(_) => EncoderKind::Json,
            Encoder::Console(_) => EncoderKind::Console,
            Encoder::Syslog(_) => EncoderKind::Syslog,
        }
    }

    pub fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        match self {
            Encoder::Json(encoder) => encoder.encode(entry),
            Encoder::Console(encoder) => encoder.encode(entry),
            Encoder::Syslog(encoder) => encoder.encode(entry),
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::Json(JsonEncoder::new())
    }
}

impl From<JsonEncoder> for Encoder {
    fn from(encoder: JsonEncoder) -> Self {
        Encoder::Json(encoder)
    }
}

impl From<ConsoleEncoder> for Encoder {
    fn from(encoder: ConsoleEncoder) -> Self {
        Encoder::Console(encoder)
    }
}

impl From<SyslogEncoder> for Encoder {
    fn from(encoder: SyslogEncoder) -> Self {
        Encoder::Syslog(encoder)
    }
}
