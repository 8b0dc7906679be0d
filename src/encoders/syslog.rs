//! RFC 5424 syslog encoder
//!
//! Each entry becomes
//! `<PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID - - BOM{json}` where the JSON
//! body is the same object the json encoder writes. Framing (RFC 6587)
//! separates messages on stream transports.

use super::json;
use crate::core::{LogEntry, LogLevel, LoggerError, Result};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const SYSLOG_VERSION: u8 = 1;
const MAX_HOSTNAME_LEN: usize = 255;
const MAX_APP_NAME_LEN: usize = 48;
const NIL_VALUE: &str = "-";
const UTF8_BOM: &str = "\u{feff}";

/// How messages are delimited on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// Each message is terminated by a newline
    #[default]
    NonTransparent,
    /// Each message is prefixed with its length in bytes and a space
    OctetCounting,
}

impl Framing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::NonTransparent => "non-transparent",
            Framing::OctetCounting => "octet-counting",
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framing {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "0" | "non-transparent" | "non-transparent-framing" => {
                Ok(Framing::NonTransparent)
            }
            "1" | "octet-counting" | "octet-counting-framing" => Ok(Framing::OctetCounting),
            _ => Err(LoggerError::UnknownFraming {
                value: s.to_string(),
            }),
        }
    }
}

/// Syslog facility codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Facility {
    Kern = 0,
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    AuthPriv = 10,
    Ftp = 11,
    #[default]
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

impl Facility {
    pub const ALL: [Facility; 20] = [
        Facility::Kern,
        Facility::User,
        Facility::Mail,
        Facility::Daemon,
        Facility::Auth,
        Facility::Syslog,
        Facility::Lpr,
        Facility::News,
        Facility::Uucp,
        Facility::Cron,
        Facility::AuthPriv,
        Facility::Ftp,
        Facility::Local0,
        Facility::Local1,
        Facility::Local2,
        Facility::Local3,
        Facility::Local4,
        Facility::Local5,
        Facility::Local6,
        Facility::Local7,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facility::Kern => "kern",
            Facility::User => "user",
            Facility::Mail => "mail",
            Facility::Daemon => "daemon",
            Facility::Auth => "auth",
            Facility::Syslog => "syslog",
            Facility::Lpr => "lpr",
            Facility::News => "news",
            Facility::Uucp => "uucp",
            Facility::Cron => "cron",
            Facility::AuthPriv => "authpriv",
            Facility::Ftp => "ftp",
            Facility::Local0 => "local0",
            Facility::Local1 => "local1",
            Facility::Local2 => "local2",
            Facility::Local3 => "local3",
            Facility::Local4 => "local4",
            Facility::Local5 => "local5",
            Facility::Local6 => "local6",
            Facility::Local7 => "local7",
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facility {
    type Err = LoggerError;

    /// Case-insensitive, with or without a `log_` prefix
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_prefix("log_").unwrap_or(&lower);
        Facility::ALL
            .iter()
            .copied()
            .find(|facility| facility.as_str() == name)
            .ok_or_else(|| LoggerError::UnknownFacility {
                value: s.to_string(),
            })
    }
}

/// Syslog severity for a log level
pub fn severity(level: LogLevel) -> u8 {
    match level {
        LogLevel::Debug => 7,
        LogLevel::Info => 6,
        LogLevel::Warn => 4,
        LogLevel::Error => 3,
        LogLevel::DPanic => 2,
        LogLevel::Panic => 1,
        LogLevel::Fatal => 0,
    }
}

#[derive(Debug, Clone)]
pub struct SyslogEncoder {
    framing: Framing,
    facility: Facility,
    hostname: String,
    app: String,
    pid: u32,
}

impl SyslogEncoder {
    /// Empty `hostname` and `app` and a zero `pid` are filled in from the
    /// running process.
    pub fn new(
        framing: Framing,
        facility: Facility,
        hostname: &str,
        pid: u32,
        app: &str,
    ) -> Self {
        let hostname = if hostname.is_empty() {
            gethostname::gethostname().to_string_lossy().into_owned()
        } else {
            hostname.to_string()
        };
        let app = if app.is_empty() {
            process_name()
        } else {
            app.to_string()
        };
        let pid = if pid == 0 { std::process::id() } else { pid };

        Self {
            framing,
            facility,
            hostname: header_value(&hostname, MAX_HOSTNAME_LEN),
            app: header_value(&app, MAX_APP_NAME_LEN),
            pid,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn facility(&self) -> Facility {
        self.facility
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn priority(&self, level: LogLevel) -> u16 {
        u16::from(self.facility.code()) * 8 + u16::from(severity(level))
    }

    pub fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let body = serde_json::to_string(&Value::Object(json::to_object(entry)))?;
        let message = format!(
            "<{}>{} {} {} {} {} {} {} {}{}",
            self.priority(entry.level),
            SYSLOG_VERSION,
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.hostname,
            self.app,
            self.pid,
            NIL_VALUE,
            NIL_VALUE,
            UTF8_BOM,
            body,
        );

        Ok(match self.framing {
            Framing::NonTransparent => {
                let mut framed = message.into_bytes();
                framed.push(b'\n');
                framed
            }
            Framing::OctetCounting => format!("{} {}", message.len(), message).into_bytes(),
        })
    }
}

fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().and_then(|n| n.to_str()).map(String::from))
        .unwrap_or_default()
}

/// Printable ASCII only, truncated, `-` when nothing is left
fn header_value(value: &str, max_len: usize) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_graphic())
        .take(max_len)
        .collect();
    if cleaned.is_empty() {
        NIL_VALUE.to_string()
    } else {
        cleaned
    }
}
