//! Line-delimited JSON encoder

use crate::core::{LogEntry, Result};
use serde_json::{Map, Value};

pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "ts";
pub const CALLER_KEY: &str = "caller";
pub const MESSAGE_KEY: &str = "msg";
pub const STACKTRACE_KEY: &str = "stacktrace";

/// Prefix for context fields whose name clashes with an entry key
pub const FIELD_PREFIX: &str = "fields.";

const RESERVED_KEYS: [&str; 5] = [LEVEL_KEY, TIME_KEY, CALLER_KEY, MESSAGE_KEY, STACKTRACE_KEY];

/// Writes each entry as a single-line JSON object (JSONL format)
///
/// Keys are emitted in a fixed order: `level`, `ts`, `caller`, `msg`, the
/// entry's fields in insertion order, then `stacktrace`. A field named after
/// one of those keys is written as `fields.<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let mut buf = serde_json::to_vec(&Value::Object(to_object(entry)))?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Seconds since the Unix epoch with sub-second precision
fn epoch_seconds(entry: &LogEntry) -> f64 {
    entry.timestamp.timestamp() as f64
        + f64::from(entry.timestamp.timestamp_subsec_nanos()) / 1_000_000_000.0
}

pub(crate) fn to_object(entry: &LogEntry) -> Map<String, Value> {
    let mut object = Map::with_capacity(5 + entry.context.len());
    object.insert(LEVEL_KEY.to_string(), Value::from(entry.level.as_str()));
    object.insert(TIME_KEY.to_string(), Value::from(epoch_seconds(entry)));
    if let Some(caller) = &entry.caller {
        object.insert(CALLER_KEY.to_string(), Value::from(caller.short()));
    }
    object.insert(MESSAGE_KEY.to_string(), Value::from(entry.message.as_str()));
    for (key, value) in entry.context.fields() {
        let key = if RESERVED_KEYS.contains(&key) {
            format!("{}{}", FIELD_PREFIX, key)
        } else {
            key.to_string()
        };
        object.insert(key, value.to_json_value());
    }
    if let Some(stacktrace) = &entry.stacktrace {
        object.insert(STACKTRACE_KEY.to_string(), Value::from(stacktrace.as_str()));
    }
    object
}
