//! Human-friendly console encoder
//!
//! `time \t LEVEL \t caller \t message \t {fields}`, with the stack trace (if
//! any) on the following lines.

use crate::core::{LogEntry, Result};
use chrono::{Local, SecondsFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct ConsoleEncoder {
    use_colors: bool,
}

impl ConsoleEncoder {
    /// Coloured levels when the `console` feature is enabled
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    fn format_level(&self, entry: &LogEntry) -> String {
        let level = entry.level.to_capital_str();
        #[cfg(feature = "console")]
        if self.use_colors {
            return level.color(entry.level.color_code()).to_string();
        }
        level.to_string()
    }

    pub fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let mut columns = vec![
            entry
                .timestamp
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Millis, false),
            self.format_level(entry),
        ];
        if let Some(caller) = &entry.caller {
            columns.push(caller.short());
        }
        columns.push(escape_message(&entry.message));
        if !entry.context.is_empty() {
            columns.push(serde_json::to_string(&Value::Object(
                entry.context.to_json_map(),
            ))?);
        }

        let mut line = columns.join("\t");
        if let Some(stacktrace) = &entry.stacktrace {
            line.push('\n');
            line.push_str(stacktrace.trim_end());
        }
        line.push('\n');
        Ok(line.into_bytes())
    }
}

impl Default for ConsoleEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep one entry per line
fn escape_message(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}
