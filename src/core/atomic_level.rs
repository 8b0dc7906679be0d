//! Dynamic, shareable minimum level
//!
//! An [`AtomicLevel`] is a handle to one shared threshold. Cloning the handle
//! shares the threshold, so every logger built against a configuration sees a
//! change made through any clone on its next log call.

use super::error::Result;
use super::log_level::LogLevel;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AtomicLevel {
    level: Arc<AtomicI8>,
}

impl AtomicLevel {
    /// Create a new threshold at `Info`
    pub fn new() -> Self {
        Self::at(LogLevel::Info)
    }

    pub fn at(level: LogLevel) -> Self {
        Self {
            level: Arc::new(AtomicI8::new(level as i8)),
        }
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_i8(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as i8, Ordering::Relaxed);
    }

    /// Parse `text` as a level name and store it
    ///
    /// On error the current threshold is left untouched.
    pub fn set(&self, text: &str) -> Result<()> {
        let level = text.parse::<LogLevel>()?;
        self.set_level(level);
        Ok(())
    }

    /// Whether an entry at `level` passes the threshold
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    /// Whether both handles share the same underlying threshold
    pub fn same_as(&self, other: &AtomicLevel) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AtomicLevel {
    fn eq(&self, other: &Self) -> bool {
        self.level() == other.level()
    }
}

impl fmt::Display for AtomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.level(), f)
    }
}

impl Serialize for AtomicLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.level().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AtomicLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let level = text.parse::<LogLevel>().map_err(serde::de::Error::custom)?;
        Ok(AtomicLevel::at(level))
    }
}
