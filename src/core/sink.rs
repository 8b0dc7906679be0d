//! Sink trait for log output destinations

use super::error::Result;
use std::sync::Arc;

/// A writable destination for encoded log entries.
///
/// Sinks are shared between every clone of a logger, so they take `&self` and
/// serialise writes internally.
pub trait Sink: Send + Sync {
    /// Write one encoded entry in full
    fn write(&self, buf: &[u8]) -> Result<()>;
    /// Flush buffered output to the underlying destination
    fn sync(&self) -> Result<()>;
    fn name(&self) -> &str;
}

pub type SharedSink = Arc<dyn Sink>;
