//! Sink implementations
//!
//! Concrete destinations for encoded log entries, plus [`MultiSink`] which
//! composes any number of them into one.

pub mod buffer;
pub mod conn;
pub mod multi;
pub mod rotating;
pub mod stream;

pub use buffer::BufferSink;
pub use conn::{split_address, ConnSink, Network};
pub use multi::MultiSink;
pub use rotating::RotatingFileSink;
pub use stream::{open_paths, Closer, StreamSink};
