//! Fan-out sink
//!
//! A [`MultiSink`] treats an ordered list of sinks as a single destination.
//! Every member receives every write; a write only succeeds when all members
//! accepted it. Members are written in list order under one lock, so all of
//! them observe concurrent writes in the same relative order.

use crate::core::{LoggerError, Result, SharedSink, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

pub struct MultiSink {
    sinks: Vec<SharedSink>,
    order: Mutex<()>,
}

impl MultiSink {
    pub fn new(sinks: Vec<SharedSink>) -> Self {
        Self {
            sinks,
            order: Mutex::new(()),
        }
    }

    /// A sink that silently discards all writes
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Wrap the members in a shared sink
    pub fn shared(sinks: Vec<SharedSink>) -> SharedSink {
        Arc::new(Self::new(sinks))
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn members(&self) -> &[SharedSink] {
        &self.sinks
    }

    fn for_each<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&dyn Sink) -> Result<()>,
    {
        let _ordered = self.order.lock();
        let errors: Vec<LoggerError> = self
            .sinks
            .iter()
            .filter_map(|sink| op(sink.as_ref()).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::sink_failures(errors, self.sinks.len()))
        }
    }
}

impl Default for MultiSink {
    fn default() -> Self {
        Self::empty()
    }
}

impl Sink for MultiSink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        self.for_each(|sink| sink.write(buf))
    }

    fn sync(&self) -> Result<()> {
        self.for_each(|sink| sink.sync())
    }

    fn name(&self) -> &str {
        "multi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::BufferSink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct FailingSink {
        attempts: AtomicUsize,
    }

    impl Sink for FailingSink {
        fn write(&self, _buf: &[u8]) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(LoggerError::writer("disk on fire"))
        }

        fn sync(&self) -> Result<()> {
            Err(LoggerError::writer("cannot sync"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_empty_discards() {
        let sink = MultiSink::empty();
        assert!(sink.is_empty());
        assert!(sink.write(b"dropped\n").is_ok());
        assert!(sink.sync().is_ok());
    }

    #[test]
    fn test_every_member_receives_write() {
        let first = Arc::new(BufferSink::new());
        let second = Arc::new(BufferSink::new());
        let sink = MultiSink::new(vec![first.clone(), second.clone()]);

        sink.write(b"one\n").unwrap();
        sink.write(b"two\n").unwrap();

        assert_eq!(first.contents(), "one\ntwo\n");
        assert_eq!(second.contents(), "one\ntwo\n");
    }

    #[test]
    fn test_failure_does_not_stop_later_members() {
        let failing = Arc::new(FailingSink {
            attempts: AtomicUsize::new(0),
        });
        let buffer = Arc::new(BufferSink::new());
        let sink = MultiSink::new(vec![failing.clone(), buffer.clone()]);

        let err = sink.write(b"entry\n").unwrap_err();
        assert!(matches!(err, LoggerError::SinkFailures { failed: 1, total: 2, .. }));
        assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(buffer.contents(), "entry\n");
        assert!(sink.sync().is_err());
    }

    #[test]
    fn test_members_observe_same_order() {
        let first = Arc::new(BufferSink::new());
        let second = Arc::new(BufferSink::new());
        let sink = Arc::new(MultiSink::new(vec![first.clone(), second.clone()]));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..100 {
                        sink.write(format!("{}-{}\n", t, i).as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(first.lines().len(), 800);
        assert_eq!(first.contents(), second.contents());
    }
}
