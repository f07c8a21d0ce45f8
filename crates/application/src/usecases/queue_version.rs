use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Notify, futures::Notified};

/// Marker identifying one scheduler loop run.
///
/// Two generations are equal only when they share a sequence number, so runs
/// captured within the same clock tick still tell each other apart.
#[derive(Debug, Clone, Copy)]
pub struct QueueGeneration {
    seq: u64,
    captured_at: DateTime<Utc>,
}

impl QueueGeneration {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Instant the run was started; the run only considers mailings starting at or after it.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

impl PartialEq for QueueGeneration {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueueGeneration {}

/// Process-wide "latest queue generation", shared by the loop starter and
/// every in-flight wait. Last write wins.
#[derive(Debug, Default)]
pub struct QueueVersionRegister {
    issued: AtomicU64,
    latest: AtomicU64,
    published: Notify,
}

impl QueueVersionRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a fresh generation without publishing it.
    pub fn issue(&self, captured_at: DateTime<Utc>) -> QueueGeneration {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        QueueGeneration { seq, captured_at }
    }

    /// Makes `generation` the current one and wakes every waiter so it can re-check.
    pub fn publish(&self, generation: QueueGeneration) {
        self.latest.store(generation.seq, Ordering::SeqCst);
        self.published.notify_waiters();
    }

    /// Sequence number of the most recently published generation, `0` before any publish.
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: &QueueGeneration) -> bool {
        self.current() == generation.seq
    }

    /// Resolves on the next `publish`. Must be created before checking `is_current`.
    pub(crate) fn next_publish(&self) -> Notified<'_> {
        self.published.notified()
    }
}
