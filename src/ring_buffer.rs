//! Bounded in-memory diagnostics buffer.
//!
//! Keeps the most recent errors for inspection (health endpoints, crash
//! reports, tests) without letting a burst of failures grow memory.
//!
//! # Design Principles
//!
//! - **Bounded memory**: fixed entry count, FIFO eviction
//! - **Per-entry size caps**: a huge driver message cannot dominate the buffer
//! - **Service half only**: entries copy the diagnostic side of an error,
//!   truncated; the full error is not retained
//! - **RwLock-based**: concurrent readers, exclusive writers
//!
//! Reads hand out `Arc<str>` clones, so repeated `get_recent` calls do not
//! copy message text.
//!
//! # Example
//!
//! ```rust
//! use bastion_errors::ring_buffer::RingBufferLogger;
//! use bastion_errors::{DbFailure, from_db_error};
//!
//! let logger = RingBufferLogger::new(1000, 2048);
//!
//! let err = from_db_error(Some(&DbFailure::RowNotFound), "Invoice").unwrap();
//! logger.log(&err, "GET /invoices/42");
//!
//! let recent = logger.get_recent(10);
//! assert_eq!(recent[0].service_code, 4041);
//! assert_eq!(recent[0].origin.as_ref(), "GET /invoices/42");
//! ```

use crate::AppError;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

const MESSAGE_CAP: usize = 512;
const ORIGIN_CAP: usize = 128;
const META_VALUE_CAP: usize = 128;
const TRUNC_MARK: &str = "...[TRUNC]";

/// One retained error, service half only.
#[derive(Clone, Debug)]
pub struct DiagnosticEntry {
    /// Unix timestamp (seconds) when the entry was recorded.
    pub timestamp: u64,
    /// Public status code value at the time of logging.
    pub public_code: i32,
    /// Service status code value.
    pub service_code: i32,
    /// Service message, truncated.
    pub message: Arc<str>,
    /// Caller-supplied origin (request path, job name, peer address).
    pub origin: Arc<str>,
    /// Service metadata that fit in the entry budget, in insertion order.
    pub metadata: Arc<[(Arc<str>, Arc<str>)]>,
    /// Approximate payload size in bytes.
    pub size_bytes: usize,
}

impl DiagnosticEntry {
    /// Look up a retained metadata value.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }
}

/// Fixed-capacity slot array; never reallocates.
struct Slots {
    entries: Box<[Option<DiagnosticEntry>]>,
    next: usize,
    oldest: usize,
    len: usize,
}

impl Slots {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            next: 0,
            oldest: 0,
            len: 0,
        }
    }

    /// Store `entry`, returning true if an older entry was overwritten.
    fn push(&mut self, entry: DiagnosticEntry) -> bool {
        let cap = self.entries.len();
        let overwritten = self.entries[self.next].replace(entry).is_some();
        self.next = (self.next + 1) % cap;
        if self.len < cap {
            self.len += 1;
        } else {
            self.oldest = (self.oldest + 1) % cap;
        }
        overwritten
    }

    /// Oldest to newest.
    fn iter(&self) -> impl DoubleEndedIterator<Item = &DiagnosticEntry> {
        let cap = self.entries.len();
        (0..self.len).filter_map(move |i| self.entries[(self.oldest + i) % cap].as_ref())
    }

    fn clear(&mut self) {
        self.entries.iter_mut().for_each(|slot| *slot = None);
        self.next = 0;
        self.oldest = 0;
        self.len = 0;
    }
}

/// Remaining byte budget while building one entry.
struct Budget(usize);

impl Budget {
    fn take<'a>(&mut self, s: &'a str, cap: usize) -> Cow<'a, str> {
        let out = truncate_to_bytes(s, cap.min(self.0));
        self.0 = self.0.saturating_sub(out.len());
        out
    }
}

/// Ring buffer of recent errors with bounded memory usage.
///
/// Cloning is cheap and shares the underlying buffer and counters.
pub struct RingBufferLogger {
    slots: Arc<RwLock<Slots>>,
    max_entries: usize,
    max_entry_bytes: usize,
    evictions: Arc<AtomicU64>,
}

impl RingBufferLogger {
    /// Create a buffer holding at most `max_entries` entries (minimum one),
    /// each capped at roughly `max_entry_bytes` of text.
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            slots: Arc::new(RwLock::new(Slots::with_capacity(max_entries))),
            max_entries,
            max_entry_bytes,
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    // A panic while holding the lock leaves the slots structurally valid,
    // so poisoning is ignored.
    fn read_slots(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slots(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the service half of `err`, evicting the oldest entry if full.
    pub fn log(&self, err: &AppError, origin: &str) {
        let entry = self.create_entry(err, origin);
        if self.write_slots().push(entry) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn create_entry(&self, err: &AppError, origin: &str) -> DiagnosticEntry {
        err.with_service_log(|log| {
            let mut budget = Budget(self.max_entry_bytes);

            let message = budget.take(log.message(), MESSAGE_CAP);

            let mut metadata: SmallVec<[(Arc<str>, Arc<str>); 8]> = SmallVec::new();
            for (key, value) in log.metadata().iter() {
                if key.len() >= budget.0 {
                    break;
                }
                budget.0 -= key.len();
                let value = budget.take(value, META_VALUE_CAP);
                metadata.push((Arc::from(key), Arc::from(value.as_ref())));
            }

            let origin = if budget.0 == 0 {
                Cow::Borrowed("[TRUNCATED]")
            } else {
                budget.take(origin, ORIGIN_CAP)
            };

            DiagnosticEntry {
                timestamp: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_or(0, |d| d.as_secs()),
                public_code: log.public_code().value(),
                service_code: log.service_code().value(),
                message: Arc::from(message.as_ref()),
                origin: Arc::from(origin.as_ref()),
                metadata: metadata.into_vec().into(),
                size_bytes: self.max_entry_bytes - budget.0,
            }
        })
    }

    /// The `count` most recent entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<DiagnosticEntry> {
        self.read_slots().iter().rev().take(count).cloned().collect()
    }

    /// Every entry, newest first.
    pub fn get_all(&self) -> Vec<DiagnosticEntry> {
        self.read_slots().iter().rev().cloned().collect()
    }

    /// Entries matching `predicate`, oldest first.
    ///
    /// ```rust
    /// # use bastion_errors::ring_buffer::RingBufferLogger;
    /// # let logger = RingBufferLogger::new(100, 1024);
    /// let server_side = logger.get_filtered(|e| e.service_code >= 5000);
    /// # assert!(server_side.is_empty());
    /// ```
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<DiagnosticEntry>
    where
        F: Fn(&DiagnosticEntry) -> bool,
    {
        self.read_slots().iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Number of retained entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.read_slots().len
    }

    /// True when nothing is retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of entry payload sizes.
    pub fn payload_bytes(&self) -> usize {
        self.read_slots().iter().map(|e| e.size_bytes).sum()
    }

    /// Entries overwritten since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Drop every entry. The eviction counter is kept.
    pub fn clear(&self) {
        self.write_slots().clear();
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// True once the next `log` will evict.
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_entries
    }
}

impl Clone for RingBufferLogger {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            max_entries: self.max_entries,
            max_entry_bytes: self.max_entry_bytes,
            evictions: Arc::clone(&self.evictions),
        }
    }
}

/// Cap `s` at `max_bytes` on a char boundary, marking the cut.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }
    if max_bytes <= TRUNC_MARK.len() {
        return Cow::Borrowed(&TRUNC_MARK[..max_bytes]);
    }

    let mut idx = max_bytes - TRUNC_MARK.len();
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    let mut out = String::with_capacity(idx + TRUNC_MARK.len());
    out.push_str(&s[..idx]);
    out.push_str(TRUNC_MARK);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::*;

    fn err(message: impl Into<String>) -> AppError {
        AppError::builder()
            .public(SERVER_ERROR, "Unknown server error")
            .service(SERVER_ERROR_DATABASE, message)
            .service_meta("pgcode", "40001")
            .build()
    }

    #[test]
    fn evicts_oldest() {
        let logger = RingBufferLogger::new(3, 1024);
        for i in 0..5 {
            logger.log(&err(format!("failure {}", i)), "worker");
        }

        assert_eq!(logger.len(), 3);
        assert!(logger.is_full());
        assert_eq!(logger.eviction_count(), 2);

        let entries = logger.get_all();
        assert_eq!(entries[0].message.as_ref(), "failure 4");
        assert_eq!(entries[2].message.as_ref(), "failure 2");
    }

    #[test]
    fn records_codes_and_metadata() {
        let logger = RingBufferLogger::new(10, 1024);
        logger.log(&err("serialization failure"), "POST /orders");

        let entry = &logger.get_recent(1)[0];
        assert_eq!(entry.public_code, 5000);
        assert_eq!(entry.service_code, 5001);
        assert_eq!(entry.meta("pgcode"), Some("40001"));
        assert_eq!(entry.origin.as_ref(), "POST /orders");
        assert!(entry.timestamp > 0);
    }

    #[test]
    fn respects_entry_size_limit() {
        let logger = RingBufferLogger::new(100, 128);
        logger.log(&err("A".repeat(10_000)), "worker");

        let entry = &logger.get_recent(1)[0];
        assert!(entry.size_bytes <= 128);
        assert!(entry.message.ends_with(TRUNC_MARK));
        assert_eq!(logger.payload_bytes(), entry.size_bytes);
    }

    #[test]
    fn filtering_by_origin() {
        let logger = RingBufferLogger::new(100, 1024);
        for i in 0..10 {
            let origin = if i % 2 == 0 { "sync" } else { "api" };
            logger.log(&err(format!("e{}", i)), origin);
        }
        assert_eq!(logger.get_filtered(|e| e.origin.as_ref() == "sync").len(), 5);
    }

    #[test]
    fn clone_shares_state() {
        let a = RingBufferLogger::new(100, 1024);
        let b = a.clone();
        a.log(&err("x"), "worker");
        assert_eq!(b.len(), 1);
        b.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let logger = RingBufferLogger::new(0, 1024);
        assert_eq!(logger.capacity(), 1);
        logger.log(&err("a"), "w");
        logger.log(&err("b"), "w");
        assert_eq!(logger.len(), 1);
    }

    #[test]
    fn truncate_respects_utf8() {
        let emoji = "🔥".repeat(100);
        let truncated = truncate_to_bytes(&emoji, 50);
        assert!(truncated.len() <= 50);
        assert!(truncated.ends_with(TRUNC_MARK));
    }

    #[test]
    fn truncate_short_is_borrowed() {
        assert!(matches!(truncate_to_bytes("short", 100), Cow::Borrowed("short")));
    }

    #[test]
    fn concurrent_logging() {
        use std::thread;

        let logger = RingBufferLogger::new(128, 256);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = logger.clone();
                thread::spawn(move || {
                    for j in 0..100 {
                        logger.log(&err(format!("t{}-{}", t, j)), "worker");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(logger.len(), 128);
        assert_eq!(logger.eviction_count(), 800 - 128);
    }

    #[test]
    fn reads_share_allocations() {
        let logger = RingBufferLogger::new(10, 1024);
        logger.log(&err("shared"), "worker");

        let first = logger.get_recent(1).remove(0);
        let second = logger.get_recent(1).remove(0);
        assert!(Arc::ptr_eq(&first.message, &second.message));
        assert!(Arc::ptr_eq(&first.metadata, &second.metadata));
    }
}
