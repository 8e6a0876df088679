//! Monotonic request tokens used to discard superseded answers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// What: Hands out strictly increasing sequence ids and remembers the newest one.
///
/// Details:
/// - Ids start at `1`; `0` means "nothing issued yet".
/// - `latest` only ever grows (`fetch_max`), so a slow thread can never roll it back.
/// - A result is current when its id equals [`RequestSequencer::latest`]; anything lower
///   was superseded and must be dropped by the consumer.
/// - [`RequestSequencer::run_if_current`] and [`RequestSequencer::issue`] exclude each
///   other, so no id can be issued between a currency check and the delivery it guards.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    /// Next id to hand out, minus one.
    issued: AtomicU64,
    /// Highest id handed out so far.
    latest: AtomicU64,
    /// Held while issuing and while delivering a current answer.
    gate: Mutex<()>,
}

impl RequestSequencer {
    /// Fresh sequencer; the first [`issue`](Self::issue) returns `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            latest: AtomicU64::new(0),
            gate: Mutex::new(()),
        }
    }

    /// What: Allocate the next id and mark it as the latest.
    ///
    /// Output:
    /// - A value strictly greater than every id returned before.
    pub fn issue(&self) -> u64 {
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let id = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.fetch_max(id, Ordering::SeqCst);
        drop(gate);
        id
    }

    /// Newest id issued so far (`0` before the first issue).
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// What: Check whether `id` still names the newest request.
    #[must_use]
    pub fn is_current(&self, id: u64) -> bool {
        id != 0 && id == self.latest()
    }

    /// What: Run `deliver` only if `id` is still the newest request.
    ///
    /// Output:
    /// - `Some` with the closure's value, or `None` when `id` was superseded.
    ///
    /// Details:
    /// - No id is issued while `deliver` runs. Keep it short and non-blocking.
    /// - A later `issue` can still supersede the answer after delivery; consumers that
    ///   hold results re-check with [`RequestSequencer::is_current`].
    pub fn run_if_current<R>(&self, id: u64, deliver: impl FnOnce() -> R) -> Option<R> {
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let out = self.is_current(id).then(deliver);
        drop(gate);
        out
    }
}
