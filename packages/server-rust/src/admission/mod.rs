//! Per-endpoint admission control.
//!
//! A sliding-window rate limiter keyed by (operation, caller key). Each
//! bucket holds the raw call timestamps inside the trailing 60-second
//! window; stale entries are pruned lazily on each check, never eagerly.
//! The timestamp-list approach trades memory (O(quota) per active key)
//! for an exact window with no fixed-bucket boundary bursting. Quotas are
//! small (<= 120/min), so the lists stay short.
//!
//! Admission is per-process: a fleet of N gateway instances enforces N
//! times the nominal quota.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use lexgate_core::Operation;
use parking_lot::Mutex;

/// The trailing window every quota is measured against.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Static per-operation request-per-minute limits, loaded once at startup.
/// Operations without an entry are unlimited.
#[derive(Debug, Clone, Default)]
pub struct QuotaTable {
    limits: HashMap<Operation, u32>,
}

impl QuotaTable {
    /// Builds a table from (operation, per-minute limit) pairs.
    #[must_use]
    pub fn new(limits: impl IntoIterator<Item = (Operation, u32)>) -> Self {
        Self {
            limits: limits.into_iter().collect(),
        }
    }

    /// Quota for the operation, or `None` when unlimited.
    #[must_use]
    pub fn quota(&self, op: Operation) -> Option<u32> {
        self.limits.get(&op).copied()
    }
}

#[derive(Debug)]
struct Buckets {
    map: HashMap<(Operation, String), Vec<Instant>>,
    last_sweep: Instant,
}

impl Buckets {
    /// Drops buckets whose newest entry has aged out of the window, at most
    /// once per window. Bounds memory under high caller-key cardinality
    /// without an eviction structure on the hot path.
    fn sweep_stale(&mut self, now: Instant) {
        if now.duration_since(self.last_sweep) < WINDOW {
            return;
        }
        self.map
            .retain(|_, bucket| bucket.last().is_some_and(|t| *t + WINDOW >= now));
        self.last_sweep = now;
    }
}

/// Accepts or rejects calls against the quota table.
///
/// Safe under arbitrary concurrent invocation; a single mutex guards the
/// bucket map (the critical section is a short prune-and-append).
#[derive(Debug)]
pub struct RateLimiter {
    quotas: QuotaTable,
    buckets: Mutex<Buckets>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(quotas: QuotaTable) -> Self {
        Self {
            quotas,
            buckets: Mutex::new(Buckets {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Returns `true` if the call is admitted and records it; returns
    /// `false` without recording when the caller's quota is exhausted.
    ///
    /// A disallowed call is a normal outcome, not an error; the edge maps
    /// it to a too-many-requests response.
    #[must_use]
    pub fn allow(&self, op: Operation, caller_key: &str) -> bool {
        self.allow_at(op, caller_key, Instant::now())
    }

    fn allow_at(&self, op: Operation, caller_key: &str, now: Instant) -> bool {
        let Some(quota) = self.quotas.quota(op) else {
            return true;
        };

        let mut buckets = self.buckets.lock();
        buckets.sweep_stale(now);

        let bucket = buckets
            .map
            .entry((op, caller_key.to_string()))
            .or_default();
        // A call exactly one window old still counts; it ages out just after.
        bucket.retain(|t| *t + WINDOW >= now);

        if bucket.len() >= quota as usize {
            return false;
        }
        bucket.push(now);
        true
    }
}
