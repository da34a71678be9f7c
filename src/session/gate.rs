//! Request Gate
//!
//! Rejects a question when the same session had one accepted less than the
//! throttle window ago. Check-and-update runs under the session's DashMap
//! shard lock, so two simultaneous requests from one session cannot both be
//! admitted. Throttled calls never move the timestamp.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::constants::throttle::PRUNE_THRESHOLD;
use crate::types::SessionId;

/// Gate decision for one question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Throttled {
        /// Time left until the session is admitted again
        retry_after: Duration,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Per-session throttle keyed by session id
#[derive(Debug)]
pub struct RequestGate {
    window: TimeDelta,
    /// Last accepted timestamp per session; absent means the epoch
    last_accepted: DashMap<SessionId, DateTime<Utc>>,
    /// Millisecond timestamp of the last threshold-triggered prune
    last_pruned_ms: AtomicI64,
}

impl RequestGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            last_accepted: DashMap::new(),
            last_pruned_ms: AtomicI64::new(i64::MIN),
        }
    }

    /// Non-finite or oversized windows saturate instead of panicking
    pub fn from_secs_f64(window_secs: f64) -> Self {
        Self::new(Duration::try_from_secs_f64(window_secs.max(0.0)).unwrap_or(Duration::MAX))
    }

    pub fn window(&self) -> Duration {
        self.window.to_std().unwrap_or(Duration::ZERO)
    }

    /// Admit or throttle a question from `session` arriving at `now`
    pub fn admit(&self, session: &SessionId, now: DateTime<Utc>) -> Admission {
        if self.last_accepted.len() > PRUNE_THRESHOLD && self.claim_prune(now) {
            self.prune_expired(now);
        }

        let admission = match self.last_accepted.entry(session.clone()) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.signed_duration_since(*entry.get());
                if elapsed < self.window {
                    Admission::Throttled {
                        retry_after: (self.window - elapsed).to_std().unwrap_or(self.window()),
                    }
                } else {
                    entry.insert(now);
                    Admission::Admitted
                }
            }
            Entry::Vacant(entry) => {
                let elapsed = now.signed_duration_since(DateTime::<Utc>::UNIX_EPOCH);
                if elapsed < self.window {
                    Admission::Throttled {
                        retry_after: (self.window - elapsed).to_std().unwrap_or(self.window()),
                    }
                } else {
                    entry.insert(now);
                    Admission::Admitted
                }
            }
        };

        debug!(session = %session, ?admission, "Gate decision");
        admission
    }

    /// Forget the session's timestamp (the page's reset flag)
    pub fn reset(&self, session: &SessionId) {
        self.last_accepted.remove(session);
    }

    /// Timestamp of the session's last accepted question
    pub fn last_accepted(&self, session: &SessionId) -> Option<DateTime<Utc>> {
        self.last_accepted.get(session).map(|entry| *entry.value())
    }

    /// Number of sessions currently tracked
    pub fn tracked_sessions(&self) -> usize {
        self.last_accepted.len()
    }

    /// At most one threshold-triggered prune per window, claimed by one caller
    fn claim_prune(&self, now: DateTime<Utc>) -> bool {
        let now_ms = now.timestamp_millis();
        let last = self.last_pruned_ms.load(Ordering::Relaxed);
        if last != i64::MIN && now_ms.saturating_sub(last) < self.window.num_milliseconds() {
            return false;
        }
        self.last_pruned_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// Drop sessions whose window has passed; they behave the same as absent ones.
    pub fn prune_expired(&self, now: DateTime<Utc>) {
        let before = self.last_accepted.len();
        self.last_accepted
            .retain(|_, last| now.signed_duration_since(*last) < self.window);
        debug!(
            before,
            after = self.last_accepted.len(),
            "Pruned expired session timestamps"
        );
    }
}
