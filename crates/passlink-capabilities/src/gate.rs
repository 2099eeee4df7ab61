//! View-count admission for share links.
//!
//! Every redemption of a link passes through [`ViewGate::try_admit`] with the
//! link's nonce and cap. The in-memory gate keeps one atomic counter per
//! nonce. The check-then-increment is a single compare-and-swap loop run
//! under the map's shard read guard, so a sweep (which needs the shard write
//! guard) never evicts a counter mid-admission, and different nonces never
//! contend on a shared lock.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{CapabilityError, CapabilityResult};

/// Outcome of a successful admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Views consumed for this nonce, including this one.
    pub views_used: u32,
    /// Views still available after this one.
    pub views_left: u32,
}

/// Per-nonce admission control.
///
/// Implementations must make the check-then-increment for a nonce
/// indivisible: with `max_views = M`, exactly `min(N, M)` of `N` concurrent
/// calls are admitted.
#[async_trait]
pub trait ViewGate: Send + Sync {
    /// Admit one view for `nonce` if fewer than `max_views` have been used.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::ViewLimitReached`] when the budget is spent,
    /// or [`CapabilityError::StorageError`] if the backing store fails.
    async fn try_admit(&self, nonce: &str, max_views: u32) -> CapabilityResult<Admission>;

    /// Views consumed so far for `nonce` (0 if never seen).
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::StorageError`] if the backing store fails.
    async fn views_used(&self, nonce: &str) -> CapabilityResult<u32>;

    /// Number of nonces currently tracked.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::StorageError`] if the backing store fails.
    async fn tracked(&self) -> CapabilityResult<usize>;

    /// Drop counters idle for at least `max_idle`, returning how many were removed.
    ///
    /// Stores with native expiry have nothing to do here.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::StorageError`] if the backing store fails.
    async fn sweep_idle(&self, _max_idle: Duration) -> CapabilityResult<usize> {
        Ok(0)
    }
}

#[derive(Debug)]
struct ViewCounter {
    used: AtomicU32,
    /// Milliseconds since the gate's epoch at the last admission attempt.
    touched_ms: AtomicU64,
}

impl ViewCounter {
    fn new(now_ms: u64) -> Self {
        Self {
            used: AtomicU32::new(0),
            touched_ms: AtomicU64::new(now_ms),
        }
    }

    /// Touch and try to take one view. `Ok` holds the count before this
    /// view, `Err` the count that was already at the cap.
    fn admit(&self, now_ms: u64, max_views: u32) -> Result<u32, u32> {
        self.touched_ms.store(now_ms, Ordering::Relaxed);
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                if used < max_views {
                    used.checked_add(1)
                } else {
                    None
                }
            })
    }
}

/// Process-local [`ViewGate`].
///
/// Counters live for the lifetime of the process unless
/// [`sweep_idle`](ViewGate::sweep_idle) is driven externally. Evicting a
/// counter re-opens its link's budget.
#[derive(Debug)]
pub struct InMemoryViewGate {
    counters: DashMap<String, ViewCounter>,
    epoch: Instant,
}

impl InMemoryViewGate {
    /// Create an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Admit against `nonce`'s counter while its map guard is held.
    fn admit(&self, nonce: &str, max_views: u32) -> Result<u32, u32> {
        let now = self.now_ms();
        if let Some(counter) = self.counters.get(nonce) {
            return counter.admit(now, max_views);
        }
        self.counters
            .entry(nonce.to_string())
            .or_insert_with(|| ViewCounter::new(now))
            .admit(now, max_views)
    }
}

impl Default for InMemoryViewGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ViewGate for InMemoryViewGate {
    async fn try_admit(&self, nonce: &str, max_views: u32) -> CapabilityResult<Admission> {
        let admitted = self.admit(nonce, max_views);

        match admitted {
            Ok(previous) => {
                let views_used = previous.saturating_add(1);
                let views_left = max_views.saturating_sub(views_used);
                tracing::debug!(nonce, views_used, views_left, "View admitted");
                Ok(Admission {
                    views_used,
                    views_left,
                })
            },
            Err(used) => {
                tracing::debug!(nonce, used, max_views, "View limit reached");
                Err(CapabilityError::ViewLimitReached {
                    nonce: nonce.to_string(),
                    max_views,
                })
            },
        }
    }

    async fn views_used(&self, nonce: &str) -> CapabilityResult<u32> {
        Ok(self
            .counters
            .get(nonce)
            .map_or(0, |c| c.used.load(Ordering::Acquire)))
    }

    async fn tracked(&self) -> CapabilityResult<usize> {
        Ok(self.counters.len())
    }

    async fn sweep_idle(&self, max_idle: Duration) -> CapabilityResult<usize> {
        let now = self.now_ms();
        let max_idle_ms = u64::try_from(max_idle.as_millis()).unwrap_or(u64::MAX);
        let mut removed: usize = 0;

        self.counters.retain(|_, counter| {
            let idle = now.saturating_sub(counter.touched_ms.load(Ordering::Relaxed));
            let keep = idle < max_idle_ms;
            if !keep {
                removed = removed.saturating_add(1);
            }
            keep
        });

        if removed > 0 {
            tracing::info!(removed, "Swept idle view counters");
        }
        Ok(removed)
    }
}
