//! Shared rate limiters
//!
//! A rate limiter is a periodic permit source shared by every concurrent
//! merge invocation. Invocations only consume permits; they never reset or
//! reconfigure a limiter.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A source of permits
///
/// `acquire` waits until one permit is available and consumes it.
/// Implementations must be safe to share across any number of tasks.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait for and consume one permit
    async fn acquire(&self);
}

/// Wait for a permit, giving up as soon as `cancel` fires
pub async fn acquire_permit(limiter: &dyn RateLimiter, cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        () = limiter.acquire() => Ok(()),
    }
}

/// Permit source that emits one permit per period
///
/// Ticks nobody waits for are dropped, so at most one permit is ever banked.
/// Waiters are served one at a time through an async mutex.
pub struct IntervalLimiter {
    period: Duration,
    interval: Mutex<Interval>,
}

impl IntervalLimiter {
    /// Create a limiter emitting one permit every `period`
    ///
    /// The first permit is available immediately. Must be called from within
    /// a tokio runtime; `period` must be non-zero.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            period,
            interval: Mutex::new(interval),
        }
    }

    /// Configured period between permits
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl std::fmt::Debug for IntervalLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalLimiter")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RateLimiter for IntervalLimiter {
    async fn acquire(&self) {
        let mut interval = self.interval.lock().await;
        interval.tick().await;
        trace!(period = ?self.period, "permit granted");
    }
}
