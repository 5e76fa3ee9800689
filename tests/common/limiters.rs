//! Deterministic rate limiter fakes

#![allow(dead_code)]

use async_trait::async_trait;
use prmerge::throttle::RateLimiter;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Grants every permit immediately and counts them
#[derive(Debug, Default)]
pub struct CountingLimiter {
    granted: AtomicUsize,
}

impl CountingLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granted(&self) -> usize {
        self.granted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn acquire(&self) {
        self.granted.fetch_add(1, Ordering::SeqCst);
    }
}

/// Never grants a permit; signals when someone starts waiting
#[derive(Debug, Default)]
pub struct BlockingLimiter {
    waiting: Notify,
    waiters: AtomicUsize,
}

impl BlockingLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once a caller is blocked in `acquire`
    pub async fn wait_for_waiter(&self) {
        loop {
            let notified = self.waiting.notified();
            if self.waiters.load(Ordering::SeqCst) > 0 {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl RateLimiter for BlockingLimiter {
    async fn acquire(&self) {
        self.waiters.fetch_add(1, Ordering::SeqCst);
        self.waiting.notify_waiters();
        std::future::pending::<()>().await;
    }
}
