//! Blocking token-bucket rate limiter for record admission
//!
//! Producers call [`RateLimiter::acquire`] before touching the current
//! buffer; the call parks the producer thread until admission would no
//! longer exceed the configured rate. This is distinct from queue
//! backpressure, which stalls the cutting thread rather than producers.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Blocking token-bucket rate limiter
///
/// Tokens refill continuously at the effective rate, capped at one
/// second's worth, so a rate raise never retroactively grants burst
/// credit for time already spent throttled.
pub struct RateLimiter {
    inner: Mutex<Inner>,
    available: Condvar,
    /// Hard ceiling fixed at construction; dynamic updates never exceed it
    max_rate: Option<u32>,
}

struct Inner {
    /// Effective records-per-second rate; `None` is unlimited
    rate: Option<u32>,
    /// Currently available tokens
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a limiter with the given rate ceiling in records per second.
    ///
    /// `None` (or zero) means unlimited: every `acquire` returns
    /// immediately until a positive rate is installed via `update_rate`.
    pub fn new(max_rate: Option<u32>) -> Self {
        let max_rate = max_rate.filter(|r| *r > 0);
        Self {
            inner: Mutex::new(Inner {
                rate: max_rate,
                tokens: max_rate.map(f64::from).unwrap_or(0.0),
                last_refill: Instant::now(),
            }),
            available: Condvar::new(),
            max_rate,
        }
    }

    /// Block the calling thread until `n` records may be admitted.
    ///
    /// Available tokens are consumed immediately and the remainder is
    /// waited out, so an `n` larger than the bucket capacity simply takes
    /// `n / rate` seconds in total rather than deadlocking.
    pub fn acquire(&self, n: usize) {
        let mut inner = self.inner.lock();
        let mut remaining = n as f64;
        loop {
            let Some(rate) = inner.rate else { return };
            Self::refill(&mut inner, rate);
            if inner.tokens >= remaining {
                inner.tokens -= remaining;
                return;
            }
            remaining -= inner.tokens;
            inner.tokens = 0.0;
            let wait = Duration::from_secs_f64((remaining / f64::from(rate)).min(1.0));
            // woken early by update_rate; the loop recomputes the deficit
            self.available.wait_for(&mut inner, wait);
        }
    }

    /// Change the admission rate without resetting throttling history.
    ///
    /// The effective rate is clamped to the ceiling supplied at
    /// construction; accumulated tokens are clamped to the new capacity.
    /// A zero rate is ignored.
    pub fn update_rate(&self, new_rate: u32) {
        if new_rate == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        let effective = match self.max_rate {
            Some(ceiling) => new_rate.min(ceiling),
            None => new_rate,
        };
        if let Some(rate) = inner.rate {
            Self::refill(&mut inner, rate);
        }
        inner.rate = Some(effective);
        inner.tokens = inner.tokens.min(f64::from(effective));
        self.available.notify_all();
    }

    /// Current effective rate in records per second; `None` is unlimited
    pub fn current_rate(&self) -> Option<u32> {
        self.inner.lock().rate
    }

    fn refill(inner: &mut Inner, rate: u32) {
        let now = Instant::now();
        let elapsed = now.duration_since(inner.last_refill).as_secs_f64();
        inner.tokens = (inner.tokens + elapsed * f64::from(rate)).min(f64::from(rate));
        inner.last_refill = now;
    }
}
