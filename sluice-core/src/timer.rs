//! Drift-free recurring timer on a dedicated thread
//!
//! Fires a callback once per interval, passing the *scheduled* fire time
//! in epoch milliseconds. The next wake-up is computed from the absolute
//! schedule (`next = previous + period`), so time spent inside the
//! callback never accumulates as drift. A callback that overruns a whole
//! period makes the next fire happen immediately at its (now past)
//! scheduled time.

use crate::error::{Result, SluiceError};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Current time in milliseconds since the Unix epoch
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Recurring timer owning one clock-driven thread
pub struct RecurringTimer {
    shared: Arc<TimerShared>,
    thread: Option<JoinHandle<()>>,
    name: String,
}

struct TimerShared {
    state: Mutex<TimerState>,
    wakeup: Condvar,
    period_ms: i64,
}

struct TimerState {
    stop_requested: bool,
    interrupted: bool,
    /// Scheduled time of the most recent completed fire; -1 before any
    prev_time: i64,
}

impl RecurringTimer {
    /// Start a timer firing `callback` once per `period` on a new thread
    /// named `name`. The first fire is scheduled one period after start.
    pub fn start<F>(period: Duration, name: &str, callback: F) -> Result<Self>
    where
        F: Fn(i64) + Send + 'static,
    {
        if period < Duration::from_millis(1) {
            return Err(SluiceError::Config(format!(
                "timer period must be at least 1ms, got {period:?}"
            )));
        }

        let shared = Arc::new(TimerShared {
            state: Mutex::new(TimerState {
                stop_requested: false,
                interrupted: false,
                prev_time: -1,
            }),
            wakeup: Condvar::new(),
            period_ms: period.as_millis() as i64,
        });

        let start_time = now_millis();
        let thread_shared = shared.clone();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || Self::run(thread_shared, start_time, callback))
            .map_err(|e| SluiceError::Internal(format!("failed to spawn timer thread: {e}")))?;

        debug!(timer = name, period_ms = period.as_millis() as u64, "timer started");

        Ok(Self {
            shared,
            thread: Some(thread),
            name: name.to_string(),
        })
    }

    /// Request termination and join the timer thread.
    ///
    /// With `interrupt_running_callback = false` the timer fires at least
    /// once more after this call, at the next interval boundary, before
    /// the thread exits; callers rely on this to flush trailing work.
    /// With `true` the pending wait is interrupted and no further fire
    /// happens (an in-flight callback still runs to completion).
    ///
    /// Returns the scheduled time of the last completed fire, or -1 if
    /// the timer never fired. Calling `stop` again is a no-op returning
    /// the same value.
    pub fn stop(&mut self, interrupt_running_callback: bool) -> i64 {
        {
            let mut state = self.shared.state.lock();
            state.stop_requested = true;
            if interrupt_running_callback {
                state.interrupted = true;
            }
            self.shared.wakeup.notify_all();
        }

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(timer = %self.name, "timer thread panicked");
            }
        }

        let prev = self.shared.state.lock().prev_time;
        debug!(timer = %self.name, prev_time = prev, "timer stopped");
        prev
    }

    fn run<F>(shared: Arc<TimerShared>, start_time: i64, callback: F)
    where
        F: Fn(i64),
    {
        let mut next_time = start_time + shared.period_ms;

        while !shared.stop_requested() {
            if !shared.wait_until(next_time) {
                return;
            }
            callback(next_time);
            shared.record_fire(next_time);
            next_time += shared.period_ms;
        }

        // a graceful stop gets exactly one more fire, so a fire always
        // begins strictly after the stop request was observed
        if !shared.wait_until(next_time) {
            return;
        }
        callback(next_time);
        shared.record_fire(next_time);
    }
}

impl Drop for RecurringTimer {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop(true);
        }
    }
}

impl TimerShared {
    fn stop_requested(&self) -> bool {
        self.state.lock().stop_requested
    }

    fn record_fire(&self, time: i64) {
        self.state.lock().prev_time = time;
    }

    /// Sleep until `deadline_ms`, returning false if interrupted first
    fn wait_until(&self, deadline_ms: i64) -> bool {
        let mut state = self.state.lock();
        loop {
            if state.interrupted {
                return false;
            }
            let now = now_millis();
            if now >= deadline_ms {
                return true;
            }
            let wait = Duration::from_millis((deadline_ms - now) as u64);
            self.wakeup.wait_for(&mut state, wait);
        }
    }
}
