//! Presentation timer: start/pause/seek bookkeeping over a monotonic clock.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Source of monotonic millisecond readings.
///
/// Readings only need to be consistent with each other; the origin is
/// arbitrary.
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

/// Monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) -> u64 {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Elapsed-time tracker for one viewing session.
///
/// `elapsed_ms` only moves forward while running and is recomputed on every
/// [`Timer::tick`] from a virtual start reference, so pausing and resuming
/// never causes a jump.
#[derive(Debug, Clone)]
pub struct Timer<C = SystemClock> {
    clock: C,
    is_running: bool,
    start_epoch_ms: i64,
    offset_ms: u64,
    elapsed_ms: u64,
}

impl Timer<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for Timer<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: MonotonicClock> Timer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            is_running: false,
            start_epoch_ms: 0,
            offset_ms: 0,
            elapsed_ms: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Whole seconds elapsed, floored.
    pub fn elapsed_sec(&self) -> i64 {
        (self.elapsed_ms / 1000) as i64
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn start(&mut self) {
        if self.is_running {
            return;
        }
        let now = self.clock.now_ms() as i64;
        self.start_epoch_ms = now - self.offset_ms as i64;
        self.is_running = true;
        tracing::debug!(elapsed_ms = self.elapsed_ms, "timer started");
    }

    pub fn pause(&mut self) {
        if !self.is_running {
            return;
        }
        self.offset_ms = self.elapsed_ms;
        self.is_running = false;
        tracing::debug!(elapsed_ms = self.elapsed_ms, "timer paused");
    }

    pub fn reset(&mut self) {
        self.is_running = false;
        self.start_epoch_ms = 0;
        self.offset_ms = 0;
        self.elapsed_ms = 0;
        tracing::debug!("timer reset");
    }

    /// Repositions the timer. Negative targets clamp to zero.
    pub fn seek_to(&mut self, ms: i64) {
        let ms = ms.max(0);
        self.offset_ms = ms as u64;
        self.start_epoch_ms = if self.is_running {
            self.clock.now_ms() as i64 - ms
        } else {
            0
        };
        self.elapsed_ms = ms as u64;
        tracing::debug!(elapsed_ms = self.elapsed_ms, running = self.is_running, "timer seek");
    }

    /// Recomputes `elapsed_ms` from an external monotonic reading.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.is_running {
            self.elapsed_ms = self.offset_ms;
            return;
        }
        self.elapsed_ms = (now_ms as i64 - self.start_epoch_ms).max(0) as u64;
    }
}
