//! Periodic driver that feeds monotonic readings to a tick callback.

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use crate::{clock::MonotonicClock, Result};

/// Interval for a tick rate, floored to whole milliseconds and never zero.
pub fn interval_for_fps(fps: u32) -> Duration {
    let millis = (1000 / fps.max(1)).max(1);
    Duration::from_millis(u64::from(millis))
}

/// Handle to a running tick thread.
///
/// The thread is stopped and joined when the handle is dropped, so no tick
/// can fire after the owner goes away.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns a thread calling `on_tick(now_ms)` once per `interval`.
    pub fn spawn<C, F>(interval: Duration, clock: C, mut on_tick: F) -> Result<Self>
    where
        C: MonotonicClock + Send + 'static,
        F: FnMut(u64) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let worker = thread::Builder::new()
            .name("second-screen-ticker".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => on_tick(clock.now_ms()),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        tracing::debug!(interval_ms = interval.as_millis() as u64, "ticker started");
        Ok(Self {
            interval,
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("ticker thread panicked");
            }
            tracing::debug!("ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Instant,
    };

    use super::*;
    use crate::clock::{ManualClock, SystemClock};

    #[test]
    fn interval_matches_tick_rate() {
        assert_eq!(interval_for_fps(10), Duration::from_millis(100));
        assert_eq!(interval_for_fps(3), Duration::from_millis(333));
        assert_eq!(interval_for_fps(0), Duration::from_millis(1000));
        assert_eq!(interval_for_fps(5_000), Duration::from_millis(1));
    }

    #[test]
    fn delivers_clock_readings() {
        let (tx, rx) = bounded(16);
        let clock = ManualClock::new(4_200);
        let ticker = Ticker::spawn(Duration::from_millis(5), clock, move |now| {
            let _ = tx.try_send(now);
        })
        .unwrap();

        let now = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(now, 4_200);
        ticker.stop();
    }

    #[test]
    fn dropping_the_handle_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(Duration::from_millis(2), SystemClock::new(), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while count.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        drop(ticker);

        let after_drop = count.load(Ordering::SeqCst);
        assert!(after_drop > 0);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }
}
