//! One viewing session: timer, scheduler and test override wired together.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use crate::{
    clock::{MonotonicClock, SystemClock, Timer},
    config::AppConfig,
    schedule::{ScheduleSnapshot, Scheduler},
    testing::{EventTesting, PresentedSchedule},
    ticker::Ticker,
    timeline::{EventKind, Payload, Timeline, TimelineEvent},
    Result, SecondScreenError,
};

/// Change in the presented active event.
///
/// `Switched` covers overlapping events handing over without passing through
/// BASIC, which the mode flag alone cannot show.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleChange {
    Entered { event: TimelineEvent },
    Switched { from: String, event: TimelineEvent },
    Exited { from: String },
}

/// Owns the mutable state of one session.
#[derive(Debug)]
pub struct Session<C = SystemClock> {
    timer: Timer<C>,
    scheduler: Scheduler,
    testing: EventTesting,
    computed_sec: Option<i64>,
    presented_id: Option<String>,
}

impl Session<SystemClock> {
    pub fn new(timeline: Timeline) -> Self {
        Self::with_clock(timeline, SystemClock::new())
    }

    /// Builds a session from configuration, loading its timeline.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timeline = config.load_timeline()?;
        let mut session = Self::new(timeline);
        session.testing = EventTesting::with_default_duration(config.testing.default_duration_sec);
        Ok(session)
    }
}

impl<C: MonotonicClock> Session<C> {
    pub fn with_clock(timeline: Timeline, clock: C) -> Self {
        Self {
            timer: Timer::with_clock(clock),
            scheduler: Scheduler::new(timeline),
            testing: EventTesting::new(),
            computed_sec: None,
            presented_id: None,
        }
    }

    pub fn timer(&self) -> &Timer<C> {
        &self.timer
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn testing(&self) -> &EventTesting {
        &self.testing
    }

    pub fn snapshot(&self) -> &ScheduleSnapshot {
        self.scheduler.snapshot()
    }

    /// Scheduler output with the test override applied.
    pub fn presented(&self) -> PresentedSchedule {
        self.testing.apply(self.scheduler.snapshot())
    }

    pub fn start(&mut self) {
        self.timer.start();
    }

    pub fn pause(&mut self) {
        self.timer.pause();
    }

    pub fn reset(&mut self) -> Option<ScheduleChange> {
        self.timer.reset();
        self.refresh()
    }

    pub fn seek_to(&mut self, ms: i64) -> Option<ScheduleChange> {
        self.timer.seek_to(ms);
        self.refresh()
    }

    /// Handles one driver tick.
    pub fn advance(&mut self, now_ms: u64) -> Option<ScheduleChange> {
        self.timer.tick(now_ms);
        self.refresh()
    }

    pub fn trigger_test_event(
        &mut self,
        kind: impl Into<EventKind>,
        duration_sec: Option<f64>,
        payload: Option<Payload>,
    ) -> Option<ScheduleChange> {
        self.testing.trigger(kind, duration_sec, payload);
        self.detect_change()
    }

    pub fn clear_test_event(&mut self) -> Option<ScheduleChange> {
        self.testing.clear();
        self.detect_change()
    }

    /// Recomputes the schedule when the whole-second position moved.
    pub fn refresh(&mut self) -> Option<ScheduleChange> {
        let elapsed_sec = self.timer.elapsed_sec();
        if self.computed_sec != Some(elapsed_sec) {
            self.scheduler.compute(elapsed_sec);
            self.computed_sec = Some(elapsed_sec);
        }
        self.detect_change()
    }

    fn detect_change(&mut self) -> Option<ScheduleChange> {
        let presented = self.presented();
        let current = presented.active_event;
        let change = match (self.presented_id.take(), current) {
            (None, None) => None,
            (None, Some(event)) => Some(ScheduleChange::Entered { event }),
            (Some(from), None) => Some(ScheduleChange::Exited { from }),
            (Some(from), Some(event)) if from != event.id => {
                Some(ScheduleChange::Switched { from, event })
            }
            (Some(same), Some(_)) => {
                self.presented_id = Some(same);
                return None;
            }
        };

        self.presented_id = match &change {
            Some(ScheduleChange::Entered { event }) | Some(ScheduleChange::Switched { event, .. }) => {
                Some(event.id.clone())
            }
            _ => None,
        };

        if let Some(change) = &change {
            match change {
                ScheduleChange::Entered { event } => {
                    tracing::info!(id = %event.id, kind = %event.kind, elapsed_sec = presented.elapsed_sec, "event started")
                }
                ScheduleChange::Switched { from, event } => {
                    tracing::info!(%from, id = %event.id, kind = %event.kind, elapsed_sec = presented.elapsed_sec, "event switched")
                }
                ScheduleChange::Exited { from } => {
                    tracing::info!(%from, elapsed_sec = presented.elapsed_sec, "event ended")
                }
            }
        }
        change
    }
}

/// Thread-safe handle over a [`Session`]; every call takes the lock once.
#[derive(Debug)]
pub struct SharedSession<C = SystemClock> {
    inner: Arc<Mutex<Session<C>>>,
}

impl<C> Clone for SharedSession<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: MonotonicClock> SharedSession<C> {
    pub fn new(session: Session<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut Session<C>) -> R) -> Result<R> {
        let mut session = self.lock()?;
        Ok(f(&mut session))
    }

    pub fn advance(&self, now_ms: u64) -> Result<Option<ScheduleChange>> {
        self.with(|session| session.advance(now_ms))
    }

    pub fn presented(&self) -> Result<PresentedSchedule> {
        self.with(|session| session.presented())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session<C>>> {
        self.inner
            .lock()
            .map_err(|_| SecondScreenError::msg("session state has been poisoned"))
    }
}

impl<C> SharedSession<C>
where
    C: MonotonicClock + Clone + Send + 'static,
{
    /// Starts a ticker driving this session from the timer's own clock.
    ///
    /// An event already presented when driving starts is reported first as
    /// `Entered`, on the calling thread. Later changes run `on_change` on the
    /// ticker thread after the lock is released.
    pub fn drive<F>(&self, interval: Duration, mut on_change: F) -> Result<Ticker>
    where
        F: FnMut(ScheduleChange, PresentedSchedule) + Send + 'static,
    {
        let (clock, initial) =
            self.with(|session| (session.timer().clock().clone(), session.presented()))?;
        if let Some(event) = initial.active_event.clone() {
            on_change(ScheduleChange::Entered { event }, initial);
        }
        let shared = self.clone();
        Ticker::spawn(interval, clock, move |now_ms| {
            let update = shared.with(|session| {
                session
                    .advance(now_ms)
                    .map(|change| (change, session.presented()))
            });
            match update {
                Ok(Some((change, presented))) => on_change(change, presented),
                Ok(None) => {}
                Err(err) => tracing::warn!(%err, "tick skipped"),
            }
        })
    }
}
