//! Event testing override composed in front of the scheduler output.
//!
//! Triggering a test event never touches the timeline or the scheduler. It
//! only changes what [`EventTesting::apply`] hands to the presentation layer.

use std::fmt;

use serde::Serialize;

use crate::{
    schedule::{write_hud, Mode, ScheduleSnapshot},
    timeline::{Clip, EventKind, Payload, TimelineEvent},
};

/// Id carried by every synthetic test event.
pub const TEST_EVENT_ID: &str = "test-event";

pub const DEFAULT_TEST_DURATION_SEC: f64 = 5.0;

/// Set/clear channel for a synthetic, always-active event.
#[derive(Debug, Clone)]
pub struct EventTesting {
    test_event: Option<TimelineEvent>,
    default_duration_sec: f64,
}

impl Default for EventTesting {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTesting {
    pub fn new() -> Self {
        Self::with_default_duration(DEFAULT_TEST_DURATION_SEC)
    }

    pub fn with_default_duration(default_duration_sec: f64) -> Self {
        Self {
            test_event: None,
            default_duration_sec,
        }
    }

    /// Replaces any current test event with a new one of `kind`.
    pub fn trigger(
        &mut self,
        kind: impl Into<EventKind>,
        duration_sec: Option<f64>,
        payload: Option<Payload>,
    ) -> &TimelineEvent {
        let event = TimelineEvent {
            id: TEST_EVENT_ID.to_string(),
            kind: kind.into(),
            at: 0.0,
            duration_sec: duration_sec.unwrap_or(self.default_duration_sec),
            payload,
        };
        tracing::info!(kind = %event.kind, duration_sec = event.duration_sec, "test event triggered");
        self.test_event.insert(event)
    }

    pub fn clear(&mut self) {
        if self.test_event.take().is_some() {
            tracing::info!("test event cleared");
        }
    }

    pub fn is_active(&self) -> bool {
        self.test_event.is_some()
    }

    pub fn test_event(&self) -> Option<&TimelineEvent> {
        self.test_event.as_ref()
    }

    /// Composes the override with a scheduler snapshot.
    pub fn apply(&self, snapshot: &ScheduleSnapshot) -> PresentedSchedule {
        let (mode, active_event, overridden) = match &self.test_event {
            Some(event) => (Mode::Event, Some(event.clone()), true),
            None => (snapshot.mode, snapshot.active_event.clone(), false),
        };
        PresentedSchedule {
            elapsed_sec: snapshot.elapsed_sec,
            mode,
            active_event,
            current_clip: snapshot.current_clip.clone(),
            next_event: snapshot.next_event.clone(),
            overridden,
        }
    }
}

/// What the presentation layer actually renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedSchedule {
    pub elapsed_sec: i64,
    pub mode: Mode,
    pub active_event: Option<TimelineEvent>,
    pub current_clip: Option<Clip>,
    pub next_event: Option<TimelineEvent>,
    /// True while a test event replaces the scheduled one.
    pub overridden: bool,
}

impl PresentedSchedule {
    pub fn active_event_id(&self) -> Option<&str> {
        self.active_event.as_ref().map(|event| event.id.as_str())
    }
}

impl fmt::Display for PresentedSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hud(
            f,
            self.mode,
            self.elapsed_sec,
            self.current_clip.as_ref(),
            self.next_event.as_ref(),
        )?;
        if self.overridden {
            f.write_str(" | TEST")?;
        }
        Ok(())
    }
}
