//! Resolves the active event, current clip and next event for an instant.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timeline::{Clip, Timeline, TimelineEvent};

/// Coarse presentation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Basic,
    Event,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Basic => f.write_str("BASIC"),
            Mode::Event => f.write_str("EVENT"),
        }
    }
}

/// Result of one [`Scheduler::compute`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    pub elapsed_sec: i64,
    pub mode: Mode,
    pub active_event: Option<TimelineEvent>,
    pub current_clip: Option<Clip>,
    pub next_event: Option<TimelineEvent>,
}

impl ScheduleSnapshot {
    pub fn active_event_id(&self) -> Option<&str> {
        self.active_event.as_ref().map(|event| event.id.as_str())
    }
}

impl fmt::Display for ScheduleSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hud(
            f,
            self.mode,
            self.elapsed_sec,
            self.current_clip.as_ref(),
            self.next_event.as_ref(),
        )
    }
}

/// Debug HUD line shared by raw and presented snapshots.
pub(crate) fn write_hud(
    f: &mut fmt::Formatter<'_>,
    mode: Mode,
    elapsed_sec: i64,
    clip: Option<&Clip>,
    next: Option<&TimelineEvent>,
) -> fmt::Result {
    write!(f, "Mode: {mode} | Elapsed: {elapsed_sec}s | Clip: ")?;
    match clip {
        Some(Clip {
            label: Some(label), ..
        }) => f.write_str(label)?,
        Some(clip) => f.write_str(&clip.id)?,
        None => f.write_str("—")?,
    }
    f.write_str(" | Next: ")?;
    match next {
        Some(event) => write!(f, "{}s ({})", event.at, event.kind),
        None => f.write_str("—"),
    }
}

/// Owns a [`Timeline`] and caches the last computed snapshot.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timeline: Timeline,
    snapshot: ScheduleSnapshot,
}

impl Scheduler {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            snapshot: ScheduleSnapshot::default(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Last snapshot produced by [`Scheduler::compute`].
    pub fn snapshot(&self) -> &ScheduleSnapshot {
        &self.snapshot
    }

    /// Resolves the schedule at `elapsed_sec`, caching and returning it.
    ///
    /// Negative input is treated as zero.
    pub fn compute(&mut self, elapsed_sec: i64) -> &ScheduleSnapshot {
        let elapsed_sec = elapsed_sec.max(0);
        let t = elapsed_sec as f64;

        let active_event = active_event(self.timeline.events(), t).cloned();
        let current_clip = current_clip(self.timeline.clips(), t).cloned();
        let next_event = next_event(self.timeline.events(), t).cloned();
        let mode = if active_event.is_some() {
            Mode::Event
        } else {
            Mode::Basic
        };

        self.snapshot = ScheduleSnapshot {
            elapsed_sec,
            mode,
            active_event,
            current_clip,
            next_event,
        };
        &self.snapshot
    }
}

/// Latest-starting active event; authored order breaks ties.
fn active_event(events: &[TimelineEvent], t: f64) -> Option<&TimelineEvent> {
    events
        .iter()
        .filter(|event| event.is_active_at(t))
        .fold(None, |best: Option<&TimelineEvent>, event| match best {
            Some(current) if current.at >= event.at => Some(current),
            _ => Some(event),
        })
}

/// First clip in authored order containing `t`.
fn current_clip(clips: &[Clip], t: f64) -> Option<&Clip> {
    clips.iter().find(|clip| clip.contains(t))
}

/// Soonest event strictly after `t`; authored order breaks ties.
fn next_event(events: &[TimelineEvent], t: f64) -> Option<&TimelineEvent> {
    events
        .iter()
        .filter(|event| event.at > t)
        .fold(None, |best: Option<&TimelineEvent>, event| match best {
            Some(current) if current.at <= event.at => Some(current),
            _ => Some(event),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{BuiltinTimeline, EventKind};

    fn event(id: &str, at: f64, duration_sec: f64) -> TimelineEvent {
        TimelineEvent::new(id, EventKind::Generic, at, duration_sec)
    }

    fn scheduler(events: Vec<TimelineEvent>) -> Scheduler {
        Scheduler::new(Timeline::new(Vec::new(), events))
    }

    #[test]
    fn single_event_window() {
        let mut scheduler = scheduler(vec![event("ev1", 10.0, 5.0)]);

        assert_eq!(scheduler.compute(9).active_event_id(), None);
        assert_eq!(scheduler.compute(10).active_event_id(), Some("ev1"));
        assert_eq!(scheduler.compute(14).active_event_id(), Some("ev1"));
        assert_eq!(scheduler.compute(15).active_event_id(), None);
        assert_eq!(scheduler.snapshot().mode, Mode::Basic);
    }

    #[test]
    fn latest_start_wins_on_overlap() {
        let mut scheduler = scheduler(vec![event("A", 5.0, 10.0), event("B", 8.0, 10.0)]);

        assert_eq!(scheduler.compute(7).active_event_id(), Some("A"));
        assert_eq!(scheduler.compute(9).active_event_id(), Some("B"));
        // A ends at 15, B is still running.
        assert_eq!(scheduler.compute(16).active_event_id(), Some("B"));
    }

    #[test]
    fn later_start_wins_regardless_of_list_order() {
        let mut scheduler = scheduler(vec![event("late", 8.0, 10.0), event("early", 5.0, 10.0)]);
        assert_eq!(scheduler.compute(9).active_event_id(), Some("late"));
    }

    #[test]
    fn identical_starts_fall_back_to_authored_order() {
        let mut scheduler = scheduler(vec![event("first", 5.0, 3.0), event("second", 5.0, 10.0)]);

        assert_eq!(scheduler.compute(6).active_event_id(), Some("first"));
        assert_eq!(scheduler.compute(9).active_event_id(), Some("second"));
    }

    #[test]
    fn next_event_is_strictly_in_the_future() {
        let mut scheduler = scheduler(vec![event("A", 10.0, 5.0), event("B", 20.0, 5.0)]);

        let snapshot = scheduler.compute(0);
        assert_eq!(snapshot.next_event.as_ref().map(|e| e.at), Some(10.0));

        let snapshot = scheduler.compute(10);
        assert_eq!(snapshot.active_event_id(), Some("A"));
        assert_eq!(snapshot.next_event.as_ref().map(|e| e.at), Some(20.0));

        assert!(scheduler.compute(20).next_event.is_none());
    }

    #[test]
    fn next_event_ignores_list_order() {
        let mut scheduler = scheduler(vec![
            event("late", 40.0, 1.0),
            event("tie-a", 12.0, 1.0),
            event("tie-b", 12.0, 1.0),
        ]);

        let next = scheduler.compute(3).next_event.clone().unwrap();
        assert_eq!(next.id, "tie-a");
    }

    #[test]
    fn negative_time_matches_zero() {
        let mut scheduler =
            Scheduler::new(Timeline::builtin(BuiltinTimeline::NewGame).unwrap());

        let at_zero = scheduler.compute(0).clone();
        let negative = scheduler.compute(-42).clone();

        assert_eq!(negative, at_zero);
        assert_eq!(negative.elapsed_sec, 0);
    }

    #[test]
    fn compute_is_idempotent() {
        let mut scheduler =
            Scheduler::new(Timeline::builtin(BuiltinTimeline::NewGame).unwrap());

        for t in [0, 10, 22, 27, 63, 99, 200] {
            let first = scheduler.compute(t).clone();
            let second = scheduler.compute(t).clone();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn every_event_is_active_at_its_start_and_gone_at_its_end() {
        let timeline = Timeline::builtin(BuiltinTimeline::NewGame).unwrap();
        let mut scheduler = Scheduler::new(timeline.clone());

        for event in timeline.events() {
            let snapshot = scheduler.compute(event.at as i64);
            assert_eq!(snapshot.active_event_id(), Some(event.id.as_str()));
            assert_eq!(snapshot.mode, Mode::Event);

            let snapshot = scheduler.compute(event.end_sec() as i64);
            assert_ne!(snapshot.active_event_id(), Some(event.id.as_str()));
        }
    }

    #[test]
    fn clips_tolerate_gaps_and_overlaps() {
        let timeline = Timeline::new(
            vec![
                Clip::new("a", 0.0, 10.0),
                Clip::new("b", 5.0, 20.0),
                Clip::new("c", 30.0, 40.0),
            ],
            Vec::new(),
        );
        let mut scheduler = Scheduler::new(timeline);

        assert_eq!(scheduler.compute(7).current_clip.as_ref().unwrap().id, "a");
        assert_eq!(scheduler.compute(12).current_clip.as_ref().unwrap().id, "b");
        assert!(scheduler.compute(25).current_clip.is_none());
        assert!(scheduler.compute(40).current_clip.is_none());
    }

    #[test]
    fn empty_timeline_yields_nothing() {
        let mut scheduler = Scheduler::default();
        let snapshot = scheduler.compute(12);

        assert_eq!(snapshot.mode, Mode::Basic);
        assert!(snapshot.active_event.is_none());
        assert!(snapshot.current_clip.is_none());
        assert!(snapshot.next_event.is_none());
    }

    #[test]
    fn malformed_entries_never_match() {
        let timeline = Timeline::new(
            vec![Clip::new("inverted", 10.0, 5.0)],
            vec![event("zero", 5.0, 0.0), event("negative", 5.0, -3.0)],
        );
        let mut scheduler = Scheduler::new(timeline);

        let snapshot = scheduler.compute(5);
        assert!(snapshot.active_event.is_none());
        assert!(snapshot.current_clip.is_none());
    }

    #[test]
    fn switches_between_events_without_basic() {
        let mut scheduler = scheduler(vec![event("A", 0.0, 10.0), event("B", 4.0, 3.0)]);

        assert_eq!(scheduler.compute(3).active_event_id(), Some("A"));
        assert_eq!(scheduler.compute(4).active_event_id(), Some("B"));
        assert_eq!(scheduler.compute(7).active_event_id(), Some("A"));
    }

    #[test]
    fn hud_line_matches_debug_overlay() {
        let mut scheduler =
            Scheduler::new(Timeline::builtin(BuiltinTimeline::NewGame).unwrap());

        let line = scheduler.compute(12).to_string();
        assert_eq!(
            line,
            "Mode: EVENT | Elapsed: 12s | Clip: Drive Setup & Penalty | Next: 22s (TOUCHDOWN)"
        );

        let line = scheduler.compute(500).to_string();
        assert_eq!(line, "Mode: BASIC | Elapsed: 500s | Clip: — | Next: —");
    }

    #[test]
    fn snapshot_serializes_for_consumers() {
        let mut scheduler = scheduler(vec![event("ev1", 1.0, 2.0)]);
        let json = serde_json::to_value(scheduler.compute(1)).unwrap();

        assert_eq!(json["mode"], "EVENT");
        assert_eq!(json["activeEvent"]["id"], "ev1");
        assert!(json["currentClip"].is_null());
    }
}
