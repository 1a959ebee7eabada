use std::{collections::HashSet, fmt};

use super::Timeline;

/// Authoring problem found in a timeline asset.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineIssue {
    DuplicateEventId { id: String },
    DuplicateClipId { id: String },
    NonPositiveDuration { id: String, duration_sec: f64 },
    NegativeStart { id: String, at: f64 },
    EmptyClip { id: String, start_sec: f64, end_sec: f64 },
    OverlappingClips { first: String, second: String },
    OverlappingEvents { first: String, second: String },
}

impl fmt::Display for TimelineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateEventId { id } => write!(f, "event id `{id}` is used more than once"),
            Self::DuplicateClipId { id } => write!(f, "clip id `{id}` is used more than once"),
            Self::NonPositiveDuration { id, duration_sec } => {
                write!(f, "event `{id}` has non-positive duration {duration_sec}s")
            }
            Self::NegativeStart { id, at } => write!(f, "event `{id}` starts before zero ({at}s)"),
            Self::EmptyClip {
                id,
                start_sec,
                end_sec,
            } => write!(f, "clip `{id}` ends at {end_sec}s, not after its start {start_sec}s"),
            Self::OverlappingClips { first, second } => {
                write!(f, "clips `{first}` and `{second}` overlap")
            }
            Self::OverlappingEvents { first, second } => {
                write!(f, "events `{first}` and `{second}` overlap")
            }
        }
    }
}

pub(super) fn validate(timeline: &Timeline) -> Vec<TimelineIssue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for event in timeline.events() {
        if !seen.insert(event.id.as_str()) {
            issues.push(TimelineIssue::DuplicateEventId {
                id: event.id.clone(),
            });
        }
        if event.at < 0.0 {
            issues.push(TimelineIssue::NegativeStart {
                id: event.id.clone(),
                at: event.at,
            });
        }
        if event.duration_sec.is_nan() || event.duration_sec <= 0.0 {
            issues.push(TimelineIssue::NonPositiveDuration {
                id: event.id.clone(),
                duration_sec: event.duration_sec,
            });
        }
    }

    let mut seen = HashSet::new();
    for clip in timeline.clips() {
        if !seen.insert(clip.id.as_str()) {
            issues.push(TimelineIssue::DuplicateClipId {
                id: clip.id.clone(),
            });
        }
        if clip.end_sec.is_nan() || clip.end_sec <= clip.start_sec {
            issues.push(TimelineIssue::EmptyClip {
                id: clip.id.clone(),
                start_sec: clip.start_sec,
                end_sec: clip.end_sec,
            });
        }
    }

    let clips = timeline.clips();
    for (i, a) in clips.iter().enumerate() {
        for b in &clips[i + 1..] {
            if intervals_overlap(a.start_sec, a.end_sec, b.start_sec, b.end_sec) {
                issues.push(TimelineIssue::OverlappingClips {
                    first: a.id.clone(),
                    second: b.id.clone(),
                });
            }
        }
    }

    let events = timeline.events();
    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            if intervals_overlap(a.at, a.end_sec(), b.at, b.end_sec()) {
                issues.push(TimelineIssue::OverlappingEvents {
                    first: a.id.clone(),
                    second: b.id.clone(),
                });
            }
        }
    }

    issues
}

// Empty or inverted intervals never overlap anything.
fn intervals_overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> bool {
    a_start < a_end && b_start < b_end && a_start < b_end && b_start < a_end
}
