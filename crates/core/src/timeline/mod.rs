//! Static timeline data model: clips, events and the aggregate that owns them.

mod validation;

use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, SecondScreenError};

pub use validation::TimelineIssue;

const NEW_GAME_JSON: &str = include_str!("../../assets/new_game.json");
const DEMO_JSON: &str = include_str!("../../assets/demo.json");

/// Schema-less payload handed verbatim to overlay renderers.
pub type Payload = Map<String, Value>;

/// Overlay tag attached to every event.
///
/// The scheduler never inspects the kind. Tags outside the known set are kept
/// as [`EventKind::Other`] so new overlays can be authored without touching
/// this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Touchdown,
    Penalty,
    Turnover,
    Celebration,
    ControversialCall,
    MvpVote,
    TwoPointKickPoll,
    StatsComparison,
    Generic,
    Other(String),
}

impl EventKind {
    /// Every kind with a dedicated tag, in authoring order.
    pub const KNOWN: [EventKind; 9] = [
        EventKind::Touchdown,
        EventKind::Penalty,
        EventKind::Turnover,
        EventKind::Celebration,
        EventKind::ControversialCall,
        EventKind::MvpVote,
        EventKind::TwoPointKickPoll,
        EventKind::StatsComparison,
        EventKind::Generic,
    ];

    /// Wire tag, e.g. `TWO_POINT_KICK_POLL`.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Touchdown => "TOUCHDOWN",
            EventKind::Penalty => "PENALTY",
            EventKind::Turnover => "TURNOVER",
            EventKind::Celebration => "CELEBRATION",
            EventKind::ControversialCall => "CONTROVERSIAL_CALL",
            EventKind::MvpVote => "MVP_VOTE",
            EventKind::TwoPointKickPoll => "TWO_POINT_KICK_POLL",
            EventKind::StatsComparison => "STATS_COMPARISON",
            EventKind::Generic => "GENERIC",
            EventKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            "TOUCHDOWN" => EventKind::Touchdown,
            "PENALTY" => EventKind::Penalty,
            "TURNOVER" => EventKind::Turnover,
            "CELEBRATION" => EventKind::Celebration,
            "CONTROVERSIAL_CALL" => EventKind::ControversialCall,
            "MVP_VOTE" => EventKind::MvpVote,
            "TWO_POINT_KICK_POLL" => EventKind::TwoPointKickPoll,
            "STATS_COMPARISON" => EventKind::StatsComparison,
            "GENERIC" => EventKind::Generic,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match EventKind::from(value.as_str()) {
            EventKind::Other(_) => EventKind::Other(value),
            known => known,
        }
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled occurrence that drives which overlay is shown.
///
/// The event is active over the half-open window `[at, at + duration_sec)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    pub kind: EventKind,
    /// Seconds from timeline start.
    pub at: f64,
    pub duration_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl TimelineEvent {
    pub fn new(id: impl Into<String>, kind: impl Into<EventKind>, at: f64, duration_sec: f64) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            at,
            duration_sec,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn end_sec(&self) -> f64 {
        self.at + self.duration_sec
    }

    /// Whether `seconds` falls inside the activation window.
    pub fn is_active_at(&self, seconds: f64) -> bool {
        seconds >= self.at && seconds < self.end_sec()
    }

    /// Looks up a string entry in the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.as_ref()?.get(key)?.as_str()
    }
}

/// Labelled segment of the underlying broadcast, `[start_sec, end_sec)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    pub start_sec: f64,
    pub end_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Clip {
    pub fn new(id: impl Into<String>, start_sec: f64, end_sec: f64) -> Self {
        Self {
            id: id.into(),
            start_sec,
            end_sec,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.start_sec && seconds < self.end_sec
    }
}

/// Immutable schedule of clips and events for one broadcast session.
///
/// Both sequences keep their authored order, which the scheduler relies on
/// for its tie-breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    clips: Vec<Clip>,
    #[serde(default)]
    events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new(clips: Vec<Clip>, events: Vec<TimelineEvent>) -> Self {
        Self { clips, events }
    }

    /// Decodes a timeline from its JSON asset form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a timeline asset from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let timeline = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            clips = timeline.clips.len(),
            events = timeline.events.len(),
            "loaded timeline"
        );
        Ok(timeline)
    }

    /// Returns one of the timelines embedded in the crate.
    pub fn builtin(which: BuiltinTimeline) -> Result<Self> {
        let json = match which {
            BuiltinTimeline::NewGame => NEW_GAME_JSON,
            BuiltinTimeline::Demo => DEMO_JSON,
        };
        Self::from_json_str(json)
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&TimelineEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty() && self.events.is_empty()
    }

    /// Latest end instant across clips and events, in seconds.
    pub fn duration_sec(&self) -> f64 {
        let clips = self.clips.iter().map(|clip| clip.end_sec);
        let events = self.events.iter().map(TimelineEvent::end_sec);
        clips.chain(events).fold(0.0, f64::max)
    }

    /// Checks the authoring conventions the reference timelines follow.
    ///
    /// Findings are informational; the scheduler tolerates every one of them.
    pub fn validate(&self) -> Vec<TimelineIssue> {
        validation::validate(self)
    }

    /// Like [`Timeline::validate`] but turns findings into an error.
    pub fn validated(self) -> Result<Self> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(self)
        } else {
            Err(SecondScreenError::InvalidTimeline { issues })
        }
    }
}

/// Timelines shipped inside the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinTimeline {
    #[default]
    NewGame,
    Demo,
}

impl BuiltinTimeline {
    pub const ALL: [BuiltinTimeline; 2] = [BuiltinTimeline::NewGame, BuiltinTimeline::Demo];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinTimeline::NewGame => "new-game",
            BuiltinTimeline::Demo => "demo",
        }
    }
}

impl fmt::Display for BuiltinTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinTimeline {
    type Err = SecondScreenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|builtin| builtin.name() == s)
            .ok_or_else(|| SecondScreenError::msg(format!("unknown built-in timeline `{s}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_timelines_decode() {
        let game = Timeline::builtin(BuiltinTimeline::NewGame).unwrap();
        assert_eq!(game.clips().len(), 5);
        assert_eq!(game.events().len(), 6);
        assert_eq!(game.duration_sec(), 105.0);

        let demo = Timeline::builtin(BuiltinTimeline::Demo).unwrap();
        assert_eq!(demo.clips().len(), 4);
        assert_eq!(demo.events().len(), 5);
        assert_eq!(demo.event("ev-flag").unwrap().kind, EventKind::Penalty);
    }

    #[test]
    fn decodes_camel_case_fields_and_payload() {
        let timeline = Timeline::builtin(BuiltinTimeline::NewGame).unwrap();
        let touchdown = timeline.event("ev-touchdown").unwrap();

        assert_eq!(touchdown.kind, EventKind::Touchdown);
        assert_eq!(touchdown.at, 22.0);
        assert_eq!(touchdown.duration_sec, 4.0);
        assert_eq!(touchdown.payload_str("playerName"), Some("J. Daniels"));
        assert_eq!(timeline.clips()[0].label.as_deref(), Some("Drive Setup & Penalty"));
    }

    #[test]
    fn unknown_kinds_survive_a_round_trip() {
        let json = r#"{"events":[{"id":"x","kind":"HALFTIME_SHOW","at":3,"durationSec":2}]}"#;
        let timeline = Timeline::from_json_str(json).unwrap();
        let event = &timeline.events()[0];

        assert_eq!(event.kind, EventKind::Other("HALFTIME_SHOW".to_string()));
        assert!(timeline.clips().is_empty());

        let encoded = serde_json::to_string(&timeline).unwrap();
        assert!(encoded.contains(r#""kind":"HALFTIME_SHOW""#));
        assert!(encoded.contains(r#""durationSec":2.0"#));
        assert!(!encoded.contains("payload"));
    }

    #[test]
    fn activation_window_is_half_open() {
        let event = TimelineEvent::new("ev", EventKind::Generic, 10.0, 5.0);
        assert!(!event.is_active_at(9.0));
        assert!(event.is_active_at(10.0));
        assert!(event.is_active_at(14.0));
        assert!(!event.is_active_at(15.0));

        let clip = Clip::new("c", 0.0, 20.0);
        assert!(clip.contains(0.0));
        assert!(!clip.contains(20.0));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Timeline::from_json_str("{\"events\": 3}").unwrap_err();
        assert!(matches!(err, SecondScreenError::Json(_)));
    }

    #[test]
    fn parses_builtin_names() {
        assert_eq!("demo".parse::<BuiltinTimeline>().unwrap(), BuiltinTimeline::Demo);
        assert!("playoffs".parse::<BuiltinTimeline>().is_err());
    }
}
