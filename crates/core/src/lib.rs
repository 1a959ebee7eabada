//! Core library for the Second Screen companion display.
//!
//! A [`Timer`] tracks how far into the broadcast the viewer is, and a
//! [`Scheduler`] resolves which overlay event is active, which clip is
//! playing and what comes next on a static [`Timeline`]. [`Session`] wires the
//! two together with the event testing override, and [`Ticker`] drives a
//! session at a fixed rate.

pub mod clock;
pub mod config;
pub mod error;
pub mod registry;
pub mod schedule;
pub mod session;
pub mod testing;
pub mod ticker;
pub mod timeline;

pub use clock::{ManualClock, MonotonicClock, SystemClock, Timer};
pub use config::{AppConfig, TestingConfig, TickerConfig, TimelineSource, ValidationMode};
pub use error::{Result, SecondScreenError};
pub use registry::{HeadlineRenderer, OverlayRenderer, RendererRegistry};
pub use schedule::{Mode, ScheduleSnapshot, Scheduler};
pub use session::{ScheduleChange, Session, SharedSession};
pub use testing::{EventTesting, PresentedSchedule};
pub use ticker::{interval_for_fps, Ticker};
pub use timeline::{BuiltinTimeline, Clip, EventKind, Payload, Timeline, TimelineEvent, TimelineIssue};
