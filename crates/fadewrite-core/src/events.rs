use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::present::DecayFrame;

/// Every observable change of a writing session produces an Event.
/// Renderers and collaborators subscribe to them; nothing feeds back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        initial_words: usize,
        at: DateTime<Utc>,
    },
    ActivityObserved {
        word_count: usize,
        at: DateTime<Utc>,
    },
    DecayTick {
        progress: f64,
        intensity: f64,
        pulse: f64,
        remaining_seconds: f64,
        heartbeat: bool,
        at: DateTime<Utc>,
    },
    /// The buffer was wiped after the deadline.
    TextDestroyed {
        final_text: String,
        word_count: usize,
        /// Whether the text was handed to the history archive.
        archived: bool,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// Applies from the next Decaying phase on.
    TimeoutChanged {
        timeout_seconds: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn decay_tick(frame: &DecayFrame) -> Self {
        Event::DecayTick {
            progress: frame.progress,
            intensity: frame.intensity,
            pulse: frame.pulse,
            remaining_seconds: frame.remaining_seconds,
            heartbeat: frame.heartbeat,
            at: Utc::now(),
        }
    }

    /// The decay frame carried by a `DecayTick`.
    pub fn frame(&self) -> Option<DecayFrame> {
        match *self {
            Event::DecayTick {
                progress,
                intensity,
                pulse,
                remaining_seconds,
                heartbeat,
                ..
            } => Some(DecayFrame {
                progress,
                intensity,
                pulse,
                heartbeat,
                remaining_seconds,
            }),
            _ => None,
        }
    }

    /// Short snake_case name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::ActivityObserved { .. } => "activity_observed",
            Event::DecayTick { .. } => "decay_tick",
            Event::TextDestroyed { .. } => "text_destroyed",
            Event::SessionReset { .. } => "session_reset",
            Event::TimeoutChanged { .. } => "timeout_changed",
        }
    }
}

/// Requests consumed from the editor surface and the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    UserRequestedStart { initial_text: Option<String> },
    UserEditedText { new_text: String },
    UserRequestedReset,
    /// Raw value from the settings surface; validated before use.
    TimeoutSettingChanged { new_value: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::SessionReset { at: Utc::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_reset");
        assert_eq!(event.kind(), "session_reset");
    }

    #[test]
    fn decay_tick_copies_frame() {
        let frame = DecayFrame {
            progress: 0.25,
            intensity: 0.5625,
            pulse: 0.1,
            heartbeat: true,
            remaining_seconds: 1.25,
        };
        assert_eq!(Event::decay_tick(&frame).frame(), Some(frame));
        match Event::decay_tick(&frame) {
            Event::DecayTick {
                progress,
                intensity,
                heartbeat,
                remaining_seconds,
                ..
            } => {
                assert_eq!(progress, 0.25);
                assert_eq!(intensity, 0.5625);
                assert!(heartbeat);
                assert_eq!(remaining_seconds, 1.25);
            }
            other => panic!("expected DecayTick, got {other:?}"),
        }
    }

    #[test]
    fn commands_parse_from_json() {
        let cmd: Command =
            serde_json::from_str(r#"{"type":"user_edited_text","new_text":"hello"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::UserEditedText {
                new_text: "hello".into()
            }
        );
    }
}
