//! Deterministic simulation harness for writing sessions.
//!
//! Replays a typing script on virtual time so decay behaviour can be checked
//! without waiting in real time:
//! - Scripted starts, edits, waits, resets and timeout changes
//! - Every emitted event stamped with its virtual time
//! - Reproducible reports for regression tests and the `simulate` command

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::decay::{DecayEngine, Easing, TimeoutSeconds};
use crate::error::CoreError;
use crate::events::{Command, Event};
use crate::session::WritingSession;
use crate::storage::MemoryStore;
use crate::timer::{ManualTimers, Millis, TimerService};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Start {
        #[serde(default)]
        text: Option<String>,
    },
    /// Replace the buffer with `text`.
    Type { text: String },
    Wait { secs: f64 },
    Reset,
    SetTimeout { secs: u32 },
}

/// An event with the virtual time it was emitted at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at_ms: Millis,
    pub event: Event,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationReport {
    pub events: Vec<TimedEvent>,
    /// Steps rejected by the session (e.g. start while active), with reasons.
    pub rejected: Vec<String>,
}

impl SimulationReport {
    pub fn destroyed(&self) -> Vec<&TimedEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e.event, Event::TextDestroyed { .. }))
            .collect()
    }

    pub fn entered_decay(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.event, Event::DecayTick { .. }))
    }

    /// Events without the per-sample ticks.
    pub fn discrete(&self) -> impl Iterator<Item = &TimedEvent> {
        self.events
            .iter()
            .filter(|e| !matches!(e.event, Event::DecayTick { .. }))
    }
}

/// Build a script from inter-keystroke gaps: wait, type one more word, repeat.
/// The last gap is a trailing wait with no keystroke after it.
pub fn script_from_gaps(gaps: &[f64], words: &[&str]) -> Vec<Step> {
    let mut steps = vec![Step::Start { text: None }];
    let mut text = String::new();
    for (i, gap) in gaps.iter().enumerate() {
        steps.push(Step::Wait { secs: *gap });
        if i + 1 < gaps.len() {
            if !text.is_empty() {
                text.push(' ');
            }
            let word = if words.is_empty() {
                "word"
            } else {
                words[i % words.len()]
            };
            text.push_str(word);
            steps.push(Step::Type { text: text.clone() });
        }
    }
    steps
}

/// Session on virtual time with an in-memory archive.
pub struct Simulation {
    session: WritingSession<ManualTimers, MemoryStore>,
}

impl Simulation {
    pub fn new(timeout: TimeoutSeconds, easing: Easing) -> Self {
        let engine = DecayEngine::new(ManualTimers::new(), timeout, easing);
        Self {
            session: WritingSession::new(engine, MemoryStore::new()),
        }
    }

    pub fn with_min_archive_words(mut self, min_words: usize) -> Self {
        self.session = self.session.with_min_archive_words(min_words);
        self
    }

    pub fn session(&self) -> &WritingSession<ManualTimers, MemoryStore> {
        &self.session
    }

    pub fn run(&mut self, steps: &[Step]) -> SimulationReport {
        let mut report = SimulationReport::default();
        for step in steps {
            if let Err(e) = self.apply(step, &mut report.events) {
                report.rejected.push(format!("{step:?}: {e}"));
            }
        }
        report
    }

    fn apply(&mut self, step: &Step, out: &mut Vec<TimedEvent>) -> Result<(), CoreError> {
        let command = match step {
            Step::Wait { secs } => {
                // Waits too long for a Duration idle until the end of the clock.
                let by = Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX);
                self.session
                    .advance_timed(by, |at_ms, event| out.push(TimedEvent { at_ms, event }));
                return Ok(());
            }
            Step::Start { text } => Command::UserRequestedStart {
                initial_text: text.clone(),
            },
            Step::Type { text } => Command::UserEditedText {
                new_text: text.clone(),
            },
            Step::Reset => Command::UserRequestedReset,
            Step::SetTimeout { secs } => Command::TimeoutSettingChanged { new_value: *secs },
        };
        let at_ms = self.now();
        let events = self.session.dispatch(command)?;
        out.extend(events.into_iter().map(|event| TimedEvent { at_ms, event }));
        Ok(())
    }

    fn now(&self) -> Millis {
        self.session.engine().timers().now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaps_become_waits_and_growing_text() {
        let steps = script_from_gaps(&[0.5, 0.5, 7.0], &["alpha", "beta"]);
        assert_eq!(
            steps,
            vec![
                Step::Start { text: None },
                Step::Wait { secs: 0.5 },
                Step::Type { text: "alpha".into() },
                Step::Wait { secs: 0.5 },
                Step::Type { text: "alpha beta".into() },
                Step::Wait { secs: 7.0 },
            ]
        );
    }

    #[test]
    fn events_are_stamped_with_virtual_time() {
        let mut sim = Simulation::new(TimeoutSeconds::new(2).unwrap(), Easing::Linear);
        let report = sim.run(&[Step::Start { text: None }, Step::Wait { secs: 4.0 }]);

        let destroyed = report.destroyed();
        assert_eq!(destroyed.len(), 1);
        assert_eq!(destroyed[0].at_ms, 3_000);
        assert_eq!(report.events[0].at_ms, 0);
        assert!(report.entered_decay());
    }

    #[test]
    fn rejected_steps_are_reported() {
        let mut sim = Simulation::new(TimeoutSeconds::DEFAULT, Easing::Linear);
        let report = sim.run(&[
            Step::Start { text: None },
            Step::Start { text: None },
            Step::SetTimeout { secs: 0 },
        ]);
        assert_eq!(report.rejected.len(), 2);
        assert!(sim.session().is_active());
    }

    #[test]
    fn huge_wait_after_clock_moved_destroys_once() {
        let mut sim = Simulation::new(TimeoutSeconds::DEFAULT, Easing::Linear);
        let report = sim.run(&[
            Step::Start { text: None },
            Step::Wait { secs: 0.5 },
            Step::Wait { secs: 2e16 },
        ]);
        let destroyed = report.destroyed();
        assert_eq!(destroyed.len(), 1);
        assert_eq!(destroyed[0].at_ms, 6_000);
        assert!(report.rejected.is_empty());
        assert!(!sim.session().is_active());
    }

    #[test]
    fn wait_beyond_duration_range_still_destroys() {
        let mut sim = Simulation::new(TimeoutSeconds::DEFAULT, Easing::Linear);
        let report = sim.run(&[Step::Start { text: None }, Step::Wait { secs: 1e300 }]);
        assert_eq!(report.destroyed().len(), 1);
        assert!(!sim.session().is_active());
        assert_eq!(sim.session().engine().timers().now(), u64::MAX);
    }

    #[test]
    fn script_round_trips_through_json() {
        let json = r#"[{"op":"start"},{"op":"type","text":"hi"},{"op":"wait","secs":1.5},{"op":"set_timeout","secs":3},{"op":"reset"}]"#;
        let steps: Vec<Step> = serde_json::from_str(json).unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], Step::Start { text: None });
        assert_eq!(steps[2], Step::Wait { secs: 1.5 });
    }
}
