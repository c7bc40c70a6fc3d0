//! Writing session controller.
//!
//! Owns the buffer and the decay engine, turns engine output into
//! [`Event`]s, and hands long enough buffers to the archive before wiping
//! them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::words::word_count;
use crate::decay::{DecayEngine, DecayOutput, DecayPhase, Easing, TimeoutSeconds};
use crate::error::{ConfigError, CoreError, SessionError};
use crate::events::{Command, Event};
use crate::present::DecayFrame;
use crate::storage::Archive;
use crate::timer::{duration_ms, ManualTimers, Millis, TimerService, Wakeup};

/// Buffers with fewer words are not worth archiving.
pub const DEFAULT_MIN_ARCHIVE_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub active: bool,
    pub started_at: DateTime<Utc>,
    pub buffer_text: String,
}

/// A single writing session at a time, plus its decay engine.
pub struct WritingSession<T: TimerService, A: Archive> {
    engine: DecayEngine<T>,
    archive: A,
    session: Option<Session>,
    min_archive_words: usize,
}

impl<T: TimerService, A: Archive> WritingSession<T, A> {
    pub fn new(engine: DecayEngine<T>, archive: A) -> Self {
        Self {
            engine,
            archive,
            session: None,
            min_archive_words: DEFAULT_MIN_ARCHIVE_WORDS,
        }
    }

    pub fn with_min_archive_words(mut self, min_words: usize) -> Self {
        self.min_archive_words = min_words;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.active)
    }

    /// Current buffer; empty when no session is active.
    pub fn buffer(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.buffer_text.as_str())
            .unwrap_or("")
    }

    pub fn phase(&self) -> DecayPhase {
        self.engine.phase()
    }

    pub fn last_frame(&self) -> Option<DecayFrame> {
        self.engine.last_frame()
    }

    pub fn engine(&self) -> &DecayEngine<T> {
        &self.engine
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn archive_mut(&mut self) -> &mut A {
        &mut self.archive
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session with `initial_text` in the buffer.
    ///
    /// # Errors
    /// [`SessionError::AlreadyActive`] if a session is running; call
    /// [`Self::reset`] first.
    pub fn start(&mut self, initial_text: &str) -> Result<Vec<Event>, SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }
        let session = Session {
            id: Uuid::new_v4(),
            active: true,
            started_at: Utc::now(),
            buffer_text: initial_text.to_string(),
        };
        let event = Event::SessionStarted {
            session_id: session.id,
            initial_words: word_count(initial_text),
            at: session.started_at,
        };
        info!(session_id = %session.id, "writing session started");
        self.session = Some(session);
        self.engine.on_session_start();
        Ok(vec![event])
    }

    /// Record a buffer mutation. Must be called on every edit.
    ///
    /// Ignored when no session is active. If the deadline already passed the
    /// edit is discarded and the destruction runs instead.
    pub fn handle_activity(&mut self, new_text: &str) -> Vec<Event> {
        if !self.is_active() {
            debug!("edit without an active session ignored");
            return Vec::new();
        }
        if let Some(DecayOutput::Destroyed(frame)) = self.engine.on_activity() {
            return self.on_destroyed(frame);
        }
        if let Some(session) = self.session.as_mut() {
            session.buffer_text.clear();
            session.buffer_text.push_str(new_text);
        }
        vec![Event::ActivityObserved {
            word_count: word_count(new_text),
            at: Utc::now(),
        }]
    }

    /// Drop the session and stop the engine. Safe to call at any time.
    pub fn reset(&mut self) -> Vec<Event> {
        if let Some(session) = self.session.take() {
            info!(session_id = %session.id, "writing session reset");
        }
        self.engine.stop();
        vec![Event::SessionReset { at: Utc::now() }]
    }

    /// Validate and apply a new timeout. Applies from the next Decaying phase.
    ///
    /// # Errors
    /// [`ConfigError::OutOfRange`]; the prior value stays in effect.
    pub fn set_timeout(&mut self, secs: u32) -> Result<Event, ConfigError> {
        let timeout = TimeoutSeconds::new(secs).map_err(|e| {
            warn!(requested = secs, kept = %self.engine.timeout(), "timeout rejected");
            e
        })?;
        self.engine.set_timeout(timeout);
        Ok(Event::TimeoutChanged {
            timeout_seconds: timeout.get(),
            at: Utc::now(),
        })
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.engine.set_easing(easing);
    }

    /// Deliver a timer callback to the engine.
    pub fn handle_wakeup(&mut self, wakeup: Wakeup) -> Vec<Event> {
        match self.engine.handle_wakeup(wakeup) {
            Some(DecayOutput::Tick(frame)) => vec![Event::decay_tick(&frame)],
            Some(DecayOutput::Destroyed(frame)) => self.on_destroyed(frame),
            None => Vec::new(),
        }
    }

    /// Apply a collaborator request.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Event>, CoreError> {
        match command {
            Command::UserRequestedStart { initial_text } => {
                Ok(self.start(initial_text.as_deref().unwrap_or(""))?)
            }
            Command::UserEditedText { new_text } => Ok(self.handle_activity(&new_text)),
            Command::UserRequestedReset => Ok(self.reset()),
            Command::TimeoutSettingChanged { new_value } => Ok(vec![self.set_timeout(new_value)?]),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_destroyed(&mut self, frame: DecayFrame) -> Vec<Event> {
        let final_text = self
            .session
            .take()
            .map(|s| s.buffer_text)
            .unwrap_or_default();
        let words = word_count(&final_text);

        let archived = words >= self.min_archive_words
            && match self.archive.archive(&final_text, words) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, words, "archiving destroyed text failed");
                    false
                }
            };
        info!(words, archived, "text destroyed");

        vec![
            Event::decay_tick(&frame),
            Event::TextDestroyed {
                final_text,
                word_count: words,
                archived,
                at: Utc::now(),
            },
        ]
    }
}

impl<A: Archive> WritingSession<ManualTimers, A> {
    /// Move virtual time forward by `by`, delivering due callbacks in order.
    pub fn advance(&mut self, by: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        self.advance_timed(by, |_, event| events.push(event));
        events
    }

    /// Like [`Self::advance`], reporting each event with the virtual time of
    /// the callback that produced it.
    pub fn advance_timed(&mut self, by: Duration, mut emit: impl FnMut(Millis, Event)) {
        let until = self.engine.timers().now().saturating_add(duration_ms(by));
        while let Some(wakeup) = self.engine.timers_mut().fire_next(until) {
            let at = self.engine.timers().now();
            for event in self.handle_wakeup(wakeup) {
                emit(at, event);
            }
        }
        self.engine.timers_mut().set_now(until);
    }
}
