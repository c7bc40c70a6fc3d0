//! Decay engine implementation.
//!
//! The decay engine is a wall-clock-based state machine. It owns no threads;
//! the host hands timer callbacks back through [`DecayEngine::handle_wakeup`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Grace -> Decaying -> (Grace on activity | Destroyed -> Idle)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = DecayEngine::new(timers, TimeoutSeconds::DEFAULT, Easing::default());
//! engine.on_session_start();
//! // On every keystroke:
//! engine.on_activity();
//! // On every wakeup delivered by the timer service:
//! engine.handle_wakeup(wakeup); // Some(DecayOutput::Destroyed { .. }) at the deadline
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::curve::{self, Easing};
use super::timeout::TimeoutSeconds;
use crate::present::DecayFrame;
use crate::timer::{duration_ms, ManualTimers, Millis, TimerHandle, TimerService, Wakeup};

/// Quiet period after activity before any visible decay.
pub const GRACE_DELAY: Duration = Duration::from_secs(1);

/// Cadence of the Decaying sampling loop.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayPhase {
    Idle,
    Grace,
    Decaying,
}

/// What the engine reports back to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecayOutput {
    /// One sample of the Decaying phase.
    Tick(DecayFrame),
    /// The deadline passed. Carries the final frame (intensity 1.0, progress 0.0).
    /// The engine is already back in `Idle` when this is returned.
    Destroyed(DecayFrame),
}

/// Snapshot taken on Decaying entry. Settings changed afterwards do not
/// touch it.
#[derive(Debug, Clone, Copy)]
struct Decaying {
    started_at: Millis,
    timeout: TimeoutSeconds,
    easing: Easing,
    last_whole_second: u64,
    intensity_floor: f64,
    progress_ceiling: f64,
}

/// Core decay engine.
///
/// Every transition revokes the pending callback and bumps `generation`
/// before scheduling anything new, so at most one callback chain is alive.
#[derive(Debug)]
pub struct DecayEngine<T: TimerService> {
    timers: T,
    phase: DecayPhase,
    phase_started_at: Millis,
    timeout: TimeoutSeconds,
    easing: Easing,
    generation: u64,
    pending: Option<TimerHandle>,
    decaying: Option<Decaying>,
    last_frame: Option<DecayFrame>,
}

impl<T: TimerService> DecayEngine<T> {
    /// Create an idle engine on top of `timers`.
    pub fn new(timers: T, timeout: TimeoutSeconds, easing: Easing) -> Self {
        let now = timers.now();
        Self {
            timers,
            phase: DecayPhase::Idle,
            phase_started_at: now,
            timeout,
            easing,
            generation: 0,
            pending: None,
            decaying: None,
            last_frame: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> DecayPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase_started_at(&self) -> Millis {
        self.phase_started_at
    }

    /// Configured timeout for the next Decaying phase.
    pub fn timeout(&self) -> TimeoutSeconds {
        self.timeout
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Most recent frame of the current Decaying phase.
    pub fn last_frame(&self) -> Option<DecayFrame> {
        self.last_frame
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn on_session_start(&mut self) {
        self.enter_grace();
    }

    /// Restart the grace period.
    ///
    /// If the deletion deadline has already passed the deletion wins: the
    /// engine returns `Destroyed` and the activity is dropped.
    pub fn on_activity(&mut self) -> Option<DecayOutput> {
        if let Some(state) = self.decaying {
            let now = self.timers.now();
            if now.saturating_sub(state.started_at) >= state.timeout.as_millis() {
                debug!(generation = self.generation, "activity after deadline; destroying");
                let frame = self.sample_at(now);
                return Some(self.destroy(frame));
            }
        }
        self.enter_grace();
        None
    }

    /// Revoke everything and go `Idle`. Calling it again changes nothing.
    pub fn stop(&mut self) {
        if self.phase == DecayPhase::Idle && self.pending.is_none() {
            return;
        }
        self.transition(DecayPhase::Idle);
        debug!(generation = self.generation, "decay engine stopped");
    }

    /// Takes effect on the next Decaying phase.
    pub fn set_timeout(&mut self, timeout: TimeoutSeconds) {
        self.timeout = timeout;
    }

    /// Takes effect on the next Decaying phase.
    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    /// Route a timer callback. Stale generations are ignored.
    pub fn handle_wakeup(&mut self, wakeup: Wakeup) -> Option<DecayOutput> {
        if wakeup.generation() != self.generation {
            trace!(?wakeup, current = self.generation, "stale wakeup ignored");
            return None;
        }
        match (wakeup, self.phase) {
            (Wakeup::GraceElapsed { .. }, DecayPhase::Grace) => Some(self.on_grace_elapsed()),
            (Wakeup::Sample { .. }, DecayPhase::Decaying) => Some(self.sample()),
            _ => {
                trace!(?wakeup, phase = ?self.phase, "wakeup does not match phase");
                None
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_grace(&mut self) {
        self.transition(DecayPhase::Grace);
        let wakeup = Wakeup::GraceElapsed {
            generation: self.generation,
        };
        self.pending = Some(self.timers.schedule_once(GRACE_DELAY, wakeup));
    }

    fn on_grace_elapsed(&mut self) -> DecayOutput {
        self.transition(DecayPhase::Decaying);
        self.decaying = Some(Decaying {
            started_at: self.phase_started_at,
            timeout: self.timeout,
            easing: self.easing,
            last_whole_second: 0,
            intensity_floor: 0.0,
            progress_ceiling: 1.0,
        });
        let wakeup = Wakeup::Sample {
            generation: self.generation,
        };
        self.pending = Some(self.timers.schedule_repeating(SAMPLE_INTERVAL, wakeup));
        debug!(
            generation = self.generation,
            timeout = %self.timeout,
            "decay started"
        );
        let frame = self.sample_at(self.phase_started_at);
        DecayOutput::Tick(frame)
    }

    fn sample(&mut self) -> DecayOutput {
        let frame = self.sample_at(self.timers.now());
        if frame.remaining_seconds <= 0.0 {
            self.destroy(frame)
        } else {
            DecayOutput::Tick(frame)
        }
    }

    fn destroy(&mut self, frame: DecayFrame) -> DecayOutput {
        self.transition(DecayPhase::Idle);
        info!(generation = self.generation, "decay deadline reached");
        DecayOutput::Destroyed(frame)
    }

    /// Derive a frame from wall-clock time since Decaying entry.
    ///
    /// Nothing is accumulated between samples except the monotone floors, so a
    /// late or skipped sample cannot shift the deadline.
    fn sample_at(&mut self, now: Millis) -> DecayFrame {
        let timeout = self.timeout;
        let Some(state) = self.decaying.as_mut() else {
            return DecayFrame::fresh(timeout.as_secs_f64());
        };

        let elapsed_ms = now.saturating_sub(state.started_at);
        let timeout_ms = state.timeout.as_millis();
        let remaining_ms = timeout_ms.saturating_sub(elapsed_ms);

        let progress = (remaining_ms as f64 / timeout_ms as f64).min(state.progress_ceiling);
        state.progress_ceiling = progress;

        let intensity = if remaining_ms == 0 {
            1.0
        } else {
            state.easing.apply(1.0 - progress).max(state.intensity_floor)
        };
        state.intensity_floor = intensity;

        let whole = elapsed_ms / 1000;
        let heartbeat = whole > state.last_whole_second;
        state.last_whole_second = state.last_whole_second.max(whole);

        let frame = DecayFrame {
            progress,
            intensity,
            pulse: curve::pulse(elapsed_ms, intensity),
            heartbeat,
            remaining_seconds: remaining_ms as f64 / 1000.0,
        };
        self.last_frame = Some(frame);
        frame
    }

    fn transition(&mut self, to: DecayPhase) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(handle);
        }
        self.generation += 1;
        self.phase = to;
        self.phase_started_at = self.timers.now();
        self.decaying = None;
        if to != DecayPhase::Decaying {
            self.last_frame = None;
        }
        trace!(generation = self.generation, phase = ?to, "transition");
    }
}

impl DecayEngine<ManualTimers> {
    /// Move virtual time forward by `by`, delivering every callback that falls
    /// due on the way, in order.
    pub fn advance(&mut self, by: Duration) -> Vec<DecayOutput> {
        let until = self.timers.now().saturating_add(duration_ms(by));
        let mut out = Vec::new();
        while let Some(wakeup) = self.timers.fire_next(until) {
            out.extend(self.handle_wakeup(wakeup));
        }
        self.timers.set_now(until);
        out
    }
}
