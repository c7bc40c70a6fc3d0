//! Clock and timer service used by the decay engine.
//!
//! The engine never sleeps or spawns anything itself. It asks a
//! [`TimerService`] to deliver a [`Wakeup`] later and reacts when the host
//! hands that wakeup back through `handle_wakeup`.
//!
//! - [`ManualTimers`]: virtual clock, advanced explicitly (tests, simulation)
//! - [`TokioTimers`]: real time on the tokio runtime, wakeups arrive on a channel

mod manual;
mod realtime;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use manual::ManualTimers;
pub use realtime::TokioTimers;

/// Milliseconds on the timer service's own monotonic timeline.
pub type Millis = u64;

/// Identifies one scheduled callback so it can be revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub(crate) u64);

/// Callback payload delivered back to the engine.
///
/// Each variant carries the engine generation that scheduled it; a wakeup
/// whose generation no longer matches is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Wakeup {
    GraceElapsed { generation: u64 },
    Sample { generation: u64 },
}

impl Wakeup {
    pub fn generation(&self) -> u64 {
        match *self {
            Wakeup::GraceElapsed { generation } | Wakeup::Sample { generation } => generation,
        }
    }
}

/// Host scheduling primitive: one-shot and repeating callbacks plus a clock.
pub trait TimerService {
    /// Current time on this service's monotonic timeline.
    fn now(&self) -> Millis;

    /// Deliver `wakeup` once after `delay`.
    fn schedule_once(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle;

    /// Deliver `wakeup` every `period` until cancelled.
    fn schedule_repeating(&mut self, period: Duration, wakeup: Wakeup) -> TimerHandle;

    /// Revoke a scheduled callback. Unknown or already-fired handles are a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

pub(crate) fn duration_ms(d: Duration) -> Millis {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
