//! Virtual-time timer service.
//!
//! Nothing fires on its own. The owner pulls due wakeups with
//! [`ManualTimers::fire_next`] and decides when the clock moves.

use std::time::Duration;

use super::{duration_ms, Millis, TimerHandle, TimerService, Wakeup};

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TimerHandle,
    due: Millis,
    period: Option<Millis>,
    wakeup: Wakeup,
}

/// Deterministic timer service driven by explicit clock advancement.
#[derive(Debug, Default, Clone)]
pub struct ManualTimers {
    now: Millis,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks still scheduled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward to `at`. Moving backwards is ignored.
    ///
    /// Callbacks that become due are not fired; use [`Self::fire_next`].
    pub fn set_now(&mut self, at: Millis) {
        self.now = self.now.max(at);
    }

    /// Pop the earliest callback due at or before `until`, moving the clock to
    /// its due time. Repeating callbacks are re-armed one period later.
    ///
    /// Ties are broken by scheduling order.
    pub fn fire_next(&mut self, until: Millis) -> Option<Wakeup> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= until)
            .min_by_key(|(_, s)| (s.due, s.handle))
            .map(|(i, _)| i)?;

        let entry = &mut self.pending[idx];
        let wakeup = entry.wakeup;
        self.now = self.now.max(entry.due);
        // A repeating callback that would land past the end of time is retired.
        match entry.period.and_then(|period| entry.due.checked_add(period)) {
            Some(next) => entry.due = next,
            None => {
                self.pending.swap_remove(idx);
            }
        }
        Some(wakeup)
    }

    fn push(&mut self, delay: Millis, period: Option<Millis>, wakeup: Wakeup) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(Scheduled {
            handle,
            due: self.now.saturating_add(delay),
            period,
            wakeup,
        });
        handle
    }
}

impl TimerService for ManualTimers {
    fn now(&self) -> Millis {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle {
        self.push(duration_ms(delay), None, wakeup)
    }

    fn schedule_repeating(&mut self, period: Duration, wakeup: Wakeup) -> TimerHandle {
        // A zero period would never let the clock move past it.
        let period = duration_ms(period).max(1);
        self.push(period, Some(period), wakeup)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|s| s.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: Wakeup = Wakeup::GraceElapsed { generation: 1 };
    const SAMPLE: Wakeup = Wakeup::Sample { generation: 2 };

    #[test]
    fn once_fires_a_single_time() {
        let mut timers = ManualTimers::new();
        timers.schedule_once(Duration::from_millis(1000), GRACE);

        assert_eq!(timers.fire_next(999), None);
        assert_eq!(timers.fire_next(1000), Some(GRACE));
        assert_eq!(timers.now(), 1000);
        assert_eq!(timers.fire_next(10_000), None);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn repeating_rearms_each_period() {
        let mut timers = ManualTimers::new();
        timers.schedule_repeating(Duration::from_millis(100), SAMPLE);

        let mut fired = Vec::new();
        while let Some(w) = timers.fire_next(350) {
            fired.push((w, timers.now()));
        }
        assert_eq!(fired, vec![(SAMPLE, 100), (SAMPLE, 200), (SAMPLE, 300)]);
        assert_eq!(timers.pending(), 1);
    }

    #[test]
    fn cancel_revokes_and_is_idempotent() {
        let mut timers = ManualTimers::new();
        let handle = timers.schedule_once(Duration::from_millis(10), GRACE);
        timers.cancel(handle);
        timers.cancel(handle);
        assert_eq!(timers.fire_next(100), None);
    }

    #[test]
    fn earliest_due_fires_first() {
        let mut timers = ManualTimers::new();
        timers.schedule_once(Duration::from_millis(50), SAMPLE);
        timers.schedule_once(Duration::from_millis(20), GRACE);
        assert_eq!(timers.fire_next(100), Some(GRACE));
        assert_eq!(timers.fire_next(100), Some(SAMPLE));
    }

    #[test]
    fn far_future_schedules_saturate() {
        let mut timers = ManualTimers::new();
        timers.set_now(u64::MAX - 50);
        timers.schedule_once(Duration::MAX, GRACE);
        timers.schedule_repeating(Duration::from_millis(100), SAMPLE);

        assert_eq!(timers.fire_next(u64::MAX), Some(GRACE));
        assert_eq!(timers.now(), u64::MAX);
        // The repeating callback cannot be re-armed past the end of the clock.
        assert_eq!(timers.fire_next(u64::MAX), Some(SAMPLE));
        assert_eq!(timers.fire_next(u64::MAX), None);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut timers = ManualTimers::new();
        timers.set_now(500);
        timers.set_now(200);
        assert_eq!(timers.now(), 500);
    }
}
