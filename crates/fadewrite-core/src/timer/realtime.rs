//! Tokio-backed timer service.
//!
//! Every scheduled callback is a spawned task that sends its [`Wakeup`] on an
//! unbounded channel. Cancellation goes through a per-handle
//! [`CancellationToken`]; a wakeup that was already sent before cancellation
//! is caught by the engine's generation check instead.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{duration_ms, Millis, TimerHandle, TimerService, Wakeup};

/// Real-time timer service. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioTimers {
    origin: Instant,
    tx: mpsc::UnboundedSender<Wakeup>,
    next_id: u64,
    live: HashMap<TimerHandle, CancellationToken>,
}

impl TokioTimers {
    /// Create the service and the receiving end the host loop must drain.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Wakeup>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            origin: Instant::now(),
            tx,
            next_id: 0,
            live: HashMap::new(),
        };
        (timers, rx)
    }

    /// Number of callbacks that have not been cancelled.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    fn register(&mut self) -> (TimerHandle, CancellationToken) {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let token = CancellationToken::new();
        self.live.insert(handle, token.clone());
        (handle, token)
    }
}

impl TimerService for TokioTimers {
    fn now(&self) -> Millis {
        duration_ms(self.origin.elapsed())
    }

    fn schedule_once(&mut self, delay: Duration, wakeup: Wakeup) -> TimerHandle {
        let (handle, token) = self.register();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(wakeup);
                }
            }
        });
        handle
    }

    fn schedule_repeating(&mut self, period: Duration, wakeup: Wakeup) -> TimerHandle {
        let (handle, token) = self.register();
        let tx = self.tx.clone();
        let period = period.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            // Late samples are fine: the engine reads the clock, not the tick count.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(wakeup).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(token) = self.live.remove(&handle) {
            token.cancel();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, token) in self.live.drain() {
            token.cancel();
        }
    }
}
