//! Presentation contract.
//!
//! Renderers receive decay frames and the destroyed notification. Nothing
//! flows back: a presenter cannot influence the engine.

use serde::{Deserialize, Serialize};

/// One sample of the Decaying phase as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayFrame {
    /// 1.0 = fresh, 0.0 = about to delete. Non-increasing within a phase.
    pub progress: f64,
    /// Visual degradation in `[0, 1]`. Non-decreasing within a phase, exactly
    /// 1.0 when `remaining_seconds` hits zero.
    pub intensity: f64,
    /// Heartbeat glow in `[0, 1]`; rendering emphasis only.
    pub pulse: f64,
    /// True on the first sample of each whole elapsed second.
    pub heartbeat: bool,
    pub remaining_seconds: f64,
}

impl DecayFrame {
    /// Undistorted frame with the full allowance remaining.
    pub fn fresh(timeout_secs: f64) -> Self {
        Self {
            progress: 1.0,
            intensity: 0.0,
            pulse: 0.0,
            heartbeat: false,
            remaining_seconds: timeout_secs,
        }
    }
}

/// Renderer for a writing session.
pub trait Presenter {
    /// Called for every decay sample with the text being degraded.
    fn on_frame(&mut self, text: &str, frame: &DecayFrame);

    /// The buffer was wiped. `final_text` is what it held.
    fn on_destroyed(&mut self, final_text: &str, word_count: usize);

    /// Activity, start or reset: drop any distortion and show `text` plainly.
    fn on_restore(&mut self, text: &str);

    /// Out-of-band message such as a failed draft save.
    fn on_status(&mut self, _message: &str) {}
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn on_frame(&mut self, text: &str, frame: &DecayFrame) {
        (**self).on_frame(text, frame)
    }

    fn on_destroyed(&mut self, final_text: &str, word_count: usize) {
        (**self).on_destroyed(final_text, word_count)
    }

    fn on_restore(&mut self, text: &str) {
        (**self).on_restore(text)
    }

    fn on_status(&mut self, message: &str) {
        (**self).on_status(message)
    }
}
