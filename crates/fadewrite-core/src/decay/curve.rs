//! Easing curves mapping decay fraction to visual intensity.
//!
//! Every curve is monotone on `[0, 1]` with `f(0) = 0` and `f(1) = 1`. The
//! engine adds a running floor on top, so swapping curves never breaks the
//! non-decreasing contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    Linear,
    #[default]
    Quadratic,
    Cubic,
}

impl Easing {
    /// Map `decayed` (`1 - progress`) to intensity. Input is clamped to `[0, 1]`.
    pub fn apply(self, decayed: f64) -> f64 {
        let x = if decayed.is_nan() { 0.0 } else { decayed.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => x,
            Easing::Quadratic => x * x,
            Easing::Cubic => x * x * x,
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Easing::Linear => "linear",
            Easing::Quadratic => "quadratic",
            Easing::Cubic => "cubic",
        })
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "quadratic" => Ok(Easing::Quadratic),
            "cubic" => Ok(Easing::Cubic),
            other => Err(format!("unknown easing '{other}' (expected linear, quadratic or cubic)")),
        }
    }
}

/// Heartbeat glow for the current second: full on the beat, fading to zero
/// before the next one. Scaled by intensity so it grows as the deadline nears.
pub fn pulse(elapsed_ms: u64, intensity: f64) -> f64 {
    if elapsed_ms < 1000 {
        return 0.0;
    }
    let frac = (elapsed_ms % 1000) as f64 / 1000.0;
    (1.0 - frac).powi(3) * intensity.clamp(0.0, 1.0)
}
