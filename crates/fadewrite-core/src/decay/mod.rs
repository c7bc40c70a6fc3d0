mod curve;
mod engine;
mod timeout;

pub use curve::{pulse, Easing};
pub use engine::{DecayEngine, DecayOutput, DecayPhase, GRACE_DELAY, SAMPLE_INTERVAL};
pub use timeout::TimeoutSeconds;
