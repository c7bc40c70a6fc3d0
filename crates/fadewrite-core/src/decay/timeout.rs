use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inactivity allowance for the Decaying phase, in whole seconds.
///
/// Always within `MIN..=MAX`; a value of zero can never reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TimeoutSeconds(u32);

impl TimeoutSeconds {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 30;
    pub const DEFAULT: TimeoutSeconds = TimeoutSeconds(5);

    /// Validate user input. Out-of-range values are rejected.
    pub fn new(secs: u32) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(ConfigError::OutOfRange {
                key: "decay.timeout_seconds".into(),
                value: i64::from(secs),
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
            })
        }
    }

    /// Parse user input such as `"12"`. Negative and oversized numbers are
    /// reported as out of range rather than as parse failures.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let secs: i64 = input.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: "decay.timeout_seconds".into(),
            message: format!("'{input}' is not a whole number of seconds"),
        })?;
        match u32::try_from(secs) {
            Ok(secs) => Self::new(secs),
            Err(_) => Err(ConfigError::OutOfRange {
                key: "decay.timeout_seconds".into(),
                value: secs,
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
            }),
        }
    }

    /// Clamp a stored value into range.
    pub fn clamped(secs: i64) -> Self {
        Self(secs.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_millis(self) -> u64 {
        u64::from(self.0) * 1000
    }

    pub fn as_secs_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for TimeoutSeconds {
    type Error = ConfigError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::new(secs)
    }
}

impl From<TimeoutSeconds> for u32 {
    fn from(t: TimeoutSeconds) -> u32 {
        t.0
    }
}

impl fmt::Display for TimeoutSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
