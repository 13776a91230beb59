//! Managed value types that cross the boundary by copy.

use serde::{Deserialize, Serialize};

/// Minutes since the start of the day.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time of day with minute resolution.
///
/// The native side transports times as milliseconds since midnight; the
/// adapter floors them to whole minutes, which is the documented lossy edge
/// of the time conversion. Values are always within `0..1440` minutes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Build a time of day from hour and minute components.
    ///
    /// Returns `None` when `hour >= 24` or `minute >= 60`.
    #[must_use]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Build a time of day from minutes since midnight.
    ///
    /// Returns `None` when `minutes` is a day or more.
    #[must_use]
    pub fn from_minutes_since_midnight(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self { minutes })
    }

    /// Hour component in `0..24`.
    #[must_use]
    pub fn hour(self) -> u8 {
        u8::try_from(self.minutes / 60).unwrap_or(0)
    }

    /// Minute component in `0..60`.
    #[must_use]
    pub fn minute(self) -> u8 {
        u8::try_from(self.minutes % 60).unwrap_or(0)
    }

    /// Minutes since midnight in `0..1440`.
    #[must_use]
    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }
}
