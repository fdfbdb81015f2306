//! Civil (wall-clock) time of day.
//!
//! A [`CivilTime`] is an hour and minute with no attached timezone. It only
//! becomes an instant when combined with a date and an explicit offset, see
//! [`crate::calculation::to_instant`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calculation::parse_civil_time;
use crate::error::{EngineError, EngineResult};

/// Number of minutes in a civil day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// An `HH:MM` wall-clock value.
///
/// Ordering is numeric (hour first, then minute), so `09:05 < 10:00` holds
/// regardless of how the value was originally written.
///
/// # Example
///
/// ```
/// use attendance_engine::models::CivilTime;
///
/// let start: CivilTime = "09:30".parse().unwrap();
/// assert_eq!(start.minutes_of_day(), 570);
/// assert_eq!(start.to_string(), "09:30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilTime {
    hour: u8,
    minute: u8,
}

impl CivilTime {
    /// Const constructor for literals known to be in range.
    pub(crate) const fn hm(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Creates a civil time, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> EngineResult<Self> {
        if hour > 23 {
            return Err(EngineError::format(
                format!("{hour}:{minute}"),
                "hour must be between 0 and 23",
            ));
        }
        if minute > 59 {
            return Err(EngineError::format(
                format!("{hour}:{minute}"),
                "minute must be between 0 and 59",
            ));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Builds a civil time from minutes after midnight.
    pub fn from_minutes_of_day(minutes: u32) -> EngineResult<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(EngineError::format(
                minutes.to_string(),
                "minutes of day must be below 1440",
            ));
        }
        Self::new(minutes / 60, minutes % 60)
    }

    /// The hour component, 0..=23.
    pub fn hour(&self) -> u32 {
        u32::from(self.hour)
    }

    /// The minute component, 0..=59.
    pub fn minute(&self) -> u32 {
        u32::from(self.minute)
    }

    /// Minutes after midnight (`hour * 60 + minute`).
    pub fn minutes_of_day(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for CivilTime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_civil_time(s)
    }
}

impl Serialize for CivilTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CivilTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_civil_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(CivilTime::new(24, 0).is_err());
        assert!(CivilTime::new(0, 60).is_err());
        assert!(CivilTime::new(23, 59).is_ok());
    }

    #[test]
    fn test_ordering_is_numeric() {
        let early = CivilTime::new(9, 5).unwrap();
        let late = CivilTime::new(10, 0).unwrap();
        assert!(early < late);
        assert!(early.minutes_of_day() < late.minutes_of_day());
    }

    #[test]
    fn test_from_minutes_of_day() {
        let t = CivilTime::from_minutes_of_day(601).unwrap();
        assert_eq!((t.hour(), t.minute()), (10, 1));
        assert!(CivilTime::from_minutes_of_day(MINUTES_PER_DAY).is_err());
    }

    #[test]
    fn test_serializes_as_padded_string() {
        let t = CivilTime::new(7, 5).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:05\"");
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        assert!(serde_json::from_str::<CivilTime>("\"7:05\"").is_err());
        let t: CivilTime = serde_json::from_str("\"18:00\"").unwrap();
        assert_eq!(t.minutes_of_day(), 1080);
    }
}
