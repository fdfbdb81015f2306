//! Wall-clock parsing and explicit-offset instant conversion.
//!
//! Every conversion between an absolute instant and business-local time goes
//! through this module, and every function takes the offset as a parameter.
//! Nothing here reads the host's local timezone.

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveTime, Offset, TimeDelta, Timelike, Utc,
};

use crate::error::{EngineError, EngineResult};
use crate::models::CivilTime;

/// Parses a 24-hour `HH:MM` wall-clock value.
///
/// Both components must be exactly two digits. Surrounding whitespace is
/// ignored; seconds are not accepted.
///
/// # Errors
///
/// Returns [`EngineError::FormatError`] for anything that is not a valid
/// `HH:MM` value.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::parse_civil_time;
///
/// let t = parse_civil_time("08:45").unwrap();
/// assert_eq!((t.hour(), t.minute()), (8, 45));
/// assert!(parse_civil_time("8:45").is_err());
/// assert!(parse_civil_time("24:00").is_err());
/// ```
pub fn parse_civil_time(s: &str) -> EngineResult<CivilTime> {
    let trimmed = s.trim();
    // chrono's %H and %M also take single digits.
    if !has_shape(trimmed, "dd:dd") {
        return Err(EngineError::format(s, "expected HH:MM"));
    }

    let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|err| EngineError::format(s, err.to_string()))?;
    CivilTime::new(time.hour(), time.minute())
}

/// Checks `s` against `pattern`, where `d` stands for an ASCII digit and
/// every other character must match itself.
pub(crate) fn has_shape(s: &str, pattern: &str) -> bool {
    s.len() == pattern.len()
        && s.bytes().zip(pattern.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}

/// Formats a civil time as zero-padded `HH:MM`.
pub fn format_civil_time(time: CivilTime) -> String {
    time.to_string()
}

/// Parses a fixed UTC offset written as `±HH:MM` (or `Z`).
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::parse_offset;
///
/// let tokyo = parse_offset("+09:00").unwrap();
/// assert_eq!(tokyo.local_minus_utc(), 9 * 3600);
/// ```
pub fn parse_offset(s: &str) -> EngineResult<FixedOffset> {
    let trimmed = s.trim();
    if trimmed == "Z" {
        return Ok(utc_offset());
    }
    if !(has_shape(trimmed, "+dd:dd") || has_shape(trimmed, "-dd:dd")) {
        return Err(EngineError::format(s, "expected ±HH:MM"));
    }

    trimmed
        .parse::<FixedOffset>()
        .map_err(|err| EngineError::format(s, err.to_string()))
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Composes a business-local date and wall time into an absolute instant.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{parse_civil_time, parse_offset, to_instant};
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let offset = parse_offset("+09:00").unwrap();
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let instant = to_instant(date, parse_civil_time("10:00").unwrap(), offset);
/// assert_eq!(instant, Utc.with_ymd_and_hms(2026, 1, 15, 1, 0, 0).unwrap());
/// ```
pub fn to_instant(date: NaiveDate, time: CivilTime, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN)
        + TimeDelta::minutes(i64::from(time.minutes_of_day()));
    match local.and_local_timezone(offset) {
        LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => {
            instant.with_timezone(&Utc)
        }
        // A fixed offset maps every local time to exactly one instant.
        LocalResult::None => local.and_utc(),
    }
}

/// Renders an instant as business-local wall time, truncating seconds.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{parse_offset, to_civil_time};
/// use chrono::{TimeZone, Utc};
///
/// let offset = parse_offset("+09:00").unwrap();
/// let instant = Utc.with_ymd_and_hms(2026, 1, 15, 1, 1, 59).unwrap();
/// assert_eq!(to_civil_time(instant, offset).to_string(), "10:01");
/// ```
pub fn to_civil_time(instant: DateTime<Utc>, offset: FixedOffset) -> CivilTime {
    let local = instant.with_timezone(&offset);
    CivilTime::hm(local.hour() as u8, local.minute() as u8)
}

/// The business-local calendar date of an instant.
pub fn to_civil_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}
