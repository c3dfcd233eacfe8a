//! Millisecond-resolution timestamps.
//!
//! This module provides the [`Timestamp`] type used for entry modification
//! times. The engine stores times as a `(seconds, nanoseconds)` pair; the
//! public type keeps milliseconds since the Unix epoch.
//!
//! # Precision
//!
//! Converting to the engine representation is exact:
//! `nanoseconds = (milliseconds mod 1000) * 1_000_000`. Converting back drops
//! anything below a millisecond. Archive formats may store less still:
//!
//! - tar: whole seconds (pax variants also keep sub-second digits)
//! - zip: two-second DOS resolution
//!
//! # Example
//!
//! ```rust
//! use archivum::Timestamp;
//!
//! let ts = Timestamp::from_unix_millis(1_700_000_000_123);
//! assert_eq!(ts.to_secs_nanos(), (1_700_000_000, 123_000_000));
//! assert_eq!(Timestamp::from_secs_nanos(1_700_000_000, 123_456_789), ts);
//! ```

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MILLIS_PER_SECOND: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// A point in time with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Milliseconds since 1970-01-01T00:00:00Z.
    millis: i64,
}

impl Timestamp {
    /// The Unix epoch.
    pub const UNIX_EPOCH: Self = Self { millis: 0 };

    /// Creates a timestamp from milliseconds since the Unix epoch.
    #[inline]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Creates a timestamp from whole seconds since the Unix epoch.
    ///
    /// Saturates at the representable range.
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self {
            millis: secs.saturating_mul(MILLIS_PER_SECOND),
        }
    }

    /// Creates a timestamp from the engine's `(seconds, nanoseconds)` pair.
    ///
    /// Nanoseconds below a whole millisecond are dropped.
    pub const fn from_secs_nanos(secs: i64, nanos: i64) -> Self {
        Self {
            millis: secs
                .saturating_mul(MILLIS_PER_SECOND)
                .saturating_add(nanos / NANOS_PER_MILLI),
        }
    }

    /// Creates a timestamp from a `SystemTime`.
    ///
    /// Returns `None` if the time is out of range.
    pub fn from_system_time(time: SystemTime) -> Option<Self> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(duration) => i64::try_from(duration.as_millis())
                .ok()
                .map(Self::from_unix_millis),
            Err(e) => i64::try_from(e.duration().as_millis())
                .ok()
                .map(|m| Self::from_unix_millis(-m)),
        }
    }

    /// Returns the current time.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now()).unwrap_or(Self::UNIX_EPOCH)
    }

    /// Milliseconds since the Unix epoch.
    #[inline]
    pub const fn as_unix_millis(&self) -> i64 {
        self.millis
    }

    /// Whole seconds since the Unix epoch, rounded towards negative infinity.
    #[inline]
    pub const fn as_unix_secs(&self) -> i64 {
        self.millis.div_euclid(MILLIS_PER_SECOND)
    }

    /// Milliseconds past the last whole second (0-999).
    #[inline]
    pub const fn subsec_millis(&self) -> u32 {
        self.millis.rem_euclid(MILLIS_PER_SECOND) as u32
    }

    /// Splits into the engine's `(seconds, nanoseconds)` pair.
    pub const fn to_secs_nanos(&self) -> (i64, i64) {
        (
            self.as_unix_secs(),
            self.subsec_millis() as i64 * NANOS_PER_MILLI,
        )
    }

    /// Drops the sub-second part.
    pub const fn truncated_to_secs(&self) -> Self {
        Self::from_unix_secs(self.as_unix_secs())
    }

    /// Converts to a `SystemTime`.
    pub fn as_system_time(&self) -> SystemTime {
        let magnitude = Duration::from_millis(self.millis.unsigned_abs());
        if self.millis >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time).unwrap_or(Self::UNIX_EPOCH)
    }
}

/// Formats as ISO 8601 UTC, e.g. `2023-11-14T22:13:20.123Z`.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let civil = CivilTime::from_unix_secs(self.as_unix_secs());
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            civil.year,
            civil.month,
            civil.day,
            civil.hour,
            civil.minute,
            civil.second,
            self.subsec_millis()
        )
    }
}

/// A broken-down UTC calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CivilTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CivilTime {
    /// Breaks Unix seconds down into a proleptic Gregorian UTC date and time.
    pub fn from_unix_secs(secs: i64) -> Self {
        let days = secs.div_euclid(SECONDS_PER_DAY);
        let rem = secs.rem_euclid(SECONDS_PER_DAY);

        // Howard Hinnant's civil_from_days
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u32,
            minute: (rem % 3600 / 60) as u32,
            second: (rem % 60) as u32,
        }
    }

    /// Converts back to Unix seconds.
    pub fn to_unix_secs(self) -> i64 {
        let year = self.year - i64::from(self.month <= 2);
        let era = year.div_euclid(400);
        let yoe = year.rem_euclid(400);
        let month = i64::from(self.month);
        let mp = if month > 2 { month - 3 } else { month + 9 };
        let doy = (153 * mp + 2) / 5 + i64::from(self.day) - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        let days = era * 146_097 + doe - 719_468;

        days * SECONDS_PER_DAY
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_nanos_split() {
        let ts = Timestamp::from_unix_millis(1_234_567);
        assert_eq!(ts.to_secs_nanos(), (1_234, 567_000_000));
        assert_eq!(Timestamp::from_secs_nanos(1_234, 567_000_000), ts);
    }

    #[test]
    fn test_sub_millisecond_dropped() {
        let ts = Timestamp::from_secs_nanos(10, 999_999);
        assert_eq!(ts.as_unix_millis(), 10_000);
    }

    #[test]
    fn test_negative_times() {
        let ts = Timestamp::from_unix_millis(-1);
        assert_eq!(ts.as_unix_secs(), -1);
        assert_eq!(ts.subsec_millis(), 999);
        assert_eq!(ts.to_secs_nanos(), (-1, 999_000_000));
        let (secs, nanos) = ts.to_secs_nanos();
        assert_eq!(Timestamp::from_secs_nanos(secs, nanos), ts);
    }

    #[test]
    fn test_truncated_to_secs() {
        let ts = Timestamp::from_unix_millis(5_999);
        assert_eq!(ts.truncated_to_secs(), Timestamp::from_unix_secs(5));
    }

    #[test]
    fn test_system_time_roundtrip() {
        let ts = Timestamp::from_unix_millis(1_700_000_000_456);
        assert_eq!(Timestamp::from_system_time(ts.as_system_time()), Some(ts));
        let before = Timestamp::from_unix_millis(-86_400_500);
        assert_eq!(
            Timestamp::from_system_time(before.as_system_time()),
            Some(before)
        );
    }

    #[test]
    fn test_civil_time() {
        let civil = CivilTime::from_unix_secs(0);
        assert_eq!((civil.year, civil.month, civil.day), (1970, 1, 1));

        // 2000-02-29T12:34:56Z
        let civil = CivilTime::from_unix_secs(951_827_696);
        assert_eq!(
            civil,
            CivilTime {
                year: 2000,
                month: 2,
                day: 29,
                hour: 12,
                minute: 34,
                second: 56
            }
        );
        assert_eq!(civil.to_unix_secs(), 951_827_696);
    }

    #[test]
    fn test_civil_time_before_epoch() {
        let civil = CivilTime::from_unix_secs(-1);
        assert_eq!(
            (civil.year, civil.month, civil.day, civil.second),
            (1969, 12, 31, 59)
        );
        assert_eq!(civil.to_unix_secs(), -1);
    }

    #[test]
    fn test_display() {
        let ts = Timestamp::from_unix_millis(951_827_696_007);
        assert_eq!(ts.to_string(), "2000-02-29T12:34:56.007Z");
    }
}
