//! Wall-clock arithmetic for lesson times
//!
//! A [`TimeOfDay`] is a minute-granularity `HH:MM` value. All arithmetic
//! wraps modulo 24 hours, so adding past `23:59` rolls over to `00:00`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minutes in one day
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Errors raised by the strict time parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    /// Input is not of the form `HH:MM` or `HH:MM:SS`
    #[error("Invalid time format '{0}', expected HH:MM")]
    Format(String),

    /// Hour or minute outside the 24-hour clock
    #[error("Time '{0}' is out of range (00:00-23:59)")]
    OutOfRange(String),
}

// ============================================================================
// Time of Day
// ============================================================================

/// Wall-clock time with minute granularity (`00:00`..=`23:59`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Midnight
    pub const MIDNIGHT: Self = Self { minutes: 0 };

    /// Build from hour and minute, `None` when either is out of range
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self::from_hm(hour, minute))
        } else {
            None
        }
    }

    /// Build from hour and minute in const contexts. Callers keep the
    /// values in range.
    pub(crate) const fn from_hm(hour: u16, minute: u16) -> Self {
        Self {
            minutes: hour * 60 + minute,
        }
    }

    /// Build from minutes since midnight, wrapping modulo 24 hours
    pub fn from_minutes(total: i32) -> Self {
        Self::wrap(i64::from(total))
    }

    fn wrap(total: i64) -> Self {
        Self {
            minutes: total.rem_euclid(i64::from(MINUTES_PER_DAY)) as u16,
        }
    }

    /// Minutes since midnight
    pub const fn minutes_since_midnight(&self) -> u16 {
        self.minutes
    }

    pub fn hour(&self) -> u16 {
        self.minutes / 60
    }

    pub fn minute(&self) -> u16 {
        self.minutes % 60
    }

    /// Shift by `delta` minutes (negative allowed), wrapping at midnight
    #[must_use]
    pub fn add_minutes(self, delta: i32) -> Self {
        add_minutes(self, delta)
    }

    /// Permissive parser matching what the portal backend and forms emit.
    ///
    /// Reads the first two `:`-separated components as hour and minute.
    /// Anything after that (seconds, fractions) is ignored, and a missing or
    /// non-numeric component reads as 0. Out-of-range values wrap modulo
    /// 24 hours. This never fails.
    pub fn parse_lenient(input: &str) -> Self {
        let mut parts = input.trim().split(':');
        let mut component = || {
            parts
                .next()
                .and_then(|p| p.trim().parse::<i64>().ok())
                .unwrap_or(0)
        };
        let hour = component();
        let minute = component();
        Self::wrap(hour.saturating_mul(60).saturating_add(minute))
    }

    /// Strict parser for operator input. Accepts `HH:MM` or `HH:MM:SS`.
    pub fn parse(input: &str) -> Result<Self, ParseTimeError> {
        let trimmed = input.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(ParseTimeError::Format(input.to_string()));
        }

        let mut numbers = [0u16; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseTimeError::Format(input.to_string()));
            }
            *slot = part
                .parse()
                .map_err(|_| ParseTimeError::Format(input.to_string()))?;
        }

        if numbers[2] >= 60 {
            return Err(ParseTimeError::OutOfRange(input.to_string()));
        }
        Self::new(numbers[0], numbers[1]).ok_or_else(|| ParseTimeError::OutOfRange(input.to_string()))
    }
}

/// Add `delta` minutes to `time`, wrapping modulo 24 hours.
///
/// ```
/// use classgrid::timetable::clock::{add_minutes, TimeOfDay};
///
/// let t = TimeOfDay::new(23, 30).unwrap();
/// assert_eq!(add_minutes(t, 45).to_string(), "00:15");
/// assert_eq!(add_minutes(t, -1440).to_string(), "23:30");
/// ```
pub fn add_minutes(time: TimeOfDay, delta: i32) -> TimeOfDay {
    TimeOfDay::wrap(i64::from(time.minutes) + i64::from(delta))
}

/// Forward distance from `start` to `end` in minutes, in `0..1440`.
///
/// An end time earlier than the start wraps past midnight, so this is never
/// negative. Equal times give 0.
pub fn duration_minutes(start: TimeOfDay, end: TimeOfDay) -> i32 {
    (i32::from(end.minutes) - i32::from(start.minutes)).rem_euclid(MINUTES_PER_DAY)
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Self::parse_lenient(&s)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    #[test]
    fn test_add_minutes_basic() {
        assert_eq!(add_minutes(t("09:00"), 45), t("09:45"));
        assert_eq!(add_minutes(t("16:15"), 45), t("17:00"));
    }

    #[test]
    fn test_add_minutes_wraps_forward_and_back() {
        assert_eq!(add_minutes(t("23:59"), 1), t("00:00"));
        assert_eq!(add_minutes(t("00:10"), -20), t("23:50"));
        assert_eq!(add_minutes(t("08:00"), -3 * 1440), t("08:00"));
    }

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(TimeOfDay::from_minutes(65).to_string(), "01:05");
        assert_eq!(TimeOfDay::MIDNIGHT.to_string(), "00:00");
    }

    #[test]
    fn test_lenient_parse_reads_backend_seconds() {
        assert_eq!(TimeOfDay::parse_lenient("14:00:00"), t("14:00"));
        assert_eq!(TimeOfDay::parse_lenient(" 9:5 "), t("09:05"));
    }

    // Malformed input is accepted on purpose: bad components read as 0
    // instead of raising an error.
    #[test]
    fn test_lenient_parse_defaults_malformed_components_to_zero() {
        assert_eq!(TimeOfDay::parse_lenient(""), TimeOfDay::MIDNIGHT);
        assert_eq!(TimeOfDay::parse_lenient("ab:30"), t("00:30"));
        assert_eq!(TimeOfDay::parse_lenient("10"), t("10:00"));
        assert_eq!(TimeOfDay::parse_lenient("25:00"), t("01:00"));
    }

    #[test]
    fn test_strict_parse_rejects_garbage() {
        assert!(matches!(TimeOfDay::parse("9"), Err(ParseTimeError::Format(_))));
        assert!(matches!(TimeOfDay::parse("aa:bb"), Err(ParseTimeError::Format(_))));
        assert!(matches!(TimeOfDay::parse("24:00"), Err(ParseTimeError::OutOfRange(_))));
        assert!(matches!(TimeOfDay::parse("12:60"), Err(ParseTimeError::OutOfRange(_))));
        assert_eq!(TimeOfDay::parse("07:30:00").unwrap(), t("07:30"));
    }

    #[test]
    fn test_duration_wraps_past_midnight() {
        assert_eq!(duration_minutes(t("09:00"), t("09:45")), 45);
        assert_eq!(duration_minutes(t("23:30"), t("00:15")), 45);
        assert_eq!(duration_minutes(t("10:00"), t("10:00")), 0);
    }

    #[test]
    fn test_serde_round_trip_formats() {
        let json = serde_json::to_string(&t("08:45")).unwrap();
        assert_eq!(json, "\"08:45\"");

        let parsed: TimeOfDay = serde_json::from_str("\"16:15:00\"").unwrap();
        assert_eq!(parsed, t("16:15"));
    }
}
