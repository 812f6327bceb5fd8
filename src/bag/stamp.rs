//! Version timestamps with microsecond resolution.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.6f";
const TIME_PARSE_FORMAT: &str = "%H:%M:%S%.f";

/// Point in time a version was persisted.
///
/// Renders as `YYYY-MM-DD/HH:MM:SS.ffffff`; the lexicographic order of the
/// rendering equals the chronological order of the stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionStamp(NaiveDateTime);

impl VersionStamp {
    /// Build a stamp, truncating anything finer than a microsecond
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        let micros = dt.nanosecond() / 1_000 * 1_000;
        VersionStamp(dt.with_nanosecond(micros).unwrap_or(dt))
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// The smallest stamp strictly after this one
    pub fn next_micro(&self) -> Self {
        let next = self
            .0
            .checked_add_signed(Duration::microseconds(1))
            .unwrap_or(self.0);
        VersionStamp(next)
    }

    /// Date directory name (`YYYY-MM-DD`)
    pub fn date_segment(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }

    /// Time file name (`HH:MM:SS.ffffff`), optionally with `_` instead of `:`
    pub fn time_segment(&self, colon_substitute: bool) -> String {
        let rendered = self.0.format(TIME_FORMAT).to_string();
        if colon_substitute {
            rendered.replace(':', "_")
        } else {
            rendered
        }
    }

    /// Parse a date directory name and a time file name.
    ///
    /// Accepts `_` in place of `:` and a missing fractional part.
    pub fn from_segments(date: &str, time: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
        let time = NaiveTime::parse_from_str(&time.replace('_', ":"), TIME_PARSE_FORMAT).ok()?;
        Some(Self::from_datetime(date.and_time(time)))
    }

    /// Lenient parse for user input: a bare date, or a date and time joined
    /// by `/`, a space, or `T`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        match input.find(['/', ' ', 'T']) {
            Some(idx) => Self::from_segments(&input[..idx], input[idx + 1..].trim()),
            None => {
                let date = NaiveDate::parse_from_str(input, DATE_FORMAT).ok()?;
                Some(VersionStamp(date.and_time(NaiveTime::MIN)))
            }
        }
    }

    /// Seconds elapsed from this stamp until `now` (negative if in the future)
    pub fn seconds_until(&self, now: NaiveDateTime) -> f64 {
        let delta = now.signed_duration_since(self.0);
        delta.num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date_segment(), self.time_segment(false))
    }
}

/// True when a directory name looks like a date partition (`YYYY-MM-DD`)
pub(crate) fn is_date_segment(name: &str) -> bool {
    name.matches('-').count() == 2 && NaiveDate::parse_from_str(name, DATE_FORMAT).is_ok()
}
