use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::pipeline::processing::diagnostics::{Field, FieldError};

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:posted\s+)?(\d+|an?|one)\+?\s+(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?)\s+ago$",
    )
    .unwrap()
});
static COMPACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)\s*(mo|s|m|h|d)(?:\s+ago)?$").unwrap());

/// Source of "now" for relative dates
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock for reproducible runs and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One way a board writes its posting date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// Exact chrono format string; the date is taken as written
    Absolute(&'static str),
    /// `"3 days ago"`, `"an hour ago"`, `"30+ days ago"`
    Relative,
    /// `"2d ago"`, `"5h"`, `"1mo"`
    Compact,
    /// `"today"`, `"just now"`, `"yesterday"`
    Today,
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Unit {
    fn from_word(word: &str) -> Option<Unit> {
        let w = word.to_lowercase();
        let unit = match w.trim_end_matches('s') {
            "second" | "sec" => Unit::Second,
            "minute" | "min" => Unit::Minute,
            "hour" | "hr" => Unit::Hour,
            "day" => Unit::Day,
            "week" => Unit::Week,
            "month" => Unit::Month,
            _ => return None,
        };
        Some(unit)
    }

    fn from_compact(code: &str) -> Option<Unit> {
        match code.to_lowercase().as_str() {
            "s" => Some(Unit::Second),
            "m" => Some(Unit::Minute),
            "h" => Some(Unit::Hour),
            "d" => Some(Unit::Day),
            "mo" => Some(Unit::Month),
            _ => None,
        }
    }

    /// Months are approximated as 30 days
    fn times(self, n: i64) -> Option<Duration> {
        match self {
            Unit::Second => Duration::try_seconds(n),
            Unit::Minute => Duration::try_minutes(n),
            Unit::Hour => Duration::try_hours(n),
            Unit::Day => Duration::try_days(n),
            Unit::Week => Duration::try_weeks(n),
            Unit::Month => n.checked_mul(30).and_then(Duration::try_days),
        }
    }
}

fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

fn ago(now: DateTime<Utc>, n: i64, unit: Unit, tz: Tz) -> Option<NaiveDate> {
    let delta = unit.times(n)?;
    now.checked_sub_signed(delta).map(|t| local_date(t, tz))
}

fn try_absolute(text: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(text, fmt)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(text, fmt))
        .ok()
}

fn try_relative(text: &str, now: DateTime<Utc>, tz: Tz) -> Option<NaiveDate> {
    let caps = RELATIVE_RE.captures(text)?;
    let count = match caps[1].to_lowercase().as_str() {
        "a" | "an" | "one" => 1,
        digits => digits.parse::<i64>().ok()?,
    };
    let unit = Unit::from_word(&caps[2])?;
    ago(now, count, unit, tz)
}

fn try_compact(text: &str, now: DateTime<Utc>, tz: Tz) -> Option<NaiveDate> {
    let caps = COMPACT_RE.captures(text)?;
    let count = caps[1].parse::<i64>().ok()?;
    let unit = Unit::from_compact(&caps[2])?;
    ago(now, count, unit, tz)
}

fn try_today(text: &str, now: DateTime<Utc>, tz: Tz) -> Option<NaiveDate> {
    match text.to_lowercase().as_str() {
        "today" | "just now" | "just posted" | "new" => Some(local_date(now, tz)),
        "yesterday" => ago(now, 1, Unit::Day, tz),
        _ => None,
    }
}

/// Convert a board's date text into a calendar date.
///
/// Formats are tried in order and the first match wins. Relative forms are
/// computed from `now` and truncated in the board's own timezone, so the day
/// boundary follows local time rather than UTC. `Ok(None)` means no date was
/// given; `Err` means text was present but matched nothing.
pub fn normalize_date(
    text: Option<&str>,
    formats: &[DateFormat],
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<Option<NaiveDate>, FieldError> {
    let text = match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(None),
    };

    for format in formats {
        let parsed = match format {
            DateFormat::Absolute(fmt) => try_absolute(text, fmt),
            DateFormat::Relative => try_relative(text, now, tz),
            DateFormat::Compact => try_compact(text, now, tz),
            DateFormat::Today => try_today(text, now, tz),
        };
        if parsed.is_some() {
            return Ok(parsed);
        }
    }

    Err(FieldError::new(
        Field::DatePosted,
        text,
        format!("no matching format among {}", formats.len()),
    ))
}
