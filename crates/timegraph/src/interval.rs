//! The `base--duration` query dialect.
//!
//! A [`TimeQuery`] is a calendar-aware base instant plus a
//! [`CalendarDuration`], written as `<base>--<duration>`:
//!
//! - `2020-01-01--P1D` — one day
//! - `2020-01-06--P1W` — one ISO week
//! - `2020-03-29T06--PT6H` — six hours starting 06:00 local time
//! - `2020-07-01T14+02:00--PT1H` — an hour during daylight-saving time
//!
//! # Lossy serialization
//!
//! When a duration has a week component, only the weeks are written
//! (`P<N>W`) and every other component is dropped. Single-unit durations
//! always round-trip; mixed week durations do not. Bases are written to
//! hour precision.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::calendar::{parse_iso_duration, Calendar, CalendarDuration, CalendarUnit, Direction};
use crate::error::TimeGraphError;
use crate::format::{format_interval, SliceLabels};

/// Separator between base and duration.
pub const SEPARATOR: &str = "--";

/// A time interval as a base instant and a calendar duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeQuery {
    pub base: DateTime<Tz>,
    pub duration: CalendarDuration,
}

impl TimeQuery {
    pub fn new(base: DateTime<Tz>, duration: CalendarDuration) -> Self {
        Self { base, duration }
    }

    /// The fallback query: today, starting at local midnight, one day wide.
    pub fn default_for(calendar: &Calendar, now: DateTime<Utc>) -> Self {
        Self::new(calendar.today(now), CalendarDuration::days(1))
    }

    /// The exclusive end of the interval.
    pub fn end(&self, calendar: &Calendar) -> DateTime<Tz> {
        apply_duration(calendar, self, Direction::Future)
    }

    /// `[from, to)` as UTC instants.
    pub fn range(&self, calendar: &Calendar) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.base.with_timezone(&Utc), self.end(calendar).with_timezone(&Utc))
    }

    /// Human-readable label for the whole interval.
    pub fn describe(&self, calendar: &Calendar) -> SliceLabels {
        let base = calendar.instant(self.base.with_timezone(&Utc));
        format_interval(&base, &self.end(calendar))
    }
}

/// The instant reached by applying the query's duration to its base.
pub fn apply_duration(calendar: &Calendar, query: &TimeQuery, direction: Direction) -> DateTime<Tz> {
    let base = calendar.instant(query.base.with_timezone(&Utc));
    calendar.apply(&base, &query.duration, direction)
}

/// Parse `<base>--<duration>`. Returns `None` for anything else.
pub fn parse(calendar: &Calendar, input: &str) -> Option<TimeQuery> {
    let parsed = input.trim().split_once(SEPARATOR).and_then(|(base, duration)| {
        let base = parse_base(calendar, base)?;
        let duration = parse_iso_duration(duration)?;
        // Reject durations that cannot be applied rather than panic later.
        calendar.checked_apply(&base, &duration, Direction::Future)?;
        Some(TimeQuery::new(base, duration))
    });
    if parsed.is_none() {
        debug!(input, "unparseable interval query");
    }
    parsed
}

/// [`parse`] for program boundaries that want an error value.
///
/// # Errors
///
/// Returns [`TimeGraphError::InvalidQuery`] if `input` is not a
/// `<base>--<duration>` query.
pub fn parse_strict(calendar: &Calendar, input: &str) -> Result<TimeQuery, TimeGraphError> {
    parse(calendar, input).ok_or_else(|| TimeGraphError::InvalidQuery(format!("'{}'", input.trim())))
}

/// Canonical `<base>--<duration>` form of a query.
pub fn serialize(calendar: &Calendar, query: &TimeQuery) -> String {
    format!(
        "{}{SEPARATOR}{}",
        serialize_base(calendar, &query.base),
        serialize_duration(&query.duration)
    )
}

/// `YYYY-MM-DD`, or `YYYY-MM-DDTHH` when the local hour is not midnight.
/// During daylight-saving time the hour form carries the UTC offset so that
/// a repeated wall-clock hour re-parses to the same instant.
pub fn serialize_base(calendar: &Calendar, base: &DateTime<Tz>) -> String {
    let local = calendar.instant(base.with_timezone(&Utc));
    let date = local.format("%Y-%m-%d").to_string();
    if local.hour() == 0 {
        return date;
    }
    if calendar.is_dst(&local) {
        format!("{date}T{:02}{}", local.hour(), local.format("%:z"))
    } else {
        format!("{date}T{:02}", local.hour())
    }
}

/// `P<N>W` when the duration has weeks (dropping other components),
/// otherwise the full ISO-8601 duration.
pub fn serialize_duration(duration: &CalendarDuration) -> String {
    let weeks = duration.get(CalendarUnit::Week);
    if weeks != 0 {
        format!("P{weeks}W")
    } else {
        duration.to_string()
    }
}

/// Parse an ISO-8601 date or date-time base.
///
/// Accepted forms: `YYYY-MM-DD`, `YYYY-MM-DDTHH`, `YYYY-MM-DDTHH:MM`,
/// `YYYY-MM-DDTHH:MM:SS`, each time form optionally followed by `Z` or a
/// `±HH:MM` offset. Without an offset the wall-clock time is read in the
/// calendar's timezone, and a repeated (fall-back) hour resolves to its
/// standard-time occurrence.
pub fn parse_base(calendar: &Calendar, s: &str) -> Option<DateTime<Tz>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&calendar.timezone()));
    }

    let (date_str, time_str) = match s.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (s, None),
    };
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;

    let Some(time_str) = time_str else {
        return Some(calendar.localize_latest(date.and_time(NaiveTime::MIN)));
    };

    let offset_at = time_str.find(['Z', '+', '-']);
    let (clock, offset) = match offset_at {
        Some(idx) => (&time_str[..idx], Some(parse_offset(&time_str[idx..])?)),
        None => (time_str, None),
    };
    let naive = date.and_time(parse_clock(clock)?);

    match offset {
        Some(offset) => Some(
            offset
                .from_local_datetime(&naive)
                .single()?
                .with_timezone(&calendar.timezone()),
        ),
        None => Some(calendar.localize_latest(naive)),
    }
}

/// `HH`, `HH:MM` or `HH:MM:SS`.
fn parse_clock(s: &str) -> Option<NaiveTime> {
    let mut fields = [0u32; 3];
    let parts: Vec<&str> = s.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    for (slot, part) in fields.iter_mut().zip(&parts) {
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    NaiveTime::from_hms_opt(fields[0], fields[1], fields[2])
}

/// `Z`, `±HH:MM`, `±HHMM` or `±HH`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// `YYYY-MM-DDTHH`, the literal base used by quarter-day slice keys.
pub(crate) fn hour_key(date: NaiveDate, hour: u32) -> String {
    format!("{}T{hour:02}", date.format("%Y-%m-%d"))
}
