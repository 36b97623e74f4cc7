//! Calendar arithmetic bound to a single timezone.
//!
//! Every other module goes through [`Calendar`] for date math, so the
//! timezone is chosen once (at construction) instead of being process-wide
//! state. Instants are `DateTime<Tz>` values: they carry their UTC offset,
//! which is what makes daylight-saving corrections possible.
//!
//! # Unit semantics
//!
//! - Seconds, minutes and hours are absolute elapsed time.
//! - Days and weeks are wall-clock: adding one day across a DST transition
//!   keeps the local time of day, so the elapsed time is 23 or 25 hours.
//! - Months and years are calendar arithmetic; a day that does not exist in
//!   the target month clamps to the month's last day (Jan 31 + 1 month =
//!   Feb 29 in a leap year).
//!
//! Nothing here validates ranges. Arithmetic that overflows chrono's
//! representable range panics, like chrono's own operators.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Months, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::TimeGraphError;

// ── Units and durations ─────────────────────────────────────────────────────

/// A calendar unit. `Week` always means an ISO week (starting Monday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl CalendarUnit {
    /// All units, smallest first. This is also the order in which
    /// [`Calendar::apply`] applies duration components.
    pub const ASCENDING: [CalendarUnit; 7] = [
        CalendarUnit::Second,
        CalendarUnit::Minute,
        CalendarUnit::Hour,
        CalendarUnit::Day,
        CalendarUnit::Week,
        CalendarUnit::Month,
        CalendarUnit::Year,
    ];
}

/// Which way a duration is applied to an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Future,
    Past,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Future => 1,
            Direction::Past => -1,
        }
    }
}

/// A duration expressed in calendar units rather than a fixed number of
/// milliseconds. Components are independent and may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct CalendarDuration {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CalendarDuration {
    /// A duration of `amount` of a single unit.
    pub fn of(unit: CalendarUnit, amount: i64) -> Self {
        Self::default().with(unit, amount)
    }

    pub fn days(amount: i64) -> Self {
        Self::of(CalendarUnit::Day, amount)
    }

    pub fn weeks(amount: i64) -> Self {
        Self::of(CalendarUnit::Week, amount)
    }

    pub fn months(amount: i64) -> Self {
        Self::of(CalendarUnit::Month, amount)
    }

    pub fn years(amount: i64) -> Self {
        Self::of(CalendarUnit::Year, amount)
    }

    pub fn hours(amount: i64) -> Self {
        Self::of(CalendarUnit::Hour, amount)
    }

    /// The count for `unit`; absent components are 0.
    pub fn get(&self, unit: CalendarUnit) -> i64 {
        match unit {
            CalendarUnit::Second => self.seconds,
            CalendarUnit::Minute => self.minutes,
            CalendarUnit::Hour => self.hours,
            CalendarUnit::Day => self.days,
            CalendarUnit::Week => self.weeks,
            CalendarUnit::Month => self.months,
            CalendarUnit::Year => self.years,
        }
    }

    /// Returns a copy with the `unit` component replaced by `amount`.
    pub fn with(mut self, unit: CalendarUnit, amount: i64) -> Self {
        let slot = match unit {
            CalendarUnit::Second => &mut self.seconds,
            CalendarUnit::Minute => &mut self.minutes,
            CalendarUnit::Hour => &mut self.hours,
            CalendarUnit::Day => &mut self.days,
            CalendarUnit::Week => &mut self.weeks,
            CalendarUnit::Month => &mut self.months,
            CalendarUnit::Year => &mut self.years,
        };
        *slot = amount;
        self
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// True when only hours, minutes and seconds are set.
    pub fn is_sub_day(&self) -> bool {
        self.years == 0 && self.months == 0 && self.weeks == 0 && self.days == 0
    }

    /// The unit of the only non-zero component, if there is exactly one.
    pub fn single_unit(&self) -> Option<CalendarUnit> {
        let mut units = CalendarUnit::ASCENDING
            .into_iter()
            .filter(|unit| self.get(*unit) != 0);
        let unit = units.next()?;
        units.next().is_none().then_some(unit)
    }
}

/// ISO-8601 form, e.g. `P1Y2M`, `P3W`, `PT6H`. The zero duration is `P0D`.
impl fmt::Display for CalendarDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        for (amount, designator) in [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if amount != 0 {
                write!(f, "{amount}{designator}")?;
            }
        }
        if self.hours != 0 || self.minutes != 0 || self.seconds != 0 {
            f.write_str("T")?;
            for (amount, designator) in [
                (self.hours, 'H'),
                (self.minutes, 'M'),
                (self.seconds, 'S'),
            ] {
                if amount != 0 {
                    write!(f, "{amount}{designator}")?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for CalendarDuration {
    type Err = TimeGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_iso_duration(s)
            .ok_or_else(|| TimeGraphError::InvalidDuration(format!("'{}'", s.trim())))
    }
}

/// Parse an ISO-8601 duration (`P1Y2M3W4DT5H6M7S`, any subset, integer
/// components, each optionally negative). Returns `None` when the string is
/// not a duration or has no components.
pub fn parse_iso_duration(s: &str) -> Option<CalendarDuration> {
    let rest = s.trim().strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut duration = CalendarDuration::default();
    let mut found_any = false;

    for (amount, designator) in duration_components(date_part)? {
        let unit = match designator {
            'Y' => CalendarUnit::Year,
            'M' => CalendarUnit::Month,
            'W' => CalendarUnit::Week,
            'D' => CalendarUnit::Day,
            _ => return None,
        };
        duration = duration.with(unit, duration.get(unit).checked_add(amount)?);
        found_any = true;
    }

    if let Some(time_part) = time_part {
        for (amount, designator) in duration_components(time_part)? {
            let unit = match designator {
                'H' => CalendarUnit::Hour,
                'M' => CalendarUnit::Minute,
                'S' => CalendarUnit::Second,
                _ => return None,
            };
            duration = duration.with(unit, duration.get(unit).checked_add(amount)?);
            found_any = true;
        }
    }

    found_any.then_some(duration)
}

/// Split `"1Y-2M"` into `[(1, 'Y'), (-2, 'M')]`.
fn duration_components(s: &str) -> Option<Vec<(i64, char)>> {
    let mut components = Vec::new();
    let mut num_buf = String::new();

    for ch in s.chars() {
        if ch.is_ascii_digit() || (ch == '-' && num_buf.is_empty()) {
            num_buf.push(ch);
        } else {
            if num_buf.is_empty() || num_buf == "-" {
                return None;
            }
            let n: i64 = num_buf.parse().ok()?;
            num_buf.clear();
            components.push((n, ch));
        }
    }

    // Trailing number without designator
    if !num_buf.is_empty() {
        return None;
    }
    Some(components)
}

// ── Configuration ───────────────────────────────────────────────────────────

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Serializable calendar settings, e.g. from a JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// IANA timezone name used for wall-clock arithmetic and labels.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

// ── Calendar ────────────────────────────────────────────────────────────────

/// Calendar arithmetic in one timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    tz: Tz,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// Build a calendar from an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`TimeGraphError::InvalidTimezone`] if the name is unknown.
    pub fn from_name(name: &str) -> Result<Self, TimeGraphError> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| TimeGraphError::InvalidTimezone(format!("'{name}'")))
    }

    pub fn from_config(config: &CalendarConfig) -> Result<Self, TimeGraphError> {
        Self::from_name(&config.timezone)
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Express a UTC instant in this calendar's timezone.
    pub fn instant(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.tz)
    }

    /// Resolve a local wall-clock time to an instant.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant.
    /// Nonexistent times (DST spring-forward gap) are read with the offset in
    /// effect before the gap, which lands them after it: 02:30 on a day that
    /// skips 02:00–03:00 becomes 03:30.
    pub fn localize(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        if let Some(dt) = self.tz.from_local_datetime(&naive).earliest() {
            return dt;
        }
        let before_gap = self
            .tz
            .offset_from_utc_datetime(&(naive - chrono::Duration::days(1)))
            .fix()
            .local_minus_utc();
        let utc = naive - chrono::Duration::seconds(i64::from(before_gap));
        self.tz.from_utc_datetime(&utc)
    }

    /// Like [`Calendar::localize`] but ambiguous times resolve to the later
    /// (standard-time) instant.
    pub fn localize_latest(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        match self.tz.from_local_datetime(&naive).latest() {
            Some(dt) => dt,
            None => self.localize(naive),
        }
    }

    /// Midnight at the start of the day containing `now`.
    pub fn today(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        self.start_of(&self.instant(now), CalendarUnit::Day)
    }

    /// Shift `dt` by `amount` of a single unit.
    ///
    /// # Panics
    ///
    /// Panics if the result is outside chrono's representable range. Use
    /// [`Calendar::checked_shift`] for untrusted amounts.
    pub fn shift(&self, dt: &DateTime<Tz>, unit: CalendarUnit, amount: i64) -> DateTime<Tz> {
        match self.checked_shift(dt, unit, amount) {
            Some(shifted) => shifted,
            None => panic!("calendar overflow shifting {dt} by {amount} {unit:?}"),
        }
    }

    /// Shift `dt` by `amount` of a single unit, or `None` on overflow.
    pub fn checked_shift(
        &self,
        dt: &DateTime<Tz>,
        unit: CalendarUnit,
        amount: i64,
    ) -> Option<DateTime<Tz>> {
        if amount == 0 {
            return Some(*dt);
        }
        let naive = dt.naive_local();
        match unit {
            CalendarUnit::Second => dt.checked_add_signed(chrono::Duration::try_seconds(amount)?),
            CalendarUnit::Minute => dt.checked_add_signed(chrono::Duration::try_minutes(amount)?),
            CalendarUnit::Hour => dt.checked_add_signed(chrono::Duration::try_hours(amount)?),
            CalendarUnit::Day => naive
                .checked_add_signed(chrono::Duration::try_days(amount)?)
                .map(|shifted| self.localize(shifted)),
            CalendarUnit::Week => naive
                .checked_add_signed(chrono::Duration::try_weeks(amount)?)
                .map(|shifted| self.localize(shifted)),
            CalendarUnit::Month => {
                checked_add_months(naive, amount).map(|shifted| self.localize(shifted))
            }
            CalendarUnit::Year => checked_add_months(naive, amount.checked_mul(12)?)
                .map(|shifted| self.localize(shifted)),
        }
    }

    /// Apply every component of `duration` to `dt`, smallest unit first.
    ///
    /// # Panics
    ///
    /// Panics if the result is outside chrono's representable range.
    pub fn apply(
        &self,
        dt: &DateTime<Tz>,
        duration: &CalendarDuration,
        direction: Direction,
    ) -> DateTime<Tz> {
        CalendarUnit::ASCENDING.into_iter().fold(*dt, |acc, unit| {
            self.shift(&acc, unit, direction.sign() * duration.get(unit))
        })
    }

    /// [`Calendar::apply`], or `None` on overflow.
    pub fn checked_apply(
        &self,
        dt: &DateTime<Tz>,
        duration: &CalendarDuration,
        direction: Direction,
    ) -> Option<DateTime<Tz>> {
        CalendarUnit::ASCENDING.into_iter().try_fold(*dt, |acc, unit| {
            let amount = direction.sign().checked_mul(duration.get(unit))?;
            self.checked_shift(&acc, unit, amount)
        })
    }

    /// Whether `duration` applied at `base` reaches at least as far as
    /// `threshold` applied at `base`. Month and year lengths are measured at
    /// `base` itself.
    pub fn span_at_least(
        &self,
        base: &DateTime<Tz>,
        duration: &CalendarDuration,
        threshold: &CalendarDuration,
    ) -> bool {
        self.apply(base, duration, Direction::Future)
            >= self.apply(base, threshold, Direction::Future)
    }

    /// The first instant of the `unit` containing `dt`.
    ///
    /// # Panics
    ///
    /// Panics if the result is outside chrono's representable range.
    pub fn start_of(&self, dt: &DateTime<Tz>, unit: CalendarUnit) -> DateTime<Tz> {
        match self.checked_start_of(dt, unit) {
            Some(start) => start,
            None => panic!("calendar overflow flooring {dt} to {unit:?}"),
        }
    }

    /// [`Calendar::start_of`], or `None` on overflow.
    pub fn checked_start_of(&self, dt: &DateTime<Tz>, unit: CalendarUnit) -> Option<DateTime<Tz>> {
        let naive = dt.naive_local();
        let sub_second = chrono::Duration::nanoseconds(i64::from(dt.nanosecond()));
        let sub_minute = sub_second + chrono::Duration::seconds(i64::from(naive.second()));
        // Sub-day floors are absolute so an instant in a repeated
        // (fall-back) hour stays in that hour.
        match unit {
            CalendarUnit::Second => return dt.checked_sub_signed(sub_second),
            CalendarUnit::Minute => return dt.checked_sub_signed(sub_minute),
            CalendarUnit::Hour => {
                return dt.checked_sub_signed(
                    sub_minute + chrono::Duration::minutes(i64::from(naive.minute())),
                )
            }
            _ => {}
        }

        let date = naive.date();
        let back = match unit {
            CalendarUnit::Week => date.weekday().num_days_from_monday(),
            CalendarUnit::Month => date.day0(),
            CalendarUnit::Year => date.ordinal0(),
            _ => 0,
        };
        let floored = date.checked_sub_signed(chrono::Duration::days(i64::from(back)))?;
        Some(self.localize(floored.and_time(NaiveTime::MIN)))
    }

    /// The last millisecond of the `unit` containing `dt`.
    ///
    /// # Panics
    ///
    /// Panics if the result is outside chrono's representable range.
    pub fn end_of(&self, dt: &DateTime<Tz>, unit: CalendarUnit) -> DateTime<Tz> {
        match self.checked_end_of(dt, unit) {
            Some(end) => end,
            None => panic!("calendar overflow ceiling {dt} to {unit:?}"),
        }
    }

    /// [`Calendar::end_of`], or `None` when the next `unit` is not
    /// representable.
    pub fn checked_end_of(&self, dt: &DateTime<Tz>, unit: CalendarUnit) -> Option<DateTime<Tz>> {
        let next = self.checked_shift(&self.checked_start_of(dt, unit)?, unit, 1)?;
        next.checked_sub_signed(chrono::Duration::milliseconds(1))
    }

    /// UTC offset of `dt` in seconds (east positive).
    pub fn utc_offset(&self, dt: &DateTime<Tz>) -> i32 {
        dt.offset().fix().local_minus_utc()
    }

    /// Whether daylight-saving time is in effect at `dt`.
    pub fn is_dst(&self, dt: &DateTime<Tz>) -> bool {
        // Standard time is the smaller of the January and July offsets, which
        // also holds for southern-hemisphere zones.
        let year = dt.year();
        let standard = [1, 7]
            .into_iter()
            .filter_map(|month| Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0).single())
            .map(|probe| probe.with_timezone(&self.tz).offset().fix().local_minus_utc())
            .min();
        match standard {
            Some(standard) => self.utc_offset(dt) > standard,
            None => false,
        }
    }

    /// Number of days in the month containing `dt`.
    pub fn days_in_month(&self, dt: &DateTime<Tz>) -> i64 {
        let first = dt.date_naive() - chrono::Duration::days(i64::from(dt.day0()));
        let next = first + Months::new(1);
        (next - first).num_days()
    }

    /// Whole wall-clock days from `from` to `to` (same local time of day).
    pub fn whole_days_between(&self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> i64 {
        let mut days = (to.date_naive() - from.date_naive()).num_days();
        while days > 0 && self.shift(from, CalendarUnit::Day, days) > *to {
            days -= 1;
        }
        days.max(0)
    }

    /// The duration that takes `from` to `to`: whole wall-clock days plus
    /// the absolute hours, minutes and seconds left over.
    pub fn difference(&self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> CalendarDuration {
        let days = self.whole_days_between(from, to);
        let remainder = (*to - self.shift(from, CalendarUnit::Day, days)).num_seconds();
        let candidate = days_and_seconds(days, remainder);
        // `apply` adds hours before days; if that crosses a transition the
        // landing point is off by the offset change.
        let landed = self.apply(from, &candidate, Direction::Future);
        days_and_seconds(days, remainder + (*to - landed).num_seconds())
    }
}

fn days_and_seconds(days: i64, seconds: i64) -> CalendarDuration {
    let seconds = seconds.max(0);
    CalendarDuration {
        days,
        hours: seconds / 3600,
        minutes: (seconds % 3600) / 60,
        seconds: seconds % 60,
        ..Default::default()
    }
}

fn checked_add_months(naive: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
    let months = Months::new(u32::try_from(amount.unsigned_abs()).ok()?);
    if amount >= 0 {
        naive.checked_add_months(months)
    } else {
        naive.checked_sub_months(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};

    fn berlin() -> Calendar {
        Calendar::from_name("Europe/Berlin").unwrap()
    }

    fn local(cal: &Calendar, y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        cal.localize(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    // ── CalendarDuration ────────────────────────────────────────────────

    #[test]
    fn test_duration_get_defaults_to_zero() {
        let d = CalendarDuration::weeks(2);
        assert_eq!(d.get(CalendarUnit::Week), 2);
        assert_eq!(d.get(CalendarUnit::Day), 0);
        assert_eq!(d.get(CalendarUnit::Year), 0);
    }

    #[test]
    fn test_duration_single_unit() {
        assert_eq!(
            CalendarDuration::months(3).single_unit(),
            Some(CalendarUnit::Month)
        );
        let mixed = CalendarDuration::weeks(1).with(CalendarUnit::Day, 2);
        assert_eq!(mixed.single_unit(), None);
        assert_eq!(CalendarDuration::default().single_unit(), None);
    }

    #[test]
    fn test_duration_display_iso() {
        assert_eq!(CalendarDuration::days(1).to_string(), "P1D");
        assert_eq!(CalendarDuration::hours(6).to_string(), "PT6H");
        assert_eq!(CalendarDuration::default().to_string(), "P0D");
        let d = CalendarDuration {
            years: 1,
            months: 2,
            days: 3,
            hours: 4,
            minutes: 5,
            seconds: 6,
            ..Default::default()
        };
        assert_eq!(d.to_string(), "P1Y2M3DT4H5M6S");
    }

    #[test]
    fn test_parse_iso_duration() {
        assert_eq!(parse_iso_duration("P1D"), Some(CalendarDuration::days(1)));
        assert_eq!(parse_iso_duration("P2W"), Some(CalendarDuration::weeks(2)));
        assert_eq!(parse_iso_duration("PT6H"), Some(CalendarDuration::hours(6)));
        let d = parse_iso_duration("P1Y2M3DT4H5M6S").unwrap();
        assert_eq!(d.years, 1);
        assert_eq!(d.months, 2);
        assert_eq!(d.days, 3);
        assert_eq!(d.hours, 4);
        assert_eq!(d.minutes, 5);
        assert_eq!(d.seconds, 6);
    }

    #[test]
    fn test_parse_iso_duration_month_vs_minute() {
        assert_eq!(parse_iso_duration("P1M").unwrap().months, 1);
        assert_eq!(parse_iso_duration("PT1M").unwrap().minutes, 1);
    }

    #[test]
    fn test_parse_iso_duration_rejects_garbage() {
        assert_eq!(parse_iso_duration(""), None);
        assert_eq!(parse_iso_duration("P"), None);
        assert_eq!(parse_iso_duration("PT"), None);
        assert_eq!(parse_iso_duration("1D"), None);
        assert_eq!(parse_iso_duration("P1"), None);
        assert_eq!(parse_iso_duration("P1H"), None);
        assert_eq!(parse_iso_duration("PT1D"), None);
        assert!("P1X".parse::<CalendarDuration>().is_err());
    }

    #[test]
    fn test_parse_iso_duration_repeated_components_overflow() {
        assert_eq!(parse_iso_duration("P2D3D").unwrap().days, 5);
        assert_eq!(parse_iso_duration("P9223372036854775807Y1Y"), None);
        assert_eq!(parse_iso_duration("PT-9223372036854775808H-1H"), None);
    }

    // ── Calendar construction ───────────────────────────────────────────

    #[test]
    fn test_calendar_invalid_timezone_returns_error() {
        let err = Calendar::from_name("Mars/Olympus").unwrap_err();
        assert!(matches!(err, TimeGraphError::InvalidTimezone(_)));
    }

    #[test]
    fn test_calendar_from_config_defaults_to_utc() {
        let config: CalendarConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(Calendar::from_config(&config).unwrap(), Calendar::utc());

        let config: CalendarConfig =
            serde_json::from_str(r#"{"timezone":"Asia/Tokyo"}"#).unwrap();
        assert_eq!(
            Calendar::from_config(&config).unwrap().timezone(),
            chrono_tz::Asia::Tokyo
        );
    }

    // ── Arithmetic ──────────────────────────────────────────────────────

    #[test]
    fn test_add_month_clamps_to_month_end() {
        let cal = Calendar::utc();
        let jan31 = local(&cal, 2020, 1, 31, 0);
        let result = cal.shift(&jan31, CalendarUnit::Month, 1);
        assert_eq!(result, local(&cal, 2020, 2, 29, 0));
    }

    #[test]
    fn test_add_year_and_negative_months() {
        let cal = Calendar::utc();
        let base = local(&cal, 2020, 3, 15, 0);
        assert_eq!(
            cal.shift(&base, CalendarUnit::Year, 1),
            local(&cal, 2021, 3, 15, 0)
        );
        assert_eq!(
            cal.shift(&base, CalendarUnit::Month, -3),
            local(&cal, 2019, 12, 15, 0)
        );
    }

    #[test]
    fn test_add_day_across_spring_forward_keeps_wall_clock() {
        // March 29 2020: Berlin skips 02:00-03:00
        let cal = berlin();
        let base = local(&cal, 2020, 3, 28, 12);
        let next = cal.shift(&base, CalendarUnit::Day, 1);
        assert_eq!(next.hour(), 12);
        assert_eq!((next - base).num_hours(), 23);
    }

    #[test]
    fn test_add_hours_across_spring_forward_is_absolute() {
        let cal = berlin();
        let base = local(&cal, 2020, 3, 29, 0);
        let later = cal.shift(&base, CalendarUnit::Hour, 6);
        assert_eq!(later.hour(), 7);
    }

    #[test]
    fn test_checked_shift_overflow_is_none() {
        let cal = Calendar::utc();
        let base = local(&cal, 2020, 1, 1, 0);
        assert_eq!(cal.checked_shift(&base, CalendarUnit::Year, i64::MAX), None);
        assert_eq!(cal.checked_shift(&base, CalendarUnit::Day, 10_000_000_000), None);
        let huge = CalendarDuration::years(1_000_000);
        assert_eq!(cal.checked_apply(&base, &huge, Direction::Future), None);
    }

    #[test]
    fn test_apply_duration_past_inverts_future() {
        let cal = Calendar::utc();
        let base = local(&cal, 2020, 1, 1, 0);
        let d = CalendarDuration::days(10);
        let forward = cal.apply(&base, &d, Direction::Future);
        assert_eq!(cal.apply(&forward, &d, Direction::Past), base);
    }

    #[test]
    fn test_localize_gap_moves_forward() {
        let cal = berlin();
        let naive = NaiveDate::from_ymd_opt(2020, 3, 29)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let dt = cal.localize(naive);
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_localize_ambiguous_earliest_and_latest() {
        // October 25 2020: Berlin repeats 02:00-03:00
        let cal = berlin();
        let naive = NaiveDate::from_ymd_opt(2020, 10, 25)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(cal.utc_offset(&cal.localize(naive)), 7200);
        assert_eq!(cal.utc_offset(&cal.localize_latest(naive)), 3600);
    }

    // ── startOf / endOf ─────────────────────────────────────────────────

    #[test]
    fn test_start_of_units() {
        let cal = Calendar::utc();
        // Wednesday
        let dt = Utc
            .with_ymd_and_hms(2020, 5, 13, 14, 35, 12)
            .unwrap()
            .with_timezone(&Tz::UTC);
        assert_eq!(
            cal.start_of(&dt, CalendarUnit::Hour),
            local(&cal, 2020, 5, 13, 14)
        );
        assert_eq!(
            cal.start_of(&dt, CalendarUnit::Day),
            local(&cal, 2020, 5, 13, 0)
        );
        assert_eq!(
            cal.start_of(&dt, CalendarUnit::Week),
            local(&cal, 2020, 5, 11, 0)
        );
        assert_eq!(
            cal.start_of(&dt, CalendarUnit::Month),
            local(&cal, 2020, 5, 1, 0)
        );
        assert_eq!(
            cal.start_of(&dt, CalendarUnit::Year),
            local(&cal, 2020, 1, 1, 0)
        );
    }

    #[test]
    fn test_start_of_iso_week_on_sunday() {
        let cal = Calendar::utc();
        let sunday = local(&cal, 2020, 5, 17, 9);
        assert_eq!(
            cal.start_of(&sunday, CalendarUnit::Week),
            local(&cal, 2020, 5, 11, 0)
        );
    }

    #[test]
    fn test_end_of_day_is_last_millisecond() {
        let cal = Calendar::utc();
        let dt = local(&cal, 2020, 5, 13, 14);
        let end = cal.end_of(&dt, CalendarUnit::Day);
        assert_eq!(end.to_rfc3339(), "2020-05-13T23:59:59.999+00:00");
    }

    #[test]
    fn test_end_of_month_february_leap_year() {
        let cal = Calendar::utc();
        let dt = local(&cal, 2020, 2, 10, 0);
        let end = cal.end_of(&dt, CalendarUnit::Month);
        assert_eq!(end.day(), 29);
    }

    #[test]
    fn test_checked_end_of_last_representable_year_is_none() {
        let cal = Calendar::utc();
        let last = cal.instant(NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap().and_utc());
        assert_eq!(cal.checked_end_of(&last, CalendarUnit::Year), None);
        assert_eq!(cal.checked_end_of(&last, CalendarUnit::Day), None);
        let first = cal.checked_start_of(&last, CalendarUnit::Year).unwrap();
        assert_eq!((first.month(), first.day()), (1, 1));
    }

    // ── Offsets and DST ─────────────────────────────────────────────────

    #[test]
    fn test_is_dst_northern_and_southern() {
        let cal = berlin();
        assert!(cal.is_dst(&local(&cal, 2020, 7, 1, 12)));
        assert!(!cal.is_dst(&local(&cal, 2020, 1, 1, 12)));

        let sydney = Calendar::from_name("Australia/Sydney").unwrap();
        assert!(sydney.is_dst(&local(&sydney, 2020, 1, 1, 12)));
        assert!(!sydney.is_dst(&local(&sydney, 2020, 7, 1, 12)));

        let utc = Calendar::utc();
        assert!(!utc.is_dst(&local(&utc, 2020, 7, 1, 12)));
    }

    #[test]
    fn test_utc_offset() {
        let cal = berlin();
        assert_eq!(cal.utc_offset(&local(&cal, 2020, 1, 1, 0)), 3600);
        assert_eq!(cal.utc_offset(&local(&cal, 2020, 7, 1, 0)), 7200);
    }

    #[test]
    fn test_days_in_month() {
        let cal = Calendar::utc();
        assert_eq!(cal.days_in_month(&local(&cal, 2021, 2, 14, 0)), 28);
        assert_eq!(cal.days_in_month(&local(&cal, 2020, 2, 14, 0)), 29);
        assert_eq!(cal.days_in_month(&local(&cal, 2020, 12, 31, 0)), 31);
    }

    #[test]
    fn test_difference_days_and_hours() {
        let cal = berlin();
        let from = local(&cal, 2020, 3, 28, 0);
        let to = local(&cal, 2020, 3, 30, 6);
        let d = cal.difference(&from, &to);
        assert_eq!(d.days, 2);
        assert_eq!(d.hours, 6);
        assert_eq!(cal.apply(&from, &d, Direction::Future), to);
    }

    #[test]
    fn test_span_at_least_uses_month_length_at_base() {
        let cal = Calendar::utc();
        let feb = local(&cal, 2021, 2, 1, 0);
        let jan = local(&cal, 2021, 1, 1, 0);
        let four_weeks = CalendarDuration::weeks(4);
        let month = CalendarDuration::months(1);
        assert!(cal.span_at_least(&feb, &four_weeks, &month));
        assert!(!cal.span_at_least(&jan, &four_weeks, &month));
    }
}
