//! Partitioning an interval into labeled buckets for bar graphs.
//!
//! [`enumerate`] slices a query's interval at two granularities at once,
//! coarse and fine, chosen by how wide the interval is:
//!
//! | Width at least | Coarse | Fine | Length unit |
//! |---|---|---|---|
//! | 3 months | month | ISO week | day |
//! | 14 days | ISO week | day | day |
//! | 3 days | day | quarter-day | hour |
//! | otherwise | quarter-day | hour | hour |
//!
//! Slices within one list are ordered, contiguous, clipped to the interval,
//! and never empty, so each list covers exactly `[from, to)`. Coarse and
//! fine lengths are not guaranteed to add up to the same total: month
//! slices carry the full month length even when clipped.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::trace;

use crate::calendar::{Calendar, CalendarDuration, CalendarUnit, Direction};
use crate::format::{day_labels, format_interval, hour_labels, month_labels, SliceLabels};
use crate::interval::{self, hour_key, TimeQuery, SEPARATOR};

/// Unit of [`TimeSlice::length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Day,
    Hour,
}

/// One bucket of a sliced interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlice {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub from: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub to: DateTime<Utc>,
    /// Interval-dialect query for drilling down into this slice.
    pub key: Option<String>,
    pub labels: SliceLabels,
    /// Visual width, in the subdivision's [`LengthUnit`].
    pub length: f64,
}

impl TimeSlice {
    /// Whether `instant` falls in `[from, to)`.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.from <= *instant && *instant < self.to
    }
}

/// Both granularities of a sliced interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slices {
    pub coarse: Vec<TimeSlice>,
    pub fine: Vec<TimeSlice>,
    pub length_unit: LengthUnit,
}

/// A bucketing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slicer {
    Month,
    IsoWeek,
    /// Calendar days, with lengths in the given unit.
    Day(LengthUnit),
    /// Night, Morning, Afternoon and Evening.
    QuarterDay,
    Hour,
}

/// The coarse/fine slicer pair for an interval width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subdivision {
    pub coarse: Slicer,
    pub fine: Slicer,
    pub length_unit: LengthUnit,
}

impl Subdivision {
    /// Pick slicers for `[from, to)`, widest rule first. Month lengths are
    /// measured from `from`.
    pub fn select(calendar: &Calendar, from: &DateTime<Tz>, to: &DateTime<Tz>) -> Self {
        let reaches = |threshold: CalendarDuration| {
            *to >= calendar.apply(from, &threshold, Direction::Future)
        };
        let subdivision = if reaches(CalendarDuration::months(3)) {
            Subdivision {
                coarse: Slicer::Month,
                fine: Slicer::IsoWeek,
                length_unit: LengthUnit::Day,
            }
        } else if reaches(CalendarDuration::days(14)) {
            Subdivision {
                coarse: Slicer::IsoWeek,
                fine: Slicer::Day(LengthUnit::Day),
                length_unit: LengthUnit::Day,
            }
        } else if reaches(CalendarDuration::days(3)) {
            Subdivision {
                coarse: Slicer::Day(LengthUnit::Hour),
                fine: Slicer::QuarterDay,
                length_unit: LengthUnit::Hour,
            }
        } else {
            Subdivision {
                coarse: Slicer::QuarterDay,
                fine: Slicer::Hour,
                length_unit: LengthUnit::Hour,
            }
        };
        trace!(?subdivision, %from, %to, "selected subdivision");
        subdivision
    }

    pub fn for_query(calendar: &Calendar, query: &TimeQuery) -> Self {
        let base = calendar.instant(query.base.with_timezone(&Utc));
        Self::select(calendar, &base, &query.end(calendar))
    }
}

/// Slice a query's interval at both granularities.
pub fn enumerate(calendar: &Calendar, query: &TimeQuery) -> Slices {
    let base = calendar.instant(query.base.with_timezone(&Utc));
    slice_between(calendar, &base, &query.end(calendar))
}

/// Slice an arbitrary `[from, to)` range, e.g. a resolved relative range.
pub fn enumerate_range(calendar: &Calendar, from: DateTime<Utc>, to: DateTime<Utc>) -> Slices {
    slice_between(calendar, &calendar.instant(from), &calendar.instant(to))
}

fn slice_between(calendar: &Calendar, from: &DateTime<Tz>, to: &DateTime<Tz>) -> Slices {
    let subdivision = Subdivision::select(calendar, from, to);
    Slices {
        coarse: subdivision.coarse.slice(calendar, from, to),
        fine: subdivision.fine.slice(calendar, from, to),
        length_unit: subdivision.length_unit,
    }
}

/// Count `points` per slice. Points outside every slice are ignored.
pub fn bucket_counts<I>(slices: &[TimeSlice], points: I) -> Vec<usize>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts = vec![0; slices.len()];
    for point in points {
        let idx = slices.partition_point(|slice| slice.from <= point);
        if idx > 0 && slices[idx - 1].contains(&point) {
            counts[idx - 1] += 1;
        }
    }
    counts
}

impl Slicer {
    /// Slice `[from, to)`.
    pub fn slice(&self, calendar: &Calendar, from: &DateTime<Tz>, to: &DateTime<Tz>) -> Vec<TimeSlice> {
        match self {
            Slicer::Month => periods(calendar, from, to, CalendarUnit::Month)
                .into_iter()
                .filter_map(|period| {
                    let (start, end) = period.clip(from, to)?;
                    Some(TimeSlice {
                        from: start.with_timezone(&Utc),
                        to: end.with_timezone(&Utc),
                        key: period.key(calendar, &start, &end, CalendarDuration::months(1)),
                        labels: month_labels(&period.start),
                        length: calendar.days_in_month(&period.start) as f64,
                    })
                })
                .collect(),
            Slicer::IsoWeek => periods(calendar, from, to, CalendarUnit::Week)
                .into_iter()
                .filter_map(|period| {
                    let (start, end) = period.clip(from, to)?;
                    let length = day_length(calendar, &start, &end);
                    (length > 0.0).then(|| TimeSlice {
                        from: start.with_timezone(&Utc),
                        to: end.with_timezone(&Utc),
                        key: period.key(calendar, &start, &end, CalendarDuration::weeks(1)),
                        labels: format_interval(&start, &end),
                        length,
                    })
                })
                .collect(),
            Slicer::Day(unit) => periods(calendar, from, to, CalendarUnit::Day)
                .into_iter()
                .filter_map(|period| {
                    let (start, end) = period.clip(from, to)?;
                    let length = match unit {
                        LengthUnit::Day => day_length(calendar, &start, &end),
                        LengthUnit::Hour => hour_length(&start, &end),
                    };
                    Some(TimeSlice {
                        from: start.with_timezone(&Utc),
                        to: end.with_timezone(&Utc),
                        key: period.key(calendar, &start, &end, CalendarDuration::days(1)),
                        labels: day_labels(&period.start),
                        length,
                    })
                })
                .collect(),
            Slicer::QuarterDay => periods(calendar, from, to, CalendarUnit::Day)
                .into_iter()
                .flat_map(|day| quarter_days(calendar, &day))
                .filter_map(|(quarter, period)| {
                    let (start, end) = period.clip(from, to)?;
                    let length = if quarter == Quarter::Night || !period.is_whole(&start, &end) {
                        hour_length(&start, &end)
                    } else {
                        6.0
                    };
                    let date = period.start.date_naive();
                    Some(TimeSlice {
                        from: start.with_timezone(&Utc),
                        to: end.with_timezone(&Utc),
                        key: Some(format!(
                            "{}{SEPARATOR}PT6H",
                            hour_key(date, quarter.start_hour())
                        )),
                        labels: quarter.labels(),
                        length,
                    })
                })
                .collect(),
            Slicer::Hour => periods(calendar, from, to, CalendarUnit::Hour)
                .into_iter()
                .filter_map(|period| {
                    let (start, end) = period.clip(from, to)?;
                    let length = if period.is_whole(&start, &end) {
                        1.0
                    } else {
                        hour_length(&start, &end)
                    };
                    Some(TimeSlice {
                        from: start.with_timezone(&Utc),
                        to: end.with_timezone(&Utc),
                        key: period.key(calendar, &start, &end, CalendarDuration::hours(1)),
                        labels: hour_labels(&period.start),
                        length,
                    })
                })
                .collect(),
        }
    }
}

// ── Periods ─────────────────────────────────────────────────────────────────

/// One whole calendar unit, before clipping.
#[derive(Debug, Clone, Copy)]
struct Period {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl Period {
    /// Intersection with `[from, to)`, or `None` if empty.
    fn clip(&self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let start = self.start.max(*from);
        let end = self.end.min(*to);
        (start < end).then_some((start, end))
    }

    fn is_whole(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> bool {
        *start == self.start && *end == self.end
    }

    /// Drill-down key: the whole unit when unclipped, otherwise the exact
    /// clipped span. `None` when the span cannot be written exactly: bases
    /// are written to the hour and durations to the second.
    fn key(
        &self,
        calendar: &Calendar,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        whole: CalendarDuration,
    ) -> Option<String> {
        let duration = if self.is_whole(start, end) {
            whole
        } else {
            if calendar.start_of(start, CalendarUnit::Hour) != *start
                || calendar.start_of(end, CalendarUnit::Second) != *end
            {
                return None;
            }
            calendar.difference(start, end)
        };
        Some(interval::serialize(calendar, &TimeQuery::new(*start, duration)))
    }
}

/// Consecutive whole units touching `[from, to)`.
fn periods(
    calendar: &Calendar,
    from: &DateTime<Tz>,
    to: &DateTime<Tz>,
    unit: CalendarUnit,
) -> Vec<Period> {
    let mut out = Vec::new();
    let mut cursor = calendar.start_of(from, unit);
    while cursor < *to {
        let next = calendar.shift(&cursor, unit, 1);
        if next <= cursor {
            break;
        }
        out.push(Period {
            start: cursor,
            end: next,
        });
        cursor = next;
    }
    out
}

// ── Quarter days ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quarter {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl Quarter {
    const ALL: [Quarter; 4] = [
        Quarter::Night,
        Quarter::Morning,
        Quarter::Afternoon,
        Quarter::Evening,
    ];

    fn start_hour(self) -> u32 {
        match self {
            Quarter::Night => 0,
            Quarter::Morning => 6,
            Quarter::Afternoon => 12,
            Quarter::Evening => 18,
        }
    }

    fn labels(self) -> SliceLabels {
        match self {
            Quarter::Night => SliceLabels::new("Night", "N"),
            Quarter::Morning => SliceLabels::new("Morning", "M"),
            Quarter::Afternoon => SliceLabels::new("Afternoon", "A"),
            Quarter::Evening => SliceLabels::new("Evening", "E"),
        }
    }
}

/// The four quarters of a day. Night starts at the day's start and Evening
/// ends at the next day's start, so quarters tile the day exactly.
fn quarter_days(calendar: &Calendar, day: &Period) -> Vec<(Quarter, Period)> {
    let date = day.start.date_naive();
    let boundary = |hour: u32| {
        calendar.localize(date.and_time(NaiveTime::MIN) + chrono::Duration::hours(i64::from(hour)))
    };
    Quarter::ALL
        .into_iter()
        .map(|quarter| {
            let start = match quarter {
                Quarter::Night => day.start,
                _ => boundary(quarter.start_hour()),
            };
            let end = match quarter {
                Quarter::Evening => day.end,
                _ => boundary(quarter.start_hour() + 6),
            };
            (quarter, Period { start, end })
        })
        .collect()
}

// ── Lengths ─────────────────────────────────────────────────────────────────

fn hour_length(start: &DateTime<Tz>, end: &DateTime<Tz>) -> f64 {
    (*end - *start).num_seconds() as f64 / 3600.0
}

/// Wall-clock days, with any remainder as a fraction of 24 hours.
fn day_length(calendar: &Calendar, start: &DateTime<Tz>, end: &DateTime<Tz>) -> f64 {
    let days = calendar.whole_days_between(start, end);
    let rest = *end - calendar.shift(start, CalendarUnit::Day, days);
    days as f64 + rest.num_seconds() as f64 / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn berlin() -> Calendar {
        Calendar::from_name("Europe/Berlin").unwrap()
    }

    fn slices(cal: &Calendar, q: &str) -> Slices {
        enumerate(cal, &interval::parse(cal, q).unwrap())
    }

    fn lengths(slices: &[TimeSlice]) -> Vec<f64> {
        slices.iter().map(|s| s.length).collect()
    }

    fn short_labels(slices: &[TimeSlice]) -> Vec<&str> {
        slices.iter().map(|s| s.labels.short.as_str()).collect()
    }

    fn assert_covers(slices: &[TimeSlice], from: DateTime<Utc>, to: DateTime<Utc>) {
        assert_eq!(slices.first().unwrap().from, from);
        assert_eq!(slices.last().unwrap().to, to);
        for pair in slices.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        assert!(slices.iter().all(|s| s.from < s.to));
    }

    // ── Subdivision ─────────────────────────────────────────────────────

    #[test]
    fn test_subdivision_thresholds() {
        let cal = Calendar::utc();
        let select = |q: &str| Subdivision::for_query(&cal, &interval::parse(&cal, q).unwrap());

        assert_eq!(select("2020-01-01--P3M").coarse, Slicer::Month);
        assert_eq!(select("2020-01-01--P1Y").fine, Slicer::IsoWeek);
        assert_eq!(select("2020-01-01--P2M").coarse, Slicer::IsoWeek);
        assert_eq!(select("2020-01-01--P14D").fine, Slicer::Day(LengthUnit::Day));
        assert_eq!(select("2020-01-01--P13D").coarse, Slicer::Day(LengthUnit::Hour));
        assert_eq!(select("2020-01-01--P3D").fine, Slicer::QuarterDay);
        assert_eq!(select("2020-01-01--P2D").coarse, Slicer::QuarterDay);
        assert_eq!(select("2020-01-01--PT6H").fine, Slicer::Hour);
        assert_eq!(select("2020-01-01--P3D").length_unit, LengthUnit::Hour);
        assert_eq!(select("2020-01-01--P14D").length_unit, LengthUnit::Day);
    }

    // ── Month / week ────────────────────────────────────────────────────

    #[test]
    fn test_quarter_year_by_month_and_week() {
        let cal = Calendar::utc();
        let s = slices(&cal, "2020-01-01--P3M");
        assert_eq!(s.length_unit, LengthUnit::Day);

        assert_eq!(lengths(&s.coarse), vec![31.0, 29.0, 31.0]);
        assert_eq!(short_labels(&s.coarse), vec!["Jan", "Feb", "Mar"]);
        assert_eq!(s.coarse[1].labels.long, "February");
        assert_eq!(s.coarse[1].key.as_deref(), Some("2020-02-01--P1M"));

        // Jan 1 2020 is a Wednesday; Mar 31 a Tuesday.
        let first = &s.fine[0];
        assert_eq!(first.length, 5.0);
        assert_eq!(first.key.as_deref(), Some("2020-01-01--P5D"));
        assert_eq!(first.labels.short, "Jan 1–5");
        assert_eq!(s.fine[1].key.as_deref(), Some("2020-01-06--P1W"));
        assert_eq!(s.fine.last().unwrap().length, 2.0);
        let total: f64 = lengths(&s.fine).iter().sum();
        assert_eq!(total, 91.0);

        let from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap();
        assert_covers(&s.coarse, from, to);
        assert_covers(&s.fine, from, to);
    }

    #[test]
    fn test_clipped_month_keeps_full_length() {
        let cal = Calendar::utc();
        let s = slices(&cal, "2020-01-15--P3M");
        assert_eq!(s.coarse.len(), 4);
        assert_eq!(s.coarse[0].length, 31.0);
        assert_eq!(s.coarse[0].key.as_deref(), Some("2020-01-15--P17D"));
        assert_eq!(s.coarse[3].key.as_deref(), Some("2020-04-01--P14D"));
    }

    #[test]
    fn test_two_weeks_by_week_and_day() {
        let cal = Calendar::utc();
        let s = slices(&cal, "2020-01-06--P2W");
        assert_eq!(s.coarse.len(), 2);
        assert_eq!(lengths(&s.coarse), vec![7.0, 7.0]);
        assert_eq!(s.coarse[0].labels.long, "January 6 – 12, 2020");
        assert_eq!(s.fine.len(), 14);
        assert!(s.fine.iter().all(|slice| slice.length == 1.0));
        assert_eq!(s.fine[0].labels.long, "Mon 6");
        assert_eq!(s.fine[0].labels.short, "Mo 6");
        assert_eq!(s.fine[0].key.as_deref(), Some("2020-01-06--P1D"));
    }

    // ── Day / quarter-day / hour ────────────────────────────────────────

    #[test]
    fn test_three_days_by_day_and_quarter() {
        let cal = Calendar::utc();
        let s = slices(&cal, "2020-01-06--P3D");
        assert_eq!(s.length_unit, LengthUnit::Hour);
        assert_eq!(lengths(&s.coarse), vec![24.0, 24.0, 24.0]);
        assert_eq!(s.fine.len(), 12);
        assert_eq!(short_labels(&s.fine[..4]), vec!["N", "M", "A", "E"]);
        assert_eq!(s.fine[1].key.as_deref(), Some("2020-01-06T06--PT6H"));
        assert_eq!(s.fine[4].key.as_deref(), Some("2020-01-07T00--PT6H"));
    }

    #[test]
    fn test_single_day_by_quarter_and_hour() {
        let cal = Calendar::utc();
        let s = slices(&cal, "2020-01-06--P1D");
        assert_eq!(s.coarse.len(), 4);
        assert_eq!(lengths(&s.coarse), vec![6.0; 4]);
        assert_eq!(s.coarse[2].labels.long, "Afternoon");
        assert_eq!(s.fine.len(), 24);
        assert_eq!(s.fine[14].labels, SliceLabels::new("14:00", "14"));
        assert_eq!(s.fine[14].key.as_deref(), Some("2020-01-06T14--PT1H"));
        assert!(s.fine.iter().all(|slice| slice.length == 1.0));
    }

    #[test]
    fn test_spring_forward_day() {
        // March 29 2020: Berlin skips 02:00-03:00
        let cal = berlin();
        let s = slices(&cal, "2020-03-29--P1D");
        assert_eq!(lengths(&s.coarse), vec![5.0, 6.0, 6.0, 6.0]);
        assert_eq!(s.fine.len(), 23);
        let (from, to) = interval::parse(&cal, "2020-03-29--P1D").unwrap().range(&cal);
        assert_covers(&s.coarse, from, to);
        assert_covers(&s.fine, from, to);
    }

    #[test]
    fn test_fall_back_day() {
        // October 25 2020: Berlin repeats 02:00-03:00
        let cal = berlin();
        let s = slices(&cal, "2020-10-25--P1D");
        assert_eq!(lengths(&s.coarse), vec![7.0, 6.0, 6.0, 6.0]);
        assert_eq!(s.fine.len(), 25);
        let twos = s.fine.iter().filter(|slice| slice.labels.short == "02").count();
        assert_eq!(twos, 2);
    }

    #[test]
    fn test_day_slices_across_dst_measure_hours() {
        let cal = berlin();
        let s = slices(&cal, "2020-03-28--P3D");
        assert_eq!(lengths(&s.coarse), vec![24.0, 23.0, 24.0]);
    }

    #[test]
    fn test_partial_hours_are_clipped() {
        let cal = Calendar::utc();
        let q = interval::parse(&cal, "2020-01-06T10:30--PT2H").unwrap();
        let s = enumerate(&cal, &q);
        assert_eq!(lengths(&s.fine), vec![0.5, 1.0, 0.5]);
        let (from, to) = q.range(&cal);
        assert_covers(&s.fine, from, to);
        assert_covers(&s.coarse, from, to);
        let keys: Vec<_> = s.fine.iter().map(|slice| slice.key.as_deref()).collect();
        assert_eq!(keys, vec![None, Some("2020-01-06T11--PT1H"), Some("2020-01-06T12--PT30M")]);
    }

    // ── Keys ────────────────────────────────────────────────────────────

    fn assert_keys_drill_down(cal: &Calendar, s: &Slices) {
        for slice in s.coarse.iter().chain(&s.fine) {
            let Some(key) = slice.key.as_deref() else {
                continue;
            };
            if key.ends_with("--PT6H") {
                continue;
            }
            let drilled = interval::parse(cal, key).unwrap();
            assert_eq!(drilled.range(cal), (slice.from, slice.to), "{key}");
        }
    }

    #[test]
    fn test_keys_drill_down_to_slice_range() {
        let cal = berlin();
        for query in [
            "2020-01-15--P3M",
            "2020-03-23--P2W",
            "2020-10-24--P2D",
            "2020-01-06T10:30--PT2H",
            "2020-10-25T01:15--PT3H",
        ] {
            let s = slices(&cal, query);
            assert!(s.fine.iter().any(|slice| slice.key.is_some()), "{query}");
            assert_keys_drill_down(&cal, &s);
        }
    }

    #[test]
    fn test_keys_of_unaligned_relative_range() {
        let now = Utc.with_ymd_and_hms(2020, 5, 13, 14, 35, 12).unwrap();
        for cal in [Calendar::utc(), berlin()] {
            let from = crate::relative::parse("now-6h").unwrap().resolve(now).unwrap();
            let s = enumerate_range(&cal, from, now);
            assert_eq!(s.fine.len(), 7);
            // 08:35:12Z cannot be written as an hour base
            assert_eq!(s.fine[0].key, None);
            assert!(s.fine[1..].iter().all(|slice| slice.key.is_some()));
            assert_keys_drill_down(&cal, &s);
        }
        let s = enumerate_range(&Calendar::utc(), now - chrono::Duration::hours(6), now);
        assert_eq!(s.fine[6].key.as_deref(), Some("2020-05-13T14--PT35M12S"));
    }

    #[test]
    fn test_sub_second_end_has_no_key() {
        let cal = Calendar::utc();
        let from = Utc.with_ymd_and_hms(2020, 1, 6, 10, 0, 0).unwrap();
        let to = from + chrono::Duration::milliseconds(90_500);
        let s = enumerate_range(&cal, from, to);
        assert_eq!(s.fine.len(), 1);
        assert_eq!(s.fine[0].key, None);
    }

    // ── Ranges and bucketing ────────────────────────────────────────────

    #[test]
    fn test_enumerate_range() {
        let cal = Calendar::utc();
        let from = Utc.with_ymd_and_hms(2020, 1, 6, 10, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2020, 1, 6, 16, 0, 0).unwrap();
        let s = enumerate_range(&cal, from, to);
        assert_eq!(s.fine.len(), 6);
        assert_eq!(lengths(&s.coarse), vec![2.0, 4.0]);
        assert_covers(&s.coarse, from, to);
    }

    #[test]
    fn test_empty_range_has_no_slices() {
        let cal = Calendar::utc();
        let at = Utc.with_ymd_and_hms(2020, 1, 6, 10, 0, 0).unwrap();
        let s = enumerate_range(&cal, at, at);
        assert!(s.coarse.is_empty());
        assert!(s.fine.is_empty());
    }

    #[test]
    fn test_bucket_counts() {
        let cal = Calendar::utc();
        let s = slices(&cal, "2020-01-06--P1W");
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2020, 1, d, h, 0, 0).unwrap();
        let points = vec![at(6, 0), at(6, 23), at(8, 12), at(12, 23), at(13, 0), at(5, 23)];
        let counts = bucket_counts(&s.coarse, points);
        assert_eq!(counts, vec![2, 0, 1, 0, 0, 0, 1]);
        assert_eq!(counts.iter().sum::<usize>(), 4);
    }

    #[test]
    fn test_slices_serialize_millis() {
        let cal = Calendar::utc();
        let s = slices(&cal, "2020-01-01--PT1H");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["lengthUnit"], "hour");
        assert_eq!(json["fine"][0]["from"], 1577836800000i64);
        assert_eq!(json["fine"][0]["labels"]["short"], "00");
    }
}
