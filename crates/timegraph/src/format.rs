//! Human-readable labels for intervals and slices.
//!
//! Every label comes in a long and a short form; renderers pick whichever
//! fits the available width.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Timelike};
use serde::Serialize;

/// Long and short forms of a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceLabels {
    pub long: String,
    pub short: String,
}

impl SliceLabels {
    pub fn new(long: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: short.into(),
        }
    }
}

/// `"January"` / `"Jan"`.
pub fn month_labels<Tz: TimeZone>(dt: &DateTime<Tz>) -> SliceLabels
where
    Tz::Offset: std::fmt::Display,
{
    SliceLabels::new(dt.format("%B").to_string(), dt.format("%b").to_string())
}

/// `"Mon 5"` / `"Mo 5"`.
pub fn day_labels<Tz: TimeZone>(dt: &DateTime<Tz>) -> SliceLabels
where
    Tz::Offset: std::fmt::Display,
{
    let weekday = dt.format("%a").to_string();
    let short: String = weekday.chars().take(2).collect();
    SliceLabels::new(
        format!("{weekday} {}", dt.day()),
        format!("{short} {}", dt.day()),
    )
}

/// `"14:00"` / `"14"`.
pub fn hour_labels<Tz: TimeZone>(dt: &DateTime<Tz>) -> SliceLabels {
    SliceLabels::new(format!("{:02}:00", dt.hour()), format!("{:02}", dt.hour()))
}

/// Describe the half-open interval `[from, to)`.
///
/// Intervals that start and end at midnight are described by the days they
/// cover (the exclusive end is not shown):
///
/// | Covers | Long | Short |
/// |---|---|---|
/// | one day | `Monday, January 6, 2020` | `Jan 6` |
/// | same month | `January 6 – 12, 2020` | `Jan 6–12` |
/// | same year | `January 27 – February 2, 2020` | `Jan 27–Feb 2` |
/// | across years | `December 30, 2019 – January 5, 2020` | `Dec 30, 2019–Jan 5, 2020` |
///
/// Anything else is described by clock times, e.g.
/// `January 6, 2020, 14:00 – 18:00` / `14:00–18:00`.
pub fn format_interval<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> SliceLabels
where
    Tz::Offset: std::fmt::Display,
{
    let day_aligned = from.time() == NaiveTime::MIN && to.time() == NaiveTime::MIN && to > from;
    if !day_aligned {
        return format_clock_interval(from, to);
    }

    // Last covered day.
    let last = to.clone() - chrono::Duration::milliseconds(1);

    if from.date_naive() == last.date_naive() {
        return SliceLabels::new(
            from.format("%A, %B %-d, %Y").to_string(),
            from.format("%b %-d").to_string(),
        );
    }

    if from.year() == last.year() && from.month() == last.month() {
        return SliceLabels::new(
            format!("{} {} – {}, {}", from.format("%B"), from.day(), last.day(), from.year()),
            format!("{} {}–{}", from.format("%b"), from.day(), last.day()),
        );
    }

    if from.year() == last.year() {
        return SliceLabels::new(
            format!(
                "{} – {}, {}",
                from.format("%B %-d"),
                last.format("%B %-d"),
                from.year()
            ),
            format!("{}–{}", from.format("%b %-d"), last.format("%b %-d")),
        );
    }

    SliceLabels::new(
        format!(
            "{} – {}",
            from.format("%B %-d, %Y"),
            last.format("%B %-d, %Y")
        ),
        format!("{}–{}", from.format("%b %-d, %Y"), last.format("%b %-d, %Y")),
    )
}

fn format_clock_interval<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> SliceLabels
where
    Tz::Offset: std::fmt::Display,
{
    if from.date_naive() == to.date_naive() {
        SliceLabels::new(
            format!(
                "{}, {} – {}",
                from.format("%B %-d, %Y"),
                from.format("%H:%M"),
                to.format("%H:%M")
            ),
            format!("{}–{}", from.format("%H:%M"), to.format("%H:%M")),
        )
    } else {
        SliceLabels::new(
            format!(
                "{} – {}",
                from.format("%B %-d, %Y, %H:%M"),
                to.format("%B %-d, %Y, %H:%M")
            ),
            format!("{}–{}", from.format("%b %-d %H:%M"), to.format("%b %-d %H:%M")),
        )
    }
}
