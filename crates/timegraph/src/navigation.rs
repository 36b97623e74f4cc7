//! Paging and zooming through interval queries.
//!
//! All operations are pure functions of the current [`TimeQuery`] and a
//! captured `now`. None of them fail: a missing or malformed current query
//! is replaced by the default query (today, one day wide) before the action
//! is applied.
//!
//! # DST correction
//!
//! Sub-day steps are absolute time, so paging a six-hour window across a
//! spring-forward transition would otherwise move it from 00:00 to 07:00
//! local time. Before shifting, the step is corrected by the UTC-offset
//! change between the current base and the tentative new base, so the base
//! always advances by the step's wall-clock width (00:00 → 06:00).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::calendar::{Calendar, CalendarDuration, CalendarUnit, Direction};
use crate::interval::{self, TimeQuery};

/// A navigation request from the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavAction {
    /// Page forward by the interval's own width.
    Next,
    /// Page back by the interval's own width.
    Previous,
    /// Step forward by the fine step (see [`Navigator::fine_step`]).
    FineNext,
    /// Step back by the fine step.
    FinePrevious,
    /// Widen to the next coarser canonical interval.
    ZoomOut,
}

/// Zoom-out ladder: a duration shorter than the threshold widens to it and
/// the base snaps to the start of the unit.
const ZOOM_LADDER: [(CalendarUnit, i64, CalendarUnit); 7] = [
    (CalendarUnit::Day, 1, CalendarUnit::Day),
    (CalendarUnit::Week, 1, CalendarUnit::Week),
    (CalendarUnit::Week, 2, CalendarUnit::Week),
    (CalendarUnit::Month, 1, CalendarUnit::Month),
    (CalendarUnit::Month, 3, CalendarUnit::Month),
    (CalendarUnit::Month, 6, CalendarUnit::Month),
    (CalendarUnit::Year, 1, CalendarUnit::Year),
];

#[derive(Debug, Clone, Copy)]
pub struct Navigator {
    calendar: Calendar,
    now: DateTime<Utc>,
}

impl Navigator {
    pub fn new(calendar: Calendar, now: DateTime<Utc>) -> Self {
        Self { calendar, now }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Today, from local midnight, one day wide.
    pub fn default_query(&self) -> TimeQuery {
        TimeQuery::default_for(&self.calendar, self.now)
    }

    /// Parse a stored query string, falling back to the default query.
    pub fn current(&self, input: Option<&str>) -> TimeQuery {
        let parsed = input.and_then(|input| interval::parse(&self.calendar, input));
        self.or_default(parsed.as_ref())
    }

    /// Apply `action` to the current query (or the default if there is none).
    pub fn apply(&self, query: Option<&TimeQuery>, action: NavAction) -> TimeQuery {
        let query = self.or_default(query);
        match action {
            NavAction::Next => self.next(&query),
            NavAction::Previous => self.previous(&query),
            NavAction::FineNext => self.fine_next(&query),
            NavAction::FinePrevious => self.fine_previous(&query),
            NavAction::ZoomOut => self.zoom_out(&query),
        }
    }

    /// Parse, apply `action` and serialize: the round trip a URL-driven host
    /// performs on every navigation event.
    pub fn navigate(&self, input: Option<&str>, action: NavAction) -> String {
        let query = self.current(input);
        interval::serialize(&self.calendar, &self.apply(Some(&query), action))
    }

    pub fn next(&self, query: &TimeQuery) -> TimeQuery {
        self.step(query, &query.duration, Direction::Future)
    }

    pub fn previous(&self, query: &TimeQuery) -> TimeQuery {
        self.step(query, &query.duration, Direction::Past)
    }

    /// The keyboard step for a query: one week for month-wide or wider
    /// intervals, one day for anything wider than a day, otherwise six hours.
    pub fn fine_step(&self, query: &TimeQuery) -> CalendarDuration {
        let base = self.local_base(query);
        let one_day = CalendarDuration::days(1);
        if self
            .calendar
            .span_at_least(&base, &query.duration, &CalendarDuration::months(1))
        {
            CalendarDuration::weeks(1)
        } else if !self.calendar.span_at_least(&base, &one_day, &query.duration) {
            one_day
        } else {
            CalendarDuration::hours(6)
        }
    }

    pub fn fine_next(&self, query: &TimeQuery) -> TimeQuery {
        self.step(query, &self.fine_step(query), Direction::Future)
    }

    pub fn fine_previous(&self, query: &TimeQuery) -> TimeQuery {
        self.step(query, &self.fine_step(query), Direction::Past)
    }

    /// Widen to the next rung of the zoom ladder (1 day, 1 week, 2 weeks,
    /// 1 month, 3 months, 6 months, 1 year), snapping the base to the start
    /// of the rung's unit. A year or wider is left unchanged.
    pub fn zoom_out(&self, query: &TimeQuery) -> TimeQuery {
        let base = self.local_base(query);
        for (unit, amount, snap) in ZOOM_LADDER {
            let rung = CalendarDuration::of(unit, amount);
            if !self.calendar.span_at_least(&base, &query.duration, &rung) {
                return TimeQuery::new(self.calendar.start_of(&base, snap), rung);
            }
        }
        *query
    }

    /// Shift the base by `by`, keeping the query's duration.
    fn step(&self, query: &TimeQuery, by: &CalendarDuration, direction: Direction) -> TimeQuery {
        let base = self.local_base(query);
        TimeQuery::new(self.shift_corrected(&base, by, direction), query.duration)
    }

    fn shift_corrected(
        &self,
        base: &DateTime<Tz>,
        by: &CalendarDuration,
        direction: Direction,
    ) -> DateTime<Tz> {
        let tentative = self.calendar.apply(base, by, direction);
        if !by.is_sub_day() {
            return tentative;
        }
        let delta_minutes =
            i64::from(self.calendar.utc_offset(&tentative) - self.calendar.utc_offset(base)) / 60;
        if delta_minutes == 0 {
            return tentative;
        }
        let sign = match direction {
            Direction::Future => 1,
            Direction::Past => -1,
        };
        let corrected = by.with(CalendarUnit::Minute, by.minutes - sign * delta_minutes);
        debug!(delta_minutes, "correcting step across DST transition");
        self.calendar.apply(base, &corrected, direction)
    }

    fn local_base(&self, query: &TimeQuery) -> DateTime<Tz> {
        self.calendar.instant(query.base.with_timezone(&Utc))
    }

    fn or_default(&self, query: Option<&TimeQuery>) -> TimeQuery {
        match query {
            Some(query) if query.end(&self.calendar) > query.base => *query,
            Some(query) => {
                debug!(duration = %query.duration, "empty or reversed query, using default");
                self.default_query()
            }
            None => {
                debug!("no current query, using default");
                self.default_query()
            }
        }
    }
}
