//! The relative (`now`-anchored) query dialect and its resolver.
//!
//! # Grammar
//!
//! ```text
//! query    = absolute | relative
//! absolute = digit+                          ; epoch milliseconds
//! relative = "now" [offset] [rounding]
//! offset   = ("+" | "-") digit+ unit
//! unit     = "m" | "h" | "d" | "w" | "M" | "y"
//! rounding = ("<" | ">") round-unit          ; "<" start of, ">" end of
//! round-unit = "d" | "w" | "M" | "y"         ; "w" is an ISO week
//! ```
//!
//! Examples: `now`, `now-2d`, `now+1d>d`, `now<w`, `1234567890`.
//!
//! Parsing and resolution are total: malformed input yields `None` and the
//! caller substitutes a default.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use url::form_urlencoded;

use crate::calendar::{Calendar, CalendarUnit};
use crate::error::TimeGraphError;

// ── Units ───────────────────────────────────────────────────────────────────

/// Offset unit of a relative query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelativeUnit {
    #[serde(rename = "m")]
    Minute,
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "w")]
    Week,
    #[serde(rename = "M")]
    Month,
    #[serde(rename = "y")]
    Year,
}

impl RelativeUnit {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'm' => Some(RelativeUnit::Minute),
            'h' => Some(RelativeUnit::Hour),
            'd' => Some(RelativeUnit::Day),
            'w' => Some(RelativeUnit::Week),
            'M' => Some(RelativeUnit::Month),
            'y' => Some(RelativeUnit::Year),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            RelativeUnit::Minute => 'm',
            RelativeUnit::Hour => 'h',
            RelativeUnit::Day => 'd',
            RelativeUnit::Week => 'w',
            RelativeUnit::Month => 'M',
            RelativeUnit::Year => 'y',
        }
    }

    pub fn calendar_unit(self) -> CalendarUnit {
        match self {
            RelativeUnit::Minute => CalendarUnit::Minute,
            RelativeUnit::Hour => CalendarUnit::Hour,
            RelativeUnit::Day => CalendarUnit::Day,
            RelativeUnit::Week => CalendarUnit::Week,
            RelativeUnit::Month => CalendarUnit::Month,
            RelativeUnit::Year => CalendarUnit::Year,
        }
    }
}

/// Unit a relative query can be rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoundUnit {
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "isoWeek")]
    IsoWeek,
    #[serde(rename = "M")]
    Month,
    #[serde(rename = "y")]
    Year,
}

impl RoundUnit {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(RoundUnit::Day),
            'w' => Some(RoundUnit::IsoWeek),
            'M' => Some(RoundUnit::Month),
            'y' => Some(RoundUnit::Year),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            RoundUnit::Day => 'd',
            RoundUnit::IsoWeek => 'w',
            RoundUnit::Month => 'M',
            RoundUnit::Year => 'y',
        }
    }

    pub fn calendar_unit(self) -> CalendarUnit {
        match self {
            RoundUnit::Day => CalendarUnit::Day,
            RoundUnit::IsoWeek => CalendarUnit::Week,
            RoundUnit::Month => CalendarUnit::Month,
            RoundUnit::Year => CalendarUnit::Year,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundTo {
    Start,
    End,
}

/// Snap to the start or end of a calendar unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rounding {
    pub round_to: RoundTo,
    pub round_unit: RoundUnit,
}

impl Rounding {
    pub fn start(unit: RoundUnit) -> Self {
        Self {
            round_to: RoundTo::Start,
            round_unit: unit,
        }
    }

    pub fn end(unit: RoundUnit) -> Self {
        Self {
            round_to: RoundTo::End,
            round_unit: unit,
        }
    }
}

// ── Queries ─────────────────────────────────────────────────────────────────

/// An offset from "now", optionally rounded.
///
/// `unit` is required whenever `value` is non-zero; queries that break this
/// neither serialize nor resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeQuery {
    #[serde(rename = "relativeValue")]
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<RelativeUnit>,
    #[serde(flatten)]
    pub rounding: Option<Rounding>,
}

impl RelativeQuery {
    /// Plain `now`.
    pub fn now() -> Self {
        Self::default()
    }

    pub fn offset(value: i64, unit: RelativeUnit) -> Self {
        Self {
            value,
            unit: Some(unit),
            rounding: None,
        }
    }

    pub fn rounded(mut self, rounding: Rounding) -> Self {
        self.rounding = Some(rounding);
        self
    }
}

/// A parsed relative-dialect query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ParsedQuery {
    /// Epoch milliseconds.
    Absolute {
        #[serde(rename = "absoluteValue")]
        value: i64,
    },
    Relative(RelativeQuery),
}

impl ParsedQuery {
    pub fn absolute(value: i64) -> Self {
        ParsedQuery::Absolute { value }
    }

    /// Resolve against `now` in UTC.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.resolve_in(&Calendar::utc(), now)
    }

    /// Resolve against `now`, offsetting and rounding in `calendar`'s
    /// timezone.
    pub fn resolve_in(&self, calendar: &Calendar, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let relative = match self {
            ParsedQuery::Absolute { value } => return DateTime::from_timestamp_millis(*value),
            ParsedQuery::Relative(relative) => relative,
        };

        if relative.value == 0 && relative.rounding.is_none() {
            return Some(now);
        }

        let local = calendar.instant(now);
        let shifted = if relative.value == 0 {
            local
        } else {
            let unit = relative.unit?.calendar_unit();
            calendar.checked_shift(&local, unit, relative.value)?
        };

        let resolved = match relative.rounding {
            None => shifted,
            Some(Rounding {
                round_to: RoundTo::Start,
                round_unit,
            }) => calendar.checked_start_of(&shifted, round_unit.calendar_unit())?,
            Some(Rounding {
                round_to: RoundTo::End,
                round_unit,
            }) => calendar.checked_end_of(&shifted, round_unit.calendar_unit())?,
        };
        Some(resolved.with_timezone(&Utc))
    }
}

/// Resolve an optional query; `None` stays `None`.
pub fn resolve(query: Option<&ParsedQuery>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    query?.resolve(now)
}

/// Parse a relative-dialect query string.
pub fn parse(input: &str) -> Option<ParsedQuery> {
    let parsed = parse_inner(input.trim());
    if parsed.is_none() {
        debug!(input, "unparseable relative query");
    }
    parsed
}

fn parse_inner(s: &str) -> Option<ParsedQuery> {
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok().map(ParsedQuery::absolute);
    }

    let mut rest = s.strip_prefix("now")?;
    let mut query = RelativeQuery::now();

    if let Some(sign) = rest.chars().next().filter(|c| matches!(*c, '+' | '-')) {
        rest = &rest[1..];
        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return None;
        }
        let magnitude: i64 = rest[..digits_len].parse().ok()?;
        rest = &rest[digits_len..];

        let mut chars = rest.chars();
        let unit = RelativeUnit::from_char(chars.next()?)?;
        rest = chars.as_str();

        query.value = if sign == '-' { -magnitude } else { magnitude };
        query.unit = Some(unit);
    }

    if let Some(marker) = rest.chars().next().filter(|c| matches!(*c, '<' | '>')) {
        let mut chars = rest[1..].chars();
        let round_unit = RoundUnit::from_char(chars.next()?)?;
        rest = chars.as_str();

        query.rounding = Some(if marker == '<' {
            Rounding::start(round_unit)
        } else {
            Rounding::end(round_unit)
        });
        if query.unit.is_none() {
            query.unit = Some(RelativeUnit::Day);
        }
    }

    if !rest.is_empty() {
        return None;
    }
    Some(ParsedQuery::Relative(query))
}

/// Serialize a query back to its string form. `None` when a non-zero
/// offset has no unit.
pub fn serialize(query: &ParsedQuery) -> Option<String> {
    let relative = match query {
        ParsedQuery::Absolute { value } => return Some(value.to_string()),
        ParsedQuery::Relative(relative) => relative,
    };

    let mut out = String::from("now");
    if relative.value != 0 {
        let unit = relative.unit?;
        let sign = if relative.value > 0 { '+' } else { '-' };
        out.push(sign);
        out.push_str(&relative.value.unsigned_abs().to_string());
        out.push(unit.as_char());
    }
    if let Some(rounding) = relative.rounding {
        out.push(match rounding.round_to {
            RoundTo::Start => '<',
            RoundTo::End => '>',
        });
        out.push(rounding.round_unit.as_char());
    }
    Some(out)
}

impl FromStr for ParsedQuery {
    type Err = TimeGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).ok_or_else(|| TimeGraphError::InvalidQuery(format!("'{}'", s.trim())))
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serialize(self) {
            Some(text) => f.write_str(&text),
            None => f.write_str("<invalid>"),
        }
    }
}

// ── from/to/step ranges ─────────────────────────────────────────────────────

/// Sampling resolution of a range, e.g. `30m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Step {
    pub value: i64,
    pub unit: RelativeUnit,
}

impl Step {
    /// Parse `<N><unit>` with `N > 0`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let unit = RelativeUnit::from_char(chars.next_back()?)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: i64 = digits.parse().ok()?;
        (value > 0).then_some(Step { value, unit })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.as_char())
    }
}

/// A `from`/`to` range of relative-dialect queries with an optional step,
/// as carried in URL parameters: `from=now-24h&to=now&step=30m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeQuery {
    pub from: ParsedQuery,
    pub to: ParsedQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
}

/// The last 24 hours.
impl Default for RangeQuery {
    fn default() -> Self {
        Self {
            from: ParsedQuery::Relative(RelativeQuery::offset(-24, RelativeUnit::Hour)),
            to: ParsedQuery::Relative(RelativeQuery::now()),
            step: None,
        }
    }
}

impl RangeQuery {
    /// Upper bound on [`RangeQuery::sample_points`].
    pub const MAX_SAMPLES: usize = 10_000;

    /// Read `from`, `to` and `step` from URL-encoded parameters. Other
    /// parameters are ignored. `None` if `from` or `to` is missing or
    /// invalid, or if `step` is present but invalid.
    pub fn from_params(params: &str) -> Option<Self> {
        let mut from = None;
        let mut to = None;
        let mut step = None;
        for (key, value) in form_urlencoded::parse(params.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "from" => from = Some(parse(&value)?),
                "to" => to = Some(parse(&value)?),
                "step" => step = Some(Step::parse(&value)?),
                _ => {}
            }
        }
        Some(Self {
            from: from?,
            to: to?,
            step,
        })
    }

    /// [`RangeQuery::from_params`], falling back to the default range.
    pub fn from_params_or_default(params: &str) -> Self {
        Self::from_params(params).unwrap_or_else(|| {
            debug!(params, "falling back to default range");
            Self::default()
        })
    }

    /// URL-encoded parameters. `None` if either end does not serialize.
    pub fn to_params(&self) -> Option<String> {
        let mut out = form_urlencoded::Serializer::new(String::new());
        out.append_pair("from", &serialize(&self.from)?);
        out.append_pair("to", &serialize(&self.to)?);
        if let Some(step) = self.step {
            out.append_pair("step", &step.to_string());
        }
        Some(out.finish())
    }

    /// Resolve both ends in UTC.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.resolve_in(&Calendar::utc(), now)
    }

    /// Resolve both ends against the same `now`. `None` if either end is
    /// unresolvable or the range is reversed.
    pub fn resolve_in(
        &self,
        calendar: &Calendar,
        now: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let from = self.from.resolve_in(calendar, now)?;
        let to = self.to.resolve_in(calendar, now)?;
        (from <= to).then_some((from, to))
    }

    /// [`RangeQuery::resolve_in`] for program boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`TimeGraphError::Unresolvable`] if either end does not
    /// resolve or the range is reversed.
    pub fn resolve_strict(
        &self,
        calendar: &Calendar,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), TimeGraphError> {
        self.resolve_in(calendar, now).ok_or_else(|| {
            TimeGraphError::Unresolvable(format!(
                "range from={} to={} does not resolve to a forward interval",
                self.from, self.to
            ))
        })
    }

    /// Sample instants `from, from + step, …` strictly before `to`. `None`
    /// without a step, when unresolvable, or beyond
    /// [`RangeQuery::MAX_SAMPLES`] points.
    pub fn sample_points(
        &self,
        calendar: &Calendar,
        now: DateTime<Utc>,
    ) -> Option<Vec<DateTime<Utc>>> {
        let step = self.step?;
        let (from, to) = self.resolve_in(calendar, now)?;
        let unit = step.unit.calendar_unit();
        let start = calendar.instant(from);

        let mut points = Vec::new();
        let mut n = 0i64;
        loop {
            let point = calendar
                .checked_shift(&start, unit, step.value.checked_mul(n)?)?
                .with_timezone(&Utc);
            if point >= to {
                return Some(points);
            }
            if points.len() >= Self::MAX_SAMPLES {
                return None;
            }
            points.push(point);
            n += 1;
        }
    }
}

impl FromStr for RangeQuery {
    type Err = TimeGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_params(s).ok_or_else(|| TimeGraphError::InvalidQuery(format!("'{}'", s.trim())))
    }
}
