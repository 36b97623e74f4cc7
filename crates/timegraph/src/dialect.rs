//! Query grammars as interchangeable strategies.
//!
//! Both dialects share the [`Calendar`] adapter and differ only in how a
//! query is written down. Hosts that store a query string (say, in a URL)
//! pick a dialect and go through [`QueryDialect`] without caring which one
//! it is.

use crate::calendar::Calendar;
use crate::interval::{self, TimeQuery};
use crate::relative::{self, ParsedQuery};

pub trait QueryDialect {
    type Query;

    /// Parse a stored query string. `None` if it is absent or malformed.
    fn parse(&self, input: &str) -> Option<Self::Query>;

    /// Canonical string form of a query. `None` if the query cannot be
    /// written in this dialect.
    fn serialize(&self, query: &Self::Query) -> Option<String>;

    /// Parse, or return `None` for a missing value.
    fn parse_optional(&self, input: Option<&str>) -> Option<Self::Query> {
        input.and_then(|input| self.parse(input))
    }
}

/// `<base>--<duration>`, bound to a calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalDialect {
    pub calendar: Calendar,
}

impl IntervalDialect {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }
}

impl QueryDialect for IntervalDialect {
    type Query = TimeQuery;

    fn parse(&self, input: &str) -> Option<TimeQuery> {
        interval::parse(&self.calendar, input)
    }

    fn serialize(&self, query: &TimeQuery) -> Option<String> {
        Some(interval::serialize(&self.calendar, query))
    }
}

/// `now[±N unit][<|>unit]` or epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeDialect;

impl QueryDialect for RelativeDialect {
    type Query = ParsedQuery;

    fn parse(&self, input: &str) -> Option<ParsedQuery> {
        relative::parse(input)
    }

    fn serialize(&self, query: &ParsedQuery) -> Option<String> {
        relative::serialize(query)
    }
}
