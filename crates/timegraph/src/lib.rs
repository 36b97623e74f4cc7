//! # timegraph
//!
//! Time-interval queries for navigable time-series graphs.
//!
//! A graph view stores its visible range as a short query string (in a URL,
//! say), pages through time with next/previous/zoom controls, and buckets
//! its data into labeled slices. All calendar math runs in one explicit
//! timezone and survives daylight-saving transitions.
//!
//! ## Modules
//!
//! - [`calendar`] — Timezone-bound calendar arithmetic and ISO-8601 durations
//! - [`interval`] — The `2020-01-01--P1W` base-plus-duration dialect
//! - [`relative`] — The `now-2d<d` relative dialect, epoch milliseconds, and ranges
//! - [`dialect`] — Both dialects behind one strategy trait
//! - [`navigation`] — Next, previous, fine stepping and zoom out
//! - [`slicing`] — Coarse and fine slices with labels, keys and lengths
//! - [`format`] — Human-readable interval and slice labels
//! - [`clock`] — Injectable "now"
//! - [`error`] — Error types

pub mod calendar;
pub mod clock;
pub mod dialect;
pub mod error;
pub mod format;
pub mod interval;
pub mod navigation;
pub mod relative;
pub mod slicing;

pub use calendar::{Calendar, CalendarConfig, CalendarDuration, CalendarUnit, Direction};
pub use clock::{Clock, FixedClock, SystemClock};
pub use dialect::{IntervalDialect, QueryDialect, RelativeDialect};
pub use error::{Result, TimeGraphError};
pub use format::{format_interval, SliceLabels};
pub use interval::TimeQuery;
pub use navigation::{NavAction, Navigator};
pub use relative::{
    ParsedQuery, RangeQuery, RelativeQuery, RelativeUnit, RoundTo, RoundUnit, Rounding, Step,
};
pub use slicing::{
    bucket_counts, enumerate, enumerate_range, LengthUnit, Slicer, Slices, Subdivision, TimeSlice,
};
