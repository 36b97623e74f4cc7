use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use timegraph::relative::{self, ParsedQuery, RangeQuery};
use timegraph::{interval, slicing, Calendar, Clock, NavAction, Navigator, SystemClock};

#[derive(Parser)]
#[command(name = "timegraph")]
#[command(about = "Parse, navigate and slice time-interval queries", long_about = None)]
#[command(version)]
struct Cli {
    /// IANA timezone used for calendar math
    #[arg(long, global = true, default_value = "UTC")]
    tz: String,

    /// Pin "now" (RFC 3339) instead of reading the system clock
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a query and print its canonical form and resolved range
    Parse {
        query: String,

        /// Query grammar
        #[arg(short, long, value_enum, default_value_t = Dialect::Interval)]
        dialect: Dialect,
    },
    /// Resolve URL parameters like `from=now-24h&to=now&step=30m`
    Resolve { params: String },
    /// Apply a navigation action to an interval query (today if omitted)
    Navigate {
        #[arg(value_enum)]
        action: Action,
        query: Option<String>,
    },
    /// Slice an interval query (today if omitted) into coarse and fine buckets
    Slice { query: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum Dialect {
    /// `2020-01-01--P1W`
    Interval,
    /// `now-2d<d` or epoch milliseconds
    Relative,
}

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    Next,
    Previous,
    FineNext,
    FinePrevious,
    ZoomOut,
}

impl From<Action> for NavAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Next => NavAction::Next,
            Action::Previous => NavAction::Previous,
            Action::FineNext => NavAction::FineNext,
            Action::FinePrevious => NavAction::FinePrevious,
            Action::ZoomOut => NavAction::ZoomOut,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let calendar = Calendar::from_name(&cli.tz)?;
    let now = cli.now.unwrap_or_else(|| SystemClock.now());
    debug!(tz = %cli.tz, %now, "calendar ready");

    let output = match cli.command {
        Command::Parse { query, dialect } => match dialect {
            Dialect::Interval => parse_interval(&calendar, &query)?,
            Dialect::Relative => parse_relative(&calendar, &query, now)?,
        },
        Command::Resolve { params } => resolve_range(&calendar, &params, now)?,
        Command::Navigate { action, query } => {
            let navigator = Navigator::new(calendar, now);
            json!({ "query": navigator.navigate(query.as_deref(), action.into()) })
        }
        Command::Slice { query } => {
            let navigator = Navigator::new(calendar, now);
            let current = navigator.current(query.as_deref());
            json!({
                "query": interval::serialize(&calendar, &current),
                "slices": slicing::enumerate(&calendar, &current),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_interval(calendar: &Calendar, input: &str) -> Result<Value> {
    let query = interval::parse_strict(calendar, input)?;
    let (from, to) = query.range(calendar);
    Ok(json!({
        "query": interval::serialize(calendar, &query),
        "base": query.base.to_rfc3339(),
        "duration": query.duration.to_string(),
        "from": from.timestamp_millis(),
        "to": to.timestamp_millis(),
        "labels": query.describe(calendar),
    }))
}

fn parse_relative(calendar: &Calendar, input: &str, now: DateTime<Utc>) -> Result<Value> {
    let query = ParsedQuery::from_str(input)?;
    let resolved = query.resolve_in(calendar, now);
    Ok(json!({
        "query": relative::serialize(&query),
        "parsed": query,
        "resolved": resolved.map(|at| at.timestamp_millis()),
    }))
}

fn resolve_range(calendar: &Calendar, params: &str, now: DateTime<Utc>) -> Result<Value> {
    let range = RangeQuery::from_str(params)?;
    let (from, to) = range.resolve_strict(calendar, now)?;
    let samples = match range.step {
        Some(_) => Some(
            range
                .sample_points(calendar, now)
                .context("too many sample points for step")?
                .len(),
        ),
        None => None,
    };
    Ok(json!({
        "params": range.to_params(),
        "from": from.timestamp_millis(),
        "to": to.timestamp_millis(),
        "samples": samples,
        "slices": slicing::enumerate_range(calendar, from, to),
    }))
}
