//! Performance tracking component.
//!
//! # Responsibility
//! - Own a named, time-indexed table of metric observations with per-metric
//!   goals and per-date notes.
//! - Compute derived views: current value, statistics, trend fit, goal
//!   progress, period comparison.
//! - Persist and restore the full tracker state as a JSON document.
//!
//! # Invariants
//! - At most one observation row per calendar day; rows are kept sorted by
//!   date ascending.
//! - Metric registration order is preserved; recording a value for an unknown
//!   metric registers it implicitly.
//! - Absence of a value is represented by a missing map entry, never by a
//!   NaN sentinel.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod analysis;
pub mod store;

pub use analysis::{
    ComparisonBlock, MetricStats, Period, PeriodComparison, PeriodStats, PeriodSummary, Trend,
    TrendAnalysis, TrendStrength,
};
pub use store::{
    parse_day, Goal, GoalProgress, PerformanceTracker, TrackerDocument, TrackerReport,
    DEFAULT_TREND_WINDOW,
};

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error type for tracker operations and document persistence.
#[derive(Debug)]
pub enum TrackerError {
    /// The named metric is not registered in this tracker.
    UnknownMetric(String),
    /// An analysis needs more observations than the tracker holds.
    ///
    /// Callers are expected to branch on this variant rather than treat it
    /// as a hard failure.
    InsufficientData(&'static str),
    /// A date string does not parse as `YYYY-MM-DD`.
    InvalidDate(String),
    /// A persisted document violates the tracker document contract.
    InvalidDocument(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMetric(metric) => write!(f, "unknown metric: `{metric}`"),
            Self::InsufficientData(message) => write!(f, "{message}"),
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidDocument(message) => write!(f, "invalid tracker document: {message}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
