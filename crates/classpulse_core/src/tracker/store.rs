//! Tracker state, recording operations and document persistence.
//!
//! # Responsibility
//! - Own tracker state: metric registry, observation rows, goals, notes.
//! - Provide recording/goal-setting mutations and derived query views.
//! - Serialize the full state to a JSON document and restore it.
//!
//! # Invariants
//! - Rows are unique per calendar day and sorted by date ascending.
//! - `record` merges into an existing row; metrics not mentioned keep their
//!   values.
//! - Goal progress clamping is asymmetric: capped at 100 for increasing
//!   goals, floored at 100 for decreasing goals.

use crate::tracker::analysis::{
    self, fold_max, fold_min, ComparisonBlock, MetricStats, Period, PeriodComparison, PeriodStats,
    PeriodSummary, Trend, TrendAnalysis, TrendStrength,
};
use crate::tracker::{TrackerError, TrackerResult};
use chrono::{Local, NaiveDate};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Day-granular date format used throughout persisted documents.
pub const DAY_FORMAT: &str = "%Y-%m-%d";
const SAVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default trailing-window size for rolling averages.
pub const DEFAULT_TREND_WINDOW: usize = 7;

const NOT_ENOUGH_FOR_TREND: &str = "not enough data points for trend analysis";
const NOT_ENOUGH_FOR_REGRESSION: &str = "not enough data points for regression analysis";
const INSUFFICIENT_PERIOD_DATA: &str = "insufficient data for one or both periods";

/// Parses a `YYYY-MM-DD` day string.
pub fn parse_day(value: &str) -> TrackerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
        .map_err(|_| TrackerError::InvalidDate(value.to_string()))
}

/// Target set for one metric. Re-setting a goal overwrites the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub target: f64,
    pub deadline: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: NaiveDate,
}

/// Progress toward a metric goal relative to the first recorded value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub initial: f64,
    pub current: f64,
    pub target: f64,
    pub progress_percentage: f64,
    pub remaining: f64,
}

/// Point-in-time snapshot across all registered metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerReport {
    pub name: String,
    pub generated_at: String,
    pub metrics_count: usize,
    pub data_points_count: usize,
    /// First and last observation date; absent for an empty tracker.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub current_values: BTreeMap<String, Option<f64>>,
    pub goals: BTreeMap<String, Goal>,
    pub progress: BTreeMap<String, GoalProgress>,
}

/// Serialized tracker state.
///
/// Each data row is a flat map of `"date"` plus every registered metric to a
/// number or `null`. Dates are `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerDocument {
    pub name: String,
    pub metrics: Vec<String>,
    pub data: Vec<Map<String, Value>>,
    pub goals: BTreeMap<String, Goal>,
    pub notes: BTreeMap<String, String>,
    pub saved_at: String,
}

#[derive(Debug, Clone, PartialEq)]
struct DataRow {
    date: NaiveDate,
    /// Missing key means no value recorded for that metric on this day.
    values: BTreeMap<String, f64>,
}

/// Named collection of time-stamped metric observations with goal tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceTracker {
    name: String,
    metrics: Vec<String>,
    rows: Vec<DataRow>,
    goals: BTreeMap<String, Goal>,
    notes: BTreeMap<NaiveDate, String>,
}

impl PerformanceTracker {
    /// Creates an empty tracker.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: Vec::new(),
            rows: Vec::new(),
            goals: BTreeMap::new(),
            notes: BTreeMap::new(),
        }
    }

    /// Creates a tracker with an initial metric list, preserving order and
    /// dropping duplicates.
    pub fn with_metrics<I, S>(name: impl Into<String>, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracker = Self::new(name);
        for metric in metrics {
            let metric = metric.into();
            tracker.add_metric(&metric);
        }
        tracker
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered metric names in registration order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.metrics.iter().any(|name| name == metric)
    }

    /// Number of observation rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn goal(&self, metric: &str) -> Option<&Goal> {
        self.goals.get(metric)
    }

    pub fn note(&self, date: NaiveDate) -> Option<&str> {
        self.notes.get(&date).map(String::as_str)
    }

    /// Registers a metric. Idempotent; existing data is untouched.
    pub fn add_metric(&mut self, metric: &str) {
        if !self.has_metric(metric) {
            self.metrics.push(metric.to_string());
        }
    }

    /// Deregisters a metric and drops its column from every row.
    ///
    /// Idempotent. Other metrics' rows are untouched; a goal set for the
    /// metric stays in place but reads as absent progress until the metric
    /// is registered again.
    pub fn remove_metric(&mut self, metric: &str) {
        self.metrics.retain(|name| name != metric);
        for row in &mut self.rows {
            row.values.remove(metric);
        }
    }

    /// Records values for one calendar day.
    ///
    /// Unknown metrics in `values` are registered implicitly. An existing row
    /// for `date` is merged: metrics not mentioned keep their values. A
    /// provided note overwrites any existing note for the day.
    pub fn record(&mut self, date: NaiveDate, values: &[(&str, f64)], note: Option<&str>) {
        for (metric, _) in values {
            self.add_metric(metric);
        }

        if let Some(row) = self.rows.iter_mut().find(|row| row.date == date) {
            for (metric, value) in values {
                row.values.insert((*metric).to_string(), *value);
            }
        } else {
            let mut row_values = BTreeMap::new();
            for (metric, value) in values {
                row_values.insert((*metric).to_string(), *value);
            }
            self.rows.push(DataRow {
                date,
                values: row_values,
            });
            // Observations may arrive out of order.
            self.rows.sort_by_key(|row| row.date);
        }

        if let Some(note) = note {
            self.notes.insert(date, note.to_string());
        }
    }

    /// Sets or overwrites the goal for a metric, registering it if absent.
    pub fn set_goal(
        &mut self,
        metric: &str,
        target: f64,
        deadline: Option<NaiveDate>,
        description: Option<&str>,
    ) {
        self.add_metric(metric);
        self.goals.insert(
            metric.to_string(),
            Goal {
                target,
                deadline,
                description: description.map(str::to_string),
                created_at: Local::now().date_naive(),
            },
        );
    }

    /// Latest recorded value: the chronologically last row holding a value
    /// for this metric.
    pub fn get_current_value(&self, metric: &str) -> Option<f64> {
        if !self.has_metric(metric) {
            return None;
        }
        self.rows
            .iter()
            .rev()
            .find_map(|row| row.values.get(metric).copied())
    }

    /// Progress toward the metric's goal.
    ///
    /// Absent when the metric has no goal, is unknown, or has no recorded
    /// value. The percentage is capped at 100 for increasing goals and
    /// floored at 100 for decreasing goals; when target equals the initial
    /// value it is 100 if the current value reached the target, else 0.
    pub fn calculate_progress(&self, metric: &str) -> Option<GoalProgress> {
        let goal = self.goals.get(metric)?;
        if !self.has_metric(metric) || self.rows.is_empty() {
            return None;
        }

        let current = self.get_current_value(metric)?;
        let initial = self
            .rows
            .iter()
            .find_map(|row| row.values.get(metric).copied())?;
        let target = goal.target;

        let total_change_needed = target - initial;
        let progress_percentage = if total_change_needed == 0.0 {
            if current >= target {
                100.0
            } else {
                0.0
            }
        } else {
            let percentage = (current - initial) / total_change_needed * 100.0;
            if total_change_needed > 0.0 {
                percentage.min(100.0)
            } else {
                percentage.max(100.0)
            }
        };

        Some(GoalProgress {
            initial,
            current,
            target,
            progress_percentage,
            remaining: target - current,
        })
    }

    /// Summary statistics over every recorded value of the metric.
    ///
    /// Absent for an unknown metric or one with no recorded values.
    pub fn get_stats(&self, metric: &str) -> Option<MetricStats> {
        if !self.has_metric(metric) {
            return None;
        }
        let series = self.metric_series(metric);
        if series.is_empty() {
            return None;
        }

        Some(MetricStats {
            count: series.len(),
            min: fold_min(&series),
            max: fold_max(&series),
            mean: analysis::mean(&series),
            median: analysis::median(&series),
            std_dev: analysis::population_std_dev(&series),
            last_value: series[series.len() - 1],
            trend: Trend::from_last_step(&series),
        })
    }

    /// Fits a linear trend over the metric series and summarizes it.
    ///
    /// The regression runs against the zero-based observation index, not
    /// calendar time. The rolling average covers the trailing `window`
    /// observations and is omitted when fewer points exist.
    pub fn analyze_trends(&self, metric: &str, window: usize) -> TrackerResult<TrendAnalysis> {
        if !self.has_metric(metric) {
            return Err(TrackerError::UnknownMetric(metric.to_string()));
        }

        let series = self.metric_series(metric);
        if series.len() < 2 {
            return Err(TrackerError::InsufficientData(NOT_ENOUGH_FOR_TREND));
        }

        let rolling_average = if window > 0 && series.len() >= window {
            Some(analysis::mean(&series[series.len() - window..]))
        } else {
            None
        };

        let Some((slope, intercept)) = analysis::linear_fit(&series) else {
            return Err(TrackerError::InsufficientData(NOT_ENOUGH_FOR_REGRESSION));
        };
        let r_squared = analysis::r_squared(&series, slope, intercept);

        Ok(TrendAnalysis {
            trend_direction: Trend::from_slope(slope),
            trend_strength: TrendStrength::classify(r_squared),
            slope,
            intercept,
            r_squared,
            next_value_estimate: slope * series.len() as f64 + intercept,
            rolling_average,
            data_points: series.len(),
        })
    }

    /// Compares one metric between two inclusive date ranges.
    pub fn compare_periods(
        &self,
        metric: &str,
        period1: Period,
        period2: Period,
    ) -> TrackerResult<PeriodComparison> {
        if !self.has_metric(metric) {
            return Err(TrackerError::UnknownMetric(metric.to_string()));
        }

        let series1 = self.series_in_period(metric, period1);
        let series2 = self.series_in_period(metric, period2);
        if series1.is_empty() || series2.is_empty() {
            return Err(TrackerError::InsufficientData(INSUFFICIENT_PERIOD_DATA));
        }

        let stats1 = PeriodStats::from_series(&series1);
        let stats2 = PeriodStats::from_series(&series2);

        let mean_change = stats2.mean - stats1.mean;
        let median_change = stats2.median - stats1.median;
        let comparison = ComparisonBlock {
            mean_change,
            mean_change_percentage: analysis::percent_change(stats1.mean, mean_change),
            median_change,
            median_change_percentage: analysis::percent_change(stats1.median, median_change),
            improved: mean_change > 0.0,
        };

        Ok(PeriodComparison {
            period1: PeriodSummary {
                period: period1,
                stats: stats1,
            },
            period2: PeriodSummary {
                period: period2,
                stats: stats2,
            },
            comparison,
        })
    }

    /// Snapshots name, counts, date range and per-metric state.
    pub fn generate_report(&self) -> TrackerReport {
        let date_range = match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        };

        let mut current_values = BTreeMap::new();
        let mut progress = BTreeMap::new();
        for metric in &self.metrics {
            current_values.insert(metric.clone(), self.get_current_value(metric));
            if let Some(metric_progress) = self.calculate_progress(metric) {
                progress.insert(metric.clone(), metric_progress);
            }
        }

        TrackerReport {
            name: self.name.clone(),
            generated_at: Local::now().format(SAVED_AT_FORMAT).to_string(),
            metrics_count: self.metrics.len(),
            data_points_count: self.rows.len(),
            date_range,
            current_values,
            goals: self.goals.clone(),
            progress,
        }
    }

    /// Builds the persisted document for the current state.
    pub fn to_document(&self) -> TrackerDocument {
        let data = self
            .rows
            .iter()
            .map(|row| {
                let mut doc_row = Map::new();
                doc_row.insert(
                    "date".to_string(),
                    Value::String(row.date.format(DAY_FORMAT).to_string()),
                );
                for metric in &self.metrics {
                    let value = row
                        .values
                        .get(metric)
                        .and_then(|value| Number::from_f64(*value))
                        .map(Value::Number)
                        .unwrap_or(Value::Null);
                    doc_row.insert(metric.clone(), value);
                }
                doc_row
            })
            .collect();

        let notes = self
            .notes
            .iter()
            .map(|(date, note)| (date.format(DAY_FORMAT).to_string(), note.clone()))
            .collect();

        TrackerDocument {
            name: self.name.clone(),
            metrics: self.metrics.clone(),
            data,
            goals: self.goals.clone(),
            notes,
            saved_at: Local::now().format(SAVED_AT_FORMAT).to_string(),
        }
    }

    /// Reconstructs a tracker from a persisted document.
    pub fn from_document(document: &TrackerDocument) -> TrackerResult<Self> {
        let mut tracker = Self::with_metrics(document.name.clone(), document.metrics.clone());

        for doc_row in &document.data {
            let date_value = doc_row.get("date").ok_or_else(|| {
                TrackerError::InvalidDocument("data row is missing `date`".to_string())
            })?;
            let date_text = date_value.as_str().ok_or_else(|| {
                TrackerError::InvalidDocument(format!(
                    "data row `date` must be a string, got `{date_value}`"
                ))
            })?;
            let date = parse_day(date_text)?;

            let mut values = BTreeMap::new();
            for metric in &document.metrics {
                match doc_row.get(metric) {
                    Some(Value::Number(number)) => {
                        let value = number.as_f64().ok_or_else(|| {
                            TrackerError::InvalidDocument(format!(
                                "value `{number}` for metric `{metric}` is not representable"
                            ))
                        })?;
                        values.insert(metric.clone(), value);
                    }
                    Some(Value::Null) | None => {}
                    Some(other) => {
                        return Err(TrackerError::InvalidDocument(format!(
                            "value for metric `{metric}` must be a number or null, got `{other}`"
                        )));
                    }
                }
            }
            tracker.rows.push(DataRow { date, values });
        }
        tracker.rows.sort_by_key(|row| row.date);

        for (date_text, note) in &document.notes {
            let date = parse_day(date_text)?;
            tracker.notes.insert(date, note.clone());
        }

        tracker.goals = document.goals.clone();
        Ok(tracker)
    }

    /// Writes the tracker document as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> TrackerResult<()> {
        let path = path.as_ref();
        let document = self.to_document();
        let payload = serde_json::to_string_pretty(&document)?;

        if let Err(err) = std::fs::write(path, payload) {
            error!(
                "event=tracker_save module=tracker status=error name={} error={}",
                self.name, err
            );
            return Err(err.into());
        }

        info!(
            "event=tracker_save module=tracker status=ok name={} rows={} metrics={}",
            self.name,
            self.rows.len(),
            self.metrics.len()
        );
        Ok(())
    }

    /// Reads a tracker document and reconstructs an equivalent tracker.
    pub fn load(path: impl AsRef<Path>) -> TrackerResult<Self> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path)?;
        let document: TrackerDocument = serde_json::from_str(&payload)?;
        let tracker = Self::from_document(&document)?;

        info!(
            "event=tracker_load module=tracker status=ok name={} rows={} metrics={}",
            tracker.name,
            tracker.rows.len(),
            tracker.metrics.len()
        );
        Ok(tracker)
    }

    /// Recorded values of one metric in date order, skipping absent days.
    fn metric_series(&self, metric: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.values.get(metric).copied())
            .collect()
    }

    fn series_in_period(&self, metric: &str, period: Period) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|row| period.contains(row.date))
            .filter_map(|row| row.values.get(metric).copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_day, PerformanceTracker};

    #[test]
    fn parse_day_accepts_iso_dates_and_rejects_garbage() {
        assert!(parse_day("2024-01-31").is_ok());
        assert!(parse_day(" 2024-01-31 ").is_ok());
        assert!(parse_day("31/01/2024").is_err());
        assert!(parse_day("2024-13-01").is_err());
    }

    #[test]
    fn with_metrics_preserves_order_and_deduplicates() {
        let tracker = PerformanceTracker::with_metrics("t", ["b", "a", "b"]);
        assert_eq!(tracker.metrics(), ["b", "a"]);
    }
}
