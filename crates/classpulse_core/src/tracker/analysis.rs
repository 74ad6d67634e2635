//! Derived statistics and trend analysis for metric series.
//!
//! # Responsibility
//! - Provide the numeric helpers behind tracker views: mean, median,
//!   standard deviations, least-squares fit, R².
//! - Define the typed result records returned by statistics, trend and
//!   period-comparison queries.
//!
//! # Invariants
//! - Regression runs over the zero-based observation index, one unit per
//!   observation, not over elapsed calendar time.
//! - Sample standard deviation is undefined below two values and reported
//!   as `None`; population standard deviation of one value is `0.0`.

use chrono::NaiveDate;
use serde::Serialize;

/// Coarse direction of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Classifies a regression slope.
    ///
    /// Slopes with magnitude below `0.001` are reported as stable; a slope
    /// of exactly `0.001` is already directional.
    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() < 0.001 {
            Self::Stable
        } else if slope > 0.0 {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }

    /// Classifies the step between the last two values of a series.
    ///
    /// Series with fewer than two values are stable.
    pub fn from_last_step(values: &[f64]) -> Self {
        match values {
            [.., previous, last] if last > previous => Self::Increasing,
            [.., previous, last] if last < previous => Self::Decreasing,
            _ => Self::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

/// Strength of a fitted trend, classified from R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Weak,
    Moderate,
    Strong,
}

impl TrendStrength {
    /// Classifies a coefficient of determination.
    ///
    /// Boundaries are inclusive on the upper class: exactly `0.3` is
    /// moderate and exactly `0.7` is strong.
    pub fn classify(r_squared: f64) -> Self {
        if r_squared.abs() < 0.3 {
            Self::Weak
        } else if r_squared.abs() < 0.7 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

/// Summary statistics over every recorded value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation; `0.0` for a single observation.
    pub std_dev: f64,
    pub last_value: f64,
    pub trend: Trend,
}

/// Linear-trend analysis of one metric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub trend_direction: Trend,
    pub trend_strength: TrendStrength,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Regression line evaluated at the next observation index.
    pub next_value_estimate: f64,
    /// Mean of the trailing window; absent when the series is shorter than
    /// the window.
    pub rolling_average: Option<f64>,
    pub data_points: usize,
}

/// Inclusive date range used by period comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Per-period summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; absent below two values.
    pub std_dev: Option<f64>,
    pub count: usize,
}

impl PeriodStats {
    /// Builds statistics over a non-empty series.
    pub(crate) fn from_series(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            median: median(values),
            min: fold_min(values),
            max: fold_max(values),
            std_dev: sample_std_dev(values),
            count: values.len(),
        }
    }
}

/// One compared period with its bounds and statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub stats: PeriodStats,
}

/// Change block between two compared periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonBlock {
    pub mean_change: f64,
    /// Infinite when the first-period mean is zero.
    pub mean_change_percentage: f64,
    pub median_change: f64,
    /// Infinite when the first-period median is zero.
    pub median_change_percentage: f64,
    /// Fixed higher-is-better reading of the mean change.
    pub improved: bool,
}

/// Result of comparing one metric across two periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub period1: PeriodSummary,
    pub period2: PeriodSummary,
    pub comparison: ComparisonBlock,
}

/// Arithmetic mean. Returns `0.0` for an empty slice; callers guard.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median over a copy of the input; averages the two middle values for
/// even-length series.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation (divides by `n`).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Sample standard deviation (divides by `n - 1`); `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Ordinary least-squares fit of `values` against the observation index
/// `0..n`. Returns `(slope, intercept)`, or `None` below two values.
pub fn linear_fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (index, value) in values.iter().enumerate() {
        let dx = index as f64 - x_mean;
        numerator += dx * (value - y_mean);
        denominator += dx * dx;
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;
    Some((slope, intercept))
}

/// Coefficient of determination for a fitted line; `0.0` when the series
/// has no variance.
pub fn r_squared(values: &[f64], slope: f64, intercept: f64) -> f64 {
    let y_mean = mean(values);
    let ss_tot: f64 = values.iter().map(|value| (value - y_mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }

    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let predicted = slope * index as f64 + intercept;
            (value - predicted).powi(2)
        })
        .sum();

    1.0 - ss_res / ss_tot
}

/// Percentage change from `baseline`; infinite when `baseline` is zero.
pub fn percent_change(baseline: f64, change: f64) -> f64 {
    if baseline == 0.0 {
        f64::INFINITY
    } else {
        change / baseline * 100.0
    }
}

pub(crate) fn fold_min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub(crate) fn fold_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::{
        linear_fit, mean, median, percent_change, population_std_dev, r_squared, sample_std_dev,
        Trend, TrendStrength,
    };

    #[test]
    fn mean_and_median_over_small_series() {
        let values = [2.0, 4.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(median(&values), 4.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn population_std_dev_of_single_value_is_zero() {
        assert_eq!(population_std_dev(&[42.0]), 0.0);
    }

    #[test]
    fn population_std_dev_matches_known_value() {
        // Variance of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 4.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&values) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sample_std_dev_is_undefined_below_two_values() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[3.0]), None);
        let two = sample_std_dev(&[1.0, 3.0]).unwrap();
        assert!((two - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn linear_fit_recovers_exact_line() {
        let values = [1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = linear_fit(&values).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
        assert!((r_squared(&values, slope, intercept) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_fit_requires_two_points() {
        assert_eq!(linear_fit(&[5.0]), None);
    }

    #[test]
    fn r_squared_is_zero_without_variance() {
        assert_eq!(r_squared(&[4.0, 4.0, 4.0], 0.0, 4.0), 0.0);
    }

    #[test]
    fn strength_boundaries_are_inclusive_upward() {
        assert_eq!(TrendStrength::classify(0.299), TrendStrength::Weak);
        assert_eq!(TrendStrength::classify(0.3), TrendStrength::Moderate);
        assert_eq!(TrendStrength::classify(0.699), TrendStrength::Moderate);
        assert_eq!(TrendStrength::classify(0.7), TrendStrength::Strong);
    }

    #[test]
    fn slope_boundary_of_exactly_one_thousandth_is_directional() {
        assert_eq!(Trend::from_slope(0.0009), Trend::Stable);
        assert_eq!(Trend::from_slope(0.001), Trend::Increasing);
        assert_eq!(Trend::from_slope(-0.001), Trend::Decreasing);
    }

    #[test]
    fn last_step_trend_is_stable_below_two_values() {
        assert_eq!(Trend::from_last_step(&[]), Trend::Stable);
        assert_eq!(Trend::from_last_step(&[1.0]), Trend::Stable);
        assert_eq!(Trend::from_last_step(&[1.0, 2.0]), Trend::Increasing);
        assert_eq!(Trend::from_last_step(&[2.0, 1.0]), Trend::Decreasing);
        assert_eq!(Trend::from_last_step(&[2.0, 2.0]), Trend::Stable);
    }

    #[test]
    fn percent_change_from_zero_baseline_is_infinite() {
        assert!(percent_change(0.0, 5.0).is_infinite());
        assert_eq!(percent_change(4.0, 2.0), 50.0);
    }
}
