use chrono::NaiveDate;
use classpulse_core::{
    Period, PerformanceTracker, TrackerError, Trend, TrendStrength, DEFAULT_TREND_WINDOW,
};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn tracker_with_series(metric: &str, values: &[f64]) -> PerformanceTracker {
    let mut tracker = PerformanceTracker::new("analysis");
    for (index, value) in values.iter().enumerate() {
        let date = day(2024, 1, 1) + chrono::Days::new(index as u64);
        tracker.record(date, &[(metric, *value)], None);
    }
    tracker
}

#[test]
fn stats_summarize_the_full_series() {
    let tracker = tracker_with_series("score", &[4.0, 8.0, 6.0, 2.0]);
    let stats = tracker.get_stats("score").unwrap();

    assert_eq!(stats.count, 4);
    assert_eq!(stats.min, 2.0);
    assert_eq!(stats.max, 8.0);
    assert_eq!(stats.mean, 5.0);
    assert_eq!(stats.median, 5.0);
    assert_eq!(stats.last_value, 2.0);
    assert_eq!(stats.trend, Trend::Decreasing);
    // Population deviation: sqrt(((1)^2 + (3)^2 + (1)^2 + (3)^2) / 4).
    assert!((stats.std_dev - 5.0_f64.sqrt()).abs() < 1e-9);
}

#[test]
fn stats_median_averages_the_middle_pair_for_even_counts() {
    let tracker = tracker_with_series("score", &[1.0, 2.0, 3.0, 10.0]);
    let stats = tracker.get_stats("score").unwrap();
    assert_eq!(stats.median, 2.5);
}

#[test]
fn stats_for_a_single_observation_are_degenerate_but_present() {
    let tracker = tracker_with_series("score", &[42.0]);
    let stats = tracker.get_stats("score").unwrap();

    assert_eq!(stats.count, 1);
    assert_eq!(stats.min, 42.0);
    assert_eq!(stats.max, 42.0);
    assert_eq!(stats.std_dev, 0.0);
    assert_eq!(stats.trend, Trend::Stable);
}

#[test]
fn stats_are_absent_without_data() {
    let mut tracker = PerformanceTracker::new("analysis");
    assert!(tracker.get_stats("score").is_none());

    tracker.add_metric("score");
    assert!(tracker.get_stats("score").is_none());
}

#[test]
fn perfect_line_yields_strong_increasing_trend() {
    let tracker = tracker_with_series("score", &[1.0, 3.0, 5.0, 7.0]);
    let analysis = tracker.analyze_trends("score", DEFAULT_TREND_WINDOW).unwrap();

    assert_eq!(analysis.trend_direction, Trend::Increasing);
    assert_eq!(analysis.trend_strength, TrendStrength::Strong);
    assert!((analysis.slope - 2.0).abs() < 1e-9);
    assert!((analysis.intercept - 1.0).abs() < 1e-9);
    assert!((analysis.r_squared - 1.0).abs() < 1e-9);
    // Fit is over the observation index, so the next index is 4.
    assert!((analysis.next_value_estimate - 9.0).abs() < 1e-9);
    assert_eq!(analysis.data_points, 4);
}

#[test]
fn constant_series_is_stable_with_weak_fit() {
    let tracker = tracker_with_series("score", &[5.0, 5.0, 5.0]);
    let analysis = tracker.analyze_trends("score", DEFAULT_TREND_WINDOW).unwrap();

    assert_eq!(analysis.trend_direction, Trend::Stable);
    assert_eq!(analysis.trend_strength, TrendStrength::Weak);
    assert_eq!(analysis.slope, 0.0);
    assert_eq!(analysis.r_squared, 0.0);
}

#[test]
fn regression_ignores_calendar_gaps() {
    // Same values on sparse dates fit the same line as on dense dates.
    let mut tracker = PerformanceTracker::new("analysis");
    tracker.record(day(2024, 1, 1), &[("score", 1.0)], None);
    tracker.record(day(2024, 1, 15), &[("score", 3.0)], None);
    tracker.record(day(2024, 3, 1), &[("score", 5.0)], None);

    let analysis = tracker.analyze_trends("score", DEFAULT_TREND_WINDOW).unwrap();
    assert!((analysis.slope - 2.0).abs() < 1e-9);
    assert!((analysis.intercept - 1.0).abs() < 1e-9);
}

#[test]
fn rolling_average_requires_a_full_window() {
    let tracker = tracker_with_series("score", &[1.0, 2.0, 3.0, 4.0]);

    let analysis = tracker.analyze_trends("score", DEFAULT_TREND_WINDOW).unwrap();
    assert_eq!(analysis.rolling_average, None);

    let analysis = tracker.analyze_trends("score", 2).unwrap();
    assert_eq!(analysis.rolling_average, Some(3.5));

    let analysis = tracker.analyze_trends("score", 4).unwrap();
    assert_eq!(analysis.rolling_average, Some(2.5));
}

#[test]
fn trend_analysis_rejects_unknown_metric_and_short_series() {
    let tracker = tracker_with_series("score", &[1.0]);

    let error = tracker.analyze_trends("missing", 7).unwrap_err();
    assert!(matches!(error, TrackerError::UnknownMetric(_)));

    let error = tracker.analyze_trends("score", 7).unwrap_err();
    assert_eq!(
        error.to_string(),
        "not enough data points for trend analysis"
    );
}

#[test]
fn period_comparison_reports_change_and_direction() {
    let mut tracker = PerformanceTracker::new("analysis");
    tracker.record(day(2024, 1, 1), &[("weight", 90.0)], None);
    tracker.record(day(2024, 1, 8), &[("weight", 88.0)], None);
    tracker.record(day(2024, 2, 1), &[("weight", 85.0)], None);
    tracker.record(day(2024, 2, 8), &[("weight", 83.0)], None);

    let january = Period::new(day(2024, 1, 1), day(2024, 1, 31));
    let february = Period::new(day(2024, 2, 1), day(2024, 2, 29));
    let comparison = tracker.compare_periods("weight", january, february).unwrap();

    assert_eq!(comparison.period1.stats.count, 2);
    assert_eq!(comparison.period1.stats.mean, 89.0);
    assert_eq!(comparison.period2.stats.mean, 84.0);
    assert_eq!(comparison.comparison.mean_change, -5.0);
    assert!((comparison.comparison.mean_change_percentage - (-500.0 / 89.0)).abs() < 1e-9);
    assert_eq!(comparison.comparison.median_change, -5.0);
    // "Improved" means the raw mean moved up, regardless of the goal
    // direction.
    assert!(!comparison.comparison.improved);

    let reversed = tracker.compare_periods("weight", february, january).unwrap();
    assert!(reversed.comparison.improved);
}

#[test]
fn period_bounds_are_inclusive() {
    let mut tracker = PerformanceTracker::new("analysis");
    tracker.record(day(2024, 1, 1), &[("score", 1.0)], None);
    tracker.record(day(2024, 1, 10), &[("score", 3.0)], None);
    tracker.record(day(2024, 1, 11), &[("score", 99.0)], None);

    let period = Period::new(day(2024, 1, 1), day(2024, 1, 10));
    let rest = Period::new(day(2024, 1, 11), day(2024, 1, 31));
    let comparison = tracker.compare_periods("score", period, rest).unwrap();
    assert_eq!(comparison.period1.stats.count, 2);
    assert_eq!(comparison.period1.stats.mean, 2.0);
}

#[test]
fn single_sample_period_has_no_deviation() {
    let mut tracker = PerformanceTracker::new("analysis");
    tracker.record(day(2024, 1, 1), &[("score", 5.0)], None);
    tracker.record(day(2024, 2, 1), &[("score", 7.0)], None);
    tracker.record(day(2024, 2, 2), &[("score", 9.0)], None);

    let january = Period::new(day(2024, 1, 1), day(2024, 1, 31));
    let february = Period::new(day(2024, 2, 1), day(2024, 2, 29));
    let comparison = tracker.compare_periods("score", january, february).unwrap();

    assert_eq!(comparison.period1.stats.std_dev, None);
    // Sample deviation for [7, 9]: sqrt(((1)^2 + (1)^2) / 1).
    let deviation = comparison.period2.stats.std_dev.unwrap();
    assert!((deviation - 2.0_f64.sqrt()).abs() < 1e-9);
}

#[test]
fn zero_baseline_mean_yields_infinite_percentage() {
    let mut tracker = PerformanceTracker::new("analysis");
    tracker.record(day(2024, 1, 1), &[("delta", 0.0)], None);
    tracker.record(day(2024, 2, 1), &[("delta", 5.0)], None);

    let january = Period::new(day(2024, 1, 1), day(2024, 1, 31));
    let february = Period::new(day(2024, 2, 1), day(2024, 2, 29));
    let comparison = tracker.compare_periods("delta", january, february).unwrap();

    assert!(comparison.comparison.mean_change_percentage.is_infinite());
    assert!(comparison.comparison.improved);
}

#[test]
fn comparison_rejects_empty_periods() {
    let mut tracker = PerformanceTracker::new("analysis");
    tracker.record(day(2024, 1, 1), &[("score", 1.0)], None);
    tracker.record(day(2024, 1, 2), &[("score", 2.0)], None);

    let january = Period::new(day(2024, 1, 1), day(2024, 1, 31));
    let empty = Period::new(day(2024, 6, 1), day(2024, 6, 30));
    let error = tracker.compare_periods("score", january, empty).unwrap_err();
    assert_eq!(error.to_string(), "insufficient data for one or both periods");
}

#[test]
fn analysis_skips_days_without_the_metric() {
    let mut tracker = PerformanceTracker::new("analysis");
    tracker.record(day(2024, 1, 1), &[("score", 1.0)], None);
    tracker.record(day(2024, 1, 2), &[("other", 50.0)], None);
    tracker.record(day(2024, 1, 3), &[("score", 3.0)], None);

    let stats = tracker.get_stats("score").unwrap();
    assert_eq!(stats.count, 2);

    let analysis = tracker.analyze_trends("score", 0).unwrap();
    assert_eq!(analysis.data_points, 2);
    assert_eq!(analysis.rolling_average, None);
}
