use chrono::NaiveDate;
use classpulse_core::{PerformanceTracker, TrackerError};
use serde_json::Value;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn sample_tracker() -> PerformanceTracker {
    let mut tracker = PerformanceTracker::new("Fitness");
    tracker.record(day(2024, 1, 8), &[("weight", 85.0)], Some("good week"));
    tracker.record(day(2024, 1, 1), &[("weight", 90.0), ("pushups", 10.0)], None);
    tracker.record(day(2024, 1, 15), &[("pushups", 25.0)], None);
    tracker.set_goal("weight", 75.0, Some(day(2024, 6, 30)), Some("summer goal"));
    tracker
}

#[test]
fn document_rows_carry_every_metric_with_null_for_absent_values() {
    let tracker = sample_tracker();
    let document = tracker.to_document();

    assert_eq!(document.name, "Fitness");
    assert_eq!(document.metrics, ["weight", "pushups"]);
    assert_eq!(document.data.len(), 3);

    let first = &document.data[0];
    assert_eq!(first["date"], Value::String("2024-01-01".to_string()));
    assert_eq!(first["weight"].as_f64(), Some(90.0));
    assert_eq!(first["pushups"].as_f64(), Some(10.0));

    let second = &document.data[1];
    assert_eq!(second["date"], Value::String("2024-01-08".to_string()));
    assert_eq!(second["weight"].as_f64(), Some(85.0));
    assert_eq!(second["pushups"], Value::Null);

    assert_eq!(document.notes["2024-01-08"], "good week");
    assert!(document.goals.contains_key("weight"));
    assert!(!document.saved_at.is_empty());
}

#[test]
fn save_then_load_restores_equivalent_state() {
    let tracker = sample_tracker();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitness.json");

    tracker.save(&path).unwrap();
    let restored = PerformanceTracker::load(&path).unwrap();

    assert_eq!(restored.name(), tracker.name());
    assert_eq!(restored.metrics(), tracker.metrics());
    assert_eq!(restored.row_count(), tracker.row_count());
    assert_eq!(restored.note(day(2024, 1, 8)), Some("good week"));
    assert_eq!(restored.goal("weight"), tracker.goal("weight"));
    assert_eq!(restored.get_stats("weight"), tracker.get_stats("weight"));
    assert_eq!(restored.get_stats("pushups"), tracker.get_stats("pushups"));
    assert_eq!(
        restored.calculate_progress("weight"),
        tracker.calculate_progress("weight")
    );

    let report = restored.generate_report();
    let original_report = tracker.generate_report();
    assert_eq!(report.metrics_count, original_report.metrics_count);
    assert_eq!(report.data_points_count, original_report.data_points_count);
    assert_eq!(report.date_range, original_report.date_range);
    assert_eq!(report.current_values, original_report.current_values);
}

#[test]
fn from_document_restores_row_order_and_absent_values() {
    let tracker = sample_tracker();
    let restored = PerformanceTracker::from_document(&tracker.to_document()).unwrap();

    // Rows came back sorted with the gap preserved as an absent value.
    assert_eq!(restored.get_current_value("weight"), Some(85.0));
    assert_eq!(restored.get_current_value("pushups"), Some(25.0));
    let stats = restored.get_stats("weight").unwrap();
    assert_eq!(stats.count, 2);
}

#[test]
fn from_document_rejects_malformed_dates_and_values() {
    let tracker = sample_tracker();

    let mut document = tracker.to_document();
    document.data[0]["date"] = Value::String("01/02/2024".to_string());
    let error = PerformanceTracker::from_document(&document).unwrap_err();
    assert!(matches!(error, TrackerError::InvalidDate(_)));

    let mut document = tracker.to_document();
    document.data[0].remove("date");
    let error = PerformanceTracker::from_document(&document).unwrap_err();
    assert!(matches!(error, TrackerError::InvalidDocument(_)));

    let mut document = tracker.to_document();
    document.data[0]["weight"] = Value::String("ninety".to_string());
    let error = PerformanceTracker::from_document(&document).unwrap_err();
    assert!(matches!(error, TrackerError::InvalidDocument(_)));
}

#[test]
fn load_surfaces_io_and_parse_failures() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    let error = PerformanceTracker::load(&missing).unwrap_err();
    assert!(matches!(error, TrackerError::Io(_)));

    let garbled = dir.path().join("garbled.json");
    std::fs::write(&garbled, "{ not json").unwrap();
    let error = PerformanceTracker::load(&garbled).unwrap_err();
    assert!(matches!(error, TrackerError::Serialization(_)));
}

#[test]
fn saved_file_is_pretty_printed_json() {
    let tracker = sample_tracker();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitness.json");
    tracker.save(&path).unwrap();

    let payload = std::fs::read_to_string(&path).unwrap();
    assert!(payload.contains('\n'));
    let parsed: Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(parsed["name"], "Fitness");
    assert_eq!(parsed["data"].as_array().unwrap().len(), 3);
}
