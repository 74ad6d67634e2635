//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `classpulse_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use chrono::NaiveDate;
use classpulse_core::PerformanceTracker;

fn main() {
    println!("classpulse_core ping={}", classpulse_core::ping());
    println!("classpulse_core version={}", classpulse_core::core_version());

    // Tiny tracker probe to validate core crate wiring end to end.
    let mut tracker = PerformanceTracker::new("smoke");
    if let (Some(first), Some(second)) = (day(2024, 1, 1), day(2024, 1, 8)) {
        tracker.record(first, &[("weight", 90.0)], None);
        tracker.record(second, &[("weight", 85.0)], None);
    }
    tracker.set_goal("weight", 75.0, None, None);

    match tracker.calculate_progress("weight") {
        Some(progress) => println!(
            "tracker probe progress={:.2}% remaining={:.1}",
            progress.progress_percentage, progress.remaining
        ),
        None => println!("tracker probe progress=unavailable"),
    }
}

fn day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
