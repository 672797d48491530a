//! Display formatting for durations, dates and file sizes.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

/// Format the time between `start` and `end` as `M.SS` or `H:MM.SS`.
///
/// Below one hour: minutes without and seconds with a leading zero, so
/// `0.00` thru `59.59`. From one hour on: `1:00.00` and up, with hours not
/// limited to a day. The fixed-width seconds keep running timers from
/// jittering. A negative difference counts as zero.
pub fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let total = (end - start).num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}.{:02}", hours, minutes, seconds)
    } else {
        format!("{}.{:02}", minutes, seconds)
    }
}

/// Format a date like `30 May 2020 17:39`, in the zone of `date`.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%-d %b %Y %H:%M").to_string()
}

/// Format a byte count like `1,5 KB`, using 1024-based units and at most
/// two decimals.
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed.replace('.', ","), UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn after(seconds: i64) -> String {
        let start = Utc::now();
        format_duration(start, start + Duration::seconds(seconds))
    }

    #[test]
    fn duration_zero() {
        assert_eq!(after(0), "0.00");
    }

    #[test]
    fn duration_below_one_minute() {
        assert_eq!(after(59), "0.59");
    }

    #[test]
    fn duration_one_minute() {
        assert_eq!(after(60), "1.00");
    }

    #[test]
    fn duration_below_one_hour() {
        assert_eq!(after(3599), "59.59");
    }

    #[test]
    fn duration_one_hour() {
        assert_eq!(after(3600), "1:00.00");
    }

    #[test]
    fn duration_pads_minutes_after_one_hour() {
        assert_eq!(after(3600 + 5 * 60 + 7), "1:05.07");
    }

    #[test]
    fn duration_hours_are_unbounded() {
        assert_eq!(after(90_000), "25:00.00");
    }

    #[test]
    fn duration_ignores_subsecond_and_negative() {
        let start = Utc::now();
        assert_eq!(
            format_duration(start, start + Duration::milliseconds(999)),
            "0.00"
        );
        assert_eq!(format_duration(start, start - Duration::seconds(5)), "0.00");
    }

    #[test]
    fn date_format() {
        let date = Utc.with_ymd_and_hms(2020, 5, 30, 17, 39, 12).unwrap();
        assert_eq!(format_date(&date), "30 May 2020 17:39");
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(500), "500 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1,5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
    }
}
